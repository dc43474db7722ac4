//! Session-state core for email/password authentication against an opaque
//! identity provider.
//!
//! The crate owns two things: the four-state session state machine
//! ([`AuthState`] driven by [`AuthSessionController`]) and the token
//! persistence contract ([`TokenStore`]). The identity provider itself is an
//! external capability behind [`IdentityBackend`]; rendering the state is the
//! host application's concern, observed through a `watch` subscription.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// Export modules
pub mod auth;
pub mod error;

pub use auth::{
    AuthSessionController, AuthState, IdentityBackend, JsonFileTokenStore, MemoryTokenStore,
    TokenStore, ACCESS_TOKEN_KEY,
};
pub use error::{AuthError, AuthResult};

/// Default file name for the file-backed token store
pub const DEFAULT_STORE_FILE: &str = "authflow.tokens.json";

/// Configuration for the session core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Logical key the session token is stored under
    pub storage_key: String,
    /// File backing the token store
    pub store_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            storage_key: ACCESS_TOKEN_KEY.to_string(),
            store_file: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

impl AuthConfig {
    /// Build the file-backed store this configuration points at
    pub fn open_store(&self) -> JsonFileTokenStore {
        JsonFileTokenStore::new(self.store_file.clone())
    }

    /// Build a controller over `backend` and `store` using this
    /// configuration's storage key
    pub fn controller(
        &self,
        backend: std::sync::Arc<dyn IdentityBackend>,
        store: std::sync::Arc<dyn TokenStore>,
    ) -> AuthSessionController {
        AuthSessionController::new(backend, store).with_storage_key(self.storage_key.clone())
    }
}

/// Install a global tracing subscriber filtered by `RUST_LOG`, loading `.env`
/// first. Intended for binaries and examples embedding this crate; the
/// library itself never installs a subscriber.
pub fn init_tracing() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
