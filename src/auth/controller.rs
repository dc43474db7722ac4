use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::auth::backend::IdentityBackend;
use crate::auth::state::AuthState;
use crate::auth::store::{TokenStore, ACCESS_TOKEN_KEY};
use crate::error::AuthResult;

/// Fallback error text for sign-up, login and session-restore failures
const GENERIC_FAILURE_MESSAGE: &str = "An error occurred";
/// Fallback error text for logout failures
const LOGOUT_FAILURE_MESSAGE: &str = "Logout failed";
/// Status text shown after a silent session restore
const SESSION_RESTORED_MESSAGE: &str = "User is logged in";

/// Owns the current [`AuthState`] and drives it through the identity backend
/// and token store capabilities.
///
/// Every mutating operation sets `Loading` strictly before its backend
/// round-trip and resolves strictly after it. Backend and store failures are
/// converted into the `Failed` state at the operation boundary; none of the
/// operations return an error to the caller.
///
/// Operations on one instance are serialized through an internal guard, so a
/// second invocation waits for the first to resolve instead of interleaving
/// with its Loading window. Distinct instances are fully independent.
pub struct AuthSessionController {
    backend: Arc<dyn IdentityBackend>,
    store: Arc<dyn TokenStore>,
    storage_key: String,
    state_tx: watch::Sender<AuthState>,
    op_guard: Mutex<()>,
}

impl AuthSessionController {
    /// Create a controller in the `Original` state, storing the session
    /// token under the default key.
    pub fn new(backend: Arc<dyn IdentityBackend>, store: Arc<dyn TokenStore>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Original);
        Self {
            backend,
            store,
            storage_key: ACCESS_TOKEN_KEY.to_string(),
            state_tx,
            op_guard: Mutex::new(()),
        }
    }

    /// Override the storage key, e.g. to namespace several controllers over
    /// one store file
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// The key under which this controller persists the session token
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// The current state
    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state changes. The receiver observes every transition
    /// published after subscription, plus the value current at that moment.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    /// Unconditional direct assignment, used by the presentation layer to
    /// force a reset (e.g. back to `Original` after logout navigation).
    /// Last-write-wins; bypasses the operation guard.
    pub fn set_state(&self, state: AuthState) {
        self.publish(state);
    }

    /// Create an account for `(email, password)` and establish a session.
    ///
    /// Success persists the backend's current access token and resolves to
    /// `Authenticated("")`; failure resolves to `Failed` with the error's
    /// description. Credentials are forwarded to the backend unvalidated.
    pub async fn sign_up(&self, email: &str, password: &str) {
        self.authenticate(email, password, true).await;
    }

    /// Establish a session for an existing account. Same contract as
    /// [`sign_up`](AuthSessionController::sign_up).
    pub async fn login(&self, email: &str, password: &str) {
        self.authenticate(email, password, false).await;
    }

    async fn authenticate(&self, email: &str, password: &str, is_sign_up: bool) {
        let operation = if is_sign_up { "sign_up" } else { "login" };
        let _guard = self.op_guard.lock().await;

        self.publish(AuthState::Loading);

        let result = if is_sign_up {
            self.backend.create_account_and_session(email, password).await
        } else {
            self.backend.create_session(email, password).await
        };

        let outcome = match result {
            Ok(()) => self.persist_current_token().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                info!(operation, "Session established");
                self.publish(AuthState::authenticated(""));
            }
            Err(e) => {
                warn!(operation, error = %e, "Authentication failed");
                self.publish(AuthState::failed(e.user_message(GENERIC_FAILURE_MESSAGE)));
            }
        }
    }

    /// Terminate the current session.
    ///
    /// Success persists whatever token value the backend reports after
    /// termination (expected empty) and resolves to `Original`. A backend
    /// error resolves to `Failed`, never a silent success.
    pub async fn logout(&self) {
        let _guard = self.op_guard.lock().await;

        self.publish(AuthState::Loading);

        let outcome = match self.backend.end_session().await {
            Ok(()) => self.persist_current_token().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                info!("Session terminated");
                self.publish(AuthState::Original);
            }
            Err(e) => {
                warn!(error = %e, "Logout failed");
                self.publish(AuthState::failed(e.user_message(LOGOUT_FAILURE_MESSAGE)));
            }
        }
    }

    /// Attempt a silent session restore from the persisted token.
    ///
    /// With no (or an empty) persisted token this resolves to `Original`
    /// without touching the backend. Otherwise the backend validates and
    /// refreshes the session, the current token is re-persisted, and the
    /// state resolves to `Authenticated("User is logged in")`. A rejected
    /// token resolves to `Failed` with the backend's description.
    pub async fn check_existing_session(&self) {
        let _guard = self.op_guard.lock().await;

        self.publish(AuthState::Loading);

        let token = match self.store.read(&self.storage_key).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                self.publish(AuthState::failed(e.user_message(GENERIC_FAILURE_MESSAGE)));
                return;
            }
        };

        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => {
                // Never logged in (or logged out); not an error
                debug!("No persisted token, nothing to restore");
                self.publish(AuthState::Original);
                return;
            }
        };

        let outcome = match self.backend.validate_and_refresh(&token).await {
            Ok(()) => self.persist_current_token().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                info!("Existing session restored");
                self.publish(AuthState::authenticated(SESSION_RESTORED_MESSAGE));
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed");
                self.publish(AuthState::failed(e.user_message(GENERIC_FAILURE_MESSAGE)));
            }
        }
    }

    /// Capture the backend's in-memory access token and persist it. A
    /// backend with no current token persists the empty string, which reads
    /// back as "no session" on the next restore attempt.
    async fn persist_current_token(&self) -> AuthResult<()> {
        let token = self.backend.current_access_token().unwrap_or_default();
        self.store.save(&self.storage_key, &token).await?;
        debug!(key = %self.storage_key, "Access token persisted");
        Ok(())
    }

    fn publish(&self, state: AuthState) {
        debug!(state = ?state, "Auth state transition");
        self.state_tx.send_replace(state);
    }
}

impl std::fmt::Debug for AuthSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionController")
            .field("storage_key", &self.storage_key)
            .field("state", &self.state())
            .finish()
    }
}
