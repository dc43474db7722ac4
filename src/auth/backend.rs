use async_trait::async_trait;

use crate::error::AuthResult;

/// Capability interface to the external identity provider.
///
/// The provider is opaque to this crate: no wire protocol, request shaping,
/// or retry policy lives here. Implementations wrap whatever SDK or client
/// the host application uses and translate its failures into [`AuthError`]
/// (`Backend` for provider rejections, `Transport` for everything else).
///
/// [`AuthError`]: crate::error::AuthError
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Create a new account for `(email, password)` and establish a session
    /// for it. Credentials are forwarded untouched; the provider is the sole
    /// source of rejection.
    async fn create_account_and_session(&self, email: &str, password: &str) -> AuthResult<()>;

    /// Establish a session for an existing account.
    async fn create_session(&self, email: &str, password: &str) -> AuthResult<()>;

    /// Terminate the current session.
    async fn end_session(&self) -> AuthResult<()>;

    /// The access token of the in-memory SDK session, if any. Read
    /// immediately after a successful call to capture the token for
    /// persistence; expected to be absent after `end_session`.
    fn current_access_token(&self) -> Option<String>;

    /// Ask the provider to validate `token` and refresh the session it
    /// belongs to. On success the refreshed token is observable through
    /// [`current_access_token`](IdentityBackend::current_access_token).
    async fn validate_and_refresh(&self, token: &str) -> AuthResult<()>;
}
