use serde::{Deserialize, Serialize};

/// Enum representing the session states observable by a presentation layer.
///
/// Exactly one variant is active at any time. Every operation on the
/// controller sets `Loading` strictly before its backend round-trip and
/// resolves to one of the other variants strictly after it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthState {
    /// No authenticated session; the initial value
    Original,

    /// An operation is in flight
    Loading,

    /// The last operation succeeded
    Authenticated {
        /// Human-readable status text (may be empty)
        message: String,
    },

    /// The last operation failed
    Failed {
        /// Human-readable error description
        message: String,
    },
}

impl AuthState {
    /// Successful state carrying a status message
    pub fn authenticated(message: impl Into<String>) -> Self {
        AuthState::Authenticated {
            message: message.into(),
        }
    }

    /// Failed state carrying an error description
    pub fn failed(message: impl Into<String>) -> Self {
        AuthState::Failed {
            message: message.into(),
        }
    }

    /// Whether an operation is currently in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    /// Whether the session is established
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    /// The status or error text, if this state carries one
    pub fn message(&self) -> Option<&str> {
        match self {
            AuthState::Original | AuthState::Loading => None,
            AuthState::Authenticated { message } => Some(message),
            AuthState::Failed { message } => Some(message),
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        AuthState::Original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_original() {
        assert_eq!(AuthState::default(), AuthState::Original);
    }

    #[test]
    fn message_accessor_matches_variant() {
        assert_eq!(AuthState::Original.message(), None);
        assert_eq!(AuthState::Loading.message(), None);
        assert_eq!(AuthState::authenticated("").message(), Some(""));
        assert_eq!(AuthState::failed("boom").message(), Some("boom"));
    }

    #[test]
    fn serde_round_trip() {
        let state = AuthState::failed("Token expired");
        let json = serde_json::to_string(&state).unwrap();
        let back: AuthState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
