use thiserror::Error;

use crate::routing::AppPath;

/// Failures reported by an identity provider.
///
/// The session store hands these back to callers exactly as the provider
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Auth API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

impl AuthError {
    /// Whether the provider rejected the request because the session is
    /// already gone.
    pub fn is_session_missing(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403 | 404, .. })
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("Too many redirects while navigating to {path}")]
    RedirectLoop { path: AppPath },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> AuthError {
        AuthError::Api {
            status,
            message: "rejected".to_string(),
        }
    }

    #[test]
    fn test_session_missing_statuses() {
        for status in [401, 403, 404] {
            assert!(api(status).is_session_missing());
        }
    }

    #[test]
    fn test_other_failures_are_not_session_missing() {
        assert!(!api(400).is_session_missing());
        assert!(!api(500).is_session_missing());
        assert!(!AuthError::Network("offline".to_string()).is_session_missing());
        assert!(!AuthError::Decode("bad json".to_string()).is_session_missing());
    }
}
