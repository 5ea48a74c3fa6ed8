//! Authentication error types.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid email or password
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Identity provider rejected a request
    #[error("Identity provider error: HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    /// Session was invalidated server-side (revoked, signed out elsewhere, etc.)
    #[error("Session invalid: {0}")]
    SessionInvalid(String),

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_includes_status_and_body() {
        let err = AuthError::Provider {
            status: 401,
            message: "invalid token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Identity provider error: HTTP 401: invalid token"
        );
    }

    #[test]
    fn invalid_credentials_display() {
        let err = AuthError::InvalidCredentials("bad password".to_string());
        assert!(err.to_string().contains("bad password"));
    }
}
