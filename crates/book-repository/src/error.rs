//! Error types for book record operations.

use thiserror::Error;

/// Errors from the record store and the repository.
///
/// The variants are the taxonomy the screens render from: validation
/// failures never reach the network, not-found redirects to the catalog,
/// and store/transport failures surface as inline messages. Nothing is
/// retried automatically.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A required field was empty; caught before any store call.
    #[error("Missing required field: {0}")]
    Validation(&'static str),

    /// No record exists for the identifier.
    #[error("Book not found: {0}")]
    NotFound(String),

    /// The record store rejected a request.
    #[error("Record store error: HTTP {status}: {message}")]
    Store { status: u16, message: String },

    /// No session is present for an authenticated store call.
    #[error("Not signed in")]
    NotSignedIn,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using RepositoryError.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_names_the_field() {
        let err = RepositoryError::Validation("title");
        assert_eq!(err.to_string(), "Missing required field: title");
    }

    #[test]
    fn not_found_names_the_id() {
        let err = RepositoryError::NotFound("bk-9".to_string());
        assert_eq!(err.to_string(), "Book not found: bk-9");
    }

    #[test]
    fn store_error_includes_status() {
        let err = RepositoryError::Store {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("unavailable"));
    }
}
