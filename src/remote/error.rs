//! Remote Store Errors

use thiserror::Error;

/// Errors that can occur when talking to the remote store
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The request could not be sent or the response could not be read.
    /// An empty endpoint URL ends up here at send time.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    /// The store answered with a non-success status
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// A row did not convert to or from the expected record shape
    #[error("Unexpected row in {table}: {error}")]
    Decode { table: String, error: String },

    /// Rejected by the store itself (used by in-process stores)
    #[error("{0}")]
    Rejected(String),
}

impl RemoteError {
    /// Message to show to a user, when the failure carries one
    pub fn service_message(&self) -> Option<String> {
        let message = match self {
            RemoteError::ApiError { message, .. } => message.trim().to_string(),
            RemoteError::Rejected(message) => message.trim().to_string(),
            other => other.to_string(),
        };
        (!message.is_empty()).then_some(message)
    }
}

/// Result type for remote store operations
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_message_prefers_store_text() {
        let err = RemoteError::ApiError {
            status: 409,
            message: "duplicate key value".to_string(),
        };
        assert_eq!(err.service_message().as_deref(), Some("duplicate key value"));
    }

    #[test]
    fn test_service_message_empty_is_none() {
        let err = RemoteError::ApiError {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(err.service_message(), None);
        assert_eq!(RemoteError::Rejected(String::new()).service_message(), None);
    }

    #[test]
    fn test_timeout_has_message() {
        assert_eq!(
            RemoteError::Timeout.service_message().as_deref(),
            Some("Request timeout")
        );
    }
}
