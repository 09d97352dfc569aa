//! Error types for Notion operations.

use thiserror::Error;

/// Errors that can occur while talking to a record store.
#[derive(Error, Debug)]
pub enum NotionError {
    /// The page does not exist, is archived, or belongs to another database.
    #[error("page not found: {0}")]
    NotFound(String),

    /// The integration token was rejected or lacks access.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Notion throttled the request.
    #[error("rate limited by Notion")]
    RateLimited {
        /// Seconds Notion asked us to wait, if it said.
        retry_after: Option<u64>,
    },

    /// Any other non-success response from the API.
    #[error("notion api error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not what we expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for NotionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NotionError::Decode(err.to_string())
        } else {
            NotionError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NotionError {
    fn from(err: serde_json::Error) -> Self {
        NotionError::Decode(err.to_string())
    }
}

/// Result type alias for Notion operations.
pub type Result<T> = std::result::Result<T, NotionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotionError::Api {
            status: 400,
            code: "validation_error".into(),
            message: "bad filter".into(),
        };
        assert_eq!(
            err.to_string(),
            "notion api error 400 (validation_error): bad filter"
        );
        assert_eq!(
            NotionError::NotFound("abc".into()).to_string(),
            "page not found: abc"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err: NotionError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, NotionError::Decode(_)));
    }
}
