//! Error types for beaker-ai

use thiserror::Error;

/// Result type alias using beaker-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when invoking a model service
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service returned an error response
    #[error("API error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },

    /// The invocation was aborted before completing
    #[error("Request aborted")]
    Aborted,

    /// The event stream failed mid-invocation
    #[error("Stream error: {0}")]
    Stream(String),

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),
}

impl Error {
    /// Create an API error from type and message
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }
}
