//! Error types for beaker-chat

use thiserror::Error;

/// Result type alias using beaker-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during session operations.
///
/// None of these are fatal to the process; every variant is recoverable at
/// the conversation level.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the model service layer
    #[error(transparent)]
    Model(#[from] beaker_ai::Error),

    /// The model stream failed mid-turn; the in-flight turn was discarded
    #[error("stream failed: {0}")]
    Stream(String),

    /// A tool generator failed; only that tool's turn pair was aborted
    #[error("tool '{name}' failed: {message}")]
    Tool { name: String, message: String },

    /// A persistence operation failed; AI state is unaffected
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),

    /// An invocation is already running for this conversation
    #[error("an invocation is already in progress")]
    Busy,

    /// A generic session error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a tool error
    pub fn tool(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            name: name.into(),
            message: message.into(),
        }
    }
}
