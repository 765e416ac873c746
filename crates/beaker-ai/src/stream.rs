//! Streaming event types

use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Events emitted during a model invocation, in order.
///
/// A well-behaved stream yields zero or more `TextDelta` events followed by
/// either a `TextDone` carrying the full assembled text, or a `ToolCall`
/// naming a catalog tool with its resolved arguments. `Error` may appear at
/// any point and terminates the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelEvent {
    /// Incremental text content
    TextDelta { delta: String },
    /// Text response completed; `content` is the full assembled text
    TextDone { content: String },
    /// The model invoked a tool
    ToolCall {
        name: String,
        arguments: serde_json::Value,
    },
    /// The invocation failed mid-stream
    Error { message: String },
}

impl ModelEvent {
    /// Check if this is a terminal event
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ModelEvent::TextDone { .. } | ModelEvent::ToolCall { .. } | ModelEvent::Error { .. }
        )
    }
}

/// A stream of model events
pub type ModelEventStream = Pin<Box<dyn Stream<Item = ModelEvent> + Send>>;
