//! Streaming cursor: the transient accumulator for an in-flight assistant turn

use crate::fragment::{FragmentView, UiFragment};
use crate::turn::next_id;

/// Accumulates text deltas for the assistant turn currently being streamed.
///
/// Exists only for the lifetime of one model invocation and is discarded
/// once the turn is committed (or the stream fails). Deltas are applied
/// strictly in emission order.
#[derive(Debug)]
pub struct StreamingCursor {
    turn_id: String,
    buffer: String,
}

impl Default for StreamingCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingCursor {
    /// Start a cursor for a new in-flight turn
    pub fn new() -> Self {
        Self {
            turn_id: next_id(),
            buffer: String::new(),
        }
    }

    /// Append one text delta
    pub fn push_delta(&mut self, delta: &str) {
        self.buffer.push_str(delta);
    }

    /// The accumulated text so far
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// The id the committed turn will carry
    pub fn turn_id(&self) -> &str {
        &self.turn_id
    }

    /// Consume the cursor, yielding the turn id for the commit
    pub fn into_turn_id(self) -> String {
        self.turn_id
    }

    /// The live fragment representing the in-flight turn
    pub fn live_fragment(&self) -> UiFragment {
        UiFragment {
            id: self.turn_id.clone(),
            display: FragmentView::PendingMessage {
                text: self.buffer.clone(),
            },
        }
    }
}
