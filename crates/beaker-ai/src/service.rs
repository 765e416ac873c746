//! Model service trait

use async_trait::async_trait;

use crate::error::Result;
use crate::stream::ModelEventStream;
use crate::types::ModelRequest;

/// A service that runs one model invocation and streams its events.
///
/// Implementations own all transport concerns (HTTP, SSE parsing, retries,
/// timeouts). Callers await the returned stream; ceasing to consume it is
/// sufficient to abandon an invocation.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Start an invocation, returning its ordered event stream
    async fn stream(&self, request: ModelRequest) -> Result<ModelEventStream>;
}
