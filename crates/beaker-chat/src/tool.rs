//! UI tool trait, progress reporting, and the tool catalog

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use beaker_ai::ToolDefinition;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::events::SessionEvent;
use crate::fragment::{FragmentView, UiFragment};

/// What a tool generator finally produces: the structured result recorded in
/// the tool turn, and the view that becomes the persisted fragment for it
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub result: serde_json::Value,
    pub view: FragmentView,
}

/// A sender for intermediate fragment yields during tool execution.
///
/// Views sent here become transient loading-state fragments; they are never
/// committed to AI state.
#[derive(Clone)]
pub struct FragmentSender {
    tx: broadcast::Sender<SessionEvent>,
    fragment_id: String,
}

impl FragmentSender {
    pub(crate) fn new(tx: broadcast::Sender<SessionEvent>, fragment_id: impl Into<String>) -> Self {
        Self {
            tx,
            fragment_id: fragment_id.into(),
        }
    }

    /// Emit an intermediate view for the in-flight tool fragment
    pub fn send(&self, view: FragmentView) {
        let _ = self.tx.send(SessionEvent::FragmentUpdate {
            fragment: UiFragment {
                id: self.fragment_id.clone(),
                display: view,
            },
        });
    }
}

/// A named, schema-described capability the model may invoke.
///
/// `run` may send any number of intermediate views through `progress` and
/// finishes with a final view plus a structured result. A failed run aborts
/// only this tool's turn pair.
#[async_trait]
pub trait UiTool: Send + Sync {
    /// Tool name (used in API calls and projection rules)
    fn name(&self) -> &str;

    /// Tool description for the model
    fn description(&self) -> &str;

    /// JSON Schema for arguments
    fn parameters_schema(&self) -> serde_json::Value;

    /// Drive the tool to completion with the model-resolved arguments
    async fn run(&self, arguments: serde_json::Value, progress: FragmentSender)
        -> Result<ToolOutcome>;
}

/// Type alias for a shared tool
pub type BoxedUiTool = Arc<dyn UiTool>;

/// Convert a UiTool to an API tool definition
pub fn to_definition(tool: &dyn UiTool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters: tool.parameters_schema(),
    }
}

/// The catalog of tools available to a session, with compiled argument
/// validators cached per tool name
#[derive(Default)]
pub struct ToolCatalog {
    tools: Vec<BoxedUiTool>,
    schema_cache: HashMap<String, Arc<jsonschema::Validator>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool
    pub fn add(&mut self, tool: BoxedUiTool) {
        self.cache_schema(&tool);
        self.tools.push(tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&BoxedUiTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// API definitions for every tool in the catalog
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| to_definition(t.as_ref())).collect()
    }

    /// Names of all registered tools
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate arguments against the tool's schema.
    /// Returns `Some(error_message)` if validation fails, `None` if valid
    /// (or if the tool's schema failed to compile and validation is skipped).
    pub fn validate(&self, name: &str, arguments: &serde_json::Value) -> Option<String> {
        let validator = self.schema_cache.get(name)?;
        let errors: Vec<String> = validator
            .iter_errors(arguments)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();

        if errors.is_empty() {
            None
        } else {
            Some(format!(
                "Tool argument validation failed:\n{}",
                errors.join("\n")
            ))
        }
    }

    fn cache_schema(&mut self, tool: &BoxedUiTool) {
        let schema = tool.parameters_schema();
        match jsonschema::validator_for(&schema) {
            Ok(validator) => {
                self.schema_cache
                    .insert(tool.name().to_string(), Arc::new(validator));
            }
            Err(e) => {
                tracing::warn!(
                    "Invalid parameter schema for tool '{}', skipping validation: {}",
                    tool.name(),
                    e
                );
            }
        }
    }
}
