//! UI fragments: render-ready view models derived from AI state

use serde::{Deserialize, Serialize};

use crate::tools::analysis::AnalysisToolsData;
use crate::tools::events::ExperimentEvent;

/// One element of UI state: a reference to a renderable view model.
///
/// Derived, not authoritative; recomputable from AI state at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiFragment {
    pub id: String,
    pub display: FragmentView,
}

/// The view models the presentation layer knows how to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FragmentView {
    /// A user message bubble
    UserMessage { text: String },
    /// A completed assistant message
    AssistantMessage { text: String },
    /// The in-flight assistant message, updated as deltas arrive
    PendingMessage { text: String },
    /// A chip marking that the assistant invoked a tool
    ToolCall { tool_name: String },
    /// Placeholder shown while a tool generator is running
    ToolLoading { tool_name: String },
    /// Analysis tool recommendations card
    AnalysisTools { props: AnalysisToolsData },
    /// Experiment events timeline card
    ExperimentEvents { props: Vec<ExperimentEvent> },
    /// Inline error display
    ErrorMessage { message: String },
}
