//! Experiment events timeline

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fragment::FragmentView;
use crate::tool::{FragmentSender, ToolOutcome, UiTool};

pub const NAME: &str = "get_events";

/// One dated event on the timeline card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentEvent {
    /// The date of the event, in ISO-8601 format
    pub date: String,
    /// The headline of the event
    pub headline: String,
    /// The description of the event
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct GetEventsArgs {
    events: Vec<ExperimentEvent>,
}

/// Lists dated events describing research activity.
pub struct GetEvents;

#[async_trait]
impl UiTool for GetEvents {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "List events between user highlighted dates that describe research activity."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "events": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "date": {
                                "type": "string",
                                "description": "The date of the event, in ISO-8601 format"
                            },
                            "headline": {
                                "type": "string",
                                "description": "The headline of the event"
                            },
                            "description": {
                                "type": "string",
                                "description": "The description of the event"
                            }
                        },
                        "required": ["date", "headline", "description"]
                    }
                }
            },
            "required": ["events"]
        })
    }

    async fn run(
        &self,
        arguments: serde_json::Value,
        progress: FragmentSender,
    ) -> Result<ToolOutcome> {
        let args: GetEventsArgs =
            serde_json::from_value(arguments).map_err(|e| Error::tool(NAME, e.to_string()))?;

        progress.send(FragmentView::ToolLoading {
            tool_name: NAME.into(),
        });

        let result =
            serde_json::to_value(&args.events).map_err(|e| Error::tool(NAME, e.to_string()))?;
        Ok(ToolOutcome {
            result,
            view: FragmentView::ExperimentEvents { props: args.events },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn test_run_returns_events_result_and_view() {
        let (tx, _rx) = broadcast::channel(16);
        let progress = FragmentSender::new(tx, "frag_1");

        let args = serde_json::json!({
            "events": [{
                "date": "2026-03-01",
                "headline": "Pilot run complete",
                "description": "First assay batch processed"
            }]
        });

        let outcome = GetEvents.run(args, progress).await.unwrap();
        assert!(outcome.result.is_array());
        match outcome.view {
            FragmentView::ExperimentEvents { props } => {
                assert_eq!(props.len(), 1);
                assert_eq!(props[0].headline, "Pilot run complete");
            }
            other => panic!("expected ExperimentEvents view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_rejects_missing_events() {
        let (tx, _rx) = broadcast::channel(16);
        let progress = FragmentSender::new(tx, "frag_1");

        let err = GetEvents
            .run(serde_json::json!({}), progress)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool { ref name, .. } if name == NAME));
    }
}
