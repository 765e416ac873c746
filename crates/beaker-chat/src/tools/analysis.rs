//! Analysis tool recommendations

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fragment::FragmentView;
use crate::tool::{FragmentSender, ToolOutcome, UiTool};

pub const NAME: &str = "recommend_analysis_tools";

/// At most this many recommendations per call, enforced by the schema
pub const MAX_RECOMMENDATIONS: usize = 5;

/// One recommended analysis tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecommendation {
    /// The name of the tool
    pub name: String,
    /// The description of the tool
    pub description: String,
    /// The category of the tool
    pub category: String,
    /// A URL to learn more or access the tool
    pub url: String,
}

/// The recommendations card payload: tool arguments, tool result, and view
/// props are all this shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisToolsData {
    /// The problem or topic of the analysis
    pub topic: String,
    pub recommendations: Vec<AnalysisRecommendation>,
}

/// Recommends tools for analysing experiment results.
pub struct RecommendAnalysisTools;

#[async_trait]
impl UiTool for RecommendAnalysisTools {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "List recommended tools for analysing experiment results, max 5."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "The problem or topic of the analysis"
                },
                "recommendations": {
                    "type": "array",
                    "maxItems": MAX_RECOMMENDATIONS,
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {
                                "type": "string",
                                "description": "The name of the tool"
                            },
                            "description": {
                                "type": "string",
                                "description": "The description of the tool"
                            },
                            "category": {
                                "type": "string",
                                "description": "The category of the tool"
                            },
                            "url": {
                                "type": "string",
                                "description": "A URL to learn more or access the tool"
                            }
                        },
                        "required": ["name", "description", "category", "url"]
                    }
                }
            },
            "required": ["topic", "recommendations"]
        })
    }

    async fn run(
        &self,
        arguments: serde_json::Value,
        progress: FragmentSender,
    ) -> Result<ToolOutcome> {
        let data: AnalysisToolsData = serde_json::from_value(arguments)
            .map_err(|e| Error::tool(NAME, e.to_string()))?;

        progress.send(FragmentView::ToolLoading {
            tool_name: NAME.into(),
        });

        let result = serde_json::to_value(&data).map_err(|e| Error::tool(NAME, e.to_string()))?;
        Ok(ToolOutcome {
            result,
            view: FragmentView::AnalysisTools { props: data },
        })
    }
}
