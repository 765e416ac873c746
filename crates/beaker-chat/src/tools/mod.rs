//! Built-in generative-UI tools for the research assistant

pub mod analysis;
pub mod events;

pub use analysis::RecommendAnalysisTools;
pub use events::GetEvents;
