//! beaker-ai: Model streaming service abstraction
//!
//! This crate defines the contract between the conversation core and
//! whatever service actually talks to a language model: the role-tagged
//! message shape, tool definitions, and the ordered event stream a model
//! invocation produces.

pub mod error;
pub mod service;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use service::ModelService;
pub use stream::{ModelEvent, ModelEventStream};
pub use types::*;
