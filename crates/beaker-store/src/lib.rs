//! File-backed persistence for beaker chat records.
//!
//! Implements [`beaker_chat::ChatStore`] over a directory of JSON files,
//! one per conversation.

pub mod file;

pub use file::FileChatStore;
