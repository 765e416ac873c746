//! Conversation state for a generative-UI chat service.
//!
//! A session keeps two representations of one conversation. The AI state is
//! an append-only log of [`Turn`]s, the single source of truth sent back to
//! the model on every invocation. The UI state is a list of [`UiFragment`]s
//! derived from the AI state by a pure projection; it is never edited
//! directly and can always be recomputed from the turn log.
//!
//! [`ChatSession`] ties the two together: it streams model output through a
//! transient cursor, commits whole turns on completion, runs generative-UI
//! tools, and persists finished conversations through a [`ChatStore`].

pub mod conversation;
pub mod cursor;
pub mod error;
pub mod events;
pub mod fragment;
pub mod handle;
pub mod identity;
pub mod projection;
pub mod session;
pub mod store;
pub mod tool;
pub mod tools;
pub mod turn;

pub use conversation::Conversation;
pub use cursor::StreamingCursor;
pub use error::{Error, Result};
pub use events::SessionEvent;
pub use fragment::{FragmentView, UiFragment};
pub use handle::SessionHandle;
pub use identity::{Anonymous, Identity, StaticUser, UserSession};
pub use projection::project_ui_state;
pub use session::{ChatSession, SessionConfig, DEFAULT_SYSTEM_PROMPT};
pub use store::{ChatRecord, ChatStore, StoreError, TITLE_MAX_CHARS};
pub use tool::{BoxedUiTool, FragmentSender, ToolCatalog, ToolOutcome, UiTool};
pub use turn::{AssistantContent, Turn};
