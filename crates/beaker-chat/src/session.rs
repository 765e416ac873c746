//! Chat session: orchestrates AI state, model invocations, and persistence

use std::sync::Arc;
use std::sync::atomic::Ordering;

use beaker_ai::{ModelEvent, ModelRequest, ModelService};
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::conversation::Conversation;
use crate::cursor::StreamingCursor;
use crate::error::{Error, Result};
use crate::events::SessionEvent;
use crate::fragment::{FragmentView, UiFragment};
use crate::handle::SessionHandle;
use crate::identity::Identity;
use crate::projection::project_ui_state;
use crate::store::{ChatRecord, ChatStore};
use crate::tool::{BoxedUiTool, FragmentSender, ToolCatalog};
use crate::turn::{self, Turn};

/// Default system prompt for the research assistant
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a scientific research assistant and you can help researchers, step by step. \
You and the researcher can discuss ideas, form hypotheses, and design experiments.

If the user requests tools to perform analysis, call `recommend_analysis_tools` to \
show tool recommendations.

If the user wants to execute an experiment directly, or complete another impossible \
task, respond that you are a demo and cannot do that.

Besides that, you can also chat with users and do some basic calculations if needed.";

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model identifier passed to the model service
    pub model: String,
    /// System prompt
    pub system_prompt: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }
}

/// One conversation's server-side session.
///
/// Owns the append-only AI state and keeps the derived UI state consistent
/// with it as turns stream in. All collaborators are injected; there is no
/// ambient registry. One invocation runs at a time per session (the
/// append-only turn log assumes serialized writers); independent sessions
/// share no mutable state.
pub struct ChatSession {
    config: SessionConfig,
    conversation: Conversation,
    catalog: ToolCatalog,
    model: Arc<dyn ModelService>,
    store: Arc<dyn ChatStore>,
    identity: Arc<dyn Identity>,
    event_tx: broadcast::Sender<SessionEvent>,
    handle: SessionHandle,
}

impl ChatSession {
    /// Create a session for a new, empty conversation
    pub fn new(
        config: SessionConfig,
        model: Arc<dyn ModelService>,
        store: Arc<dyn ChatStore>,
        identity: Arc<dyn Identity>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            config,
            conversation: Conversation::new(),
            catalog: ToolCatalog::new(),
            model,
            store,
            identity,
            event_tx,
            handle: SessionHandle::new(),
        }
    }

    /// Resume a session from a persisted record.
    ///
    /// Projecting the resumed conversation reproduces the same UI state the
    /// live session had.
    pub fn resume(
        config: SessionConfig,
        record: ChatRecord,
        model: Arc<dyn ModelService>,
        store: Arc<dyn ChatStore>,
        identity: Arc<dyn Identity>,
    ) -> Self {
        let mut session = Self::new(config, model, store, identity);
        session.conversation = Conversation::from_turns(record.id, record.turns);
        session
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Get a cloneable handle for cancelling from external code
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// The conversation's AI state
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// All committed turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        self.conversation.turns()
    }

    /// Add a tool to the catalog
    pub fn add_tool(&mut self, tool: BoxedUiTool) {
        self.catalog.add(tool);
    }

    /// The current UI state: the pure projection of committed AI state.
    ///
    /// The in-flight fragment, if any, is delivered through session events
    /// only and never appears here.
    pub fn ui_state(&self) -> Vec<UiFragment> {
        project_ui_state(&self.conversation)
    }

    /// Append a user turn to AI state.
    ///
    /// Always succeeds; rejecting empty submissions is the caller layer's
    /// responsibility.
    pub fn append_user_turn(&mut self, content: impl Into<String>) -> Turn {
        let turn = Turn::user(content);
        self.commit(turn.clone());
        turn
    }

    /// Run one model invocation against the full AI state history.
    ///
    /// AI state is only mutated by whole-turn appends; partial progress
    /// lives in the streaming cursor and the live fragment. A failure
    /// mid-stream discards the in-flight turn and leaves AI state at its
    /// last committed turn.
    pub async fn invoke_assistant(&mut self) -> Result<()> {
        if self.handle.is_running() {
            return Err(Error::Busy);
        }
        *self.handle.cancel.lock() = CancellationToken::new();
        self.handle.is_running.store(true, Ordering::Release);
        let _ = self.event_tx.send(SessionEvent::InvocationStart);

        let result = self.run_invocation().await;

        if let Err(ref e) = result {
            let _ = self.event_tx.send(SessionEvent::Error {
                message: e.to_string(),
            });
        }
        let _ = self.event_tx.send(SessionEvent::InvocationEnd);
        self.handle.is_running.store(false, Ordering::Release);
        self.handle.idle_notify.notify_waiters();

        result
    }

    /// Persist the conversation for the current user.
    ///
    /// A no-op for anonymous sessions and empty conversations, per the
    /// product decision to allow ephemeral anonymous chat.
    pub async fn finalize_and_persist(&self) -> Result<Option<ChatRecord>> {
        let Some(user) = self.identity.current_session().await else {
            tracing::debug!("anonymous session, skipping persistence");
            return Ok(None);
        };
        if self.conversation.is_empty() {
            return Ok(None);
        }

        let record = ChatRecord::from_conversation(&self.conversation, user.user_id);
        self.store.save(&record).await?;
        Ok(Some(record))
    }

    fn commit(&mut self, turn: Turn) {
        self.conversation.push(turn.clone());
        let _ = self.event_tx.send(SessionEvent::TurnCommitted { turn });
    }

    fn build_request(&self) -> ModelRequest {
        let mut request =
            ModelRequest::new(&self.config.model, self.config.system_prompt.clone());
        for message in self.conversation.chat_messages() {
            request.push(message);
        }
        for definition in self.catalog.definitions() {
            request.add_tool(definition);
        }
        request
    }

    /// Emit the final form of the most recently committed fragment
    fn emit_last_fragment(&self) {
        if let Some(fragment) = self.ui_state().pop() {
            let _ = self.event_tx.send(SessionEvent::FragmentDone { fragment });
        }
    }

    fn emit_error_fragment(&self, fragment_id: String, message: impl Into<String>) {
        let _ = self.event_tx.send(SessionEvent::FragmentDone {
            fragment: UiFragment {
                id: fragment_id,
                display: FragmentView::ErrorMessage {
                    message: message.into(),
                },
            },
        });
    }

    async fn run_invocation(&mut self) -> Result<()> {
        let request = self.build_request();
        let cancel = self.handle.cancel_token();
        let mut stream = self.model.stream(request).await?;

        let mut cursor: Option<StreamingCursor> = None;

        while let Some(event) = stream.next().await {
            if cancel.is_cancelled() {
                // Discard the in-flight turn; AI state stays at the last
                // committed turn and no error is surfaced.
                return Ok(());
            }

            match event {
                ModelEvent::TextDelta { delta } => {
                    let cursor = cursor.get_or_insert_with(StreamingCursor::new);
                    cursor.push_delta(&delta);
                    let _ = self.event_tx.send(SessionEvent::FragmentUpdate {
                        fragment: cursor.live_fragment(),
                    });
                }
                ModelEvent::TextDone { content } => {
                    let turn_id = cursor
                        .take()
                        .map(StreamingCursor::into_turn_id)
                        .unwrap_or_else(turn::next_id);
                    self.commit(Turn::assistant_text_with_id(turn_id, content));
                    self.emit_last_fragment();
                }
                ModelEvent::ToolCall { name, arguments } => {
                    self.run_tool(&name, arguments).await;
                }
                ModelEvent::Error { message } => {
                    let fragment_id = cursor
                        .take()
                        .map(StreamingCursor::into_turn_id)
                        .unwrap_or_else(turn::next_id);
                    self.emit_error_fragment(fragment_id, message.clone());
                    return Err(Error::Stream(message));
                }
            }
        }

        Ok(())
    }

    /// Execute one tool call event: validate, drive the generator, and on
    /// success append the assistant/tool turn pair. A failure here aborts
    /// only this tool's turn pair, never the conversation.
    async fn run_tool(&mut self, name: &str, arguments: serde_json::Value) {
        let Some(tool) = self.catalog.get(name).cloned() else {
            tracing::warn!("model invoked unknown tool '{}'", name);
            self.emit_error_fragment(turn::next_id(), format!("Unknown tool: {}", name));
            return;
        };

        let tool_call_id = turn::next_id();
        let _ = self.event_tx.send(SessionEvent::ToolExecutionStart {
            tool_call_id: tool_call_id.clone(),
            tool_name: name.to_string(),
            arguments: arguments.clone(),
        });

        if let Some(validation_error) = self.catalog.validate(name, &arguments) {
            tracing::warn!("rejecting tool call '{}': {}", name, validation_error);
            let _ = self.event_tx.send(SessionEvent::ToolExecutionEnd {
                tool_call_id: tool_call_id.clone(),
                tool_name: name.to_string(),
                is_error: true,
            });
            self.emit_error_fragment(tool_call_id, validation_error);
            return;
        }

        let progress = FragmentSender::new(self.event_tx.clone(), tool_call_id.clone());
        match tool.run(arguments.clone(), progress).await {
            Ok(outcome) => {
                let (call_turn, result_turn) = self.conversation.push_tool_exchange(
                    tool_call_id.clone(),
                    name,
                    arguments,
                    outcome.result,
                );
                let _ = self.event_tx.send(SessionEvent::TurnCommitted { turn: call_turn });
                let _ = self
                    .event_tx
                    .send(SessionEvent::TurnCommitted { turn: result_turn });
                self.emit_last_fragment();
                let _ = self.event_tx.send(SessionEvent::ToolExecutionEnd {
                    tool_call_id,
                    tool_name: name.to_string(),
                    is_error: false,
                });
            }
            Err(e) => {
                tracing::warn!("tool '{}' failed: {}", name, e);
                let _ = self.event_tx.send(SessionEvent::ToolExecutionEnd {
                    tool_call_id: tool_call_id.clone(),
                    tool_name: name.to_string(),
                    is_error: true,
                });
                self.emit_error_fragment(tool_call_id, e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Anonymous, StaticUser};
    use crate::store::StoreError;
    use crate::tools::analysis::{self, RecommendAnalysisTools};
    use async_trait::async_trait;
    use beaker_ai::ModelEventStream;
    use parking_lot::Mutex;

    /// Replays one scripted event sequence per invocation.
    struct ScriptedModel {
        scripts: Mutex<Vec<Vec<ModelEvent>>>,
    }

    impl ScriptedModel {
        fn new(scripts: Vec<Vec<ModelEvent>>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(scripts),
            })
        }
    }

    #[async_trait]
    impl ModelService for ScriptedModel {
        async fn stream(&self, _request: ModelRequest) -> beaker_ai::Result<ModelEventStream> {
            let events = {
                let mut scripts = self.scripts.lock();
                if scripts.is_empty() {
                    vec![ModelEvent::TextDone { content: "done".into() }]
                } else {
                    scripts.remove(0)
                }
            };
            Ok(Box::pin(async_stream::stream! {
                for event in events {
                    yield event;
                }
            }))
        }
    }

    /// Records saves; never fails.
    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<ChatRecord>>,
    }

    #[async_trait]
    impl ChatStore for MemoryStore {
        async fn save(&self, record: &ChatRecord) -> std::result::Result<(), StoreError> {
            self.saved.lock().push(record.clone());
            Ok(())
        }
        async fn load(&self, owner_id: &str) -> std::result::Result<Vec<ChatRecord>, StoreError> {
            Ok(self
                .saved
                .lock()
                .iter()
                .filter(|r| r.owner_id == owner_id)
                .cloned()
                .collect())
        }
        async fn remove(&self, id: &str) -> std::result::Result<(), StoreError> {
            self.saved.lock().retain(|r| r.id != id);
            Ok(())
        }
        async fn clear(&self, owner_id: &str) -> std::result::Result<(), StoreError> {
            self.saved.lock().retain(|r| r.owner_id != owner_id);
            Ok(())
        }
    }

    fn make_session(scripts: Vec<Vec<ModelEvent>>) -> (ChatSession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let session = ChatSession::new(
            SessionConfig::default(),
            ScriptedModel::new(scripts),
            store.clone(),
            Arc::new(StaticUser::new("user-1")),
        );
        (session, store)
    }

    fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = vec![];
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_hello_scenario_streams_then_commits() {
        let (mut session, _store) = make_session(vec![vec![
            ModelEvent::TextDelta { delta: "Hi".into() },
            ModelEvent::TextDelta { delta: " there".into() },
            ModelEvent::TextDone { content: "Hi there".into() },
        ]]);
        let mut rx = session.subscribe();

        session.append_user_turn("hello");
        session.invoke_assistant().await.unwrap();

        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text(), "hello");
        assert_eq!(turns[1].text(), "Hi there");

        let fragments = session.ui_state();
        assert_eq!(fragments.len(), 2);
        assert!(matches!(fragments[1].display, FragmentView::AssistantMessage { ref text } if text == "Hi there"));

        // Live fragment grew delta by delta, in order
        let updates: Vec<String> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::FragmentUpdate { fragment } => match fragment.display {
                    FragmentView::PendingMessage { text } => Some(text),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(updates, vec!["Hi".to_string(), "Hi there".to_string()]);
    }

    #[tokio::test]
    async fn test_tool_call_appends_turn_pair_and_fragment() {
        let args = serde_json::json!({
            "topic": "rna-seq",
            "recommendations": [{
                "name": "DESeq2",
                "description": "Differential expression",
                "category": "statistics",
                "url": "https://bioconductor.org/packages/DESeq2"
            }]
        });
        let (mut session, _store) = make_session(vec![vec![ModelEvent::ToolCall {
            name: analysis::NAME.into(),
            arguments: args,
        }]]);
        session.add_tool(Arc::new(RecommendAnalysisTools));

        session.append_user_turn("what tools should I use?");
        session.invoke_assistant().await.unwrap();

        let turns = session.turns();
        assert_eq!(turns.len(), 3);
        let (call_id, name, _) = turns[1].tool_call().unwrap();
        assert_eq!(name, analysis::NAME);
        match &turns[2] {
            Turn::Tool {
                tool_call_id,
                tool_name,
                ..
            } => {
                assert_eq!(tool_call_id, call_id);
                assert_eq!(tool_name, analysis::NAME);
            }
            other => panic!("expected tool turn, got {:?}", other),
        }

        let fragments = session.ui_state();
        assert_eq!(fragments.len(), 3);
        assert!(matches!(
            fragments[2].display,
            FragmentView::AnalysisTools { ref props } if props.recommendations.len() == 1
        ));
    }

    #[tokio::test]
    async fn test_stream_failure_discards_in_flight_turn() {
        let (mut session, _store) = make_session(vec![vec![
            ModelEvent::TextDelta { delta: "Hi".into() },
            ModelEvent::Error { message: "connection reset".into() },
        ]]);
        let mut rx = session.subscribe();

        session.append_user_turn("hello");
        let err = session.invoke_assistant().await.unwrap_err();
        assert!(matches!(err, Error::Stream(_)));

        // AI state unchanged beyond the user turn
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.ui_state().len(), 1);

        // Live fragment transitioned to an error display
        let saw_error_fragment = drain(&mut rx).iter().any(|e| {
            matches!(
                e,
                SessionEvent::FragmentDone { fragment } if matches!(fragment.display, FragmentView::ErrorMessage { .. })
            )
        });
        assert!(saw_error_fragment);
        assert!(!session.handle().is_running());
    }

    #[tokio::test]
    async fn test_tool_failure_aborts_only_that_pair() {
        // Arguments fail schema validation: recommendations has the wrong type
        let (mut session, _store) = make_session(vec![vec![
            ModelEvent::ToolCall {
                name: analysis::NAME.into(),
                arguments: serde_json::json!({"topic": "x", "recommendations": "nope"}),
            },
            ModelEvent::TextDone { content: "Sorry, that failed.".into() },
        ]]);
        session.add_tool(Arc::new(RecommendAnalysisTools));

        session.append_user_turn("recommend");
        session.invoke_assistant().await.unwrap();

        // No tool turn pair; the follow-up text turn still committed
        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].text(), "Sorry, that failed.");
    }

    #[tokio::test]
    async fn test_unknown_tool_commits_nothing() {
        let (mut session, _store) = make_session(vec![vec![ModelEvent::ToolCall {
            name: "mystery_tool".into(),
            arguments: serde_json::json!({}),
        }]]);

        session.append_user_turn("hm");
        session.invoke_assistant().await.unwrap();
        assert_eq!(session.turns().len(), 1);
    }

    /// Yields a delta, aborts the session mid-stream, then tries to finish.
    struct AbortingModel {
        handle: Mutex<Option<SessionHandle>>,
    }

    #[async_trait]
    impl ModelService for AbortingModel {
        async fn stream(&self, _request: ModelRequest) -> beaker_ai::Result<ModelEventStream> {
            let handle = self.handle.lock().take();
            Ok(Box::pin(async_stream::stream! {
                yield ModelEvent::TextDelta { delta: "Hi".into() };
                if let Some(handle) = handle {
                    handle.abort();
                }
                yield ModelEvent::TextDone { content: "Hi there".into() };
            }))
        }
    }

    #[tokio::test]
    async fn test_cancellation_discards_cursor_without_error() {
        let model = Arc::new(AbortingModel {
            handle: Mutex::new(None),
        });
        let mut session = ChatSession::new(
            SessionConfig::default(),
            model.clone(),
            Arc::new(MemoryStore::default()),
            Arc::new(StaticUser::new("user-1")),
        );
        *model.handle.lock() = Some(session.handle());

        session.append_user_turn("hello");
        session.invoke_assistant().await.unwrap();

        // The final text event arrived after the abort; nothing committed
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.ui_state().len(), 1);
        assert!(!session.handle().is_running());
    }

    #[tokio::test]
    async fn test_serialized_writers_guard() {
        let (mut session, _store) = make_session(vec![]);
        session.handle().is_running.store(true, Ordering::Release);
        let err = session.invoke_assistant().await.unwrap_err();
        assert!(matches!(err, Error::Busy));
        session.handle().is_running.store(false, Ordering::Release);
    }

    #[tokio::test]
    async fn test_anonymous_persist_is_a_noop() {
        let store = Arc::new(MemoryStore::default());
        let mut session = ChatSession::new(
            SessionConfig::default(),
            ScriptedModel::new(vec![]),
            store.clone(),
            Arc::new(Anonymous),
        );
        session.append_user_turn("hello");

        let saved = session.finalize_and_persist().await.unwrap();
        assert!(saved.is_none());
        assert!(store.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_authenticated_persist_saves_record() {
        let (mut session, store) = make_session(vec![vec![ModelEvent::TextDone {
            content: "Hi there".into(),
        }]]);
        session.append_user_turn("hello");
        session.invoke_assistant().await.unwrap();

        let record = session.finalize_and_persist().await.unwrap().unwrap();
        assert_eq!(record.owner_id, "user-1");
        assert_eq!(record.title, "hello");
        assert_eq!(record.path, format!("/chat/{}", session.conversation().id()));
        assert_eq!(store.saved.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_conversation_is_not_persisted() {
        let (session, store) = make_session(vec![]);
        let saved = session.finalize_and_persist().await.unwrap();
        assert!(saved.is_none());
        assert!(store.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_resume_reproduces_ui_state() {
        let (mut session, _store) = make_session(vec![vec![
            ModelEvent::TextDelta { delta: "Hi there".into() },
            ModelEvent::TextDone { content: "Hi there".into() },
        ]]);
        session.append_user_turn("hello");
        session.invoke_assistant().await.unwrap();
        let live_fragments = session.ui_state();

        let record = ChatRecord::from_conversation(session.conversation(), "user-1");
        let resumed = ChatSession::resume(
            SessionConfig::default(),
            record,
            ScriptedModel::new(vec![]),
            Arc::new(MemoryStore::default()),
            Arc::new(StaticUser::new("user-1")),
        );

        assert_eq!(resumed.ui_state(), live_fragments);
    }

    #[tokio::test]
    async fn test_request_carries_history_and_catalog() {
        let (mut session, _store) = make_session(vec![]);
        session.add_tool(Arc::new(RecommendAnalysisTools));
        session.append_user_turn("hello");

        let request = session.build_request();
        assert_eq!(request.model, "gpt-4o");
        assert!(request.system_prompt.as_deref().unwrap_or_default().contains("research assistant"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, analysis::NAME);
    }
}
