//! Phase-progression engine.
//!
//! Owns the single live session, the mode catalog, and the history list.
//! Every turn runs the same pipeline: intercept, append the user answer,
//! build the judged prompt, invoke the gateway, interpret the reply, then
//! advance, retry, or complete. Exactly one turn may be in flight; replies
//! belonging to a superseded session are discarded at apply time.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::time::Duration;

use super::history::mark_active;
use super::hydrate::hydrate;
use super::interceptor::intercept;
use super::prompt::{build_judged_prompt, composite_task};
use super::reply::ParsedReply;
use super::{Context, HistoryItem, Message, MessageData};
use crate::domain::catalog::{parse_mode, ImportError, Mode, ModeCatalog, Phase};
use crate::domain::foundation::Timestamp;
use crate::ports::{ChatGateway, GatewayConfig, GatewayError, HistoryStore, HistoryStoreError};

/// Artificial delay on session load, so a caller can render a loading state.
const LOAD_DELAY: Duration = Duration::from_millis(300);

/// Result of one `send_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Dropped without effect: no mode, a turn in flight, session completed,
    /// or empty input.
    Ignored,
    /// The interceptor rejected the input; nothing was appended.
    Blocked { warning: String },
    /// The gateway or interpreter failed; a warning message was appended and
    /// the turn may be retried from the same phase.
    Failed { warning: String },
    /// A judged reply was applied.
    Replied { passed: bool, completed: bool },
}

/// Where the session stands inside its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseProgress {
    /// 1-based position of the current phase in numeric order.
    pub position: usize,
    pub total: usize,
    pub key: u32,
    pub title: String,
}

/// One answered phase, for report export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub phase: u32,
    pub title: String,
    pub answer: String,
}

/// Mutable state of the live session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    mode_id: Option<String>,
    current_phase: u32,
    context: Context,
    messages: Vec<Message>,
    /// Snapshot taken at `init_mode`, so catalog mutation never shifts the
    /// ground under a running session.
    phases: BTreeMap<u32, Phase>,
    is_processing: bool,
    is_completed: bool,
    has_started: bool,
}

impl SessionState {
    pub fn mode_id(&self) -> Option<&str> {
        self.mode_id.as_deref()
    }

    pub fn current_phase(&self) -> u32 {
        self.current_phase
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phases(&self) -> &BTreeMap<u32, Phase> {
        &self.phases
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    fn current_phase_entry(&self) -> Option<&Phase> {
        self.phases.get(&self.current_phase)
    }

    fn next_phase(&self) -> Option<(u32, &Phase)> {
        // Excluded bound: `+ 1` would overflow on a u32::MAX phase key.
        self.phases
            .range((Bound::Excluded(self.current_phase), Bound::Unbounded))
            .next()
            .map(|(k, p)| (*k, p))
    }

    /// The composite task for the current turn: current phase standard plus
    /// the next phase task as a bridging hint, both hydrated.
    fn composite_task(&self) -> String {
        let current = self
            .current_phase_entry()
            .map(|p| hydrate(&p.task, &self.context))
            .unwrap_or_default();
        let next = self
            .next_phase()
            .map(|(_, p)| hydrate(&p.task, &self.context));
        composite_task(&current, next.as_deref())
    }
}

/// The session engine: catalog, gateway, history, and the live session.
pub struct SessionEngine {
    catalog: ModeCatalog,
    gateway: Arc<dyn ChatGateway>,
    gateway_config: GatewayConfig,
    history_store: Arc<dyn HistoryStore>,
    state: SessionState,
    history: Vec<HistoryItem>,
    history_error: Option<String>,
    /// Bumped on every reset/init/load; replies carrying an older value are
    /// stale and discarded instead of applied.
    generation: u64,
}

impl SessionEngine {
    pub fn new(
        catalog: ModeCatalog,
        gateway: Arc<dyn ChatGateway>,
        gateway_config: GatewayConfig,
        history_store: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            gateway_config,
            history_store,
            state: SessionState::default(),
            history: Vec::new(),
            history_error: None,
            generation: 0,
        }
    }

    /// Loads the saved history list. Called once at process start.
    pub async fn bootstrap(&mut self) -> Result<(), HistoryStoreError> {
        self.history = self.history_store.load_all().await?;
        tracing::info!(sessions = self.history.len(), "history loaded");
        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    /// The pending session-load error, if any. Cleared on the next operation.
    pub fn history_error(&self) -> Option<&str> {
        self.history_error.as_deref()
    }

    pub fn catalog(&self) -> &ModeCatalog {
        &self.catalog
    }

    /// Registers a validated custom mode into the catalog.
    ///
    /// Sessions already in progress keep their own phase snapshot and are
    /// unaffected.
    pub fn add_custom_mode(&mut self, mode: Mode) {
        tracing::info!(mode_id = mode.id(), "registering custom mode");
        // Replacement on duplicate id; register never fails on a valid Mode.
        let _ = self.catalog.register(mode);
    }

    /// Parses a custom mode definition from JSON and registers it.
    pub fn import_custom_mode(&mut self, json: &str) -> Result<String, ImportError> {
        let mode = parse_mode(json)?;
        let id = mode.id().to_string();
        self.add_custom_mode(mode);
        Ok(id)
    }

    /// Starts a fresh session under `mode_id`, issuing the opening call.
    ///
    /// Unknown mode ids are a silent no-op.
    pub async fn init_mode(&mut self, mode_id: &str) {
        self.history_error = None;
        let Some(mode) = self.catalog.get(mode_id) else {
            tracing::warn!(mode_id, "init_mode called with unknown mode");
            return;
        };

        let (first_key, _) = mode.first_phase();
        self.state = SessionState {
            mode_id: Some(mode_id.to_string()),
            current_phase: first_key,
            phases: mode.phases().clone(),
            ..SessionState::default()
        };
        self.generation += 1;
        mark_active(&mut self.history, None);

        // Opening call: ask the model for the first question. No judgment
        // happens yet, whatever comes back is shown as the opening prompt.
        self.state.is_processing = true;
        let task = self.state.composite_task();
        let prompt = build_judged_prompt(&[], None, &task);
        let result = self.gateway.invoke(&prompt, &self.gateway_config).await;
        match result {
            Ok(raw) => {
                let display = ParsedReply::interpret(&raw).display_text();
                let title = self.current_phase_title();
                self.state.messages.push(Message::system(
                    display,
                    self.state.current_phase,
                    Some(MessageData::titled(title)),
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "opening call failed");
                self.state
                    .messages
                    .push(Message::system_warning(process_error_text(&e)));
            }
        }
        self.state.is_processing = false;
    }

    /// Runs one interview turn.
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        self.history_error = None;
        if self.state.mode_id.is_none() || self.state.is_processing || self.state.is_completed {
            tracing::debug!("send_message ignored by state guard");
            return SendOutcome::Ignored;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SendOutcome::Ignored;
        }

        let interception = intercept(trimmed);
        if interception.blocked {
            // No mutation: the caller keeps the draft for editing.
            return SendOutcome::Blocked {
                warning: interception.warning.unwrap_or_default(),
            };
        }

        let task = self.state.composite_task();
        let prompt = build_judged_prompt(&self.state.messages, Some(trimmed), &task);
        self.state
            .messages
            .push(Message::user(trimmed, self.state.current_phase));
        self.state.has_started = true;
        self.state.is_processing = true;
        self.persist().await;

        let token = self.generation;
        let result = self.gateway.invoke(&prompt, &self.gateway_config).await;
        let outcome = self.apply_reply(token, result);
        self.persist().await;
        outcome
    }

    /// Applies a gateway result to the session, unless it is stale.
    fn apply_reply(
        &mut self,
        token: u64,
        result: Result<String, GatewayError>,
    ) -> SendOutcome {
        if token != self.generation {
            tracing::warn!("discarding reply for a superseded session");
            return SendOutcome::Ignored;
        }

        let outcome = match result {
            Err(e) => {
                tracing::warn!(error = %e, "gateway call failed");
                let warning = process_error_text(&e);
                self.state
                    .messages
                    .push(Message::system_warning(warning.clone()));
                SendOutcome::Failed { warning }
            }
            Ok(raw) => {
                let parsed = ParsedReply::interpret(&raw);
                let passed = parsed.passed();
                let display = parsed.display_text();
                if passed {
                    match self.state.next_phase().map(|(k, p)| (k, p.title.clone())) {
                        Some((next_key, next_title)) => {
                            self.state.current_phase = next_key;
                            self.state.messages.push(Message::system(
                                display,
                                next_key,
                                Some(MessageData::titled(next_title)),
                            ));
                        }
                        None => {
                            self.state.is_completed = true;
                            let title = self.current_phase_title();
                            self.state.messages.push(Message::system(
                                display,
                                self.state.current_phase,
                                Some(MessageData::titled(title)),
                            ));
                        }
                    }
                } else {
                    // Retry prompt, same phase.
                    let title = self.current_phase_title();
                    self.state.messages.push(Message::system(
                        display,
                        self.state.current_phase,
                        Some(MessageData::titled(title)),
                    ));
                }
                SendOutcome::Replied {
                    passed,
                    completed: self.state.is_completed,
                }
            }
        };
        self.state.is_processing = false;
        outcome
    }

    /// Restores a saved session into the live state.
    ///
    /// Returns false and records a history error when the snapshot is
    /// missing or its mode definition no longer resolves.
    pub async fn load_session(&mut self, id: &str) -> bool {
        self.history_error = None;
        tokio::time::sleep(LOAD_DELAY).await;

        let Some(item) = self.history.iter().find(|i| i.id == id).cloned() else {
            self.history_error = Some("会话不存在或已被删除".to_string());
            return false;
        };
        if !self.catalog.contains(&item.mode_id) {
            self.history_error = Some(format!(
                "无法加载会话：模式 \"{}\" 定义缺失。请确认是否为自定义模式且已重新导入。",
                item.mode_id
            ));
            return false;
        }

        self.state = SessionState {
            mode_id: Some(item.mode_id.clone()),
            current_phase: item.current_phase,
            context: item.context.clone(),
            messages: item.messages.clone(),
            phases: item.phases.clone(),
            is_processing: false,
            is_completed: item.is_completed,
            has_started: true,
        };
        self.generation += 1;
        mark_active(&mut self.history, Some(id));
        self.save_history().await;
        true
    }

    /// Removes a saved session. Deleting the active one resets the engine.
    pub async fn delete_session(&mut self, id: &str) {
        let Some(index) = self.history.iter().position(|i| i.id == id) else {
            return;
        };
        let was_active = self.history[index].active;
        self.history.remove(index);
        if was_active {
            self.state = SessionState::default();
            self.generation += 1;
        }
        self.save_history().await;
    }

    /// Returns to the no-mode state, leaving saved history untouched.
    pub async fn reset(&mut self) {
        self.state = SessionState::default();
        self.history_error = None;
        self.generation += 1;
        mark_active(&mut self.history, None);
        self.save_history().await;
    }

    /// Where the session stands inside its mode, for progress rendering.
    pub fn phase_progress(&self) -> Option<PhaseProgress> {
        self.state.mode_id.as_ref()?;
        let position = self
            .state
            .phases
            .keys()
            .position(|k| *k == self.state.current_phase)?
            + 1;
        Some(PhaseProgress {
            position,
            total: self.state.phases.len(),
            key: self.state.current_phase,
            title: self.current_phase_title(),
        })
    }

    /// The user's answers with phase attribution, for report export.
    pub fn report_entries(&self) -> Vec<ReportEntry> {
        self.state
            .messages
            .iter()
            .filter(|m| m.is_user())
            .filter_map(|m| {
                let phase = m.phase()?;
                let title = self
                    .state
                    .phases
                    .get(&phase)
                    .map(|p| p.title.clone())
                    .unwrap_or_default();
                Some(ReportEntry {
                    phase,
                    title,
                    answer: m.content().to_string(),
                })
            })
            .collect()
    }

    fn current_phase_title(&self) -> String {
        self.state
            .current_phase_entry()
            .map(|p| p.title.clone())
            .unwrap_or_default()
    }

    /// Upserts the live session into the history list and writes it out.
    async fn persist(&mut self) {
        if !self.state.has_started {
            return;
        }
        let now = Timestamp::now();
        let id = HistoryItem::derive_id(&self.state.messages, &now);
        let mode_id = self.state.mode_id.clone().unwrap_or_default();
        let fallback_title = format!(
            "{} · {}",
            self.catalog.display_name(&mode_id),
            now.date_string()
        );
        let snapshot = HistoryItem {
            id: id.clone(),
            mode_id,
            title: HistoryItem::derive_title(&self.state.messages, &fallback_title),
            timestamp: now,
            active: true,
            messages: self.state.messages.clone(),
            context: self.state.context.clone(),
            current_phase: self.state.current_phase,
            is_completed: self.state.is_completed,
            phases: self.state.phases.clone(),
        };
        match self.history.iter_mut().find(|i| i.id == id) {
            Some(existing) => *existing = snapshot,
            None => self.history.push(snapshot),
        }
        mark_active(&mut self.history, Some(&id));
        self.save_history().await;
    }

    /// Writes the history list out; persistence failures never break a turn.
    async fn save_history(&self) {
        if let Err(e) = self.history_store.save_all(&self.history).await {
            tracing::warn!(error = %e, "failed to persist session history");
        }
    }
}

/// Warning text appended when a turn fails with a recoverable error.
fn process_error_text(e: &GatewayError) -> String {
    format!("系统处理出错: {e}。请重试。")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Role;
    use crate::ports::{ChatMessage, HistoryStore, HistoryStoreError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const PASS_REPLY: &str = r#"{"diagnosis":"ok","question":"下一步？","is_passed":true}"#;
    const FAIL_REPLY: &str = r#"{"diagnosis":"太空泛","question":"具体是谁？","is_passed":false}"#;

    /// Gateway that replays a scripted queue, falling back to a pass reply.
    struct ScriptedGateway {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn passing() -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn scripted(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatGateway for ScriptedGateway {
        async fn invoke(
            &self,
            _messages: &[ChatMessage],
            _config: &GatewayConfig,
        ) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(PASS_REPLY.to_string()))
        }
    }

    /// History store that remembers the last written list.
    struct RecordingStore {
        saved: Mutex<Vec<HistoryItem>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                saved: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HistoryStore for RecordingStore {
        async fn load_all(&self) -> Result<Vec<HistoryItem>, HistoryStoreError> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save_all(&self, items: &[HistoryItem]) -> Result<(), HistoryStoreError> {
            *self.saved.lock().unwrap() = items.to_vec();
            Ok(())
        }
    }

    fn engine_with(gateway: Arc<ScriptedGateway>) -> SessionEngine {
        SessionEngine::new(
            ModeCatalog::with_builtins(),
            gateway,
            GatewayConfig::new("test", "sk-test", "https://api.example.com/v1", "m"),
            Arc::new(RecordingStore::new()),
        )
    }

    async fn started_engine(gateway: Arc<ScriptedGateway>) -> SessionEngine {
        let mut engine = engine_with(gateway);
        engine.init_mode("b_side_efficiency").await;
        engine
    }

    mod init {
        use super::*;

        #[tokio::test]
        async fn unknown_mode_is_a_silent_noop() {
            let mut engine = engine_with(Arc::new(ScriptedGateway::passing()));
            engine.init_mode("ghost_mode").await;
            assert!(engine.state().mode_id().is_none());
            assert!(engine.state().messages().is_empty());
        }

        #[tokio::test]
        async fn appends_exactly_one_phase_one_system_message() {
            let engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            let messages = engine.state().messages();
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].role(), Role::System);
            assert_eq!(messages[0].phase(), Some(1));
            assert!(!engine.state().is_processing());
            assert!(!engine.state().has_started());
        }

        #[tokio::test]
        async fn max_numeric_phase_key_starts_and_completes() {
            let mut engine = engine_with(Arc::new(ScriptedGateway::passing()));
            engine
                .import_custom_mode(
                    r#"{"id":"edge","name":"边界","phases":{"4294967295":{"title":"唯一","task":"说出一个具体事实"}}}"#,
                )
                .unwrap();

            engine.init_mode("edge").await;
            assert_eq!(engine.state().current_phase(), u32::MAX);
            assert_eq!(engine.state().messages().len(), 1);

            // The only phase is also the last one.
            let outcome = engine.send_message("一个具体事实").await;
            assert_eq!(
                outcome,
                SendOutcome::Replied {
                    passed: true,
                    completed: true
                }
            );
        }

        #[tokio::test]
        async fn opening_failure_surfaces_as_warning() {
            let gateway = Arc::new(ScriptedGateway::scripted(vec![Err(
                GatewayError::network("connection refused"),
            )]));
            let engine = started_engine(gateway).await;
            let messages = engine.state().messages();
            assert_eq!(messages.len(), 1);
            assert!(messages[0].is_warning());
            assert!(messages[0].content().contains("connection refused"));
            assert!(!engine.state().is_processing());
        }
    }

    mod guards {
        use super::*;

        #[tokio::test]
        async fn ignores_input_without_a_mode() {
            let mut engine = engine_with(Arc::new(ScriptedGateway::passing()));
            assert_eq!(engine.send_message("某个回答").await, SendOutcome::Ignored);
        }

        #[tokio::test]
        async fn ignores_input_while_processing() {
            let gateway = Arc::new(ScriptedGateway::passing());
            let mut engine = started_engine(Arc::clone(&gateway)).await;
            let calls_before = gateway.call_count();

            engine.state.is_processing = true;
            let outcome = engine.send_message("具体的回答").await;

            assert_eq!(outcome, SendOutcome::Ignored);
            assert_eq!(gateway.call_count(), calls_before);
            assert_eq!(engine.state().messages().len(), 1);
        }

        #[tokio::test]
        async fn ignores_input_after_completion() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.state.is_completed = true;
            assert_eq!(engine.send_message("再来一条").await, SendOutcome::Ignored);
        }

        #[tokio::test]
        async fn ignores_empty_input() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            assert_eq!(engine.send_message("   ").await, SendOutcome::Ignored);
            assert_eq!(engine.state().messages().len(), 1);
        }
    }

    mod interception {
        use super::*;

        #[tokio::test]
        async fn blocked_input_mutates_nothing() {
            let gateway = Arc::new(ScriptedGateway::passing());
            let mut engine = started_engine(Arc::clone(&gateway)).await;
            let calls_before = gateway.call_count();
            let phase_before = engine.state().current_phase();

            let outcome = engine.send_message("我不知道").await;

            match outcome {
                SendOutcome::Blocked { warning } => assert!(warning.contains("核心逻辑缺失")),
                other => panic!("expected Blocked, got {other:?}"),
            }
            assert_eq!(gateway.call_count(), calls_before);
            assert_eq!(engine.state().messages().len(), 1);
            assert_eq!(engine.state().current_phase(), phase_before);
            assert!(!engine.state().has_started());
        }
    }

    mod turns {
        use super::*;

        #[tokio::test]
        async fn passing_answer_advances_phase() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;

            let outcome = engine.send_message("我们卖给中型制造企业的仓库部门").await;

            assert_eq!(
                outcome,
                SendOutcome::Replied {
                    passed: true,
                    completed: false
                }
            );
            assert_eq!(engine.state().current_phase(), 2);
            let messages = engine.state().messages();
            // Opening system + user + judged reply.
            assert_eq!(messages.len(), 3);
            assert_eq!(messages[1].role(), Role::User);
            assert_eq!(messages[1].phase(), Some(1));
            assert_eq!(messages[2].role(), Role::System);
            assert_eq!(messages[2].phase(), Some(2));
            assert!(!engine.state().is_processing());
            assert!(engine.state().has_started());
        }

        #[tokio::test]
        async fn failed_judgment_stays_on_phase() {
            let gateway = Arc::new(ScriptedGateway::scripted(vec![
                Ok(PASS_REPLY.to_string()), // opening call
                Ok(FAIL_REPLY.to_string()),
            ]));
            let mut engine = started_engine(gateway).await;

            let outcome = engine.send_message("还行吧").await;

            assert_eq!(
                outcome,
                SendOutcome::Replied {
                    passed: false,
                    completed: false
                }
            );
            assert_eq!(engine.state().current_phase(), 1);
            let last = engine.state().messages().last().unwrap();
            assert_eq!(last.phase(), Some(1));
            assert!(last.content().contains("具体是谁？"));
        }

        #[tokio::test]
        async fn unparsed_reply_shows_raw_text_without_advancing() {
            let gateway = Arc::new(ScriptedGateway::scripted(vec![
                Ok(PASS_REPLY.to_string()),
                Ok("这不是 JSON，只是一段话。".to_string()),
            ]));
            let mut engine = started_engine(gateway).await;

            let outcome = engine.send_message("具体的回答").await;

            assert_eq!(
                outcome,
                SendOutcome::Replied {
                    passed: false,
                    completed: false
                }
            );
            assert_eq!(engine.state().current_phase(), 1);
            let last = engine.state().messages().last().unwrap();
            assert_eq!(last.content(), "这不是 JSON，只是一段话。");
        }

        #[tokio::test]
        async fn passing_final_phase_completes_session() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            let last_key = *engine.state().phases().keys().next_back().unwrap();
            engine.state.current_phase = last_key;

            let outcome = engine.send_message("最后一个环节的具体回答").await;

            assert_eq!(
                outcome,
                SendOutcome::Replied {
                    passed: true,
                    completed: true
                }
            );
            assert!(engine.state().is_completed());
            assert_eq!(engine.state().current_phase(), last_key);
            assert_eq!(engine.send_message("再来").await, SendOutcome::Ignored);
        }

        #[tokio::test]
        async fn gateway_failure_appends_warning_and_clears_processing() {
            let gateway = Arc::new(ScriptedGateway::scripted(vec![
                Ok(PASS_REPLY.to_string()),
                Err(GatewayError::http(502, "bad gateway")),
            ]));
            let mut engine = started_engine(gateway).await;

            let outcome = engine.send_message("具体的回答").await;

            match outcome {
                SendOutcome::Failed { warning } => {
                    assert!(warning.contains("系统处理出错"));
                    assert!(warning.contains("502"));
                }
                other => panic!("expected Failed, got {other:?}"),
            }
            let last = engine.state().messages().last().unwrap();
            assert!(last.is_warning());
            assert_eq!(last.phase(), None);
            assert!(!engine.state().is_processing());
            assert_eq!(engine.state().current_phase(), 1);

            // Recoverable: the next attempt runs normally.
            let retry = engine.send_message("换一个具体的回答").await;
            assert!(matches!(retry, SendOutcome::Replied { passed: true, .. }));
        }
    }

    mod staleness {
        use super::*;

        #[tokio::test]
        async fn reply_from_a_superseded_session_is_discarded() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            let token = engine.generation;
            engine.reset().await;

            let outcome = engine.apply_reply(token, Ok(PASS_REPLY.to_string()));

            assert_eq!(outcome, SendOutcome::Ignored);
            assert!(engine.state().messages().is_empty());
            assert_eq!(engine.state().current_phase(), 0);
        }
    }

    mod persistence {
        use super::*;

        #[tokio::test]
        async fn first_send_creates_an_active_history_item() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            assert!(engine.history().is_empty());

            engine.send_message("我们卖给仓库部门").await;

            assert_eq!(engine.history().len(), 1);
            let item = &engine.history()[0];
            assert!(item.active);
            assert_eq!(item.mode_id, "b_side_efficiency");
            assert_eq!(item.title, "我们卖给仓库部门");
            // Stable id: derived from the first message.
            assert_eq!(item.id, engine.state().messages()[0].id().to_string());
        }

        #[tokio::test]
        async fn later_sends_update_the_same_item() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.send_message("第一条具体回答").await;
            engine.send_message("第二条具体回答").await;

            assert_eq!(engine.history().len(), 1);
            assert_eq!(engine.history()[0].current_phase, 3);
            assert_eq!(engine.history()[0].messages.len(), 5);
        }

        #[tokio::test]
        async fn snapshot_round_trips_through_load() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.send_message("具体的回答").await;
            let saved = engine.history()[0].clone();

            engine.reset().await;
            assert!(engine.state().mode_id().is_none());

            assert!(engine.load_session(&saved.id).await);
            assert_eq!(engine.state().messages(), saved.messages.as_slice());
            assert_eq!(engine.state().current_phase(), saved.current_phase);
            assert_eq!(engine.state().context(), &saved.context);
            assert_eq!(engine.state().is_completed(), saved.is_completed);
            assert!(engine.state().has_started());
        }
    }

    mod loading {
        use super::*;

        #[tokio::test]
        async fn missing_session_sets_error_and_leaves_state_alone() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.send_message("具体的回答").await;
            let messages_before = engine.state().messages().to_vec();
            let phase_before = engine.state().current_phase();

            assert!(!engine.load_session("no-such-id").await);

            assert_eq!(
                engine.history_error(),
                Some("会话不存在或已被删除")
            );
            assert_eq!(engine.state().messages(), messages_before.as_slice());
            assert_eq!(engine.state().current_phase(), phase_before);
        }

        #[tokio::test]
        async fn missing_mode_definition_names_the_mode() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.import_custom_mode(
                r#"{"id":"my_mode","name":"自定义","phases":{"1":{"title":"t","task":"k"}}}"#,
            )
            .unwrap();
            engine.init_mode("my_mode").await;
            engine.send_message("具体的回答").await;
            let saved_id = engine.history()[0].id.clone();

            // Fresh process without the custom mode re-imported.
            let mut fresh = engine_with(Arc::new(ScriptedGateway::passing()));
            fresh.history = engine.history().to_vec();

            assert!(!fresh.load_session(&saved_id).await);
            let error = fresh.history_error().unwrap();
            assert!(error.contains("my_mode"));
            assert!(error.contains("定义缺失"));
        }

        #[tokio::test]
        async fn error_clears_on_next_operation() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.load_session("no-such-id").await;
            assert!(engine.history_error().is_some());

            engine.send_message("具体的回答").await;
            assert!(engine.history_error().is_none());
        }
    }

    mod deletion {
        use super::*;

        #[tokio::test]
        async fn deleting_the_active_session_resets_the_engine() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.send_message("具体的回答").await;
            let id = engine.history()[0].id.clone();

            engine.delete_session(&id).await;

            assert!(engine.history().is_empty());
            assert!(engine.state().mode_id().is_none());
            assert!(engine.state().messages().is_empty());
        }

        #[tokio::test]
        async fn deleting_another_session_keeps_the_live_one() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.send_message("第一个会话的回答").await;
            let first_id = engine.history()[0].id.clone();

            engine.init_mode("c_side_growth").await;
            engine.send_message("第二个会话的回答").await;
            assert_eq!(engine.history().len(), 2);

            engine.delete_session(&first_id).await;

            assert_eq!(engine.history().len(), 1);
            assert_eq!(engine.state().mode_id(), Some("c_side_growth"));
            assert!(!engine.state().messages().is_empty());
        }
    }

    mod progress_and_report {
        use super::*;

        #[tokio::test]
        async fn progress_tracks_numeric_position() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            let progress = engine.phase_progress().unwrap();
            assert_eq!(progress.position, 1);
            assert_eq!(progress.total, 6);
            assert_eq!(progress.key, 1);

            engine.send_message("具体的回答").await;
            let progress = engine.phase_progress().unwrap();
            assert_eq!(progress.position, 2);
            assert_eq!(progress.key, 2);
        }

        #[tokio::test]
        async fn no_progress_without_a_mode() {
            let engine = engine_with(Arc::new(ScriptedGateway::passing()));
            assert!(engine.phase_progress().is_none());
        }

        #[tokio::test]
        async fn report_lists_answers_with_phase_titles() {
            let mut engine = started_engine(Arc::new(ScriptedGateway::passing())).await;
            engine.send_message("第一阶段的回答").await;
            engine.send_message("第二阶段的回答").await;

            let report = engine.report_entries();
            assert_eq!(report.len(), 2);
            assert_eq!(report[0].phase, 1);
            assert_eq!(report[0].answer, "第一阶段的回答");
            assert!(!report[0].title.is_empty());
            assert_eq!(report[1].phase, 2);
        }
    }
}
