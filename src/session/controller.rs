//! Conversation Controller
//!
//! Gatekeeper and state machine for the chat session. Queries are checked
//! against the document and model preconditions, the user message is logged
//! synchronously, and the analysis runs in a spawned task that reports back
//! over an mpsc channel. Only one request may be pending at a time; extra
//! submissions are dropped, not queued.
//!
//! There is no timeout on the backend call. A stalled backend leaves the
//! session pending until it answers.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::compare::{compare, ComparisonReport};
use super::{Notification, SessionState, UiMode, View};
use crate::analysis::ChartData;
use crate::backend::BackendGateway;
use crate::documents::ingest;
use crate::llm::GenerationParams;
use crate::models::{AnalysisResponse, ChartKind, Document, Message, Report, UploadedFile};
use crate::router::AnalysisRouter;
use crate::scheduler::{self, TaskHandle};
use crate::types::{BackendResult, CompareError, SessionError, SessionResult};

pub const GREETING: &str =
    "I've processed your PDF documents. You can now ask me questions about their content!";

pub const DEFAULT_VIEW_SWITCH_DELAY: Duration = Duration::from_millis(100);

/// Simulated time to load a newly selected model
pub const DEFAULT_MODEL_LOAD_DELAY: Duration = Duration::from_millis(800);

/// Events delivered back to the controller from spawned work
#[derive(Debug)]
pub enum SessionEvent {
    /// The in-flight analysis finished
    AnalysisSettled {
        request_id: Uuid,
        result: BackendResult<AnalysisResponse>,
    },
    /// Scheduled view change (after a visualization result)
    SwitchView(View),
    /// The simulated model load with this id finished
    ModelLoaded(Uuid),
    /// Notice from a background job such as report export
    Notice(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank query or a request already in flight
    Ignored,
    Dispatched,
}

#[derive(Debug)]
struct PendingRequest {
    id: Uuid,
    started_at: DateTime<Utc>,
    document_names: Vec<String>,
    model: String,
}

pub struct ConversationController {
    state: SessionState,
    router: AnalysisRouter,
    notifications: Vec<Notification>,
    pending: Option<PendingRequest>,
    last_query: Option<String>,
    view_switch_delay: Duration,
    view_switch: Option<TaskHandle>,
    model_load_delay: Duration,
    model_load: Option<(Uuid, TaskHandle)>,
    event_tx: mpsc::Sender<SessionEvent>,
    event_rx: mpsc::Receiver<SessionEvent>,
}

impl ConversationController {
    pub fn new(gateway: Arc<dyn BackendGateway>, params: GenerationParams) -> Self {
        let (tx, rx) = mpsc::channel(100);
        Self {
            state: SessionState::with_params(params),
            router: AnalysisRouter::new(gateway),
            notifications: Vec::new(),
            pending: None,
            last_query: None,
            view_switch_delay: DEFAULT_VIEW_SWITCH_DELAY,
            view_switch: None,
            model_load_delay: DEFAULT_MODEL_LOAD_DELAY,
            model_load: None,
            event_tx: tx,
            event_rx: rx,
        }
    }

    pub fn with_view_switch_delay(mut self, delay: Duration) -> Self {
        self.view_switch_delay = delay;
        self
    }

    /// Zero skips the loading phase entirely.
    pub fn with_model_load_delay(mut self, delay: Duration) -> Self {
        self.model_load_delay = delay;
        self
    }

    // === Read access ===

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn documents(&self) -> &[Document] {
        self.state.documents.list()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the send affordance should be enabled
    pub fn can_submit(&self) -> bool {
        self.pending.is_none() && !self.state.documents.is_empty() && self.state.model.is_selected()
    }

    /// Seconds the current request has been in flight
    pub fn pending_for(&self) -> Option<chrono::Duration> {
        self.pending.as_ref().map(|p| Utc::now() - p.started_at)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // === Input buffer ===

    pub fn input(&self) -> &str {
        &self.state.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.input = text.into();
    }

    pub fn submit_input(&mut self) -> SessionResult<SubmitOutcome> {
        let query = self.state.input.clone();
        self.submit(&query)
    }

    // === Chat ===

    fn check_preconditions(&self) -> SessionResult<()> {
        if self.state.documents.is_empty() {
            return Err(SessionError::NoDocuments);
        }
        if !self.state.model.is_selected() {
            return Err(SessionError::NoModel);
        }
        Ok(())
    }

    /// Validate and dispatch a query.
    ///
    /// Blank queries and submissions while a request is pending are ignored.
    /// Precondition failures append nothing and raise a notification.
    pub fn submit(&mut self, query: &str) -> SessionResult<SubmitOutcome> {
        if query.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }
        if let Some(pending) = &self.pending {
            debug!(request_id = %pending.id, "Submit suppressed while a request is pending");
            return Ok(SubmitOutcome::Ignored);
        }
        if let Err(e) = self.check_preconditions() {
            warn!(error = %e, "Query rejected");
            self.notify_precondition(&e);
            return Err(e);
        }

        self.state.messages.push(Message::user(query));
        self.state.input.clear();
        self.state.is_loading = true;
        self.state.model.set_running(true);
        self.last_query = Some(query.to_string());

        let request_id = Uuid::new_v4();
        let document_names = self.state.documents.names();
        let model = self.state.model.label().unwrap_or_default();
        info!(
            request_id = %request_id,
            query_len = query.len(),
            documents = document_names.len(),
            model = %model,
            "Query dispatched"
        );

        let router = self.router.clone();
        let tx = self.event_tx.clone();
        let query = query.to_string();
        let names = document_names.clone();
        let label = model.clone();
        let params = self.state.params;
        tokio::spawn(async move {
            let result = router.dispatch(query, names, label, params).await;
            tx.send(SessionEvent::AnalysisSettled { request_id, result })
                .await
                .ok();
        });

        self.pending = Some(PendingRequest {
            id: request_id,
            started_at: Utc::now(),
            document_names,
            model,
        });
        Ok(SubmitOutcome::Dispatched)
    }

    /// Empty the message log. Documents and model are untouched.
    ///
    /// A reply still in flight is appended to the emptied log when it lands.
    pub fn clear_chat(&mut self) {
        self.cancel_view_switch();
        self.state.messages.clear();
        self.notifications.push(Notification::info(
            "Chat cleared",
            "All messages have been cleared.",
        ));
    }

    /// Empty the documents and the message log together.
    pub fn clear_documents_and_chat(&mut self) {
        self.cancel_view_switch();
        self.state.documents.clear();
        self.state.messages.clear();
        self.normalize_view();
        self.notifications.push(Notification::info(
            "Documents cleared",
            "All uploaded documents have been removed.",
        ));
    }

    /// Ingest a batch of files. Returns how many were accepted.
    pub fn upload(&mut self, files: &[UploadedFile]) -> usize {
        let report = ingest(files);
        for rejected in &report.rejected {
            self.notifications
                .push(Notification::error("Invalid file type", rejected.to_string()));
        }
        let accepted = report.accepted.len();
        self.add_documents(report.accepted);
        accepted
    }

    /// Add already-ingested documents, seeding the greeting on the first batch.
    pub fn add_documents(&mut self, documents: Vec<Document>) {
        let was_empty = self.state.documents.is_empty();
        let count = documents.len();
        if !self.state.documents.add(documents) {
            return;
        }
        info!(count, total = self.state.documents.len(), "Documents added");
        self.notifications.push(Notification::info(
            format!("{} PDF{} uploaded", count, if count > 1 { "s" } else { "" }),
            "Documents are ready for analysis.",
        ));
        if was_empty {
            self.on_first_upload();
        }
    }

    /// Seed the greeting when documents exist and the log is still empty.
    pub fn on_first_upload(&mut self) {
        if self.state.documents.is_empty() || !self.state.messages.is_empty() {
            return;
        }
        self.state.messages.push(Message::assistant(GREETING));
    }

    // === Event reconciliation ===

    /// Apply every event that is already waiting. Never blocks.
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for one event and apply it.
    pub async fn next_event(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Wait until no request is pending.
    pub async fn settle(&mut self) {
        while self.pending.is_some() {
            if !self.next_event().await {
                break;
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AnalysisSettled { request_id, result } => {
                self.settle_request(request_id, result);
            }
            SessionEvent::SwitchView(view) => {
                // A cancelled switch may already be queued
                if self.view_switch.take().is_some() {
                    self.apply_view(view);
                } else {
                    debug!(?view, "Dropped cancelled view switch");
                }
            }
            SessionEvent::ModelLoaded(load_id) => {
                if matches!(&self.model_load, Some((id, _)) if *id == load_id) {
                    self.model_load = None;
                    self.state.model.set_loading(false);
                    info!(model = ?self.state.model.label(), "Model loaded");
                }
            }
            SessionEvent::Notice(notice) => {
                self.notifications.push(notice);
            }
        }
    }

    fn settle_request(&mut self, request_id: Uuid, result: BackendResult<AnalysisResponse>) {
        let Some(pending) = self.pending.take() else {
            warn!(request_id = %request_id, "Result arrived with no pending request");
            return;
        };
        if pending.id != request_id {
            warn!(expected = %pending.id, got = %request_id, "Result for a different request");
        }

        match result {
            Ok(response) => {
                let content = compose_reply(&response.narrative, &pending.document_names, &pending.model);
                match response.data.filter(|d| !d.is_empty()) {
                    Some(data) => {
                        let kind = response.chart_kind.unwrap_or(ChartKind::Bar);
                        self.state.chart = Some(ChartData::new(kind, data.clone()));
                        self.state
                            .messages
                            .push(Message::assistant_with_data(content, data, Some(kind)));
                        self.schedule_view_switch(View::Visualization);
                    }
                    None => self.state.messages.push(Message::assistant(content)),
                }
                info!(request_id = %request_id, "Analysis completed");
            }
            Err(e) => {
                error!(request_id = %request_id, error = %e, "Analysis failed");
                self.notifications
                    .push(Notification::error("Analysis failed", e.to_string()));
            }
        }

        self.state.is_loading = false;
        self.state.model.set_running(false);
    }

    fn schedule_view_switch(&mut self, view: View) {
        let tx = self.event_tx.clone();
        self.view_switch = Some(scheduler::spawn_after(
            "view-switch",
            self.view_switch_delay,
            async move {
                tx.send(SessionEvent::SwitchView(view)).await.ok();
            },
        ));
    }

    fn cancel_view_switch(&mut self) {
        if self.view_switch.take().is_some() {
            debug!("Pending view switch cancelled");
        }
    }

    /// Mark the model as loading until the simulated load finishes.
    fn begin_model_load(&mut self) {
        self.cancel_model_load();
        if self.model_load_delay.is_zero() {
            return;
        }
        let load_id = Uuid::new_v4();
        let tx = self.event_tx.clone();
        let handle = scheduler::spawn_after("model-load", self.model_load_delay, async move {
            tx.send(SessionEvent::ModelLoaded(load_id)).await.ok();
        });
        self.state.model.set_loading(true);
        self.model_load = Some((load_id, handle));
    }

    fn cancel_model_load(&mut self) {
        self.model_load = None;
        self.state.model.set_loading(false);
    }

    fn notify_precondition(&mut self, error: &SessionError) {
        let notice = match error {
            SessionError::NoDocuments => Notification::error(
                "No PDF document",
                "Please upload at least one PDF document first.",
            ),
            SessionError::NoModel => Notification::error(
                "No LLM model selected",
                "Please select or provide a path to an LLM model.",
            ),
        };
        self.notifications.push(notice);
    }

    // === Model ===

    pub fn select_model(&mut self, id: &str) {
        self.state.model.select_catalog_model(id);
        self.state.custom_path_entry = false;
        self.begin_model_load();
        let label = self.state.model.label().unwrap_or_else(|| id.to_string());
        info!(model = %label, "Model selected");
        self.notifications
            .push(Notification::info("Model selected", format!("Selected: {}", label)));
    }

    /// Switch the selector to custom-path entry; the catalog id is cleared.
    pub fn choose_custom_path(&mut self) {
        self.cancel_model_load();
        self.state.custom_path_entry = true;
        self.state.model.clear_model_id();
    }

    /// Update the custom path. The catalog id is left as it is.
    pub fn set_model_path(&mut self, path: impl Into<String>) {
        self.state.model.set_custom_path(path);
    }

    /// Confirm the typed path; blank paths are refused.
    pub fn confirm_model_path(&mut self) -> bool {
        let path = self.state.model.custom_path().trim().to_string();
        if path.is_empty() {
            self.notifications.push(Notification::error(
                "Invalid path",
                "Please enter a valid model path.",
            ));
            return false;
        }
        info!(path = %path, "Custom model path set");
        self.begin_model_load();
        self.notifications
            .push(Notification::info("Custom model path set", path));
        true
    }

    pub fn delete_model(&mut self) {
        self.cancel_model_load();
        self.state.model.clear();
        self.state.custom_path_entry = false;
        self.notifications.push(Notification::info(
            "Model removed",
            "No model selected.",
        ));
    }

    pub fn set_temperature(&mut self, value: f32) {
        self.state.params.set_temperature(value);
    }

    pub fn set_max_tokens(&mut self, value: u32) {
        self.state.params.set_max_tokens(value);
    }

    // === Mode and views ===

    pub fn set_mode(&mut self, mode: UiMode) {
        self.state.mode = mode;
        self.normalize_view();
    }

    /// Change the main view. The compare view falls back to chat when it is
    /// not available. A scheduled switch is dropped in favour of this one.
    pub fn set_view(&mut self, view: View) {
        self.cancel_view_switch();
        self.apply_view(view);
    }

    fn apply_view(&mut self, view: View) {
        self.state.view = match view {
            View::Compare if !self.state.compare_available() => View::Chat,
            other => other,
        };
    }

    fn normalize_view(&mut self) {
        let current = self.state.view;
        self.apply_view(current);
    }

    pub fn comparison(&self) -> Result<ComparisonReport, CompareError> {
        compare(self.state.documents.list())
    }

    /// Chart for the visualization surface, or the sample series.
    pub fn chart_or_sample(&self) -> ChartData {
        self.state.chart.clone().unwrap_or_default()
    }

    // === Reports ===

    /// Report request for the last query, detached from the controller.
    pub fn generate_report(&self) -> impl Future<Output = BackendResult<Report>> + Send + 'static {
        let gateway = self.router.gateway();
        let query = self.last_query.clone().unwrap_or_default();
        let names = self.state.documents.names();
        async move { gateway.generate_report(&query, &names).await }
    }

    /// Generate the report in the background and write it to `path`.
    /// The outcome arrives later as a notification.
    pub fn export_report(&self, path: PathBuf) {
        let report = self.generate_report();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let notice = match report.await {
                Ok(report) => match tokio::fs::write(&path, &report.bytes).await {
                    Ok(()) => Notification::info("Report saved", path.display().to_string()),
                    Err(e) => Notification::error("Report not saved", e.to_string()),
                },
                Err(e) => Notification::error("Report failed", e.to_string()),
            };
            tx.send(SessionEvent::Notice(notice)).await.ok();
        });
    }
}

fn compose_reply(narrative: &str, document_names: &[String], model: &str) -> String {
    if document_names.is_empty() {
        return narrative.to_string();
    }
    format!(
        "{}\n\nSources: {} (model: {})",
        narrative,
        document_names.join(", "),
        model
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::models::{AnalysisRequest, DataPoint, MessageRole};
    use crate::types::BackendError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    /// Deterministic gateway: fixed answer, optional gate to hold requests.
    struct FakeGateway {
        response: BackendResult<AnalysisResponse>,
        gate: Option<Arc<Semaphore>>,
        calls: Mutex<Vec<AnalysisRequest>>,
    }

    impl FakeGateway {
        fn answering(response: AnalysisResponse) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response),
                gate: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Err(BackendError::new(message)),
                gate: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn gated(response: AnalysisResponse, gate: Arc<Semaphore>) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response),
                gate: Some(gate),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BackendGateway for FakeGateway {
        async fn analyze(&self, request: AnalysisRequest) -> BackendResult<AnalysisResponse> {
            self.calls.lock().unwrap().push(request);
            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            self.response.clone()
        }

        async fn generate_report(&self, _query: &str, _names: &[String]) -> BackendResult<Report> {
            Ok(Report {
                content_type: "text/csv".to_string(),
                bytes: bytes::Bytes::from_static(b"name,value\n"),
            })
        }
    }

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile::new(name, "application/pdf", Vec::new())
    }

    fn controller(gateway: Arc<dyn BackendGateway>) -> ConversationController {
        ConversationController::new(gateway, GenerationParams::default())
            .with_view_switch_delay(Duration::ZERO)
            .with_model_load_delay(Duration::ZERO)
    }

    /// Controller with one document and a model, greeting cleared.
    fn ready(gateway: Arc<dyn BackendGateway>) -> ConversationController {
        let mut c = controller(gateway);
        c.upload(&[pdf("q1.pdf")]);
        c.select_model("phi-2");
        c.clear_chat();
        c.take_notifications();
        c
    }

    #[tokio::test]
    async fn test_blank_queries_are_noops() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = ready(gateway.clone());

        for q in ["", "   ", "\t\n"] {
            assert_eq!(c.submit(q), Ok(SubmitOutcome::Ignored));
        }
        assert!(c.messages().is_empty());
        assert!(!c.is_pending());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_documents_rejected() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway.clone());
        c.select_model("phi-2");
        c.take_notifications();

        assert_eq!(c.submit("what is in the file?"), Err(SessionError::NoDocuments));
        assert!(c.messages().is_empty());
        assert!(!c.is_pending());
        assert_eq!(gateway.call_count(), 0);

        let notes = c.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "No PDF document");
    }

    #[tokio::test]
    async fn test_no_model_rejected() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway.clone());
        c.upload(&[pdf("q1.pdf")]);
        let before = c.messages().len();

        assert_eq!(c.submit("summarize"), Err(SessionError::NoModel));
        assert_eq!(c.messages().len(), before);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_documents_checked_before_model() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway);
        assert_eq!(c.submit("hello"), Err(SessionError::NoDocuments));
    }

    #[tokio::test]
    async fn test_bar_chart_round_trip_with_mock_backend() {
        let mut c = ready(Arc::new(MockBackend::new(Duration::ZERO)));
        c.set_input("show me a bar chart");

        assert_eq!(c.submit_input(), Ok(SubmitOutcome::Dispatched));
        // User message is logged synchronously and input is cleared
        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.messages()[0].role, MessageRole::User);
        assert_eq!(c.messages()[0].content, "show me a bar chart");
        assert_eq!(c.input(), "");
        assert!(c.state().is_loading);
        assert!(c.state().is_model_running());
        assert!(!c.can_submit());

        c.settle().await;

        assert_eq!(c.messages().len(), 2);
        let reply = &c.messages()[1];
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.attached_data.as_ref().map(|d| d.len()), Some(6));
        assert_eq!(reply.chart_kind, Some(ChartKind::Bar));
        assert!(reply.content.contains("q1.pdf"));
        assert!(!c.state().is_loading);
        assert!(!c.state().is_model_running());
        assert_eq!(c.state().chart.as_ref().map(|ch| ch.points.len()), Some(6));

        // The view switch lands after the message
        assert_eq!(c.state().view, View::Chat);
        assert!(c.next_event().await);
        assert_eq!(c.state().view, View::Visualization);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_cancels_scheduled_view_switch() {
        let mut c = ready(Arc::new(MockBackend::new(Duration::ZERO)))
            .with_view_switch_delay(Duration::from_millis(50));

        c.submit("show me a bar chart").unwrap();
        c.settle().await;
        c.clear_documents_and_chat();

        tokio::time::sleep(Duration::from_millis(100)).await;
        c.poll_events();
        assert_eq!(c.state().view, View::Chat);
        assert!(c.documents().is_empty());
        assert!(c.messages().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_drops_already_queued_view_switch() {
        let mut c = ready(Arc::new(MockBackend::new(Duration::ZERO)));

        c.submit("plot a line chart").unwrap();
        c.settle().await;
        // Let the zero-delay switch reach the channel before navigating
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        c.set_view(View::Chat);
        c.poll_events();
        assert_eq!(c.state().view, View::Chat);

        c.clear_chat();
        c.poll_events();
        assert_eq!(c.state().view, View::Chat);
    }

    #[tokio::test]
    async fn test_generic_query_has_no_data_and_no_view_switch() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("Plain answer."));
        let mut c = ready(gateway.clone());

        c.submit("Summarize the key findings").unwrap();
        c.settle().await;

        assert_eq!(c.messages().len(), 2);
        assert!(c.messages()[1].attached_data.is_none());
        assert!(c.messages()[1].content.starts_with("Plain answer."));
        assert!(c.state().chart.is_none());

        tokio::task::yield_now().await;
        assert_eq!(c.poll_events(), 0);
        assert_eq!(c.state().view, View::Chat);

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls[0].kind, crate::models::AnalysisKind::Generic);
        assert_eq!(calls[0].document_names, vec!["q1.pdf".to_string()]);
        assert_eq!(calls[0].model, "Phi-2");
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_log_unchanged() {
        let gateway = FakeGateway::failing("backend down");
        let mut c = ready(gateway);

        c.submit("plot revenue").unwrap();
        c.settle().await;

        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.messages()[0].role, MessageRole::User);
        assert!(!c.state().is_loading);
        assert!(!c.is_pending());
        let notes = c.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Analysis failed");
        assert_eq!(notes[0].level, crate::session::NotificationLevel::Error);

        // Session stays usable
        assert!(c.can_submit());
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_ignored() {
        let gate = Arc::new(Semaphore::new(0));
        let gateway = FakeGateway::gated(AnalysisResponse::narrative("done"), gate.clone());
        let mut c = ready(gateway.clone());

        assert_eq!(c.submit("first question"), Ok(SubmitOutcome::Dispatched));
        assert_eq!(c.submit("second question"), Ok(SubmitOutcome::Ignored));
        assert_eq!(c.messages().len(), 1);

        gate.add_permits(1);
        c.settle().await;

        assert_eq!(gateway.call_count(), 1);
        let users = c
            .messages()
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .count();
        assert_eq!(users, 1);
        assert_eq!(c.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_stalled_backend_stays_pending() {
        let gate = Arc::new(Semaphore::new(0));
        let gateway = FakeGateway::gated(AnalysisResponse::narrative("never"), gate);
        let mut c = ready(gateway);

        c.submit("anything").unwrap();
        tokio::task::yield_now().await;
        c.poll_events();

        assert!(c.is_pending());
        assert!(c.state().is_loading);
        assert!(c.pending_for().is_some());
    }

    #[tokio::test]
    async fn test_clear_chat_keeps_documents_and_model() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = ready(gateway);
        c.submit("question").unwrap();
        c.settle().await;

        c.clear_chat();
        assert!(c.messages().is_empty());
        assert_eq!(c.documents().len(), 1);
        assert!(c.state().model.is_selected());

        c.clear_chat();
        assert!(c.messages().is_empty());
    }

    #[tokio::test]
    async fn test_reply_in_flight_lands_in_cleared_log() {
        let gate = Arc::new(Semaphore::new(0));
        let gateway = FakeGateway::gated(AnalysisResponse::narrative("late answer"), gate.clone());
        let mut c = ready(gateway);

        c.submit("question").unwrap();
        c.clear_chat();
        assert!(c.messages().is_empty());
        assert!(c.is_pending());

        gate.add_permits(1);
        c.settle().await;

        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.messages()[0].role, MessageRole::Assistant);
        assert!(c.messages()[0].content.starts_with("late answer"));
    }

    #[tokio::test]
    async fn test_clear_documents_clears_chat_too() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = ready(gateway);
        c.submit("question").unwrap();
        c.settle().await;

        c.clear_documents_and_chat();
        assert!(c.documents().is_empty());
        assert!(c.messages().is_empty());
        assert!(c.state().model.is_selected());
    }

    #[tokio::test]
    async fn test_first_upload_seeds_greeting_once() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway);

        assert_eq!(c.upload(&[pdf("a.pdf")]), 1);
        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.messages()[0].content, GREETING);

        c.upload(&[pdf("b.pdf"), pdf("c.pdf")]);
        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.documents().len(), 3);

        // A new empty -> non-empty transition seeds again
        c.clear_documents_and_chat();
        c.upload(&[pdf("d.pdf")]);
        assert_eq!(c.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_files_do_not_abort_batch() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway);

        let accepted = c.upload(&[
            pdf("a.pdf"),
            UploadedFile::new("b.docx", "application/msword", Vec::new()),
            pdf("c.pdf"),
        ]);

        assert_eq!(accepted, 2);
        let notes = c.take_notifications();
        assert!(notes.iter().any(|n| n.title == "Invalid file type" && n.description.contains("b.docx")));
        assert!(notes.iter().any(|n| n.title == "2 PDFs uploaded"));
    }

    #[tokio::test]
    async fn test_all_rejected_upload_adds_nothing() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway);

        assert_eq!(c.upload(&[UploadedFile::new("x.png", "image/png", Vec::new())]), 0);
        assert!(c.documents().is_empty());
        assert!(c.messages().is_empty());
    }

    #[tokio::test]
    async fn test_custom_path_flow() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway);
        c.select_model("llama2-7b");

        c.choose_custom_path();
        assert!(!c.state().model.is_selected());
        assert!(c.state().custom_path_entry);

        c.set_model_path("   ");
        assert!(!c.confirm_model_path());
        c.set_model_path("/models/mine.gguf");
        assert!(c.confirm_model_path());
        assert!(c.state().model.is_selected());

        c.delete_model();
        assert!(!c.state().model.is_selected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_is_loading_until_load_finishes() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway).with_model_load_delay(Duration::from_millis(500));

        c.select_model("mistral-7b");
        assert!(c.state().model.status().loading);
        assert!(c.state().model.is_active());

        tokio::time::sleep(Duration::from_millis(100)).await;
        c.poll_events();
        assert!(c.state().model.status().loading);

        tokio::time::sleep(Duration::from_millis(500)).await;
        c.poll_events();
        assert!(!c.state().model.status().loading);
        assert!(!c.state().model.is_active());
        assert!(c.state().model.is_selected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reselecting_restarts_model_load() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway).with_model_load_delay(Duration::from_millis(500));

        c.select_model("phi-2");
        tokio::time::sleep(Duration::from_millis(400)).await;
        c.select_model("llama2-7b");

        // The first load would have finished here
        tokio::time::sleep(Duration::from_millis(200)).await;
        c.poll_events();
        assert!(c.state().model.status().loading);

        tokio::time::sleep(Duration::from_millis(400)).await;
        c.poll_events();
        assert!(!c.state().model.status().loading);

        c.select_model("phi-2");
        c.delete_model();
        assert!(!c.state().model.is_active());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(c.poll_events(), 0);
    }

    #[tokio::test]
    async fn test_compare_view_requires_mode_and_two_documents() {
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = controller(gateway);
        c.upload(&[pdf("a.pdf")]);

        c.set_mode(UiMode::Compare);
        c.set_view(View::Compare);
        assert_eq!(c.state().view, View::Chat);

        c.upload(&[pdf("b.pdf")]);
        c.set_view(View::Compare);
        assert_eq!(c.state().view, View::Compare);
        assert!(c.comparison().is_ok());

        c.clear_documents_and_chat();
        assert_eq!(c.state().view, View::Chat);
    }

    #[tokio::test]
    async fn test_export_report_notifies() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        let gateway = FakeGateway::answering(AnalysisResponse::narrative("ok"));
        let mut c = ready(gateway);

        c.export_report(path.clone());
        assert!(c.next_event().await);

        let notes = c.take_notifications();
        assert_eq!(notes[0].title, "Report saved");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "name,value\n");
    }

    #[tokio::test]
    async fn test_chart_falls_back_to_sample() {
        let gateway = FakeGateway::answering(AnalysisResponse::chart(
            "chart",
            vec![DataPoint::new("a", 1.0)],
            ChartKind::Pie,
        ));
        let mut c = ready(gateway);
        assert_eq!(c.chart_or_sample().points.len(), 6);

        c.submit("pie chart").unwrap();
        c.settle().await;
        let chart = c.chart_or_sample();
        assert_eq!(chart.kind, ChartKind::Pie);
        assert_eq!(chart.points.len(), 1);
    }
}
