//! Stage pipeline controller
//!
//! Owns the active panel selection and drives each stage through
//! validate -> busy -> backend call -> store write -> card rebuild -> gate
//! re-evaluation. State sits behind a `parking_lot::Mutex` that is never held
//! across an `.await`, so runs of different stages may overlap while a second
//! trigger of a busy stage is refused.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::cards::{CardBoard, CardView};
use crate::error::{Error, Result};
use crate::export::{self, Artifact, ExportFormat, ExportKind};
use crate::gate::{Gates, REPORT_PRECONDITION, RUN_PRECONDITION};
use crate::stage::{clamp_depth, Panel, Stage, StageInput};
use crate::store::ResultStore;
use crate::types::{CategoryStats, CombinedTestCase, ExecutionResult};

pub const DOWNLOAD_PRECONDITION: &str = "No report generated yet. Generate a report first.";

/// Hooks for the presentation layer. Every method defaults to a no-op.
pub trait StageObserver: Send + Sync {
    /// A stage entered its busy state
    fn busy(&self, _stage: Stage, _message: &str) {}
    /// A stage left its busy state, whatever the outcome
    fn idle(&self, _stage: Stage) {}
    /// The shared error banner now shows `message`
    fn error(&self, _message: &str) {}
    fn error_cleared(&self) {}
    /// A stage's result was stored and its cards rebuilt
    fn rendered(&self, _stage: Stage) {}
    fn gates_changed(&self, _gates: Gates) {}
}

pub struct NoopObserver;

impl StageObserver for NoopObserver {}

/// What the user currently sees
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub active: Panel,
    /// Text of the shared error banner, if shown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_banner: Option<String>,
    /// Result panel currently displayed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shown: Option<Panel>,
}

/// Persistable controller state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub view: ViewState,
    #[serde(default)]
    pub store: ResultStore,
    /// Last generated report document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The backend call succeeded and its result was stored
    Completed,
    /// The stage was already in flight; nothing was done
    AlreadyRunning,
}

/// Payload a stage takes from the store rather than from user input
enum Payload {
    None,
    Cases(Vec<CombinedTestCase>),
    Execution(ExecutionResult),
}

struct Inner {
    store: ResultStore,
    view: ViewState,
    analysis_board: CardBoard,
    combined_board: CardBoard,
    report: Option<String>,
    busy: HashSet<Stage>,
    gates: Gates,
}

impl Inner {
    fn new(snapshot: Snapshot) -> Self {
        let mut inner = Self {
            store: snapshot.store,
            view: snapshot.view,
            analysis_board: CardBoard::new(CardView::Analysis),
            combined_board: CardBoard::new(CardView::Combined),
            report: snapshot.report,
            busy: HashSet::new(),
            gates: Gates::default(),
        };
        inner.rebuild_boards();
        inner.gates = Gates::evaluate(&inner.store);
        inner
    }

    fn rebuild_boards(&mut self) {
        match self.store.analysis() {
            Some(a) => self.analysis_board.rebuild(a.test_cases()),
            None => self.analysis_board.clear(),
        }
        match self.store.combined() {
            Some(c) => self.combined_board.rebuild(&c.test_cases),
            None => self.combined_board.clear(),
        }
    }

    fn board_mut(&mut self, view: CardView) -> &mut CardBoard {
        match view {
            CardView::Analysis => &mut self.analysis_board,
            CardView::Combined => &mut self.combined_board,
        }
    }

    fn board(&self, view: CardView) -> &CardBoard {
        match view {
            CardView::Analysis => &self.analysis_board,
            CardView::Combined => &self.combined_board,
        }
    }
}

/// Releases a stage's busy flag on every exit path
struct BusyGuard<'a> {
    controller: &'a StageController,
    stage: Stage,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.controller.inner.lock().busy.remove(&self.stage);
        self.controller.observer.idle(self.stage);
        debug!(stage = %self.stage, "stage idle");
    }
}

pub struct StageController {
    backend: Arc<dyn Backend>,
    observer: Arc<dyn StageObserver>,
    inner: Mutex<Inner>,
}

impl StageController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::from_snapshot(backend, Snapshot::default())
    }

    /// Resume from persisted state; cards and gates are rebuilt from the store.
    pub fn from_snapshot(backend: Arc<dyn Backend>, snapshot: Snapshot) -> Self {
        Self {
            backend,
            observer: Arc::new(NoopObserver),
            inner: Mutex::new(Inner::new(snapshot)),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    // ========================================================================
    // Panel selection
    // ========================================================================

    /// Switch panels. Hides result panels and clears the error banner;
    /// stored results are untouched.
    pub fn select_stage(&self, panel: Panel) {
        {
            let mut inner = self.inner.lock();
            inner.view.active = panel;
            inner.view.shown = None;
            inner.view.error_banner = None;
        }
        debug!(%panel, "panel selected");
        self.observer.error_cleared();
    }

    pub fn view(&self) -> ViewState {
        self.inner.lock().view.clone()
    }

    pub fn dismiss_error(&self) {
        self.inner.lock().view.error_banner = None;
        self.observer.error_cleared();
    }

    // ========================================================================
    // Stage runs
    // ========================================================================

    pub fn is_busy(&self, stage: Stage) -> bool {
        self.inner.lock().busy.contains(&stage)
    }

    /// Run one stage end to end.
    ///
    /// Validation failures are returned without touching the banner.
    /// Precondition, transport and backend failures are also shown on the
    /// shared error banner. No failure writes to the store.
    pub async fn run_stage(&self, input: StageInput) -> Result<RunOutcome> {
        let stage = input.stage();
        input.validate()?;

        let Some(_guard) = self.try_enter(stage) else {
            debug!(%stage, "stage already in flight, ignoring trigger");
            return Ok(RunOutcome::AlreadyRunning);
        };

        let payload = match self.payload_for(stage) {
            Ok(payload) => payload,
            Err(e) => return Err(self.surface(stage, e)),
        };

        self.dismiss_error();
        self.observer.busy(stage, stage.busy_message());
        info!(%stage, endpoint = stage.endpoint(), "running stage");

        match self.dispatch(input, payload).await {
            Ok(()) => {
                self.after_write(stage);
                Ok(RunOutcome::Completed)
            }
            Err(e) => Err(self.surface(stage, e)),
        }
    }

    fn try_enter(&self, stage: Stage) -> Option<BusyGuard<'_>> {
        let mut inner = self.inner.lock();
        if !inner.busy.insert(stage) {
            return None;
        }
        Some(BusyGuard { controller: self, stage })
    }

    fn payload_for(&self, stage: Stage) -> Result<Payload> {
        let inner = self.inner.lock();
        match stage {
            Stage::Execute => match inner.store.combined() {
                Some(c) if inner.gates.can_run => Ok(Payload::Cases(c.test_cases.clone())),
                _ => Err(Error::Precondition(RUN_PRECONDITION.to_string())),
            },
            Stage::Report => match inner.store.execution() {
                Some(e) if inner.gates.can_report => Ok(Payload::Execution(e.clone())),
                _ => Err(Error::Precondition(REPORT_PRECONDITION.to_string())),
            },
            _ => Ok(Payload::None),
        }
    }

    async fn dispatch(&self, input: StageInput, payload: Payload) -> Result<()> {
        match (input, payload) {
            (StageInput::Analyze { story }, _) => {
                let result = self.backend.analyze(story.trim()).await?;
                info!(cases = result.test_cases().len(), "analysis complete");
                self.inner.lock().store.set_analysis(result);
            }
            (StageInput::Explore { url, depth }, _) => {
                let result = self.backend.explore(url.trim(), clamp_depth(depth)).await?;
                info!(pages = result.pages.len(), "exploration complete");
                self.inner.lock().store.set_explorer(result);
            }
            (StageInput::Combine { story, url, depth }, _) => {
                let result = self
                    .backend
                    .combine(story.trim(), url.trim(), clamp_depth(depth))
                    .await?;
                info!(
                    cases = result.test_cases.len(),
                    unmapped = result.summary.unmapped,
                    "combined generation complete"
                );
                self.inner.lock().store.set_combined(result);
            }
            (StageInput::Execute { headless }, Payload::Cases(cases)) => {
                let result = self.backend.execute(&cases, headless).await?;
                info!(
                    passed = result.summary.passed,
                    failed = result.summary.failed,
                    errored = result.summary.errored,
                    "execution complete"
                );
                // A report describes the previous run
                let mut inner = self.inner.lock();
                inner.store.set_execution(result);
                inner.report = None;
            }
            (StageInput::Report, Payload::Execution(results)) => {
                let html = self.backend.generate_report(&results).await?;
                info!(bytes = html.len(), "report generated");
                self.inner.lock().report = Some(html);
            }
            (input, _) => {
                // payload_for always pairs Execute/Report with their payloads
                return Err(Error::Precondition(format!(
                    "missing stored input for {}",
                    input.stage()
                )));
            }
        }
        Ok(())
    }

    /// Render pipeline after a successful write
    fn after_write(&self, stage: Stage) {
        let gates = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            // Only the written stage's board is rebuilt; the other keeps its filter.
            match stage {
                Stage::Analyze => {
                    if let Some(a) = inner.store.analysis() {
                        inner.analysis_board.rebuild(a.test_cases());
                    }
                }
                Stage::Combine => {
                    if let Some(c) = inner.store.combined() {
                        inner.combined_board.rebuild(&c.test_cases);
                    }
                }
                Stage::Explore | Stage::Execute | Stage::Report => {}
            }
            inner.view.shown = Some(stage.panel());
            inner.gates = Gates::evaluate(&inner.store);
            inner.gates
        };
        self.observer.rendered(stage);
        self.observer.gates_changed(gates);
    }

    /// Put an operation error on the banner and hand it back
    fn surface(&self, stage: Stage, e: Error) -> Error {
        if e.is_operation_error() {
            let message = e.to_string();
            error!(%stage, error = %message, "stage failed");
            self.inner.lock().view.error_banner = Some(message.clone());
            self.observer.error(&message);
        } else {
            warn!(%stage, error = %e, "stage rejected");
        }
        e
    }

    // ========================================================================
    // Report preview and download
    // ========================================================================

    pub fn report_preview(&self) -> Option<String> {
        self.inner.lock().report.clone()
    }

    /// Fetch the served copy of the last generated report
    pub async fn download_report(&self) -> Result<Vec<u8>> {
        if self.inner.lock().report.is_none() {
            return Err(self.surface(
                Stage::Report,
                Error::Precondition(DOWNLOAD_PRECONDITION.to_string()),
            ));
        }
        self.backend
            .download_report()
            .await
            .map_err(|e| self.surface(Stage::Report, e))
    }

    // ========================================================================
    // Store, gates, cards, export
    // ========================================================================

    /// Drop every stored result and rendered card
    pub fn reset(&self) {
        let gates = {
            let mut inner = self.inner.lock();
            inner.store.reset();
            inner.report = None;
            inner.rebuild_boards();
            inner.view.shown = None;
            inner.view.error_banner = None;
            inner.gates = Gates::evaluate(&inner.store);
            inner.gates
        };
        info!("session reset");
        self.observer.error_cleared();
        self.observer.gates_changed(gates);
    }

    pub fn gates(&self) -> Gates {
        self.inner.lock().gates
    }

    /// Read the store without cloning it
    pub fn with_store<R>(&self, f: impl FnOnce(&ResultStore) -> R) -> R {
        f(&self.inner.lock().store)
    }

    pub fn with_board<R>(&self, view: CardView, f: impl FnOnce(&CardBoard) -> R) -> R {
        f(self.inner.lock().board(view))
    }

    /// Apply a filter to a view, returning the number of visible cards
    pub fn apply_filter(&self, view: CardView, key: &str) -> Result<usize> {
        let visible = self.inner.lock().board_mut(view).apply_str(key)?;
        debug!(%view, filter = key, visible, "filter applied");
        Ok(visible)
    }

    pub fn analysis_stats(&self) -> Option<CategoryStats> {
        self.inner.lock().store.analysis().map(|a| a.stats())
    }

    /// Export a stored result; `Ok(None)` when there is nothing to export
    pub fn export(&self, kind: ExportKind, format: ExportFormat) -> Result<Option<Artifact>> {
        let artifact = export::export(&self.inner.lock().store, kind, format)?;
        if artifact.is_none() {
            debug!(%kind, "nothing to export");
        }
        Ok(artifact)
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        Snapshot {
            view: inner.view.clone(),
            store: inner.store.clone(),
            report: inner.report.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::*;
    use crate::types::{
        AnalysisResult, Category, CombinedResult, ExecStatus, ExplorerResult, StoryAnalysis,
        TestSuite,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeBackend {
        calls: AtomicUsize,
        fail: Option<&'static str>,
        transport_down: bool,
        hold: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn enter(&self, stage: Stage) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            if self.transport_down {
                return Err(Error::Transport("connection refused".to_string()));
            }
            if let Some(message) = self.fail {
                return Err(Error::backend(stage, Some(message.to_string())));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn analyze(&self, _story: &str) -> Result<AnalysisResult> {
            self.enter(Stage::Analyze).await?;
            Ok(AnalysisResult {
                analysis: StoryAnalysis {
                    feature: "Login".into(),
                    user_role: "user".into(),
                    conditions: vec!["valid credentials".into(), "invalid credentials".into()],
                },
                test_suite: TestSuite {
                    test_cases: vec![test_case("TC1", "Positive")],
                    ..Default::default()
                },
            })
        }

        async fn explore(&self, url: &str, _depth: u32) -> Result<ExplorerResult> {
            self.enter(Stage::Explore).await?;
            Ok(ExplorerResult {
                start_url: Some(url.to_string()),
                pages: Vec::new(),
            })
        }

        async fn combine(&self, _story: &str, _url: &str, _depth: u32) -> Result<CombinedResult> {
            self.enter(Stage::Combine).await?;
            Ok(CombinedResult::new(vec![
                combined_case("TC-001", "Positive", true),
                combined_case("TC-002", "Positive", true),
                combined_case("TC-003", "Negative", false),
            ]))
        }

        async fn execute(&self, test_cases: &[CombinedTestCase], _headless: bool) -> Result<ExecutionResult> {
            self.enter(Stage::Execute).await?;
            Ok(ExecutionResult::new(
                test_cases.iter().map(|tc| exec_record(&tc.tc_id, ExecStatus::Pass)).collect(),
            ))
        }

        async fn generate_report(&self, results: &ExecutionResult) -> Result<String> {
            self.enter(Stage::Report).await?;
            Ok(format!("<html>{} results</html>", results.results.len()))
        }

        async fn download_report(&self) -> Result<Vec<u8>> {
            self.enter(Stage::Report).await?;
            Ok(b"<html>report</html>".to_vec())
        }
    }

    fn controller(backend: FakeBackend) -> (Arc<FakeBackend>, StageController) {
        let backend = Arc::new(backend);
        let controller = StageController::new(backend.clone());
        (backend, controller)
    }

    fn combine_input() -> StageInput {
        StageInput::Combine {
            story: "As a user I want to log in".into(),
            url: "https://example.com".into(),
            depth: 1,
        }
    }

    #[tokio::test]
    async fn test_analyze_renders_stats() {
        let (_, controller) = controller(FakeBackend::default());
        let outcome = controller
            .run_stage(StageInput::Analyze { story: "As a user I want to log in".into() })
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Completed);

        let stats = controller.analysis_stats().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_type.positive, 1);
        assert_eq!(stats.by_type.sum(), 1);
        assert_eq!(controller.view().shown, Some(Panel::Story));

        let csv = controller
            .export(ExportKind::TestCases, ExportFormat::Csv)
            .unwrap()
            .unwrap();
        assert_eq!(csv.contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_validation_makes_no_call() {
        let (backend, controller) = controller(FakeBackend::default());
        let err = controller
            .run_stage(StageInput::Explore { url: "   ".into(), depth: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "website URL" }));
        assert_eq!(backend.calls(), 0);
        assert!(controller.view().error_banner.is_none());
        assert!(!controller.is_busy(Stage::Explore));
    }

    #[tokio::test]
    async fn test_execute_without_combined_is_precondition_error() {
        let (backend, controller) = controller(FakeBackend::default());
        let err = controller
            .run_stage(StageInput::Execute { headless: true })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert_eq!(backend.calls(), 0);
        assert_eq!(controller.view().error_banner.as_deref(), Some(RUN_PRECONDITION));
        assert!(!controller.is_busy(Stage::Execute));

        let err = controller.run_stage(StageInput::Report).await.unwrap_err();
        assert_eq!(err.to_string(), REPORT_PRECONDITION);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_pipeline_opens_gates() {
        let (_, controller) = controller(FakeBackend::default());
        assert_eq!(controller.gates(), Gates::default());

        controller.run_stage(combine_input()).await.unwrap();
        assert!(controller.gates().can_run);
        assert!(!controller.gates().can_report);

        controller.run_stage(StageInput::Execute { headless: true }).await.unwrap();
        assert!(controller.gates().can_report);

        controller.run_stage(StageInput::Report).await.unwrap();
        assert_eq!(controller.report_preview().as_deref(), Some("<html>3 results</html>"));
        assert_eq!(controller.download_report().await.unwrap(), b"<html>report</html>");

        controller.reset();
        assert_eq!(controller.gates(), Gates::default());
        assert!(controller.report_preview().is_none());
        assert!(controller.with_board(CardView::Combined, |b| b.cards().is_empty()));
    }

    #[tokio::test]
    async fn test_combined_filters() {
        let (_, controller) = controller(FakeBackend::default());
        controller.run_stage(combine_input()).await.unwrap();

        assert_eq!(controller.apply_filter(CardView::Combined, "unmapped").unwrap(), 1);
        assert_eq!(controller.apply_filter(CardView::Combined, "Positive").unwrap(), 2);
        assert_eq!(controller.apply_filter(CardView::Combined, "all").unwrap(), 3);

        controller.apply_filter(CardView::Combined, "Negative").unwrap();
        controller.run_stage(combine_input()).await.unwrap();
        controller.with_board(CardView::Combined, |board| {
            assert_eq!(board.visible_count(), 3);
            assert_eq!(board.cards()[2].category, Category::Negative);
        });
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_previous_result() {
        let (_, controller) = controller(FakeBackend::default());
        controller.run_stage(combine_input()).await.unwrap();
        let before = controller.snapshot().store;

        let failing = Arc::new(FakeBackend {
            fail: Some("No website URL provided."),
            ..Default::default()
        });
        let controller = StageController::from_snapshot(failing, controller.snapshot());
        let err = controller.run_stage(combine_input()).await.unwrap_err();
        assert_eq!(err.to_string(), "No website URL provided.");
        assert_eq!(controller.snapshot().store, before);
        assert_eq!(
            controller.view().error_banner.as_deref(),
            Some("No website URL provided.")
        );
        assert!(!controller.is_busy(Stage::Combine));
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let (_, controller) = controller(FakeBackend {
            transport_down: true,
            ..Default::default()
        });
        let err = controller
            .run_stage(StageInput::Analyze { story: "story".into() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Network error: connection refused");
        assert!(controller.with_store(|s| s.analysis().is_none()));
    }

    #[tokio::test]
    async fn test_second_trigger_while_busy_is_noop() {
        let hold = Arc::new(Notify::new());
        let (backend, controller) = controller(FakeBackend {
            hold: Some(hold.clone()),
            ..Default::default()
        });

        let (first, second, _) = tokio::join!(
            controller.run_stage(combine_input()),
            controller.run_stage(combine_input()),
            async {
                tokio::task::yield_now().await;
                hold.notify_one();
            }
        );

        assert_eq!(first.unwrap(), RunOutcome::Completed);
        assert_eq!(second.unwrap(), RunOutcome::AlreadyRunning);
        assert_eq!(backend.calls(), 1);
        assert!(!controller.is_busy(Stage::Combine));
    }

    #[tokio::test]
    async fn test_invalid_trigger_while_busy_reports_missing_field() {
        let hold = Arc::new(Notify::new());
        let (backend, controller) = controller(FakeBackend {
            hold: Some(hold.clone()),
            ..Default::default()
        });

        let (first, second, _) = tokio::join!(
            controller.run_stage(combine_input()),
            controller.run_stage(StageInput::Combine {
                story: "  ".into(),
                url: "https://example.com".into(),
                depth: 1,
            }),
            async {
                tokio::task::yield_now().await;
                hold.notify_one();
            }
        );

        assert_eq!(first.unwrap(), RunOutcome::Completed);
        assert!(matches!(second, Err(Error::Validation { field: "user story" })));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_new_execution_discards_previous_report() {
        let (_, controller) = controller(FakeBackend::default());
        controller.run_stage(combine_input()).await.unwrap();
        controller.run_stage(StageInput::Execute { headless: true }).await.unwrap();
        controller.run_stage(StageInput::Report).await.unwrap();
        assert!(controller.report_preview().is_some());

        controller.run_stage(StageInput::Execute { headless: true }).await.unwrap();
        assert!(controller.report_preview().is_none());
        assert!(controller.snapshot().report.is_none());
        assert!(matches!(
            controller.download_report().await,
            Err(Error::Precondition(_))
        ));
        assert!(controller.gates().can_report);
    }

    #[tokio::test]
    async fn test_select_stage_is_non_destructive() {
        let (_, controller) = controller(FakeBackend::default());
        controller.run_stage(combine_input()).await.unwrap();
        controller.inner.lock().view.error_banner = Some("stale".into());

        controller.select_stage(Panel::Exec);
        let view = controller.view();
        assert_eq!(view.active, Panel::Exec);
        assert!(view.shown.is_none());
        assert!(view.error_banner.is_none());
        assert!(controller.gates().can_run);
    }

    #[tokio::test]
    async fn test_snapshot_restores_cards() {
        let (_, controller) = controller(FakeBackend::default());
        controller.run_stage(combine_input()).await.unwrap();

        let restored = StageController::from_snapshot(
            Arc::new(FakeBackend::default()),
            controller.snapshot(),
        );
        assert_eq!(restored.with_board(CardView::Combined, |b| b.cards().len()), 3);
        assert!(restored.gates().can_run);
    }

    #[tokio::test]
    async fn test_download_requires_generated_report() {
        let (backend, controller) = controller(FakeBackend::default());
        assert!(matches!(
            controller.download_report().await,
            Err(Error::Precondition(_))
        ));
        assert_eq!(backend.calls(), 0);
    }
}
