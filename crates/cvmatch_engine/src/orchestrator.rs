use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use bytes::Bytes;
use chrono::{Local, NaiveDate};
use cvmatch_core::{
    ActionError, ActionKind, ActionRequest, FileEntry, OutboundRequest, ResponseShape,
    TaskResult, TaskState, TaskTracker,
};
use cvmatch_logging::{current_screen, cvm_info, cvm_warn};

use crate::download::Downloader;
use crate::filename::download_filename;
use crate::transport::Transport;

/// Supplies the date embedded in download filenames.
pub type DateSource = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Runs at most one action at a time against the service.
///
/// The orchestrator never resets a terminal state on its own; the caller
/// calls [`TaskOrchestrator::acknowledge`] once the result has been shown.
/// There is no cancellation and no retry: a started action runs to
/// completion or failure.
pub struct TaskOrchestrator {
    transport: Arc<dyn Transport>,
    downloader: Arc<dyn Downloader>,
    today: DateSource,
    screen: Option<&'static str>,
    tracker: Mutex<TaskTracker>,
}

impl TaskOrchestrator {
    pub fn new(transport: Arc<dyn Transport>, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            transport,
            downloader,
            today: Arc::new(|| Local::now().date_naive()),
            screen: None,
            tracker: Mutex::new(TaskTracker::new()),
        }
    }

    pub fn with_date_source(mut self, today: DateSource) -> Self {
        self.today = today;
        self
    }

    /// Labels this orchestrator's log lines with `screen`.
    pub fn with_screen(mut self, screen: &'static str) -> Self {
        self.screen = Some(screen);
        self
    }

    /// The label on this orchestrator's log lines; the thread's label if none was set.
    pub fn screen(&self) -> &'static str {
        self.screen.unwrap_or_else(current_screen)
    }

    fn tracker(&self) -> MutexGuard<'_, TaskTracker> {
        lock(&self.tracker)
    }

    pub fn state(&self) -> TaskState {
        self.tracker().state().clone()
    }

    pub fn can_start(&self, kind: ActionKind) -> bool {
        self.tracker().can_start(kind)
    }

    /// Returns a terminal state to `Idle`; false if there was nothing to acknowledge.
    pub fn acknowledge(&self) -> bool {
        self.tracker().acknowledge()
    }

    /// Runs `request` against a snapshot of the selection.
    ///
    /// Precondition failures (`ConflictingAction`, `ValidationFailed`) are
    /// returned without touching the state or the network. Anything after
    /// that ends in `Succeeded` or `Failed`, including a future dropped
    /// mid-flight, which leaves `Failed` with an "interrupted" message.
    pub async fn start(
        &self,
        request: ActionRequest,
        selection: &[FileEntry],
    ) -> Result<TaskResult, ActionError> {
        let kind = request.kind();
        {
            let mut tracker = self.tracker();
            // A busy orchestrator refuses before looking at the request.
            let admitted = if tracker.can_start(kind) {
                request
                    .validate(selection)
                    .and_then(|()| tracker.begin(kind))
            } else {
                Err(ActionError::ConflictingAction {
                    active: tracker.state().describe(),
                })
            };
            if let Err(err) = admitted {
                cvm_warn!(screen = self.screen(); "{} refused: {}", kind, err);
                return Err(err);
            }
        }
        let running = RunningAction {
            tracker: &self.tracker,
            kind,
            screen: self.screen(),
            settled: false,
        };

        let plan = OutboundRequest::plan(&request, selection);
        cvm_info!(
            screen = self.screen();
            "{} started: {} with {} file(s)",
            kind,
            plan.describe(),
            plan.files.len()
        );
        let started = Instant::now();

        let outcome = self.execute(&request, &plan).await;
        match &outcome {
            Ok(_) => cvm_info!(
                screen = self.screen();
                "{} succeeded in {:?}",
                kind,
                started.elapsed()
            ),
            Err(err) => cvm_warn!(
                screen = self.screen();
                "{} failed after {:?}: {}",
                kind,
                started.elapsed(),
                err
            ),
        }

        running.finish(&outcome);
        outcome
    }

    async fn execute(
        &self,
        request: &ActionRequest,
        plan: &OutboundRequest,
    ) -> Result<TaskResult, ActionError> {
        let body = self
            .transport
            .send(plan)
            .await
            .map_err(ActionError::Remote)?;

        match plan.response {
            ResponseShape::Json => serde_json::from_slice(&body)
                .map(TaskResult::Json)
                .map_err(|err| {
                    cvm_warn!(
                        screen = self.screen();
                        "{} returned unparsable json: {}",
                        plan.kind,
                        err
                    );
                    ActionError::MalformedResponse { kind: plan.kind }
                }),
            ResponseShape::Spreadsheet => self.deliver(request, body).await,
        }
    }

    async fn deliver(&self, request: &ActionRequest, body: Bytes) -> Result<TaskResult, ActionError> {
        let filename = download_filename(request, (self.today)())
            .ok_or(ActionError::MalformedResponse {
                kind: request.kind(),
            })?;
        let size_bytes = body.len() as u64;

        let downloader = self.downloader.clone();
        let name = filename.clone();
        let location = tokio::task::spawn_blocking(move || downloader.deliver(&name, &body))
            .await
            .map_err(|err| ActionError::Delivery(format!("Could not save {filename}: {err}")))?
            .map_err(|err| ActionError::Delivery(format!("Could not save {filename}: {err}")))?;

        cvm_info!(
            screen = self.screen();
            "saved {} ({} bytes) to {}",
            filename,
            size_bytes,
            location.display()
        );
        Ok(TaskResult::Downloaded {
            filename,
            size_bytes,
            location,
        })
    }
}

fn lock(tracker: &Mutex<TaskTracker>) -> MutexGuard<'_, TaskTracker> {
    // Poisoning is ignored: every tracker transition is a single assignment.
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The `Running` state of one `start` call.
///
/// Dropping it unsettled (the `start` future was dropped at an await)
/// moves the tracker to `Failed` so it can be acknowledged.
struct RunningAction<'a> {
    tracker: &'a Mutex<TaskTracker>,
    kind: ActionKind,
    screen: &'static str,
    settled: bool,
}

impl RunningAction<'_> {
    fn finish(mut self, outcome: &Result<TaskResult, ActionError>) {
        self.settled = true;
        lock(self.tracker).finish(self.kind, outcome);
    }
}

impl Drop for RunningAction<'_> {
    fn drop(&mut self) {
        if !self.settled && lock(self.tracker).interrupt(self.kind) {
            cvm_warn!(
                screen = self.screen;
                "{} interrupted before it finished",
                self.kind
            );
        }
    }
}
