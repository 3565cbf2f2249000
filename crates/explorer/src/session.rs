//! Transient UI state of one explorer view.
//!
//! [`ExplorerSession`] owns the form, the [`ViewState`] shown to the
//! user and the cancellation of outstanding jobs. It is the only writer
//! of the view state; every operation leaves it in a settled state
//! (`Empty`, `Error` or `Ready`) when it returns.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use clearsky_core::error::CoreError;
use clearsky_core::job::{JobStatus, DEFAULT_JOB_FAILURE};
use clearsky_core::plot::PlotSelection;
use clearsky_core::poll::{PollConfig, PollState};
use clearsky_core::request::{VisualizationForm, VisualizationRequest, DEFAULT_BBOX};
use clearsky_core::view::{
    AllThreeSummary, SingleResult, ViewState, VisualizationResult, MSG_GENERATING_ALL,
    MSG_PRELOADING, MSG_PRELOAD_GENERATING, MSG_TESTING_CONNECTION,
};
use clearsky_harmony::{HarmonyApiError, VisualizationBackend};

use crate::poller::{self, ProgressSender};

/// Job id shown for preloaded results the backend did not label.
const PRELOAD_JOB_ID: &str = "preload";
/// Job id shown for all-three results the backend did not label.
const ALL_THREE_JOB_ID: &str = "all_three";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Backend(#[from] HarmonyApiError),

    /// The job ended without a result (failed or timed out).
    #[error("{0}")]
    Job(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Core(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub struct ExplorerSession<B: ?Sized> {
    backend: Arc<B>,
    poll_config: PollConfig,
    form: VisualizationForm,
    view: ViewState,
    /// Result currently on screen; decides what `retry` does.
    result: Option<VisualizationResult>,
    retry_count: u32,
    /// Cancelled when the session is torn down; parent of every job token.
    shutdown: CancellationToken,
    /// Token of the running (or next) operation, handed out by `cancel_handle`.
    current: CancellationToken,
    progress: ProgressSender,
}

impl<B> ExplorerSession<B>
where
    B: VisualizationBackend + ?Sized,
{
    pub fn new(backend: Arc<B>, poll_config: PollConfig) -> Self {
        let shutdown = CancellationToken::new();
        let current = shutdown.child_token();
        let (progress, _) = watch::channel(None);
        Self {
            backend,
            poll_config,
            form: VisualizationForm::default(),
            view: ViewState::Empty,
            result: None,
            retry_count: 0,
            shutdown,
            current,
            progress,
        }
    }

    pub fn with_form(mut self, form: VisualizationForm) -> Self {
        self.form = form;
        self
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn form(&self) -> &VisualizationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut VisualizationForm {
        &mut self.form
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Status updates of the job being polled.
    pub fn subscribe_progress(&self) -> watch::Receiver<Option<JobStatus>> {
        self.progress.subscribe()
    }

    /// Token that tears the session down, cancelling any job in flight
    /// and every job started afterwards.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Handle that cancels the operation currently running, or the next
    /// one started if the session is idle. Cancelling stops local polling
    /// only; the backend keeps working on the job.
    ///
    /// The handle expires once that operation settles, so a handle kept
    /// from a finished job never cancels a later one.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.current.clone()
    }

    /// Load the sample visualizations shown before the user asks for
    /// anything. Any failure leaves the view empty rather than in error.
    pub async fn preload(&mut self) -> &ViewState {
        self.view = ViewState::Preloading {
            message: MSG_PRELOADING.to_string(),
        };

        let outcome = self.run_preload().await;
        self.settle_token();
        match outcome {
            Ok(summary) => {
                tracing::info!(
                    job_id = %summary.job_id,
                    visualizations = summary.visualizations.len(),
                    "Sample visualizations loaded",
                );
                self.form.bbox = DEFAULT_BBOX.to_string();
                self.show(VisualizationResult::AllThree(summary));
            }
            Err(e) => {
                tracing::info!(error = %e, "Preload failed, showing empty state");
                self.result = None;
                self.view = ViewState::Empty;
            }
        }
        &self.view
    }

    async fn run_preload(&mut self) -> Result<AllThreeSummary, SessionError> {
        let token = self.begin_token();
        let request = VisualizationRequest::sample()?;

        let health = cancellable(&token, self.backend.check_health()).await??;
        tracing::debug!(status = %health.status, "Harmony API reachable");

        self.view = ViewState::Preloading {
            message: MSG_PRELOAD_GENERATING.to_string(),
        };
        let response =
            cancellable(&token, self.backend.visualize_all(&request.to_all_request())).await??;
        Ok(AllThreeSummary::from_response(
            response,
            &request,
            PRELOAD_JOB_ID,
        )?)
    }

    /// Validate the form and generate the requested visualization.
    ///
    /// A form that fails validation never reaches the backend. A
    /// cancelled request leaves the view empty.
    pub async fn submit(&mut self) -> &ViewState {
        self.result = None;
        self.progress.send_replace(None);

        let outcome = self.run_submit().await;
        self.settle_token();
        match outcome {
            Ok(result) => {
                tracing::info!(summary = result.message(), "Visualization ready");
                self.show(result);
            }
            Err(SessionError::Cancelled) => {
                tracing::info!("Visualization request cancelled");
                self.view = ViewState::Empty;
            }
            Err(e) => self.fail(&e),
        }
        &self.view
    }

    async fn run_submit(&mut self) -> Result<VisualizationResult, SessionError> {
        let request = self.form.validate()?;
        let token = self.begin_token();

        match request.plots() {
            PlotSelection::AllThree => {
                self.view = ViewState::Loading {
                    message: MSG_GENERATING_ALL.to_string(),
                    job: None,
                };
                let response =
                    cancellable(&token, self.backend.visualize_all(&request.to_all_request()))
                        .await??;
                let summary = AllThreeSummary::from_response(response, &request, ALL_THREE_JOB_ID)?;
                Ok(VisualizationResult::AllThree(summary))
            }
            PlotSelection::Single(plot) => {
                self.view = ViewState::generating(plot);
                let state = poller::run_job(
                    self.backend.as_ref(),
                    &request.to_job_request(),
                    plot,
                    &self.poll_config,
                    &token,
                    &self.progress,
                )
                .await;

                match state {
                    PollState::Completed {
                        handle,
                        plot,
                        result,
                    } => Ok(VisualizationResult::Single(SingleResult::new(
                        handle.job_id,
                        plot,
                        request.variable(),
                        result,
                    ))),
                    PollState::Cancelled => Err(SessionError::Cancelled),
                    other => Err(SessionError::Job(
                        other
                            .error_message()
                            .unwrap_or_else(|| DEFAULT_JOB_FAILURE.to_string()),
                    )),
                }
            }
        }
    }

    /// Check that the backend is reachable.
    pub async fn test_connection(&mut self) -> &ViewState {
        self.view = ViewState::Loading {
            message: MSG_TESTING_CONNECTION.to_string(),
            job: None,
        };
        let token = self.begin_token();

        let outcome = cancellable(&token, self.backend.check_health()).await;
        self.settle_token();
        match outcome {
            Ok(Ok(health)) => self.show(VisualizationResult::health(health.status)),
            Ok(Err(e)) => self.fail(&SessionError::Backend(e)),
            Err(_) => {
                self.view = match &self.result {
                    Some(result) => ViewState::Ready(result.clone()),
                    None => ViewState::Empty,
                };
            }
        }
        &self.view
    }

    /// Try again after an error: regenerate when a result is on screen,
    /// otherwise check the connection.
    pub async fn retry(&mut self) -> &ViewState {
        self.retry_count += 1;
        tracing::info!(retry_count = self.retry_count, "Retrying");

        if self.result.is_some() {
            self.submit().await
        } else {
            self.test_connection().await
        }
    }

    /// Token for the operation about to run. A cancel issued while the
    /// session was idle is dropped rather than aborting this operation.
    fn begin_token(&mut self) -> CancellationToken {
        if self.current.is_cancelled() && !self.shutdown.is_cancelled() {
            self.current = self.shutdown.child_token();
        }
        self.current.clone()
    }

    /// Retire the token of the operation that just settled.
    fn settle_token(&mut self) {
        self.current = self.shutdown.child_token();
    }

    fn show(&mut self, result: VisualizationResult) {
        self.result = Some(result.clone());
        self.view = ViewState::Ready(result);
    }

    fn fail(&mut self, error: &SessionError) {
        tracing::warn!(error = %error, "Visualization request failed");
        self.view = ViewState::Error {
            message: error.user_message(),
            retry_count: self.retry_count,
        };
    }
}

/// Run `fut` unless `token` is cancelled first.
async fn cancellable<F: std::future::Future>(
    token: &CancellationToken,
    fut: F,
) -> Result<F::Output, SessionError> {
    tokio::select! {
        biased;
        () = token.cancelled() => Err(SessionError::Cancelled),
        output = fut => Ok(output),
    }
}
