//! Async driver for the job-poll state machine.
//!
//! [`run_job`] submits a single-plot job and then asks the backend for
//! its status on a fixed interval until the job finishes, the deadline
//! passes or the [`CancellationToken`] is triggered. Every fetched status
//! is published on a [`watch`] channel so a renderer can show progress.

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use clearsky_core::error::CoreError;
use clearsky_core::job::JobStatus;
use clearsky_core::plot::PlotType;
use clearsky_core::poll::{PollConfig, PollMachine, PollState};
use clearsky_core::request::ParallelJobRequest;
use clearsky_harmony::VisualizationBackend;

/// Latest status of the job being polled, `None` before the first one.
pub type ProgressSender = watch::Sender<Option<JobStatus>>;

/// Submit `request` and poll until the job reaches a terminal state.
///
/// Always returns a terminal [`PollState`]. A status request that fails
/// is logged and retried on the next tick; only a `failed` status, a
/// rejected submission, the deadline or cancellation end the job early.
pub async fn run_job<B>(
    backend: &B,
    request: &ParallelJobRequest,
    plot: PlotType,
    config: &PollConfig,
    cancel: &CancellationToken,
    progress: &ProgressSender,
) -> PollState
where
    B: VisualizationBackend + ?Sized,
{
    let mut machine = PollMachine::new();
    if let Err(e) = drive(backend, &mut machine, request, plot, config, cancel, progress).await {
        tracing::error!(error = %e, plot = %plot, "Job poller stopped on an illegal transition");
        return PollState::Failed {
            message: e.user_message(),
        };
    }
    machine.into_state()
}

async fn drive<B>(
    backend: &B,
    machine: &mut PollMachine,
    request: &ParallelJobRequest,
    plot: PlotType,
    config: &PollConfig,
    cancel: &CancellationToken,
    progress: &ProgressSender,
) -> Result<(), CoreError>
where
    B: VisualizationBackend + ?Sized,
{
    machine.submit(plot)?;

    let submitted = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::info!(plot = %plot, "Job submission cancelled");
            machine.cancel();
            return Ok(());
        }
        result = backend.start_job(request) => result,
    };

    let handle = match submitted {
        Ok(response) => match response.into_handle() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(plot = %plot, error = %e, "Job rejected by backend");
                return machine.reject(e.user_message());
            }
        },
        Err(e) => {
            tracing::warn!(plot = %plot, error = %e, "Failed to submit job");
            return machine.reject(e.to_string());
        }
    };

    tracing::info!(job_id = %handle.job_id, plot = %plot, "Job accepted, polling for status");
    machine.accept(handle)?;
    if let Some(seed) = machine.state().status() {
        progress.send_replace(Some(seed.clone()));
    }

    poll(backend, machine, config, cancel, progress).await
}

/// Poll an accepted job until the machine reaches a terminal state.
async fn poll<B>(
    backend: &B,
    machine: &mut PollMachine,
    config: &PollConfig,
    cancel: &CancellationToken,
    progress: &ProgressSender,
) -> Result<(), CoreError>
where
    B: VisualizationBackend + ?Sized,
{
    let job_id = match machine.state() {
        PollState::Polling { handle, .. } => handle.job_id.clone(),
        _ => return Ok(()),
    };

    let started = Instant::now();
    let deadline = async {
        match config.max_duration {
            Some(limit) => tokio::time::sleep_until(started + limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first request goes out
    // one interval after submission.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, "Polling cancelled");
                machine.cancel();
                return Ok(());
            }
            () = &mut deadline => {
                let elapsed = started.elapsed();
                tracing::warn!(job_id = %job_id, elapsed_secs = elapsed.as_secs(), "Polling timed out");
                return machine.time_out(elapsed);
            }
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, "Polling cancelled during status request");
                machine.cancel();
                return Ok(());
            }
            () = &mut deadline => {
                let elapsed = started.elapsed();
                tracing::warn!(job_id = %job_id, elapsed_secs = elapsed.as_secs(), "Polling timed out");
                return machine.time_out(elapsed);
            }
            result = backend.poll_status(&job_id) => result,
        };

        match fetched {
            Ok(status) => {
                tracing::debug!(
                    job_id = %job_id,
                    status = ?status.status,
                    progress = status.progress,
                    "Job status",
                );
                progress.send_replace(Some(status.clone()));
                let state = machine.observe(status)?;
                if state.is_terminal() {
                    tracing::info!(job_id = %job_id, state = state.name(), "Job finished");
                    return Ok(());
                }
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Error checking job status");
            }
        }
    }
}
