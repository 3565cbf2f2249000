//! Job-poll state machine.
//!
//! ```text
//! Idle -> Submitting -> Polling -> { Completed | Failed | TimedOut | Cancelled }
//!                    \-> Failed
//! ```
//!
//! The machine is pure: the async driver feeds it events (job accepted,
//! status fetched, deadline passed, cancelled) and stops ticking as soon
//! as [`PollState::is_terminal`] reports true.

use std::time::Duration;

use crate::error::CoreError;
use crate::job::{JobHandle, JobState, JobStatus, PlotResult};
use crate::plot::PlotType;

/// Interval between status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Longest a job is polled before giving up.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Tunable polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// `None` polls until a terminal status or cancellation.
    pub max_duration: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_duration: Some(DEFAULT_POLL_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Idle,
    Submitting {
        plot: PlotType,
    },
    Polling {
        handle: JobHandle,
        plot: PlotType,
        status: JobStatus,
        /// Status responses received so far.
        attempts: u32,
    },
    Completed {
        handle: JobHandle,
        plot: PlotType,
        result: PlotResult,
    },
    Failed {
        message: String,
    },
    TimedOut {
        handle: JobHandle,
        elapsed: Duration,
    },
    Cancelled,
}

impl PollState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting { .. } => "submitting",
            Self::Polling { .. } => "polling",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::TimedOut { .. } | Self::Cancelled
        )
    }

    /// The message to surface for an unsuccessful terminal state.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Failed { message } => Some(message.clone()),
            Self::TimedOut { handle, elapsed } => Some(format!(
                "Timed out after {}s waiting for job {}",
                elapsed.as_secs(),
                handle.job_id
            )),
            _ => None,
        }
    }

    /// Latest status while polling.
    pub fn status(&self) -> Option<&JobStatus> {
        match self {
            Self::Polling { status, .. } => Some(status),
            _ => None,
        }
    }
}

/// Owner of a [`PollState`] that enforces legal transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct PollMachine {
    state: PollState,
}

impl Default for PollMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PollMachine {
    pub fn new() -> Self {
        Self {
            state: PollState::Idle,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn into_state(self) -> PollState {
        self.state
    }

    fn invalid(&self, event: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            state: self.state.name(),
            event,
        }
    }

    /// User confirmed a single-plot request. Allowed from idle or after a
    /// previous job finished.
    pub fn submit(&mut self, plot: PlotType) -> Result<(), CoreError> {
        if !matches!(self.state, PollState::Idle) && !self.state.is_terminal() {
            return Err(self.invalid("submit"));
        }
        self.state = PollState::Submitting { plot };
        Ok(())
    }

    /// The backend accepted the job; polling starts from a queued seed.
    pub fn accept(&mut self, handle: JobHandle) -> Result<(), CoreError> {
        let PollState::Submitting { plot } = self.state else {
            return Err(self.invalid("accept"));
        };
        let status = JobStatus::queued(handle.job_id.clone());
        self.state = PollState::Polling {
            handle,
            plot,
            status,
            attempts: 0,
        };
        Ok(())
    }

    /// Submission failed before a job existed.
    pub fn reject(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        if !matches!(self.state, PollState::Submitting { .. }) {
            return Err(self.invalid("reject"));
        }
        self.state = PollState::Failed {
            message: message.into(),
        };
        Ok(())
    }

    /// Apply a freshly fetched status, replacing the local copy in full.
    pub fn observe(&mut self, fetched: JobStatus) -> Result<&PollState, CoreError> {
        let PollState::Polling {
            handle,
            plot,
            attempts,
            ..
        } = &self.state
        else {
            return Err(self.invalid("observe status"));
        };
        let (handle, plot, attempts) = (handle.clone(), *plot, attempts + 1);

        self.state = match fetched.status {
            JobState::Completed => PollState::Completed {
                result: fetched.plot_result(plot).cloned().unwrap_or_default(),
                handle,
                plot,
            },
            JobState::Failed => PollState::Failed {
                message: fetched.failure_message(),
            },
            JobState::Queued | JobState::Processing => PollState::Polling {
                handle,
                plot,
                status: fetched,
                attempts,
            },
        };
        Ok(&self.state)
    }

    /// The poll deadline passed without a terminal status.
    pub fn time_out(&mut self, elapsed: Duration) -> Result<(), CoreError> {
        let PollState::Polling { handle, .. } = &self.state else {
            return Err(self.invalid("time out"));
        };
        self.state = PollState::TimedOut {
            handle: handle.clone(),
            elapsed,
        };
        Ok(())
    }

    /// Stop tracking the job. No-op once terminal.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.state = PollState::Cancelled;
        }
    }
}
