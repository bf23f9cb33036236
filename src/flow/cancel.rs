//! Run-level cancellation and deadlines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::FlowError;

use super::router::SkipReason;

/// Shared flag for stopping a run between stages.
///
/// Clones observe the same flag, so a handle can be moved to another thread
/// or into a signal handler while the orchestrator keeps its own.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next stage starts.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Why a run stopped advancing before its last stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    Cancelled,
    DeadlineExceeded,
}

impl HaltReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            HaltReason::Cancelled => "cancelled",
            HaltReason::DeadlineExceeded => "deadline_exceeded",
        }
    }

    /// Skip reason recorded for stages that never got to run.
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            HaltReason::Cancelled => SkipReason::Cancelled,
            HaltReason::DeadlineExceeded => SkipReason::DeadlineExceeded,
        }
    }

    pub fn into_error(self) -> FlowError {
        match self {
            HaltReason::Cancelled => FlowError::Cancelled,
            HaltReason::DeadlineExceeded => FlowError::DeadlineExceeded,
        }
    }
}

/// Options for one orchestrator run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Emit per-stage trace events (starting, finished, skipped).
    pub verbose: bool,

    /// Overall time budget, checked between stages.
    pub deadline: Option<Duration>,

    /// External cancellation signal, checked between stages.
    pub cancel: CancellationToken,
}

impl RunOptions {
    /// Check whether the run must stop, given the time spent so far.
    pub fn halt_reason(&self, elapsed: Duration) -> Option<HaltReason> {
        if self.cancel.is_cancelled() {
            return Some(HaltReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if elapsed >= deadline => Some(HaltReason::DeadlineExceeded),
            _ => None,
        }
    }
}
