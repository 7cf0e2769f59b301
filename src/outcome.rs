//! Result contract returned to the reconciliation scheduler.

use crate::error::{Result, SafeStopError};
use kube::runtime::controller::Action;
use std::time::Duration;

/// Outcome of one drain attempt.
///
/// Every call site has to pick one of the three variants. A stability
/// timeout is a `RequeueAfter`, never an `Error`.
#[must_use]
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// The member may be stopped.
    Success,
    /// The attempt failed. The caller decides whether and when to retry.
    Error(SafeStopError),
    /// Not safe yet. Revisit after the given delay.
    RequeueAfter(Duration),
}

impl ReconcileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReconcileOutcome::Success)
    }

    pub fn requeue_after(&self) -> Option<Duration> {
        match self {
            ReconcileOutcome::RequeueAfter(d) => Some(*d),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SafeStopError> {
        match self {
            ReconcileOutcome::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::Success => "success",
            ReconcileOutcome::Error(_) => "error",
            ReconcileOutcome::RequeueAfter(_) => "requeue",
        }
    }

    /// Convert into a result. `Ok(None)` is success and `Ok(Some(d))` asks for a requeue.
    pub fn into_result(self) -> Result<Option<Duration>> {
        match self {
            ReconcileOutcome::Success => Ok(None),
            ReconcileOutcome::Error(e) => Err(e),
            ReconcileOutcome::RequeueAfter(d) => Ok(Some(d)),
        }
    }

    /// Map onto a controller action for a kube-runtime reconciler.
    pub fn into_action(self) -> Result<Action> {
        match self.into_result()? {
            None => Ok(Action::await_change()),
            Some(delay) => Ok(Action::requeue(delay)),
        }
    }
}

impl From<SafeStopError> for ReconcileOutcome {
    fn from(e: SafeStopError) -> Self {
        ReconcileOutcome::Error(e)
    }
}

impl From<Result<()>> for ReconcileOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => ReconcileOutcome::Success,
            Err(e) => ReconcileOutcome::Error(e),
        }
    }
}
