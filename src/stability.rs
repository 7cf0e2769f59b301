//! Cluster stability polling.
//!
//! Before a member is quiesced the whole cluster must agree on one view
//! and have no partition migrations outstanding. The monitor polls for
//! that with a bounded budget; running out of budget is reported as a
//! requeue, never as an error.

use crate::config::StabilityConfig;
use crate::error::{Result, SafeStopError};
use crate::info::InfoClient;
use crate::observability;
use crate::outcome::ReconcileOutcome;
use crate::shutdown::ShutdownCoordinator;
use crate::types::{ClusterStats, MemberConnection, StabilityResult};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Proof that the cluster was observed stable during the current attempt.
///
/// Only the monitor can create one. The quiesce executor requires it.
#[derive(Debug, Clone)]
pub struct ClusterStable {
    result: StabilityResult,
    attempts: u32,
}

impl ClusterStable {
    pub fn result(&self) -> &StabilityResult {
        &self.result
    }

    /// Poll on which stability was observed (1-based).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Result of waiting for stability.
#[derive(Debug)]
pub enum StabilityWait {
    /// Cluster settled within the budget.
    Stable(ClusterStable),
    /// Budget exhausted without observing stability.
    Unsettled {
        attempts: u32,
        requeue_after: Duration,
    },
}

impl StabilityWait {
    /// Outcome to report when the wait is the last step.
    pub fn into_outcome(self) -> ReconcileOutcome {
        match self {
            StabilityWait::Stable(_) => ReconcileOutcome::Success,
            StabilityWait::Unsettled { requeue_after, .. } => {
                ReconcileOutcome::RequeueAfter(requeue_after)
            }
        }
    }
}

/// Polls member connections for migration quiescence.
#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    config: StabilityConfig,
}

impl StabilityMonitor {
    pub fn new(config: StabilityConfig) -> Self {
        Self { config }
    }

    /// Wait until every connection reports a settled cluster.
    ///
    /// Each attempt first waits `retry_interval`, then polls. Polling stops
    /// on the first stable observation. A query error or a cancellation ends
    /// the wait immediately with an error.
    pub async fn wait_for_stability(
        &self,
        client: &dyn InfoClient,
        conns: &[MemberConnection],
        shutdown: &ShutdownCoordinator,
    ) -> Result<StabilityWait> {
        for attempt in 1..=self.config.max_retry {
            debug!(attempt, max_retry = self.config.max_retry, "Waiting for migrations to be zero");

            if !shutdown.sleep(self.config.retry_interval).await {
                warn!(attempt, "Stability wait cancelled");
                return Err(SafeStopError::Cancelled);
            }

            let result = check_cluster_stability(client, conns).await?;
            observability::record_stability_poll(result.stable);

            if result.stable {
                info!(attempt, "Cluster is stable");
                return Ok(StabilityWait::Stable(ClusterStable {
                    result,
                    attempts: attempt,
                }));
            }
        }

        warn!(
            attempts = self.config.max_retry,
            requeue_after_secs = self.config.requeue_after.as_secs(),
            "Cluster did not settle, requeueing"
        );
        Ok(StabilityWait::Unsettled {
            attempts: self.config.max_retry,
            requeue_after: self.config.requeue_after,
        })
    }
}

/// Poll every connection once and decide whether the cluster is stable.
///
/// Members are queried sequentially and all responses are collected
/// before deciding.
pub async fn check_cluster_stability(
    client: &dyn InfoClient,
    conns: &[MemberConnection],
) -> Result<StabilityResult> {
    let mut stats = Vec::with_capacity(conns.len());
    for conn in conns {
        stats.push(client.cluster_stats(conn).await?);
    }

    Ok(StabilityResult {
        stable: is_cluster_stable(&stats),
        observed_at: Utc::now(),
    })
}

/// A cluster is stable when every member reports the same cluster key and
/// size and no member has partition migrations remaining.
pub fn is_cluster_stable(stats: &[ClusterStats]) -> bool {
    let Some(first) = stats.first() else {
        return false;
    };

    stats.iter().all(|s| {
        s.cluster_key == first.cluster_key
            && s.cluster_size == first.cluster_size
            && s.migrate_partitions_remaining == 0
    })
}
