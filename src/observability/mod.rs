//! Observability module for the safe-stop coordinator.
//!
//! Provides logging initialisation and metric recording. Metrics go through
//! the `metrics` facade; installing a recorder is up to the embedding process.

use crate::config::ObservabilityConfig;
use crate::error::{Result, SafeStopError};
use metrics::counter;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| SafeStopError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| SafeStopError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!("Observability initialized");
    Ok(())
}

/// Record the outcome of a drain decision.
pub fn record_drain_outcome(outcome: &'static str) {
    counter!("safestop_drain_decisions_total", "outcome" => outcome).increment(1);
}

/// Record a drain attempt that needed no quiesce.
pub fn record_quiesce_skipped() {
    counter!("safestop_quiesce_skipped_total").increment(1);
}

/// Record one stability poll.
pub fn record_stability_poll(stable: bool) {
    let result = if stable { "stable" } else { "unsettled" };
    counter!("safestop_stability_polls_total", "result" => result).increment(1);
}

/// Record an issued quiesce command.
pub fn record_quiesce(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("safestop_quiesce_total", "result" => result).increment(1);
}

/// Record a membership hint call.
pub fn record_hint(kind: &'static str) {
    counter!("safestop_membership_hints_total", "kind" => kind).increment(1);
}
