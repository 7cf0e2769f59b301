//! Common test utilities for integration tests.

pub mod cluster_sim;

pub use cluster_sim::*;

use safestop::config::{SafeStopConfig, StabilityConfig};
use safestop::SafeStopCoordinator;
use std::sync::Arc;

/// Configuration used by the integration tests: development preset with
/// the production stability budget.
pub fn test_config() -> SafeStopConfig {
    let mut config = SafeStopConfig::development();
    config.stability = StabilityConfig::default();
    config
}

/// Coordinator wired to a simulated cluster.
pub fn coordinator_for(cluster: &Arc<SimulatedCluster>) -> SafeStopCoordinator {
    coordinator_with(cluster, test_config())
}

pub fn coordinator_with(cluster: &Arc<SimulatedCluster>, config: SafeStopConfig) -> SafeStopCoordinator {
    SafeStopCoordinator::new(config, cluster.clone(), cluster.clone())
}

/// Owned ignorable-member list.
pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
