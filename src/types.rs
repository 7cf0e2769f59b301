//! Core data model shared by every drain component.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Readiness of a cluster member as seen by the orchestration platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberState {
    /// Running and passing readiness checks.
    Ready,
    /// Present but not (yet) serving.
    NotReady,
    /// Being deleted.
    Terminating,
}

/// A member of the data-store cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Member (pod) name.
    pub name: String,
    /// Network address, when one has been assigned.
    pub address: Option<String>,
    /// Current readiness state.
    pub state: MemberState,
}

impl ClusterMember {
    pub fn new(name: impl Into<String>, address: impl Into<String>, state: MemberState) -> Self {
        Self {
            name: name.into(),
            address: Some(address.into()),
            state,
        }
    }

    /// Build a member from a pod object.
    ///
    /// A pod with a deletion timestamp is terminating. A pod is ready only
    /// when it is in the `Running` phase and every container reports ready.
    pub fn from_pod(pod: &Pod) -> Self {
        let state = if pod.metadata.deletion_timestamp.is_some() {
            MemberState::Terminating
        } else if is_pod_running_and_ready(pod) {
            MemberState::Ready
        } else {
            MemberState::NotReady
        };

        Self {
            name: pod.name_any(),
            address: pod.status.as_ref().and_then(|s| s.pod_ip.clone()),
            state,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == MemberState::Ready
    }

    pub fn is_terminating(&self) -> bool {
        self.state == MemberState::Terminating
    }
}

fn is_pod_running_and_ready(pod: &Pod) -> bool {
    let Some(status) = pod.status.as_ref() else {
        return false;
    };

    if status.phase.as_deref() != Some("Running") {
        return false;
    }

    match status.container_statuses.as_ref() {
        Some(containers) if !containers.is_empty() => containers.iter().all(|c| c.ready),
        _ => false,
    }
}

/// Connection descriptor for one member. Building one never opens a socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConnection {
    /// Name of the member this descriptor addresses.
    pub member: String,
    /// Host to connect to.
    pub host: String,
    /// Info service port.
    pub port: u16,
    /// TLS name, when the TLS service port is used.
    pub tls_name: Option<String>,
}

impl MemberConnection {
    /// `host:port` form used in logs and errors.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for MemberConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.member, self.host, self.port)
    }
}

/// Consistency mode of a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyMode {
    /// Strong consistency, roster-aware node removal required.
    Strong,
    /// Availability mode, tolerates node loss.
    Available,
}

/// A namespace as seen during one drain decision.
///
/// The roster is not carried here. It is read on demand and only for
/// strong-consistency namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub consistency: ConsistencyMode,
}

impl Namespace {
    pub fn available(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            consistency: ConsistencyMode::Available,
        }
    }

    pub fn strong(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            consistency: ConsistencyMode::Strong,
        }
    }

    pub fn is_strong_consistency(&self) -> bool {
        self.consistency == ConsistencyMode::Strong
    }
}

/// Migration and cluster-view statistics reported by one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub cluster_key: String,
    pub cluster_size: usize,
    pub migrate_partitions_remaining: u64,
}

/// Result of one stability poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityResult {
    pub stable: bool,
    pub observed_at: DateTime<Utc>,
}

/// What to do with one member about to be stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainPlan {
    /// Member being drained.
    pub target: String,
    /// Namespace to quiesce through. `None` means no quiesce is required.
    pub scope: Option<Namespace>,
}

impl DrainPlan {
    pub fn requires_quiesce(&self) -> bool {
        self.scope.is_some()
    }
}
