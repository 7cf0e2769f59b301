// Cluster simulation for integration tests
// Plays both the member lister and the info protocol of a data-store
// cluster, and records every call made against it.

use async_trait::async_trait;
use safestop::error::{Result, SafeStopError};
use safestop::info::InfoClient;
use safestop::topology::MemberLister;
use safestop::types::{ClusterMember, ClusterStats, MemberConnection, MemberState};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// A recorded call against the simulated cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListMembers,
    Namespaces(String),
    StrongConsistency(String, String),
    Roster(String, String),
    NodeId(String),
    ClusterStats(String),
    Quiesce {
        target: String,
        namespace: String,
        all: Vec<String>,
    },
    Tip(String, String, u16),
    TipClear(String, String, u16),
    AlumniReset(String),
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Namespaces,
    StrongConsistency,
    Roster,
    ClusterStats,
    Quiesce,
    Tip,
    TipClear,
    AlumniReset,
}

/// Namespace as stored by the simulation.
#[derive(Debug, Clone)]
struct SimNamespace {
    name: String,
    strong: bool,
    roster: BTreeSet<String>,
}

struct SimState {
    members: Vec<ClusterMember>,
    namespaces: Vec<SimNamespace>,
    /// Namespaces whose queries fail.
    broken_namespaces: HashSet<String>,
    /// Polls reporting pending migrations before the cluster settles. `None` never settles.
    unsettled_polls: Option<u32>,
    polls: u32,
    poll_times: Vec<Instant>,
    failures: HashSet<Op>,
    calls: Vec<Call>,
}

/// Simulated cluster. Node ids are the member names.
pub struct SimulatedCluster {
    state: Mutex<SimState>,
}

impl SimulatedCluster {
    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check(&self, op: Op, conn: &MemberConnection) -> Result<()> {
        if self.state.lock().unwrap().failures.contains(&op) {
            return Err(SafeStopError::info_query(
                conn.endpoint(),
                format!("{:?}", op),
                "injected failure",
            ));
        }
        Ok(())
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failures.insert(op);
    }

    /// Make every query against `namespace` fail.
    pub fn fail_namespace(&self, namespace: &str) {
        self.state
            .lock()
            .unwrap()
            .broken_namespaces
            .insert(namespace.to_string());
    }

    pub fn heal(&self, op: Op) {
        self.state.lock().unwrap().failures.remove(&op);
    }

    pub fn set_state(&self, name: &str, state: MemberState) {
        let mut s = self.state.lock().unwrap();
        if let Some(m) = s.members.iter_mut().find(|m| m.name == name) {
            m.state = state;
        }
    }

    pub fn member(&self, name: &str) -> ClusterMember {
        self.state
            .lock()
            .unwrap()
            .members
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .expect("unknown member")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Number of stability polls (rounds over all members) seen so far.
    pub fn polls(&self) -> u32 {
        self.state.lock().unwrap().polls
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.state.lock().unwrap().poll_times.clone()
    }

    pub fn quiesce_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Quiesce { .. }))
            .collect()
    }

    /// Calls that mention `namespace`.
    pub fn namespace_calls(&self, namespace: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| match c {
                Call::StrongConsistency(_, ns) | Call::Roster(_, ns) => ns == namespace,
                Call::Quiesce { namespace: ns, .. } => ns == namespace,
                _ => false,
            })
            .collect()
    }

    fn lookup(&self, conn: &MemberConnection, namespace: &str) -> Result<SimNamespace> {
        let state = self.state.lock().unwrap();
        if state.broken_namespaces.contains(namespace) {
            return Err(SafeStopError::info_query(
                conn.endpoint(),
                format!("namespace/{}", namespace),
                "timeout",
            ));
        }
        state
            .namespaces
            .iter()
            .find(|n| n.name == namespace)
            .cloned()
            .ok_or_else(|| SafeStopError::info_query(conn.endpoint(), "namespace", "unknown"))
    }

    fn first_live_member(state: &SimState) -> Option<String> {
        state
            .members
            .iter()
            .find(|m| m.state == MemberState::Ready)
            .map(|m| m.name.clone())
    }
}

#[async_trait]
impl MemberLister for SimulatedCluster {
    async fn list_members(&self) -> Result<Vec<ClusterMember>> {
        self.record(Call::ListMembers);
        Ok(self.state.lock().unwrap().members.clone())
    }
}

#[async_trait]
impl InfoClient for SimulatedCluster {
    async fn namespaces(&self, conn: &MemberConnection) -> Result<Vec<String>> {
        self.record(Call::Namespaces(conn.member.clone()));
        self.check(Op::Namespaces, conn)?;
        let state = self.state.lock().unwrap();
        Ok(state.namespaces.iter().map(|n| n.name.clone()).collect())
    }

    async fn is_strong_consistency(
        &self,
        conn: &MemberConnection,
        namespace: &str,
    ) -> Result<bool> {
        self.record(Call::StrongConsistency(conn.member.clone(), namespace.to_string()));
        self.check(Op::StrongConsistency, conn)?;
        Ok(self.lookup(conn, namespace)?.strong)
    }

    async fn roster(&self, conn: &MemberConnection, namespace: &str) -> Result<BTreeSet<String>> {
        self.record(Call::Roster(conn.member.clone(), namespace.to_string()));
        self.check(Op::Roster, conn)?;
        Ok(self.lookup(conn, namespace)?.roster)
    }

    async fn node_id(&self, conn: &MemberConnection) -> Result<String> {
        self.record(Call::NodeId(conn.member.clone()));
        Ok(conn.member.clone())
    }

    async fn cluster_stats(&self, conn: &MemberConnection) -> Result<ClusterStats> {
        self.record(Call::ClusterStats(conn.member.clone()));
        self.check(Op::ClusterStats, conn)?;

        let mut state = self.state.lock().unwrap();
        if Self::first_live_member(&state).as_deref() == Some(conn.member.as_str()) {
            state.polls += 1;
            state.poll_times.push(Instant::now());
        }

        let settled = match state.unsettled_polls {
            Some(n) => state.polls > n,
            None => false,
        };
        let live = state
            .members
            .iter()
            .filter(|m| m.state == MemberState::Ready)
            .count();

        Ok(ClusterStats {
            cluster_key: "A1B2C3D4E5F6".to_string(),
            cluster_size: live,
            migrate_partitions_remaining: if settled { 0 } else { 42 },
        })
    }

    async fn quiesce(
        &self,
        all: &[MemberConnection],
        target: &MemberConnection,
        namespace: &str,
    ) -> Result<()> {
        self.record(Call::Quiesce {
            target: target.member.clone(),
            namespace: namespace.to_string(),
            all: all.iter().map(|c| c.member.clone()).collect(),
        });
        self.check(Op::Quiesce, target)
    }

    async fn tip_hostname(&self, conn: &MemberConnection, host: &str, port: u16) -> Result<()> {
        self.record(Call::Tip(conn.member.clone(), host.to_string(), port));
        self.check(Op::Tip, conn)
    }

    async fn tip_clear_hostname(
        &self,
        conn: &MemberConnection,
        host: &str,
        port: u16,
    ) -> Result<()> {
        self.record(Call::TipClear(conn.member.clone(), host.to_string(), port));
        self.check(Op::TipClear, conn)
    }

    async fn alumni_reset(&self, conn: &MemberConnection) -> Result<()> {
        self.record(Call::AlumniReset(conn.member.clone()));
        self.check(Op::AlumniReset, conn)
    }
}

/// Builder for simulated clusters.
pub struct ClusterBuilder {
    members: Vec<ClusterMember>,
    namespaces: Vec<SimNamespace>,
    unsettled_polls: Option<u32>,
}

impl ClusterBuilder {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            namespaces: Vec::new(),
            unsettled_polls: Some(0),
        }
    }

    pub fn member(mut self, name: &str, state: MemberState) -> Self {
        let address = format!("10.0.0.{}", self.members.len() + 10);
        self.members.push(ClusterMember::new(name, address, state));
        self
    }

    /// Add ready members with the given names.
    pub fn ready(mut self, names: &[&str]) -> Self {
        for name in names {
            self = self.member(name, MemberState::Ready);
        }
        self
    }

    /// Add an available-mode namespace.
    pub fn available(mut self, name: &str) -> Self {
        self.namespaces.push(SimNamespace {
            name: name.to_string(),
            strong: false,
            roster: BTreeSet::new(),
        });
        self
    }

    /// Add a strong-consistency namespace with the given roster.
    pub fn strong(mut self, name: &str, roster: &[&str]) -> Self {
        self.namespaces.push(SimNamespace {
            name: name.to_string(),
            strong: true,
            roster: roster.iter().map(|id| id.to_string()).collect(),
        });
        self
    }

    /// Report pending migrations on the first `polls` polls.
    pub fn unsettled_for(mut self, polls: u32) -> Self {
        self.unsettled_polls = Some(polls);
        self
    }

    /// Never settle.
    pub fn never_settles(mut self) -> Self {
        self.unsettled_polls = None;
        self
    }

    pub fn build(self) -> Arc<SimulatedCluster> {
        Arc::new(SimulatedCluster {
            state: Mutex::new(SimState {
                members: self.members,
                namespaces: self.namespaces,
                broken_namespaces: HashSet::new(),
                unsettled_polls: self.unsettled_polls,
                polls: 0,
                poll_times: Vec::new(),
                failures: HashSet::new(),
                calls: Vec::new(),
            }),
        })
    }
}

impl Default for ClusterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
