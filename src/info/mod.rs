//! Info-protocol capability consumed by the drain components.
//!
//! The coordinator never talks to the wire itself. It depends on
//! [`InfoClient`], a typed view of the handful of info commands a drain
//! needs. [`InfoCommands`] provides that view on top of any raw
//! [`InfoTransport`], so a transport only has to move one command string
//! and one response string per call.

mod commands;
mod parse;

pub use commands::{InfoCommands, InfoTransport};
pub use parse::{parse_info_map, parse_roster};

use crate::error::Result;
use crate::types::{ClusterStats, MemberConnection};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Typed info operations against cluster members.
#[async_trait]
pub trait InfoClient: Send + Sync {
    /// Namespaces known to the member, in the order the member lists them.
    async fn namespaces(&self, conn: &MemberConnection) -> Result<Vec<String>>;

    /// Whether the namespace runs in strong-consistency mode.
    async fn is_strong_consistency(&self, conn: &MemberConnection, namespace: &str)
        -> Result<bool>;

    /// Roster node ids of a strong-consistency namespace.
    async fn roster(&self, conn: &MemberConnection, namespace: &str) -> Result<BTreeSet<String>>;

    /// Node id the member is known by in rosters.
    async fn node_id(&self, conn: &MemberConnection) -> Result<String>;

    /// Migration and cluster-view statistics of one member.
    async fn cluster_stats(&self, conn: &MemberConnection) -> Result<ClusterStats>;

    /// Quiesce `target` through `namespace`, coordinated over every connection in `all`.
    async fn quiesce(
        &self,
        all: &[MemberConnection],
        target: &MemberConnection,
        namespace: &str,
    ) -> Result<()>;

    /// Add a heartbeat peer hint to the member.
    async fn tip_hostname(&self, conn: &MemberConnection, host: &str, port: u16) -> Result<()>;

    /// Remove a heartbeat peer hint from the member.
    async fn tip_clear_hostname(
        &self,
        conn: &MemberConnection,
        host: &str,
        port: u16,
    ) -> Result<()>;

    /// Reset the member's alumni list.
    async fn alumni_reset(&self, conn: &MemberConnection) -> Result<()>;
}
