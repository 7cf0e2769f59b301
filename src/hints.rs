//! Heartbeat membership hints sent to peers during scale-down.

use crate::config::{ClusterConfig, HeartbeatConfig};
use crate::connection::ConnectionFactory;
use crate::error::Result;
use crate::info::InfoClient;
use crate::observability;
use crate::types::ClusterMember;
use std::sync::Arc;
use tracing::debug;

/// Issues tip, tip-clear and alumni-reset calls against one member.
///
/// One call goes out per configured heartbeat channel, TLS first. A channel
/// that is not configured is skipped. Errors are returned as-is.
pub struct HintController {
    client: Arc<dyn InfoClient>,
    factory: ConnectionFactory,
    heartbeat: HeartbeatConfig,
    cluster: ClusterConfig,
}

impl HintController {
    pub fn new(
        client: Arc<dyn InfoClient>,
        factory: ConnectionFactory,
        heartbeat: HeartbeatConfig,
        cluster: ClusterConfig,
    ) -> Self {
        Self {
            client,
            factory,
            heartbeat,
            cluster,
        }
    }

    /// Tell `member` about the heartbeat address of `peer`.
    pub async fn tip_hostname(&self, member: &ClusterMember, peer: &str) -> Result<()> {
        let conn = self.factory.connection_for(member)?;
        let host = self.cluster.fqdn_for(peer);

        for port in self.heartbeat.ports() {
            debug!(member = %member.name, peer = %host, port, "Sending tip");
            self.client.tip_hostname(&conn, &host, port).await?;
            observability::record_hint("tip");
        }
        Ok(())
    }

    /// Make `member` forget the heartbeat address of `peer`.
    pub async fn tip_clear_hostname(&self, member: &ClusterMember, peer: &str) -> Result<()> {
        let conn = self.factory.connection_for(member)?;
        let host = self.cluster.fqdn_for(peer);

        for port in self.heartbeat.ports() {
            debug!(member = %member.name, peer = %host, port, "Sending tip-clear");
            self.client.tip_clear_hostname(&conn, &host, port).await?;
            observability::record_hint("tip_clear");
        }
        Ok(())
    }

    /// Reset the alumni list of `member`.
    pub async fn alumni_reset(&self, member: &ClusterMember) -> Result<()> {
        let conn = self.factory.connection_for(member)?;
        debug!(member = %member.name, "Resetting alumni");
        self.client.alumni_reset(&conn).await?;
        observability::record_hint("alumni_reset");
        Ok(())
    }
}
