//! Cluster topology snapshots.
//!
//! Turns the member list reported by the orchestration platform into the
//! set of connections a drain decision works against:
//! - terminating members are skipped
//! - not-ready members are skipped only when listed as ignorable
//! - any other not-ready member fails the snapshot

mod pods;

pub use pods::PodLister;

use crate::connection::ConnectionFactory;
use crate::error::{Result, SafeStopError};
use crate::types::{ClusterMember, MemberConnection};
use async_trait::async_trait;
use tracing::{debug, info};

/// Source of current cluster members.
#[async_trait]
pub trait MemberLister: Send + Sync {
    /// Members of the cluster, in a stable order.
    async fn list_members(&self) -> Result<Vec<ClusterMember>>;
}

/// Builds member connection sets from a [`MemberLister`].
pub struct TopologyProber<'a> {
    lister: &'a dyn MemberLister,
    factory: &'a ConnectionFactory,
}

impl<'a> TopologyProber<'a> {
    pub fn new(lister: &'a dyn MemberLister, factory: &'a ConnectionFactory) -> Self {
        Self { lister, factory }
    }

    /// Connections to every eligible member.
    ///
    /// `ignorable` names failed or pending members that are about to be
    /// deleted and may be left out of the snapshot.
    pub async fn new_all_member_connections(
        &self,
        ignorable: &[String],
    ) -> Result<Vec<MemberConnection>> {
        let members = self.lister.list_members().await?;
        eligible_connections(&members, ignorable, self.factory)
    }
}

/// Connection set for `members`, applying the skip and readiness rules.
pub fn eligible_connections(
    members: &[ClusterMember],
    ignorable: &[String],
    factory: &ConnectionFactory,
) -> Result<Vec<MemberConnection>> {
    let mut conns = Vec::with_capacity(members.len());

    for member in members {
        if member.is_terminating() {
            debug!(member = %member.name, "Skipping terminating member");
            continue;
        }

        if !member.is_ready() {
            if ignorable.iter().any(|name| name == &member.name) {
                info!(member = %member.name, "Ignoring info calls on non-running member");
                continue;
            }
            return Err(SafeStopError::NotReady {
                member: member.name.clone(),
            });
        }

        conns.push(factory.connection_for(member)?);
    }

    if conns.is_empty() {
        return Err(SafeStopError::EmptyTopology);
    }

    Ok(conns)
}
