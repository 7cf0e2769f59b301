//! Namespace-scoped quiesce of one member.

use crate::error::Result;
use crate::info::InfoClient;
use crate::observability;
use crate::stability::ClusterStable;
use crate::types::{MemberConnection, Namespace};
use tracing::{error, info};

/// Issues the quiesce directive once stability has been confirmed.
///
/// Failures are returned untouched and never retried here: repeating a
/// quiesce is only safe after stability has been re-checked, so the whole
/// decision has to run again.
pub struct QuiesceExecutor<'a> {
    client: &'a dyn InfoClient,
}

impl<'a> QuiesceExecutor<'a> {
    pub fn new(client: &'a dyn InfoClient) -> Self {
        Self { client }
    }

    pub async fn quiesce(
        &self,
        all: &[MemberConnection],
        target: &MemberConnection,
        scope: &Namespace,
        stable: &ClusterStable,
    ) -> Result<()> {
        info!(
            member = %target.member,
            namespace = %scope.name,
            stable_since = %stable.result().observed_at,
            members = all.len(),
            "Quiescing member"
        );

        let result = self.client.quiesce(all, target, &scope.name).await;
        observability::record_quiesce(result.is_ok());

        if let Err(e) = &result {
            error!(member = %target.member, namespace = %scope.name, error = %e, "Quiesce failed");
        }
        result
    }
}
