//! Top-level safe-stop entry points.
//!
//! [`SafeStopCoordinator`] carries everything a drain needs as an explicit
//! context: the member lister, the info client, the connection factory,
//! the stability budget and the cancellation signal.

use crate::classifier::NamespaceClassifier;
use crate::config::SafeStopConfig;
use crate::connection::ConnectionFactory;
use crate::error::Result;
use crate::hints::HintController;
use crate::info::InfoClient;
use crate::observability;
use crate::outcome::ReconcileOutcome;
use crate::quiesce::QuiesceExecutor;
use crate::shutdown::ShutdownCoordinator;
use crate::stability::{StabilityMonitor, StabilityWait};
use crate::topology::{MemberLister, TopologyProber};
use crate::types::{ClusterMember, DrainPlan, MemberConnection, Namespace};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Decides whether a member needs draining and drains it.
pub struct SafeStopCoordinator {
    config: SafeStopConfig,
    lister: Arc<dyn MemberLister>,
    client: Arc<dyn InfoClient>,
    factory: ConnectionFactory,
    monitor: StabilityMonitor,
    shutdown: ShutdownCoordinator,
}

impl SafeStopCoordinator {
    pub fn new(
        config: SafeStopConfig,
        lister: Arc<dyn MemberLister>,
        client: Arc<dyn InfoClient>,
    ) -> Self {
        let factory = ConnectionFactory::new(config.service.clone());
        let monitor = StabilityMonitor::new(config.stability.clone());

        Self {
            config,
            lister,
            client,
            factory,
            monitor,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Use an externally owned cancellation signal.
    pub fn with_shutdown(mut self, shutdown: ShutdownCoordinator) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Hint controller sharing this coordinator's client and configuration.
    pub fn hints(&self) -> HintController {
        HintController::new(
            Arc::clone(&self.client),
            self.factory.clone(),
            self.config.heartbeat.clone(),
            self.config.cluster.clone(),
        )
    }

    /// Connections to every eligible member of the cluster.
    pub async fn new_all_member_connections(
        &self,
        ignorable: &[String],
    ) -> Result<Vec<MemberConnection>> {
        TopologyProber::new(self.lister.as_ref(), &self.factory)
            .new_all_member_connections(ignorable)
            .await
    }

    /// Work out through which namespace, if any, `target` must be quiesced.
    pub async fn plan_drain(&self, target: &ClusterMember) -> Result<DrainPlan> {
        let conn = self.factory.connection_for(target)?;
        let classifier = NamespaceClassifier::new(self.client.as_ref(), &conn);

        let node_id = classifier.node_id().await?;
        info!(member = %target.name, node = %node_id, "Selecting drain scope");

        Ok(DrainPlan {
            target: target.name.clone(),
            scope: classifier.select_drain_scope(&node_id).await?,
        })
    }

    /// Wait until `target` is safe to stop, quiescing it when required.
    ///
    /// `ignorable` names not-ready members that are going to be deleted and
    /// may be left out of the stability check.
    pub async fn wait_for_node_safe_stop_ready(
        &self,
        target: &ClusterMember,
        ignorable: &[String],
    ) -> ReconcileOutcome {
        info!(member = %target.name, "Checking whether member needs quiesce");

        let outcome = match self.plan_drain(target).await {
            Ok(DrainPlan {
                scope: Some(scope), ..
            }) => self.stabilize_and_quiesce(target, ignorable, &scope).await,
            Ok(DrainPlan { scope: None, .. }) => {
                info!(
                    member = %target.name,
                    "Quiesce not needed: member is in no roster and has no available-mode namespace"
                );
                observability::record_quiesce_skipped();
                ReconcileOutcome::Success
            }
            Err(e) => ReconcileOutcome::Error(e),
        };

        match &outcome {
            ReconcileOutcome::Success => info!(member = %target.name, "Member is safe to stop"),
            ReconcileOutcome::RequeueAfter(delay) => {
                warn!(member = %target.name, delay_secs = delay.as_secs(), "Member not yet safe to stop")
            }
            ReconcileOutcome::Error(e) => {
                error!(member = %target.name, error = %e, "Safe-stop check failed")
            }
        }
        observability::record_drain_outcome(outcome.label());
        outcome
    }

    async fn stabilize_and_quiesce(
        &self,
        target: &ClusterMember,
        ignorable: &[String],
        scope: &Namespace,
    ) -> ReconcileOutcome {
        let all = match self.new_all_member_connections(ignorable).await {
            Ok(conns) => conns,
            Err(e) => return ReconcileOutcome::Error(e),
        };

        let stable = match self
            .monitor
            .wait_for_stability(self.client.as_ref(), &all, &self.shutdown)
            .await
        {
            Ok(StabilityWait::Stable(stable)) => stable,
            Ok(unsettled) => return unsettled.into_outcome(),
            Err(e) => return ReconcileOutcome::Error(e),
        };

        let target_conn = match self.factory.connection_for(target) {
            Ok(conn) => conn,
            Err(e) => return ReconcileOutcome::Error(e),
        };

        QuiesceExecutor::new(self.client.as_ref())
            .quiesce(&all, &target_conn, scope, &stable)
            .await
            .into()
    }
}
