//! Kubernetes-backed member listing.

use super::MemberLister;
use crate::config::ClusterConfig;
use crate::error::Result;
use crate::types::ClusterMember;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use tracing::debug;

/// Lists cluster members as the pods matching the cluster's label selector.
pub struct PodLister {
    api: Api<Pod>,
    selector: String,
}

impl PodLister {
    pub fn new(client: Client, cluster: &ClusterConfig) -> Self {
        Self {
            api: Api::namespaced(client, &cluster.namespace),
            selector: cluster.selector(),
        }
    }
}

#[async_trait]
impl MemberLister for PodLister {
    async fn list_members(&self) -> Result<Vec<ClusterMember>> {
        let lp = ListParams::default().labels(&self.selector);
        let mut pods = self.api.list(&lp).await?.items;
        pods.sort_by_key(|pod| pod.name_any());

        debug!(selector = %self.selector, count = pods.len(), "Listed member pods");
        Ok(pods.iter().map(ClusterMember::from_pod).collect())
    }
}
