//! Namespace classification and drain-scope selection.
//!
//! A member is only quiesced through a namespace where that is safe:
//! an available-mode namespace always qualifies, a strong-consistency
//! namespace only when the member is in its roster. The first qualifying
//! namespace in listing order wins and later namespaces are never queried.

use crate::error::Result;
use crate::info::InfoClient;
use crate::types::{MemberConnection, Namespace};
use tracing::info;

/// Reads namespace state through a single member connection.
///
/// All queries of one decision go through the same connection so the
/// decision works on one member's view of the cluster.
pub struct NamespaceClassifier<'a> {
    client: &'a dyn InfoClient,
    conn: &'a MemberConnection,
}

impl<'a> NamespaceClassifier<'a> {
    pub fn new(client: &'a dyn InfoClient, conn: &'a MemberConnection) -> Self {
        Self { client, conn }
    }

    pub async fn list_namespaces(&self) -> Result<Vec<String>> {
        self.client.namespaces(self.conn).await
    }

    pub async fn is_strong_consistency(&self, namespace: &str) -> Result<bool> {
        self.client.is_strong_consistency(self.conn, namespace).await
    }

    pub async fn is_in_roster(&self, namespace: &str, node_id: &str) -> Result<bool> {
        Ok(self.client.roster(self.conn, namespace).await?.contains(node_id))
    }

    /// Node id of the member behind the classifier's connection.
    pub async fn node_id(&self) -> Result<String> {
        self.client.node_id(self.conn).await
    }

    /// Pick the namespace to quiesce `node_id` through, if any.
    ///
    /// Namespaces are evaluated in listing order. The roster is only read
    /// for strong-consistency namespaces, and evaluation stops at the first
    /// namespace that qualifies.
    pub async fn select_drain_scope(&self, node_id: &str) -> Result<Option<Namespace>> {
        for name in self.list_namespaces().await? {
            if !self.is_strong_consistency(&name).await? {
                info!(namespace = %name, "Namespace is not strong-consistency, quiescing through it");
                return Ok(Some(Namespace::available(name)));
            }

            if self.is_in_roster(&name, node_id).await? {
                info!(
                    namespace = %name,
                    node = node_id,
                    "Namespace is strong-consistency and node is in roster, quiescing through it"
                );
                return Ok(Some(Namespace::strong(name)));
            }

            info!(namespace = %name, node = node_id, "Node is not in roster for namespace");
        }

        Ok(None)
    }
}
