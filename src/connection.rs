//! Connection descriptors for cluster members.

use crate::config::ServiceConfig;
use crate::error::{Result, SafeStopError};
use crate::types::{ClusterMember, MemberConnection};

/// Builds [`MemberConnection`] descriptors without opening sockets.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    service: ServiceConfig,
}

impl ConnectionFactory {
    pub fn new(service: ServiceConfig) -> Self {
        Self { service }
    }

    /// Descriptor for `member`, using the TLS service endpoint when one is configured.
    pub fn connection_for(&self, member: &ClusterMember) -> Result<MemberConnection> {
        let host = member
            .address
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                SafeStopError::Connection(format!("member {} has no address", member.name))
            })?;

        let (port, tls_name) = match self.service.tls_endpoint() {
            Some((name, port)) => (port, Some(name.to_string())),
            None => {
                let port = self.service.port.ok_or_else(|| {
                    SafeStopError::Config("no info service port configured".to_string())
                })?;
                (port, None)
            }
        };

        Ok(MemberConnection {
            member: member.name.clone(),
            host: host.to_string(),
            port,
            tls_name,
        })
    }
}
