//! Configuration module for the safe-stop coordinator.

use crate::error::{Result, SafeStopError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for the coordinator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafeStopConfig {
    /// The data-store cluster being managed.
    pub cluster: ClusterConfig,
    /// Info service ports.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Heartbeat channels used for membership hints.
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    /// Stability polling budget.
    #[serde(default)]
    pub stability: StabilityConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl SafeStopConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.cluster.name.is_empty() {
            return Err(SafeStopError::InvalidConfig {
                field: "cluster.name".to_string(),
                reason: "Cluster name must be set".to_string(),
            });
        }

        if self.service.effective_port().is_none() {
            return Err(SafeStopError::InvalidConfig {
                field: "service.port".to_string(),
                reason: "No usable info service port".to_string(),
            });
        }

        if self.stability.max_retry == 0 {
            return Err(SafeStopError::InvalidConfig {
                field: "stability.max_retry".to_string(),
                reason: "At least one stability poll is required".to_string(),
            });
        }

        Ok(())
    }

    /// Create a minimal development configuration.
    pub fn development() -> Self {
        Self {
            cluster: ClusterConfig {
                name: "aerocluster".to_string(),
                namespace: "default".to_string(),
                label_selector: None,
            },
            service: ServiceConfig::default(),
            heartbeat: HeartbeatConfig {
                port: Some(3002),
                tls_port: None,
            },
            stability: StabilityConfig {
                max_retry: 3,
                retry_interval: Duration::from_secs(1),
                requeue_after: Duration::from_secs(10),
            },
            observability: ObservabilityConfig {
                log_level: "debug".to_string(),
                json_logs: false,
            },
        }
    }
}

/// Identity of the managed cluster object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Name of the cluster custom resource.
    pub name: String,
    /// Kubernetes namespace the cluster runs in.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Label selector for member pods. Derived from `name` when unset.
    #[serde(default)]
    pub label_selector: Option<String>,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            namespace: default_namespace(),
            label_selector: None,
        }
    }
}

impl ClusterConfig {
    /// Label selector used to list member pods.
    pub fn selector(&self) -> String {
        self.label_selector
            .clone()
            .unwrap_or_else(|| format!("app.kubernetes.io/instance={}", self.name))
    }

    /// Fully qualified DNS name of a member pod.
    pub fn fqdn_for(&self, pod_name: &str) -> String {
        format!(
            "{}.{}.{}.svc.cluster.local",
            pod_name, self.name, self.namespace
        )
    }
}

/// Info service ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Plain-text service port.
    pub port: Option<u16>,
    /// TLS service port.
    #[serde(default)]
    pub tls_port: Option<u16>,
    /// TLS name presented by the members.
    #[serde(default)]
    pub tls_name: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: Some(3000),
            tls_port: None,
            tls_name: None,
        }
    }
}

impl ServiceConfig {
    /// TLS endpoint, only when both a name and a port are configured.
    pub fn tls_endpoint(&self) -> Option<(&str, u16)> {
        match (self.tls_name.as_deref(), self.tls_port) {
            (Some(name), Some(port)) if !name.is_empty() => Some((name, port)),
            _ => None,
        }
    }

    /// Port used for info calls.
    pub fn effective_port(&self) -> Option<u16> {
        self.tls_endpoint().map(|(_, port)| port).or(self.port)
    }
}

/// Heartbeat channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Plain heartbeat port.
    pub port: Option<u16>,
    /// TLS heartbeat port.
    #[serde(default)]
    pub tls_port: Option<u16>,
}

impl HeartbeatConfig {
    /// Configured heartbeat ports, TLS first.
    pub fn ports(&self) -> Vec<u16> {
        self.tls_port.into_iter().chain(self.port).collect()
    }
}

/// Stability polling budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Maximum number of polls before giving up.
    pub max_retry: u32,
    /// Wait before each poll.
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,
    /// Requeue delay reported when the budget is exhausted.
    #[serde(with = "humantime_serde")]
    pub requeue_after: Duration,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            max_retry: 12,
            retry_interval: Duration::from_secs(10),
            requeue_after: Duration::from_secs(60),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
