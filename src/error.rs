//! Error types for the safe-stop coordinator.
//!
//! This module provides a unified error type [`SafeStopError`] for every
//! drain operation, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Topology**: a required member is not ready, or no member is eligible
//! - **Connection**: a member connection cannot be built or used
//! - **Info queries**: a namespace, roster or migration query failed
//! - **Configuration**: invalid settings or missing configuration
//!
//! Stability timeouts are deliberately *not* errors. They are reported as
//! [`ReconcileOutcome::RequeueAfter`](crate::outcome::ReconcileOutcome).
//!
//! # Example
//!
//! ```rust
//! use safestop::error::SafeStopError;
//!
//! fn handle_error(err: &SafeStopError) {
//!     if err.is_retryable() {
//!         println!("Will retry on the next reconciliation pass");
//!     } else {
//!         println!("Fatal error: {}", err);
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

/// Main error type for safe-stop operations.
#[derive(Error, Debug)]
pub enum SafeStopError {
    // Topology errors
    #[error("Member {member} is not ready")]
    NotReady { member: String },

    #[error("No eligible cluster members found")]
    EmptyTopology,

    // Connection errors
    #[error("Connection failed: {0}")]
    Connection(String),

    // Info protocol errors
    #[error("Info query '{command}' against {host} failed: {reason}")]
    InfoQuery {
        host: String,
        command: String,
        reason: String,
    },

    #[error("Failed to parse info response: {0}")]
    InfoParse(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    // External errors
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SafeStopError {
    /// Shorthand for an info-query failure against one host.
    pub fn info_query(
        host: impl Into<String>,
        command: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SafeStopError::InfoQuery {
            host: host.into(),
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Check if a later reconciliation pass may succeed without intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SafeStopError::Connection(_)
                | SafeStopError::InfoQuery { .. }
                | SafeStopError::InfoParse(_)
                | SafeStopError::NotReady { .. }
                | SafeStopError::Cancelled
                | SafeStopError::Kube(_)
        )
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SafeStopError::NotReady { .. } => "not_ready",
            SafeStopError::EmptyTopology => "empty_topology",
            SafeStopError::Connection(_) => "connection",
            SafeStopError::InfoQuery { .. } | SafeStopError::InfoParse(_) => "info_query",
            SafeStopError::Config(_) | SafeStopError::InvalidConfig { .. } => "config",
            SafeStopError::Cancelled => "cancelled",
            SafeStopError::Kube(_) => "kube",
            SafeStopError::Serialization(_) => "serialization",
            SafeStopError::Io(_) => "io",
            SafeStopError::Internal(_) => "internal",
        }
    }
}

/// Result type alias for safe-stop operations.
pub type Result<T> = std::result::Result<T, SafeStopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SafeStopError::Connection("refused".into()).is_retryable());
        assert!(SafeStopError::NotReady { member: "pod-1".into() }.is_retryable());
        assert!(SafeStopError::info_query("10.0.0.1:3000", "namespaces", "eof").is_retryable());
        assert!(SafeStopError::InfoParse("garbled".into()).is_retryable());
        assert!(!SafeStopError::EmptyTopology.is_retryable());
        assert!(!SafeStopError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn test_from_conversions() {
        let io_err: SafeStopError = io::Error::new(io::ErrorKind::NotFound, "absent").into();
        assert_eq!(io_err.kind(), "io");

        let json_err: SafeStopError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(json_err.kind(), "serialization");
    }

    #[test]
    fn test_display() {
        let err = SafeStopError::info_query("10.0.0.1:3000", "statistics", "timeout");
        assert_eq!(
            err.to_string(),
            "Info query 'statistics' against 10.0.0.1:3000 failed: timeout"
        );
        assert_eq!(
            SafeStopError::NotReady { member: "pod-2".into() }.to_string(),
            "Member pod-2 is not ready"
        );
    }
}
