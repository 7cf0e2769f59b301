//! safestop - safe node removal for replicated data-store clusters.
//!
//! Before a cluster member is stopped, restarted or removed, safestop
//! decides whether the member has to be quiesced first, waits for the
//! cluster to settle, and quiesces it through a namespace where that does
//! not break strong-consistency roster guarantees.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SafeStopCoordinator                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Topology Prober → Namespace Classifier → Stability Monitor │
//! │                                         → Quiesce Executor  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Connection Factory | Membership Hint Controller            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MemberLister (Kubernetes pods) | InfoClient (info protocol)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entry point returns a [`ReconcileOutcome`]: `Success`,
//! `Error(cause)` or `RequeueAfter(delay)`.

pub mod config;
pub mod error;
pub mod types;

pub mod classifier;
pub mod cli;
pub mod connection;
pub mod coordinator;
pub mod hints;
pub mod info;
pub mod observability;
pub mod outcome;
pub mod quiesce;
pub mod shutdown;
pub mod stability;
pub mod topology;

// Re-exports
pub use coordinator::SafeStopCoordinator;
pub use error::{Result, SafeStopError};
pub use outcome::ReconcileOutcome;
pub use types::*;
