// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Traffic-steering decision engine.
//!
//! For each advertised host the engine turns this cluster's exposed addresses,
//! the host's local health, and the addresses peer clusters advertise into the
//! DNS records to publish, following one of three strategies:
//!
//! - **Round robin** - every peer-advertised address, sorted
//! - **Geo** - same target set as round robin; the DNS provider does the geo matching
//! - **Failover** - only the addresses of the highest-priority region that has any
//!
//! # Modules
//!
//! - [`geotags`] - Failover priority ordering of regions
//! - [`targets`] - Region-keyed address container
//! - [`strategy`] - Per-strategy target selection
//! - [`endpoint`] - DNS record assembly and batch computation
//! - [`weights`] - Weighted labels for observability
//! - [`types`] - Shared types
//!
//! The computation keeps no state between invocations. The only call that may
//! block is the peer lookup behind [`ExternalTargets`].

pub mod endpoint;
pub mod geotags;
pub mod strategy;
pub mod targets;
pub mod types;
pub mod weights;

pub use endpoint::{build_endpoints, EndpointPlan};
pub use targets::TargetSet;
pub use types::{ClusterTopology, HealthStatus, Resolution, Strategy, StrategyConfig};

use crate::gslb_errors::PeerLookupError;

/// Source of the addresses peer clusters advertise for a host.
///
/// Implementations return an empty set, not an error, when peers have not
/// published anything yet. The engine treats errors the same way.
#[async_trait::async_trait]
pub trait ExternalTargets: Send + Sync {
    /// Peer-advertised addresses of `host`, keyed by peer region tag.
    async fn external_targets(&self, host: &str) -> Result<TargetSet, PeerLookupError>;
}
