// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-strategy target selection for a single host.
//!
//! # Round robin and geo
//!
//! The externally visible targets are the peer-reported targets, sorted. Local
//! addresses only reach DNS through the separate local-targets record, and the
//! primary/secondary distinction does not apply.
//!
//! # Failover
//!
//! Local addresses are merged into the peer-reported set under the local region,
//! whatever the local health is, and the set is projected onto the first region
//! of the failover priority list that has addresses. This cluster is primary when
//! that region is its own.
//!
//! The projection only looks at the presence of addresses, so an unhealthy local
//! cluster that still exposes addresses keeps winning while it is first in the
//! priority list. That case is logged separately.

use tracing::info;

use super::geotags::failover_order;
use super::targets::TargetSet;
use super::types::{ClusterTopology, HealthStatus, Resolution, Strategy};

/// Resolve the final targets of `host`.
///
/// `external_targets` is what peer clusters advertise for the host. When it is
/// empty, peer discovery has not completed yet and no targets are selected.
#[must_use]
pub fn resolve(
    topology: &ClusterTopology,
    strategy: &Strategy,
    host: &str,
    health: HealthStatus,
    local_targets: &[String],
    external_targets: &TargetSet,
) -> Resolution {
    let mut resolution = Resolution {
        host: host.to_string(),
        targets: TargetSet::new(),
        addresses: Vec::new(),
        is_primary: false,
        health,
    };

    if external_targets.is_empty() {
        info!(host = %host, "No external targets have been found for host");
        return resolution;
    }

    match strategy {
        Strategy::RoundRobin | Strategy::Geo => {
            resolution.targets = external_targets.sorted();
            resolution.addresses = resolution.targets.sorted_addresses();
        }
        Strategy::Failover { primary_geotag } => {
            let mut candidates = external_targets.clone();
            candidates.append(&topology.cluster_geotag, local_targets.iter().cloned());

            let priority = failover_order(
                &topology.cluster_geotag,
                &topology.ext_cluster_geotags,
                primary_geotag,
            );
            let (targets, top_geotag) = candidates.project_to_top_priority(&priority);

            resolution.is_primary = top_geotag.as_deref() == Some(topology.cluster_geotag.as_str());
            resolution.addresses = targets.addresses();
            resolution.targets = targets;

            if resolution.is_primary {
                if !health.is_healthy() {
                    info!(
                        host = %host,
                        cluster = %topology.cluster_geotag,
                        targets = ?resolution.addresses,
                        workload = %HealthStatus::Unhealthy,
                        "Executing failover strategy for primary cluster"
                    );
                }
            } else {
                info!(
                    host = %host,
                    cluster = %topology.cluster_geotag,
                    primary = ?top_geotag,
                    targets = ?resolution.addresses,
                    workload = %health,
                    "Executing failover strategy for secondary cluster"
                );
            }
        }
    }

    info!(
        host = %host,
        strategy = %strategy,
        targets = ?resolution.addresses,
        "Final target list"
    );
    resolution
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod strategy_tests;
