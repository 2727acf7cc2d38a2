// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Assembly of DNS endpoint records from resolved targets.
//!
//! Every host of a batch is checked against the delegated zone before anything
//! is computed. One host outside the zone fails the whole batch; there is no
//! partial output.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::strategy::resolve;
use super::targets::TargetSet;
use super::types::{ClusterTopology, HealthStatus, Resolution, StrategyConfig};
use super::weights::weight_labels;
use super::ExternalTargets;
use crate::crd::Endpoint;
use crate::gslb_errors::GslbError;
use crate::labels::{LOCAL_TARGETS_PREFIX, STRATEGY_LABEL};

/// Records and status signals computed for a batch of hosts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointPlan {
    /// Records in host order; per host the local-targets record comes first
    pub endpoints: Vec<Endpoint>,
    /// One resolution per host, in host order
    pub resolutions: Vec<Resolution>,
}

/// Name of the local-targets record of `host`.
#[must_use]
pub fn local_targets_name(host: &str) -> String {
    format!("{LOCAL_TARGETS_PREFIX}{host}")
}

/// Check that every host belongs to the delegated zone.
///
/// The check is a plain substring containment test.
///
/// # Errors
///
/// Returns [`GslbError::ZoneMismatch`] for the first host outside the zone.
pub fn validate_hosts<'a, I>(hosts: I, dns_zone: &str) -> Result<(), GslbError>
where
    I: IntoIterator<Item = &'a str>,
{
    for host in hosts {
        if !host.contains(dns_zone) {
            return Err(GslbError::ZoneMismatch {
                host: host.to_string(),
                zone: dns_zone.to_string(),
            });
        }
    }
    Ok(())
}

/// Local-targets record of `host`, built only while the host is healthy.
#[must_use]
pub fn local_targets_endpoint(
    host: &str,
    health: HealthStatus,
    ttl_seconds: u32,
    local_targets: &[String],
) -> Option<Endpoint> {
    health.is_healthy().then(|| {
        Endpoint::a_record(&local_targets_name(host), ttl_seconds, local_targets.to_vec())
    })
}

/// Externally visible record of a resolved host, built only when it has targets.
#[must_use]
pub fn gslb_endpoint(config: &StrategyConfig, resolution: &Resolution) -> Option<Endpoint> {
    if resolution.addresses.is_empty() {
        return None;
    }
    let mut endpoint = Endpoint::a_record(
        &resolution.host,
        config.ttl_seconds,
        resolution.addresses.clone(),
    );
    endpoint.labels.insert(
        STRATEGY_LABEL.to_string(),
        config.strategy.name().to_string(),
    );
    endpoint
        .labels
        .extend(weight_labels(&config.weights, &resolution.targets));
    Some(endpoint)
}

/// Compute every record of a batch of hosts.
///
/// `health` lists the advertised hosts and their local health. Peer targets are
/// fetched through `external_targets`; a failed lookup is treated like a lookup
/// that found nothing.
///
/// # Errors
///
/// Returns [`GslbError::ZoneMismatch`] if any host is outside the delegated zone.
pub async fn build_endpoints(
    topology: &ClusterTopology,
    config: &StrategyConfig,
    local_targets: &[String],
    health: &BTreeMap<String, HealthStatus>,
    external_targets: &dyn ExternalTargets,
) -> Result<EndpointPlan, GslbError> {
    validate_hosts(health.keys().map(String::as_str), &topology.dns_zone)?;

    let mut plan = EndpointPlan::default();
    for (host, host_health) in health {
        if let Some(endpoint) =
            local_targets_endpoint(host, *host_health, config.ttl_seconds, local_targets)
        {
            plan.endpoints.push(endpoint);
        }

        let peers = match external_targets.external_targets(host).await {
            Ok(peers) => peers,
            Err(e) => {
                warn!(host = %host, error = %e, "Peer target lookup failed, treating as no peer data");
                TargetSet::new()
            }
        };
        debug!(host = %host, peers = peers.len(), "Fetched external targets");

        let resolution = resolve(
            topology,
            &config.strategy,
            host,
            *host_health,
            local_targets,
            &peers,
        );
        if let Some(endpoint) = gslb_endpoint(config, &resolution) {
            plan.endpoints.push(endpoint);
        }
        plan.resolutions.push(resolution);
    }

    info!(
        hosts = health.len(),
        endpoints = plan.endpoints.len(),
        strategy = %config.strategy,
        "Computed DNS endpoints"
    );
    Ok(plan)
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
