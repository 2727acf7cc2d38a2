// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Exposed addresses and per-host health of an Ingress.
//!
//! These are the two local inputs of the engine:
//! - the addresses this cluster exposes the Ingress on (its load-balancer status)
//! - whether each advertised host has at least one ready backend

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use k8s_openapi::api::core::v1::Endpoints;
use k8s_openapi::api::networking::v1::Ingress;
use tracing::{debug, warn};

use crate::engine::HealthStatus;

/// Advertised hosts of an Ingress, deduplicated and sorted.
#[must_use]
pub fn hosts(ingress: &Ingress) -> Vec<String> {
    backend_services(ingress).into_keys().collect()
}

/// Backend services referenced by the paths of each host.
///
/// A host without HTTP paths maps to an empty set.
#[must_use]
pub fn backend_services(ingress: &Ingress) -> BTreeMap<String, BTreeSet<String>> {
    let mut services: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let rules = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.rules.as_ref())
        .into_iter()
        .flatten();

    for rule in rules {
        let Some(host) = rule.host.as_deref().filter(|h| !h.is_empty()) else {
            continue;
        };
        let entry = services.entry(host.to_string()).or_default();
        let paths = rule.http.iter().flat_map(|http| http.paths.iter());
        for path in paths {
            if let Some(service) = &path.backend.service {
                entry.insert(service.name.clone());
            }
        }
    }
    services
}

/// Whether any path of the Ingress routes to `service`.
#[must_use]
pub fn references_service(ingress: &Ingress, service: &str) -> bool {
    backend_services(ingress)
        .values()
        .any(|services| services.contains(service))
}

/// Load-balancer entries of the Ingress status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadBalancerExposure {
    /// Literal IP entries
    pub ips: Vec<String>,
    /// Hostname entries that still need resolving
    pub hostnames: Vec<String>,
}

/// Split the Ingress load-balancer status into IPs and hostnames.
#[must_use]
pub fn load_balancer_exposure(ingress: &Ingress) -> LoadBalancerExposure {
    let mut exposure = LoadBalancerExposure::default();
    let entries = ingress
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .into_iter()
        .flatten();

    for entry in entries {
        if let Some(ip) = entry.ip.as_deref().filter(|ip| !ip.is_empty()) {
            exposure.ips.push(ip.to_string());
        }
        if let Some(hostname) = entry.hostname.as_deref().filter(|h| !h.is_empty()) {
            exposure.hostnames.push(hostname.to_string());
        }
    }
    exposure
}

/// Addresses this cluster exposes the Ingress on.
///
/// Hostname entries are resolved to their IPv4 addresses. A hostname that does
/// not resolve is logged and skipped. The result is deduplicated and sorted.
pub async fn exposed_ips(ingress: &Ingress) -> Vec<String> {
    let exposure = load_balancer_exposure(ingress);
    let mut addresses: BTreeSet<String> = exposure.ips.into_iter().collect();

    for hostname in &exposure.hostnames {
        match tokio::net::lookup_host((hostname.as_str(), 0)).await {
            Ok(resolved) => {
                for addr in resolved {
                    if let IpAddr::V4(v4) = addr.ip() {
                        addresses.insert(v4.to_string());
                    }
                }
            }
            Err(e) => {
                warn!(hostname = %hostname, error = %e, "Failed to resolve load balancer hostname");
            }
        }
    }

    debug!(addresses = ?addresses, "Resolved exposed ingress addresses");
    addresses.into_iter().collect()
}

/// Whether an `Endpoints` object lists at least one ready address.
#[must_use]
pub fn endpoints_ready(endpoints: &Endpoints) -> bool {
    endpoints
        .subsets
        .iter()
        .flatten()
        .any(|subset| subset.addresses.as_ref().is_some_and(|a| !a.is_empty()))
}

/// Health of every host given the readiness of each backend service.
///
/// A service missing from `ready_services` counts as not ready.
#[must_use]
pub fn host_health(
    services: &BTreeMap<String, BTreeSet<String>>,
    ready_services: &BTreeMap<String, bool>,
) -> BTreeMap<String, HealthStatus> {
    services
        .iter()
        .map(|(host, backends)| {
            let healthy = backends
                .iter()
                .any(|svc| ready_services.get(svc).copied().unwrap_or(false));
            let status = if healthy {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            };
            (host.clone(), status)
        })
        .collect()
}

#[cfg(test)]
#[path = "ingress_tests.rs"]
mod ingress_tests;
