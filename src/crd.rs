// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) written by the operator.
//!
//! The operator persists its computed DNS records as an external-dns
//! [`DNSEndpoint`]. external-dns (or any compatible provider) then publishes
//! the records in the delegated zone.
//!
//! # Example: Building a DNSEndpoint
//!
//! ```rust,no_run
//! use gslb::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint};
//!
//! let endpoint = Endpoint::a_record(
//!     "app.cloud.example.com",
//!     30,
//!     vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
//! );
//!
//! let dns_endpoint = DNSEndpoint::new(
//!     "app",
//!     DNSEndpointSpec {
//!         endpoints: vec![endpoint],
//!     },
//! );
//! ```

use kube::{CustomResource, CustomResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::RECORD_TYPE_A;

/// Desired DNS records of one Ingress.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "externaldns.k8s.io",
    version = "v1alpha1",
    kind = "DNSEndpoint",
    namespaced,
    doc = "DNSEndpoint holds the DNS records computed for one Ingress: a local-targets record per healthy host and the externally visible record per host with resolved targets."
)]
#[kube(status = "DNSEndpointStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointSpec {
    /// Records to publish.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// A single DNS record.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully qualified record name.
    pub dns_name: String,

    /// Record values (IPv4 addresses for A records).
    #[serde(default)]
    pub targets: Vec<String>,

    /// Record type, always `A` for records written by this operator.
    pub record_type: String,

    /// Time to live in seconds.
    #[serde(rename = "recordTTL", skip_serializing_if = "Option::is_none")]
    pub record_ttl: Option<i64>,

    /// Descriptive labels (`strategy`, `weight-<region>-<index>-<weight>`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Endpoint {
    /// Build an unlabeled A record.
    #[must_use]
    pub fn a_record(dns_name: &str, ttl_seconds: u32, targets: Vec<String>) -> Self {
        Self {
            dns_name: dns_name.to_string(),
            targets,
            record_type: RECORD_TYPE_A.to_string(),
            record_ttl: Some(i64::from(ttl_seconds)),
            labels: BTreeMap::new(),
        }
    }
}

/// Status written back by the DNS provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointStatus {
    /// Generation last processed by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl DNSEndpoint {
    /// Find a record by DNS name.
    #[must_use]
    pub fn endpoint(&self, dns_name: &str) -> Option<&Endpoint> {
        self.spec.endpoints.iter().find(|e| e.dns_name == dns_name)
    }
}

/// Render the CRD of `T` as YAML.
///
/// # Errors
///
/// Returns an error if the CRD cannot be serialized.
pub fn render_crd_yaml<T>() -> Result<String, serde_yaml::Error>
where
    T: CustomResourceExt,
{
    serde_yaml::to_string(&T::crd())
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
