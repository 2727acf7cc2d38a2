// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Write and delete helpers for `DNSEndpoint` resources.
//!
//! Writes use server-side apply (SSA) with the operator's field manager, so a
//! single call creates the resource or converges an existing one.
//!
//! # Example
//!
//! ```rust,no_run
//! use gslb::crd::{DNSEndpoint, DNSEndpointSpec};
//! use gslb::reconcilers::resources::apply_dns_endpoint;
//! use kube::Client;
//! use anyhow::Result;
//!
//! async fn example(client: &Client, dns_endpoint: &DNSEndpoint) -> Result<()> {
//!     apply_dns_endpoint(client, dns_endpoint).await
//! }
//! ```

use anyhow::{anyhow, Result};
use kube::api::{DeleteParams, Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info};

use crate::constants::{FIELD_MANAGER, RESOURCE_TYPE_DNS_ENDPOINT};
use crate::crd::DNSEndpoint;
use crate::metrics::{record_resource_deleted, record_resource_updated};

/// Create or update a `DNSEndpoint` with server-side apply.
///
/// # Errors
///
/// Returns an error if the resource has no name or namespace, or the API call fails.
pub async fn apply_dns_endpoint(client: &Client, dns_endpoint: &DNSEndpoint) -> Result<()> {
    let name = dns_endpoint.name_any();
    let namespace = dns_endpoint
        .namespace()
        .ok_or_else(|| anyhow!("DNSEndpoint {name} must have a namespace"))?;

    let api: Api<DNSEndpoint> = Api::namespaced(client.clone(), &namespace);

    debug!(
        namespace = %namespace,
        name = %name,
        endpoints = dns_endpoint.spec.endpoints.len(),
        "Applying DNSEndpoint"
    );
    api.patch(
        &name,
        &PatchParams::apply(FIELD_MANAGER).force(),
        &Patch::Apply(dns_endpoint),
    )
    .await?;
    record_resource_updated(RESOURCE_TYPE_DNS_ENDPOINT);
    info!("Applied DNSEndpoint {}/{}", namespace, name);

    Ok(())
}

/// Delete a `DNSEndpoint` if it exists.
///
/// Returns `true` if a resource was deleted, `false` if there was none.
///
/// # Errors
///
/// Returns an error if the API call fails for any reason other than not found.
pub async fn delete_dns_endpoint(client: &Client, namespace: &str, name: &str) -> Result<bool> {
    let api: Api<DNSEndpoint> = Api::namespaced(client.clone(), namespace);

    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            record_resource_deleted(RESOURCE_TYPE_DNS_ENDPOINT);
            info!("Deleted DNSEndpoint {}/{}", namespace, name);
            Ok(true)
        }
        Err(e) if is_not_found(&e) => {
            debug!("DNSEndpoint {}/{} already absent", namespace, name);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Whether a Kubernetes API error is a 404.
#[must_use]
pub fn is_not_found(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 404)
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
