// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Ingress reconciliation.
//!
//! For every Ingress carrying the strategy annotation the controller:
//!
//! 1. Reads the strategy configuration from the annotations
//! 2. Derives the local exposed addresses and per-host health
//! 3. Runs the engine, which queries peer clusters for their targets
//! 4. Publishes the per-host strategy status metrics
//! 5. Applies the resulting `DNSEndpoint`, owned by the Ingress
//!
//! Removing the strategy annotation deletes the `DNSEndpoint` the Ingress owns.
//! Deleting the Ingress leaves the `DNSEndpoint` to Kubernetes garbage
//! collection; its status metrics are cleared once the controller notices.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Endpoints;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{DynamicObject, ObjectMeta};
use kube::runtime::controller::{Action, Error as ControllerError};
use kube::runtime::reflector::ObjectRef;
use kube::runtime::{watcher, Controller};
use kube::{Api, Resource, ResourceExt};
use tracing::{debug, error, info, warn};

use crate::annotations::strategy_config;
use crate::constants::{ERROR_REQUEUE_DURATION_SECS, RESOURCE_TYPE_INGRESS};
use crate::context::Context;
use crate::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint};
use crate::engine::build_endpoints;
use crate::gslb_errors::{AnnotationError, GslbError};
use crate::ingress::{
    backend_services, endpoints_ready, exposed_ips, host_health, hosts, references_service,
};
use crate::labels::{DNS_TYPE_LABEL, DNS_TYPE_LOCAL, K8S_MANAGED_BY, MANAGED_BY_GSLB};
use crate::metrics::{
    clear_strategy_status, record_error, record_reconciliation_error,
    record_reconciliation_success, update_strategy_status,
};
use crate::reconcilers::resources::{apply_dns_endpoint, delete_dns_endpoint};

/// Error returned to kube-runtime by the Ingress controller.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] anyhow::Error);

/// Run the Ingress controller until shutdown.
///
/// Besides Ingress events, the controller reacts to changes of the
/// `DNSEndpoint` it owns and of the `Endpoints` of every backend service.
///
/// # Errors
///
/// Reconciliation errors are handled by [`error_policy`] and never end the
/// controller.
pub async fn run_gslb_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting Ingress GSLB controller");

    let client = ctx.client.clone();
    let ingresses = Api::<Ingress>::all(client.clone());
    let dns_endpoints = Api::<DNSEndpoint>::all(client.clone());
    let service_endpoints = Api::<Endpoints>::all(client);

    let controller = Controller::new(ingresses, watcher::Config::default());
    let store = controller.store();

    controller
        .owns(dns_endpoints, watcher::Config::default())
        .watches(
            service_endpoints,
            watcher::Config::default(),
            move |endpoints: Endpoints| ingresses_for_endpoints(&store.state(), &endpoints),
        )
        .shutdown_on_signal()
        .run(reconcile_ingress_wrapper, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((obj, _)) => debug!("Reconciled Ingress {}", obj),
                Err(ControllerError::ObjectNotFound(obj)) => forget_deleted_ingress(&obj),
                Err(e) => warn!("Ingress reconciliation failed: {}", e),
            }
        })
        .await;

    Ok(())
}

/// Ingresses in the namespace of `endpoints` that route to its service.
#[must_use]
pub fn ingresses_for_endpoints(
    ingresses: &[Arc<Ingress>],
    endpoints: &Endpoints,
) -> Vec<ObjectRef<Ingress>> {
    let namespace = endpoints.namespace();
    let service = endpoints.name_any();

    ingresses
        .iter()
        .filter(|ingress| ingress.namespace() == namespace)
        .filter(|ingress| references_service(ingress, &service))
        .map(|ingress| ObjectRef::from_obj(ingress.as_ref()))
        .collect()
}

/// Drop the status metrics of an Ingress that left the controller's store.
pub fn forget_deleted_ingress(ingress: &ObjectRef<DynamicObject>) {
    let Some(namespace) = ingress.namespace.as_deref() else {
        return;
    };
    debug!("Ingress {}/{} is gone, clearing its status", namespace, ingress.name);
    clear_strategy_status(namespace, &ingress.name);
}

async fn reconcile_ingress_wrapper(
    ingress: Arc<Ingress>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();

    match reconcile_ingress(ctx.clone(), &ingress).await {
        Ok(action) => {
            record_reconciliation_success(RESOURCE_TYPE_INGRESS, start.elapsed());
            Ok(action)
        }
        Err(e) => {
            error!(
                "Failed to reconcile Ingress {}/{}: {}",
                ingress.namespace().unwrap_or_default(),
                ingress.name_any(),
                e
            );
            record_reconciliation_error(RESOURCE_TYPE_INGRESS, start.elapsed());
            record_error(RESOURCE_TYPE_INGRESS, error_type(&e));
            Err(e.into())
        }
    }
}

/// Requeue policy for failed reconciliations.
pub fn error_policy(_ingress: Arc<Ingress>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Metrics category of a reconciliation error.
#[must_use]
pub fn error_type(error: &anyhow::Error) -> &'static str {
    if error.downcast_ref::<AnnotationError>().is_some() {
        "annotation_error"
    } else if error.downcast_ref::<GslbError>().is_some() {
        "zone_mismatch"
    } else if error.downcast_ref::<kube::Error>().is_some() {
        "api_error"
    } else {
        "unknown"
    }
}

/// Reconcile one Ingress.
///
/// # Errors
///
/// Returns an error if the annotations are invalid, a host is outside the
/// delegated zone, or a Kubernetes API call fails. No `DNSEndpoint` is written
/// in any of these cases.
pub async fn reconcile_ingress(ctx: Arc<Context>, ingress: &Ingress) -> Result<Action> {
    let name = ingress.name_any();
    let namespace = ingress
        .namespace()
        .ok_or_else(|| anyhow!("Ingress {name} has no namespace"))?;

    let Some(config) = strategy_config(ingress.annotations())? else {
        debug!("Ingress {}/{} is not managed", namespace, name);
        clear_strategy_status(&namespace, &name);
        remove_owned_dns_endpoint(&ctx, ingress, &namespace, &name).await?;
        return Ok(Action::await_change());
    };

    info!(
        "Reconciling Ingress {}/{} with strategy {} for hosts {:?}",
        namespace,
        name,
        config.strategy,
        hosts(ingress)
    );

    let services = backend_services(ingress);
    let ready = service_readiness(&ctx, &namespace, &services).await?;
    let health = host_health(&services, &ready);
    let local_targets = exposed_ips(ingress).await;
    debug!(
        namespace = %namespace,
        name = %name,
        local_targets = ?local_targets,
        "Local ingress state"
    );

    let plan = build_endpoints(
        &ctx.topology,
        &config,
        &local_targets,
        &health,
        ctx.external_targets.as_ref(),
    )
    .await?;

    update_strategy_status(&namespace, &name, &config.strategy, &plan.resolutions);

    let dns_endpoint = build_dns_endpoint(ingress, plan.endpoints)?;
    apply_dns_endpoint(&ctx.client, &dns_endpoint).await?;

    Ok(Action::requeue(ctx.config.reconcile_requeue()))
}

/// Delete the `DNSEndpoint` named after `ingress` if the Ingress owns it.
///
/// Ingresses that were never managed only cost a read.
async fn remove_owned_dns_endpoint(
    ctx: &Context,
    ingress: &Ingress,
    namespace: &str,
    name: &str,
) -> Result<()> {
    let api: Api<DNSEndpoint> = Api::namespaced(ctx.client.clone(), namespace);
    if let Some(dns_endpoint) = api.get_opt(name).await? {
        if is_owned_by(&dns_endpoint, ingress) {
            delete_dns_endpoint(&ctx.client, namespace, name).await?;
        }
    }
    Ok(())
}

/// Whether `dns_endpoint` carries an owner reference to `ingress`.
#[must_use]
pub fn is_owned_by(dns_endpoint: &DNSEndpoint, ingress: &Ingress) -> bool {
    let Some(uid) = ingress.uid() else {
        return false;
    };
    dns_endpoint
        .owner_references()
        .iter()
        .any(|owner| owner.kind == "Ingress" && owner.uid == uid)
}

/// Readiness of every backend service, read from its `Endpoints` object.
async fn service_readiness(
    ctx: &Context,
    namespace: &str,
    services: &BTreeMap<String, BTreeSet<String>>,
) -> Result<BTreeMap<String, bool>> {
    let api: Api<Endpoints> = Api::namespaced(ctx.client.clone(), namespace);
    let names: BTreeSet<&String> = services.values().flatten().collect();

    let mut ready = BTreeMap::new();
    for service in names {
        let is_ready = api
            .get_opt(service)
            .await?
            .is_some_and(|endpoints| endpoints_ready(&endpoints));
        ready.insert(service.clone(), is_ready);
    }
    Ok(ready)
}

/// The `DNSEndpoint` holding the records of `ingress`.
///
/// It carries the Ingress name and namespace, the local dnstype marker as both
/// label and annotation, and a controller owner reference to the Ingress.
///
/// # Errors
///
/// Returns an error if the Ingress has no namespace or no UID.
pub fn build_dns_endpoint(ingress: &Ingress, endpoints: Vec<Endpoint>) -> Result<DNSEndpoint> {
    let name = ingress.name_any();
    let namespace = ingress
        .namespace()
        .ok_or_else(|| anyhow!("Ingress {name} has no namespace"))?;
    let owner = ingress
        .controller_owner_ref(&())
        .ok_or_else(|| anyhow!("Ingress {namespace}/{name} has no UID"))?;

    let labels = BTreeMap::from([
        (DNS_TYPE_LABEL.to_string(), DNS_TYPE_LOCAL.to_string()),
        (K8S_MANAGED_BY.to_string(), MANAGED_BY_GSLB.to_string()),
    ]);
    let annotations = BTreeMap::from([(DNS_TYPE_LABEL.to_string(), DNS_TYPE_LOCAL.to_string())]);

    Ok(DNSEndpoint {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace),
            labels: Some(labels),
            annotations: Some(annotations),
            owner_references: Some(vec![owner]),
            ..ObjectMeta::default()
        },
        spec: DNSEndpointSpec { endpoints },
        status: None,
    })
}

#[cfg(test)]
#[path = "gslb_tests.rs"]
mod gslb_tests;
