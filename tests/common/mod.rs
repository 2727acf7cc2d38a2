// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;

use gslb::engine::{
    build_endpoints, ClusterTopology, EndpointPlan, ExternalTargets, HealthStatus, StrategyConfig,
    TargetSet,
};
use gslb::gslb_errors::PeerLookupError;
use gslb::labels::LOCAL_TARGETS_PREFIX;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{Api, DeleteParams, PostParams};
use kube::client::Client;
use serde_json::json;

pub const DNS_ZONE: &str = "cloud.example.com";

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let ns = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "gslb-test"
            }
        }
    }))?;

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(ae)) if ae.code == 409 => Ok(()),
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(client: &Client, name: &str) {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    if let Err(e) = namespaces.delete(name, &DeleteParams::default()).await {
        eprintln!("Failed to delete test namespace {name}: {e}");
    }
}

/// Peer lookup answering from a fixed host → targets map.
#[derive(Default)]
pub struct FixturePeers {
    pub targets: BTreeMap<String, TargetSet>,
}

#[async_trait::async_trait]
impl ExternalTargets for FixturePeers {
    async fn external_targets(&self, host: &str) -> Result<TargetSet, PeerLookupError> {
        Ok(self.targets.get(host).cloned().unwrap_or_default())
    }
}

/// One simulated cluster running the operator.
#[derive(Clone, Debug)]
pub struct SimulatedCluster {
    pub geotag: String,
    pub exposed_ips: Vec<String>,
    pub health: HealthStatus,
}

impl SimulatedCluster {
    pub fn new(geotag: &str, exposed_ips: &[&str]) -> Self {
        Self {
            geotag: geotag.to_string(),
            exposed_ips: exposed_ips.iter().map(|ip| (*ip).to_string()).collect(),
            health: HealthStatus::Healthy,
        }
    }
}

/// Several clusters serving the same hosts, each seeing the others as peers.
///
/// Peers learn each other's addresses only through the published
/// local-targets records, as they would over DNS.
pub struct Federation {
    pub clusters: Vec<SimulatedCluster>,
    /// geotag → host → published local targets
    published: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Federation {
    pub fn new(clusters: Vec<SimulatedCluster>) -> Self {
        Self {
            clusters,
            published: BTreeMap::new(),
        }
    }

    pub fn cluster_mut(&mut self, geotag: &str) -> &mut SimulatedCluster {
        self.clusters
            .iter_mut()
            .find(|c| c.geotag == geotag)
            .unwrap()
    }

    pub fn topology(&self, geotag: &str) -> ClusterTopology {
        ClusterTopology {
            cluster_geotag: geotag.to_string(),
            ext_cluster_geotags: self
                .clusters
                .iter()
                .filter(|c| c.geotag != geotag)
                .map(|c| c.geotag.clone())
                .collect(),
            dns_zone: DNS_ZONE.to_string(),
        }
    }

    /// What `geotag` learns from its peers' published records.
    fn peer_view(&self, geotag: &str, hosts: &[&str]) -> FixturePeers {
        let mut peers = FixturePeers::default();
        for host in hosts {
            let mut targets = TargetSet::new();
            for (peer, records) in &self.published {
                if peer == geotag {
                    continue;
                }
                if let Some(ips) = records.get(*host) {
                    targets.append(peer, ips.clone());
                }
            }
            peers.targets.insert((*host).to_string(), targets);
        }
        peers
    }

    /// Run one reconciliation on every cluster and return the plans by geotag.
    ///
    /// All clusters compute from the records published in the previous round,
    /// then publish their new local-targets records.
    pub async fn reconcile(
        &mut self,
        config: &StrategyConfig,
        hosts: &[&str],
    ) -> BTreeMap<String, EndpointPlan> {
        let mut plans = BTreeMap::new();
        for cluster in &self.clusters {
            let health: BTreeMap<String, HealthStatus> = hosts
                .iter()
                .map(|h| ((*h).to_string(), cluster.health))
                .collect();
            let peers = self.peer_view(&cluster.geotag, hosts);
            let plan = build_endpoints(
                &self.topology(&cluster.geotag),
                config,
                &cluster.exposed_ips,
                &health,
                &peers,
            )
            .await
            .unwrap();
            plans.insert(cluster.geotag.clone(), plan);
        }

        self.published.clear();
        for (geotag, plan) in &plans {
            let records = self.published.entry(geotag.clone()).or_default();
            for endpoint in &plan.endpoints {
                if let Some(host) = endpoint.dns_name.strip_prefix(LOCAL_TARGETS_PREFIX) {
                    records.insert(host.to_string(), endpoint.targets.clone());
                }
            }
        }
        plans
    }
}

/// Targets of the externally visible record of `host`, if any.
pub fn gslb_targets(plan: &EndpointPlan, host: &str) -> Option<Vec<String>> {
    plan.endpoints
        .iter()
        .find(|e| e.dns_name == host)
        .map(|e| e.targets.clone())
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
