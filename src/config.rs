// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration.
//!
//! Every setting is a command line flag that can also be supplied through an
//! environment variable, which is how the operator is configured when deployed:
//!
//! | Flag | Environment variable | Default |
//! |------|----------------------|---------|
//! | `--cluster-geo-tag` | `CLUSTER_GEO_TAG` | required |
//! | `--ext-clusters-geo-tags` | `EXT_GSLB_CLUSTERS_GEO_TAGS` | none |
//! | `--edge-dns-zone` | `EDGE_DNS_ZONE` | required |
//! | `--dns-zone` | `DNS_ZONE` | required |
//! | `--peer-dns-port` | `PEER_DNS_PORT` | `53` |
//! | `--peer-dns-timeout-ms` | `PEER_DNS_TIMEOUT_MS` | `2000` |
//! | `--reconcile-requeue-seconds` | `RECONCILE_REQUEUE_SECONDS` | `30` |
//! | `--metrics-address` | `METRICS_ADDRESS` | `0.0.0.0:8080` |
//!
//! Parsed settings must go through [`OperatorConfig::validate`] before use.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::engine::ClusterTopology;
use crate::gslb_errors::ConfigError;
use crate::peers::DnsExternalTargets;

/// Global server load balancing operator for Kubernetes Ingresses
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct OperatorConfig {
    /// Region tag of this cluster
    #[arg(long, env = "CLUSTER_GEO_TAG")]
    pub cluster_geo_tag: String,

    /// Region tags of the peer clusters (comma separated)
    #[arg(long, env = "EXT_GSLB_CLUSTERS_GEO_TAGS", value_delimiter = ',')]
    pub ext_clusters_geo_tags: Vec<String>,

    /// Parent zone hosting the peer nameserver names
    #[arg(long, env = "EDGE_DNS_ZONE")]
    pub edge_dns_zone: String,

    /// Zone delegated to the GSLB nameservers; every Ingress host must belong to it
    #[arg(long, env = "DNS_ZONE")]
    pub dns_zone: String,

    /// Port used to query peer nameservers
    #[arg(long, env = "PEER_DNS_PORT", default_value_t = crate::constants::DNS_PORT)]
    pub peer_dns_port: u16,

    /// Timeout of a single peer nameserver query in milliseconds
    #[arg(long, env = "PEER_DNS_TIMEOUT_MS", default_value_t = crate::constants::DEFAULT_PEER_DNS_TIMEOUT_MILLIS)]
    pub peer_dns_timeout_ms: u64,

    /// Interval between periodic re-computations of every managed Ingress
    #[arg(long, env = "RECONCILE_REQUEUE_SECONDS", default_value_t = crate::constants::DEFAULT_RECONCILE_REQUEUE_SECS)]
    pub reconcile_requeue_seconds: u64,

    /// Listen address of the Prometheus metrics server
    #[arg(long, env = "METRICS_ADDRESS", default_value = crate::constants::DEFAULT_METRICS_ADDRESS)]
    pub metrics_address: SocketAddr,
}

impl OperatorConfig {
    /// Normalize and check the settings.
    ///
    /// Region tags are trimmed and lowercased, empty peer tags are dropped, and
    /// zones are trimmed, lowercased and stripped of a trailing dot.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the cluster tag or a zone is empty, the
    /// delegated zone is not a subdomain of the edge zone, or the peer tags
    /// repeat each other or the local tag.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.cluster_geo_tag = normalize_geotag(&self.cluster_geo_tag);
        if self.cluster_geo_tag.is_empty() {
            return Err(ConfigError::MissingClusterGeoTag);
        }

        self.edge_dns_zone = normalize_zone(&self.edge_dns_zone);
        if self.edge_dns_zone.is_empty() {
            return Err(ConfigError::EmptyZone {
                setting: "edge DNS zone",
            });
        }
        self.dns_zone = normalize_zone(&self.dns_zone);
        if self.dns_zone.is_empty() {
            return Err(ConfigError::EmptyZone {
                setting: "DNS zone",
            });
        }
        if !self.dns_zone.ends_with(&format!(".{}", self.edge_dns_zone)) {
            return Err(ConfigError::ZoneOutsideEdgeZone {
                dns_zone: self.dns_zone,
                edge_dns_zone: self.edge_dns_zone,
            });
        }

        let mut seen = BTreeSet::new();
        let mut peers = Vec::new();
        for tag in self.ext_clusters_geo_tags.iter().map(|t| normalize_geotag(t)) {
            if tag.is_empty() {
                continue;
            }
            if tag == self.cluster_geo_tag {
                return Err(ConfigError::LocalGeoTagInPeers { geotag: tag });
            }
            if !seen.insert(tag.clone()) {
                return Err(ConfigError::DuplicatePeerGeoTag { geotag: tag });
            }
            peers.push(tag);
        }
        self.ext_clusters_geo_tags = peers;

        Ok(self)
    }

    /// What the engine needs to know about this cluster and its peers.
    #[must_use]
    pub fn topology(&self) -> ClusterTopology {
        ClusterTopology {
            cluster_geotag: self.cluster_geo_tag.clone(),
            ext_cluster_geotags: self.ext_clusters_geo_tags.clone(),
            dns_zone: self.dns_zone.clone(),
        }
    }

    #[must_use]
    pub fn peer_dns_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_dns_timeout_ms)
    }

    #[must_use]
    pub fn reconcile_requeue(&self) -> Duration {
        Duration::from_secs(self.reconcile_requeue_seconds)
    }

    /// DNS-backed peer lookup for the configured peers.
    #[must_use]
    pub fn external_targets(&self) -> DnsExternalTargets {
        DnsExternalTargets::new(
            self.ext_clusters_geo_tags.clone(),
            self.dns_zone.clone(),
            self.edge_dns_zone.clone(),
            self.peer_dns_port,
            self.peer_dns_timeout(),
        )
    }
}

fn normalize_geotag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

fn normalize_zone(zone: &str) -> String {
    zone.trim().trim_end_matches('.').to_lowercase()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
