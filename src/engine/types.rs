// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Types shared by the traffic-steering engine.

use std::collections::BTreeMap;
use std::fmt;

use super::targets::TargetSet;
use crate::constants::{STRATEGY_FAILOVER, STRATEGY_GEOIP, STRATEGY_ROUND_ROBIN};

/// Health of a single advertised hostname on this cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HealthStatus {
    /// At least one backend of the host has a ready address
    Healthy,
    /// No backend of the host has a ready address
    Unhealthy,
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(self) -> bool {
        self == Self::Healthy
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Unhealthy => write!(f, "Unhealthy"),
        }
    }
}

/// Traffic distribution strategy for a group of hosts.
///
/// Only failover carries extra configuration: the declared primary order, a
/// comma separated list of region tags (e.g. `"us, eu"`). It is passed to the
/// geotag ranker verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    RoundRobin,
    Geo,
    Failover { primary_geotag: String },
}

impl Strategy {
    /// Canonical name, written to the `strategy` endpoint label.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoundRobin => STRATEGY_ROUND_ROBIN,
            Self::Geo => STRATEGY_GEOIP,
            Self::Failover { .. } => STRATEGY_FAILOVER,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy configuration for one Ingress (all of its hosts).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyConfig {
    /// Selected strategy
    pub strategy: Strategy,
    /// Region tag to configured weight
    pub weights: BTreeMap<String, u32>,
    /// TTL of every produced record
    pub ttl_seconds: u32,
}

impl StrategyConfig {
    #[must_use]
    pub fn new(strategy: Strategy, ttl_seconds: u32) -> Self {
        Self {
            strategy,
            weights: BTreeMap::new(),
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn with_weights(mut self, weights: BTreeMap<String, u32>) -> Self {
        self.weights = weights;
        self
    }
}

/// What this cluster knows about itself and its peers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterTopology {
    /// Region tag of this cluster
    pub cluster_geotag: String,
    /// Region tags of every peer cluster
    pub ext_cluster_geotags: Vec<String>,
    /// Delegated zone every advertised host must belong to
    pub dns_zone: String,
}

/// Outcome of the strategy resolution for one host.
///
/// This is also the status signal handed to the metrics collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Advertised hostname
    pub host: String,
    /// Region-keyed final targets (input of the weight labels)
    pub targets: TargetSet,
    /// Final address list as published in the externally visible record
    pub addresses: Vec<String>,
    /// Whether this cluster won the failover projection (always false outside failover)
    pub is_primary: bool,
    /// Local health of the host
    pub health: HealthStatus,
}
