// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the GSLB operator.
//!
//! This module provides specialized error types for:
//! - Endpoint computation (hosts outside the delegated zone)
//! - Ingress annotation parsing
//! - Operator configuration validation
//! - Peer cluster DNS lookups
//!
//! Only [`GslbError`] is raised by the decision engine. Peer lookup failures are
//! degraded to "no peer data yet" by the engine and never abort a computation.

use thiserror::Error;

/// Errors raised while computing DNS endpoints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GslbError {
    /// An Ingress host is outside the zone this cluster is delegated to manage
    ///
    /// Fails the whole batch: no endpoint is produced for any host of the Ingress.
    #[error("ingress host {host} does not match delegated zone {zone}")]
    ZoneMismatch {
        /// The offending host
        host: String,
        /// The delegated zone
        zone: String,
    },
}

/// Errors found while reading strategy annotations from an Ingress.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// Strategy annotation holds an unknown value
    #[error("unknown strategy '{value}' in annotation {annotation} (expected roundRobin, geoip or failover)")]
    UnknownStrategy {
        /// Annotation key
        annotation: String,
        /// Value found
        value: String,
    },

    /// Failover strategy without a primary geotag
    #[error("strategy failover requires a non-empty {annotation} annotation")]
    MissingPrimaryGeotag {
        /// Annotation key that must be set
        annotation: String,
    },

    /// Weights annotation is not a `region:weight` list
    #[error("invalid weights '{value}' in annotation {annotation}: {reason}")]
    InvalidWeights {
        /// Annotation key
        annotation: String,
        /// Value found
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// TTL annotation is not a non-negative integer
    #[error("invalid TTL '{value}' in annotation {annotation}")]
    InvalidTtl {
        /// Annotation key
        annotation: String,
        /// Value found
        value: String,
    },
}

/// Errors found while validating operator configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Cluster geotag empty after normalization
    #[error("cluster geo tag must not be empty")]
    MissingClusterGeoTag,

    /// A zone setting is empty
    #[error("{setting} must not be empty")]
    EmptyZone {
        /// Name of the setting
        setting: &'static str,
    },

    /// Delegated zone does not sit under the edge zone
    #[error("DNS zone {dns_zone} is not a subdomain of edge DNS zone {edge_dns_zone}")]
    ZoneOutsideEdgeZone {
        /// Delegated zone
        dns_zone: String,
        /// Edge zone
        edge_dns_zone: String,
    },

    /// Local geotag listed as a peer
    #[error("cluster geo tag {geotag} must not be listed among external cluster geo tags")]
    LocalGeoTagInPeers {
        /// The repeated tag
        geotag: String,
    },

    /// Same peer listed twice
    #[error("external cluster geo tag {geotag} is listed more than once")]
    DuplicatePeerGeoTag {
        /// The repeated tag
        geotag: String,
    },
}

/// Errors from querying a peer cluster's nameserver.
#[derive(Error, Debug)]
pub enum PeerLookupError {
    /// Peer nameserver name did not resolve
    #[error("failed to resolve peer nameserver {nameserver}: {reason}")]
    NameserverResolution {
        /// Nameserver name
        nameserver: String,
        /// Underlying reason
        reason: String,
    },

    /// DNS query to the peer nameserver failed
    #[error("DNS query for {fqdn} against {server} failed: {reason}")]
    QueryFailed {
        /// Queried name
        fqdn: String,
        /// Server address
        server: String,
        /// Underlying reason
        reason: String,
    },

    /// Blocking query task did not complete
    #[error("DNS query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
#[path = "gslb_errors_tests.rs"]
mod gslb_errors_tests;
