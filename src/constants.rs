// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the GSLB operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Strategy Constants
// ============================================================================

/// Canonical name of the round robin strategy
pub const STRATEGY_ROUND_ROBIN: &str = "roundRobin";

/// Canonical name of the geo strategy
pub const STRATEGY_GEOIP: &str = "geoip";

/// Canonical name of the failover strategy
pub const STRATEGY_FAILOVER: &str = "failover";

// ============================================================================
// DNS Constants
// ============================================================================

/// Record type of every record written by the operator
pub const RECORD_TYPE_A: &str = "A";

/// Default TTL of produced records when the Ingress does not set one
pub const DEFAULT_DNS_TTL_SECS: u32 = 30;

/// Standard DNS port for queries to peer nameservers
pub const DNS_PORT: u16 = 53;

/// Default timeout of a single peer nameserver query
pub const DEFAULT_PEER_DNS_TIMEOUT_MILLIS: u64 = 2000;

/// Prefix of peer cluster nameserver names
pub const PEER_NAMESERVER_PREFIX: &str = "gslb-ns";

// ============================================================================
// Controller Constants
// ============================================================================

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "gslb-controller";

/// Resource type label used in metrics for Ingress reconciliations
pub const RESOURCE_TYPE_INGRESS: &str = "Ingress";

/// Resource type label used in metrics for `DNSEndpoint` writes
pub const RESOURCE_TYPE_DNS_ENDPOINT: &str = "DNSEndpoint";

/// Default periodic re-computation interval (peer state changes without local events)
pub const DEFAULT_RECONCILE_REQUEUE_SECS: u64 = 30;

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default bind address of the Prometheus metrics HTTP server
pub const DEFAULT_METRICS_ADDRESS: &str = "0.0.0.0:8080";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";
