// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label and annotation constants used across the operator.
//!
//! This module defines the Ingress annotations that configure traffic steering
//! and the labels/annotations written on produced `DNSEndpoint` resources, to
//! ensure consistency between the parser, the engine and the reconciler.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Value for `app.kubernetes.io/managed-by` on resources written by this operator
pub const MANAGED_BY_GSLB: &str = "gslb";

// ============================================================================
// Ingress Annotations
// ============================================================================

/// Traffic distribution strategy (`roundRobin`, `geoip`, `failover`)
pub const ANNOTATION_STRATEGY: &str = "gslb.firestoned.io/strategy";

/// Declared primary region order for failover (e.g. `"us, eu"`)
pub const ANNOTATION_PRIMARY_GEOTAG: &str = "gslb.firestoned.io/primary-geotag";

/// Per-region weights (e.g. `"eu:5,us:10"`)
pub const ANNOTATION_WEIGHTS: &str = "gslb.firestoned.io/weights";

/// TTL of produced records in seconds
pub const ANNOTATION_DNS_TTL_SECONDS: &str = "gslb.firestoned.io/dns-ttl-seconds";

// ============================================================================
// DNSEndpoint Labels and Annotations
// ============================================================================

/// Label and annotation marking a `DNSEndpoint` as locally computed
pub const DNS_TYPE_LABEL: &str = "gslb.firestoned.io/dnstype";

/// Value of [`DNS_TYPE_LABEL`]
pub const DNS_TYPE_LOCAL: &str = "local";

// ============================================================================
// Endpoint Record Labels
// ============================================================================

/// Endpoint label carrying the strategy's canonical name
pub const STRATEGY_LABEL: &str = "strategy";

/// Prefix of `weight-<region>-<index>-<weight>` endpoint labels
pub const WEIGHT_LABEL_PREFIX: &str = "weight";

/// Prefix of the per-cluster local-targets record name
pub const LOCAL_TARGETS_PREFIX: &str = "localtargets-";
