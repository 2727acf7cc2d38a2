// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # GSLB - Global Server Load Balancing Operator for Kubernetes
//!
//! A Kubernetes operator that steers traffic for an Ingress across several
//! clusters by publishing DNS records.
//!
//! ## Overview
//!
//! Every cluster runs the operator. For each annotated Ingress it:
//!
//! - publishes the addresses this cluster exposes the Ingress on as a
//!   `localtargets-<host>` record, while the host has a ready backend
//! - queries the same record on every peer cluster's nameserver
//! - combines local and peer addresses with the selected strategy (round
//!   robin, geo, or failover) into the externally visible record of the host
//!
//! The records are persisted as an external-dns `DNSEndpoint`.
//!
//! ## Modules
//!
//! - [`engine`] - Stateless traffic-steering decision engine
//! - [`crd`] - `DNSEndpoint` custom resource
//! - [`annotations`] - Strategy configuration from Ingress annotations
//! - [`ingress`] - Exposed addresses and host health of an Ingress
//! - [`peers`] - DNS lookups of peer cluster targets
//! - [`config`] - Operator configuration
//! - [`reconcilers`] - Ingress controller
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use gslb::engine::{ClusterTopology, Strategy, StrategyConfig};
//!
//! let topology = ClusterTopology {
//!     cluster_geotag: "eu".to_string(),
//!     ext_cluster_geotags: vec!["us".to_string()],
//!     dns_zone: "cloud.example.com".to_string(),
//! };
//!
//! let config = StrategyConfig::new(
//!     Strategy::Failover {
//!         primary_geotag: "eu".to_string(),
//!     },
//!     30,
//! );
//! ```

pub mod annotations;
pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod engine;
pub mod gslb_errors;
pub mod ingress;
pub mod labels;
pub mod metrics;
pub mod peers;
pub mod reconcilers;
