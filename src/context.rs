// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the Ingress controller.
//!
//! The controller receives an `Arc<Context>` that contains:
//! - Kubernetes client
//! - Validated operator configuration and the cluster topology derived from it
//! - The peer lookup used by the engine

use std::sync::Arc;

use kube::Client;

use crate::config::OperatorConfig;
use crate::engine::{ClusterTopology, ExternalTargets};

/// Shared context passed to the controller.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Validated operator configuration
    pub config: OperatorConfig,

    /// This cluster and its peers as the engine sees them
    pub topology: ClusterTopology,

    /// Source of the addresses peer clusters advertise
    pub external_targets: Arc<dyn ExternalTargets>,
}

impl Context {
    /// Build the context from a validated configuration, querying peers over DNS.
    #[must_use]
    pub fn new(client: Client, config: OperatorConfig) -> Self {
        let external_targets: Arc<dyn ExternalTargets> = Arc::new(config.external_targets());
        let topology = config.topology();
        Self {
            client,
            config,
            topology,
            external_targets,
        }
    }
}
