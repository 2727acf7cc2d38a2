// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers.
//!
//! The operator follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor Ingresses, the `DNSEndpoint`s they own, and backend `Endpoints`
//! 2. **Reconcile** - Compute the DNS records of the Ingress from local and peer state
//! 3. **Update** - Apply the records as a `DNSEndpoint`
//!
//! # Available Reconcilers
//!
//! - [`reconcile_ingress`] - Computes and applies the `DNSEndpoint` of one Ingress
//! - [`run_gslb_controller`] - Runs the Ingress controller
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use gslb::reconcilers::reconcile_ingress;
//! use gslb::context::Context;
//! use k8s_openapi::api::networking::v1::Ingress;
//! use std::sync::Arc;
//!
//! async fn reconcile(ctx: Arc<Context>, ingress: Ingress) -> anyhow::Result<()> {
//!     reconcile_ingress(ctx, &ingress).await?;
//!     Ok(())
//! }
//! ```

pub mod gslb;
pub mod resources;

pub use gslb::{error_policy, reconcile_ingress, run_gslb_controller, ReconcileError};
