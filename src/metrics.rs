// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the GSLB operator.
//!
//! This module provides metrics collection with the namespace prefix
//! `gslb_firestoned_io_` (prometheus-safe version of "gslb.firestoned.io").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Track reconciliation operations and their outcomes
//! - **Resource Lifecycle Metrics** - Track `DNSEndpoint` writes and deletions
//! - **Error Metrics** - Track error conditions and types
//! - **Strategy Status Metrics** - Per-host outcome of the traffic-steering engine
//!
//! # Example
//!
//! ```rust,no_run
//! use gslb::metrics::record_reconciliation_success;
//!
//! // Record a successful reconciliation
//! record_reconciliation_success("Ingress", std::time::Duration::from_secs(1));
//! ```

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Duration;
use tracing::{error, info};

use crate::constants::METRICS_SERVER_PATH;
use crate::engine::{Resolution, Strategy};

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all GSLB metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "gslb_firestoned_io";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and status
///
/// Labels:
/// - `resource_type`: Kind of resource (`Ingress`)
/// - `status`: Outcome (`success`, `error`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Resource Lifecycle Metrics
// ============================================================================

/// Total number of resources written with server-side apply
pub static RESOURCES_UPDATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_updated_total"),
        "Total number of resources updated by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of resources deleted
pub static RESOURCES_DELETED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_deleted_total"),
        "Total number of resources deleted by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by resource type and error category
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `error_type`: Category of error (`annotation_error`, `zone_mismatch`, `api_error`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by resource type and error category",
    );
    let counter = CounterVec::new(opts, &["resource_type", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Strategy Status Metrics
// ============================================================================

/// Number of addresses in the externally visible record of each host
///
/// Labels:
/// - `namespace`, `name`: The Ingress
/// - `host`: Advertised hostname
pub static HEALTHY_RECORDS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_healthy_records"),
        "Number of addresses published for a host",
    );
    let gauge = GaugeVec::new(opts, &["namespace", "name", "host"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Local health of each host (1 = healthy, 0 = unhealthy)
pub static HOST_HEALTH: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_host_health"),
        "Local health of a host (1 = healthy, 0 = unhealthy)",
    );
    let gauge = GaugeVec::new(opts, &["namespace", "name", "host"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Whether this cluster serves a failover host (1 = primary, 0 = secondary)
pub static FAILOVER_PRIMARY: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_failover_primary"),
        "Whether this cluster is the active failover target of a host (1 = primary, 0 = secondary)",
    );
    let gauge = GaugeVec::new(opts, &["namespace", "name", "host"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Hosts with strategy status series, keyed by Ingress namespace and name
static PUBLISHED_HOSTS: LazyLock<Mutex<BTreeMap<(String, String), BTreeSet<String>>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));

/// Total number of strategy computations by strategy
pub static STRATEGY_UPDATES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_strategy_updates_total"),
        "Total number of strategy computations by strategy",
    );
    let counter = CounterVec::new(opts, &["strategy"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
///
/// # Arguments
/// * `resource_type` - The kind of resource reconciled (e.g., `Ingress`)
/// * `duration` - Duration of the reconciliation
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
///
/// # Arguments
/// * `resource_type` - The kind of resource reconciled
/// * `duration` - Duration of the reconciliation before failure
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record resource update
pub fn record_resource_updated(resource_type: &str) {
    RESOURCES_UPDATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record resource deletion
pub fn record_resource_deleted(resource_type: &str) {
    RESOURCES_DELETED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record an error
///
/// # Arguments
/// * `resource_type` - The kind of resource where error occurred
/// * `error_type` - Category of error (e.g., `annotation_error`, `api_error`)
pub fn record_error(resource_type: &str, error_type: &str) {
    ERRORS_TOTAL
        .with_label_values(&[resource_type, error_type])
        .inc();
}

/// Publish the per-host outcome of one strategy computation.
///
/// `failover_primary` is only written for the failover strategy; switching to
/// another strategy removes it. Series of hosts the Ingress no longer
/// advertises are removed.
pub fn update_strategy_status(
    namespace: &str,
    name: &str,
    strategy: &Strategy,
    resolutions: &[Resolution],
) {
    STRATEGY_UPDATES_TOTAL
        .with_label_values(&[strategy.name()])
        .inc();

    let is_failover = matches!(strategy, Strategy::Failover { .. });
    for resolution in resolutions {
        let labels = [namespace, name, resolution.host.as_str()];
        #[allow(clippy::cast_precision_loss)]
        let published = resolution.addresses.len() as f64;
        HEALTHY_RECORDS.with_label_values(&labels).set(published);
        HOST_HEALTH
            .with_label_values(&labels)
            .set(if resolution.health.is_healthy() { 1.0 } else { 0.0 });
        if is_failover {
            FAILOVER_PRIMARY
                .with_label_values(&labels)
                .set(if resolution.is_primary { 1.0 } else { 0.0 });
        } else {
            // Absent series is not an error
            let _ = FAILOVER_PRIMARY.remove_label_values(&labels);
        }
    }

    let current: BTreeSet<String> = resolutions.iter().map(|r| r.host.clone()).collect();
    let previous = PUBLISHED_HOSTS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert((namespace.to_string(), name.to_string()), current.clone())
        .unwrap_or_default();
    for host in previous.difference(&current) {
        remove_host_status(namespace, name, host);
    }
}

/// Remove every strategy status series of an Ingress.
///
/// Called when the Ingress is deleted or loses its strategy annotation.
pub fn clear_strategy_status(namespace: &str, name: &str) {
    let hosts = PUBLISHED_HOSTS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&(namespace.to_string(), name.to_string()))
        .unwrap_or_default();
    for host in &hosts {
        remove_host_status(namespace, name, host);
    }
}

fn remove_host_status(namespace: &str, name: &str, host: &str) {
    let labels = [namespace, name, host];
    for gauge in [&*HEALTHY_RECORDS, &*HOST_HEALTH, &*FAILOVER_PRIMARY] {
        let _ = gauge.remove_label_values(&labels);
    }
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!("Failed to gather metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Router serving the registry on `/metrics`.
pub fn metrics_router() -> Router {
    Router::new().route(METRICS_SERVER_PATH, get(metrics_handler))
}

/// Serve `/metrics` on `address` until the process exits.
///
/// # Errors
/// Returns error if the listener cannot be bound or the server fails
pub async fn serve_metrics(address: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Serving metrics on http://{address}{METRICS_SERVER_PATH}");
    axum::serve(listener, metrics_router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{HealthStatus, TargetSet};

    fn resolution(host: &str, addresses: &[&str], is_primary: bool) -> Resolution {
        Resolution {
            host: host.to_string(),
            targets: TargetSet::new(),
            addresses: addresses.iter().map(|a| (*a).to_string()).collect(),
            is_primary,
            health: HealthStatus::Healthy,
        }
    }

    #[test]
    fn test_record_reconciliation_success() {
        let resource_type = "TestResource";
        record_reconciliation_success(resource_type, Duration::from_millis(500));

        let counter = RECONCILIATION_TOTAL.with_label_values(&[resource_type, "success"]);
        assert!(counter.get() > 0.0);

        let histogram = RECONCILIATION_DURATION_SECONDS.with_label_values(&[resource_type]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_reconciliation_error() {
        let resource_type = "TestResourceError";
        record_reconciliation_error(resource_type, Duration::from_millis(250));

        let counter = RECONCILIATION_TOTAL.with_label_values(&[resource_type, "error"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn test_update_strategy_status_failover() {
        let strategy = Strategy::Failover {
            primary_geotag: "eu".to_string(),
        };
        update_strategy_status(
            "status-ns",
            "failover-app",
            &strategy,
            &[resolution("failover.cloud.example.com", &["10.0.0.1", "10.0.0.2"], true)],
        );

        let labels = ["status-ns", "failover-app", "failover.cloud.example.com"];
        assert_eq!(HEALTHY_RECORDS.with_label_values(&labels).get(), 2.0);
        assert_eq!(HOST_HEALTH.with_label_values(&labels).get(), 1.0);
        assert_eq!(FAILOVER_PRIMARY.with_label_values(&labels).get(), 1.0);
        assert!(STRATEGY_UPDATES_TOTAL.with_label_values(&["failover"]).get() > 0.0);
    }

    #[test]
    fn test_update_strategy_status_skips_primary_outside_failover() {
        update_strategy_status(
            "status-ns",
            "rr-app",
            &Strategy::RoundRobin,
            &[resolution("roundrobin.cloud.example.com", &["10.1.0.1"], false)],
        );

        let rendered = gather_metrics().unwrap();
        assert!(rendered.contains("roundrobin.cloud.example.com"));
        assert!(!rendered
            .lines()
            .any(|l| l.starts_with("gslb_firestoned_io_failover_primary")
                && l.contains("roundrobin.cloud.example.com")));
    }

    fn has_series(metric: &str, host: &str) -> bool {
        gather_metrics()
            .unwrap()
            .lines()
            .any(|l| l.starts_with(&format!("{METRICS_NAMESPACE}_{metric}{{")) && l.contains(host))
    }

    #[test]
    fn test_switch_from_failover_removes_primary() {
        let host = "switch.cloud.example.com";
        let failover = Strategy::Failover {
            primary_geotag: "eu".to_string(),
        };

        update_strategy_status(
            "switch-ns",
            "switch",
            &failover,
            &[resolution(host, &["10.2.0.1"], true)],
        );
        assert!(has_series("failover_primary", host));

        update_strategy_status(
            "switch-ns",
            "switch",
            &Strategy::RoundRobin,
            &[resolution(host, &["10.2.0.1"], false)],
        );
        assert!(!has_series("failover_primary", host));
        assert!(has_series("healthy_records", host));
    }

    #[test]
    fn test_removed_host_loses_its_series() {
        let kept = "kept.cloud.example.com";
        let dropped = "dropped.cloud.example.com";
        let failover = Strategy::Failover {
            primary_geotag: "eu".to_string(),
        };

        update_strategy_status(
            "hosts-ns",
            "hosts",
            &failover,
            &[
                resolution(kept, &["10.3.0.1"], true),
                resolution(dropped, &["10.3.0.2"], true),
            ],
        );
        assert!(has_series("host_health", dropped));

        update_strategy_status(
            "hosts-ns",
            "hosts",
            &failover,
            &[resolution(kept, &["10.3.0.1"], true)],
        );

        for metric in ["healthy_records", "host_health", "failover_primary"] {
            assert!(!has_series(metric, dropped), "{metric} still reports {dropped}");
            assert!(has_series(metric, kept), "{metric} lost {kept}");
        }
    }

    #[test]
    fn test_clear_strategy_status() {
        let host = "cleared.cloud.example.com";
        let failover = Strategy::Failover {
            primary_geotag: "eu".to_string(),
        };
        update_strategy_status(
            "clear-ns",
            "cleared",
            &failover,
            &[resolution(host, &["10.4.0.1"], false)],
        );

        clear_strategy_status("clear-ns", "cleared");

        for metric in ["healthy_records", "host_health", "failover_primary"] {
            assert!(!has_series(metric, host), "{metric} still reports {host}");
        }
        // Clearing an unknown Ingress is a no-op
        clear_strategy_status("clear-ns", "never-reconciled");
    }

    #[test]
    fn test_gather_metrics() {
        record_reconciliation_success("GatherTest", Duration::from_millis(100));

        let metrics_text = gather_metrics().unwrap();
        assert!(
            metrics_text.contains("gslb_firestoned_io"),
            "Metrics should contain namespace prefix"
        );
        assert!(
            metrics_text.contains("reconciliations_total"),
            "Metrics should contain reconciliation counter"
        );
    }

    #[tokio::test]
    async fn test_metrics_handler() {
        record_reconciliation_success("HandlerTest", Duration::from_millis(10));

        let response = metrics_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
