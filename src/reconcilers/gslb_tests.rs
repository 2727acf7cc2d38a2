// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `gslb.rs`

use super::*;
use serde_json::json;

fn ingress(name: &str, namespace: &str, service: &str) -> Ingress {
    serde_json::from_value(json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("{name}-uid"),
            "annotations": { "gslb.firestoned.io/strategy": "roundRobin" }
        },
        "spec": {
            "rules": [{
                "host": format!("{name}.cloud.example.com"),
                "http": { "paths": [{
                    "path": "/",
                    "pathType": "Prefix",
                    "backend": { "service": { "name": service, "port": { "number": 80 } } }
                }] }
            }]
        }
    }))
    .unwrap()
}

fn endpoints(name: &str, namespace: &str) -> Endpoints {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Endpoints",
        "metadata": { "name": name, "namespace": namespace }
    }))
    .unwrap()
}

#[test]
fn test_build_dns_endpoint_metadata() {
    let ingress = ingress("roundrobin", "test-gslb", "frontend-podinfo");
    let records = vec![Endpoint::a_record(
        "roundrobin.cloud.example.com",
        30,
        vec!["10.0.0.1".to_string()],
    )];

    let dns_endpoint = build_dns_endpoint(&ingress, records.clone()).unwrap();

    assert_eq!(dns_endpoint.name_any(), "roundrobin");
    assert_eq!(dns_endpoint.namespace().as_deref(), Some("test-gslb"));
    assert_eq!(
        dns_endpoint.labels().get(DNS_TYPE_LABEL).map(String::as_str),
        Some("local")
    );
    assert_eq!(
        dns_endpoint
            .annotations()
            .get(DNS_TYPE_LABEL)
            .map(String::as_str),
        Some("local")
    );
    assert_eq!(dns_endpoint.spec.endpoints, records);

    let owners = dns_endpoint.owner_references();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].kind, "Ingress");
    assert_eq!(owners[0].name, "roundrobin");
    assert_eq!(owners[0].uid, "roundrobin-uid");
    assert_eq!(owners[0].controller, Some(true));
}

#[test]
fn test_build_dns_endpoint_requires_uid() {
    let mut ingress = ingress("roundrobin", "test-gslb", "frontend-podinfo");
    ingress.metadata.uid = None;

    assert!(build_dns_endpoint(&ingress, vec![]).is_err());
}

#[test]
fn test_ingresses_for_endpoints() {
    let ingresses = vec![
        Arc::new(ingress("roundrobin", "test-gslb", "frontend-podinfo")),
        Arc::new(ingress("failover", "test-gslb", "frontend-podinfo")),
        Arc::new(ingress("other", "test-gslb", "backend")),
        Arc::new(ingress("elsewhere", "other-ns", "frontend-podinfo")),
    ];

    let refs = ingresses_for_endpoints(&ingresses, &endpoints("frontend-podinfo", "test-gslb"));

    let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["roundrobin", "failover"]);
    assert!(refs
        .iter()
        .all(|r| r.namespace.as_deref() == Some("test-gslb")));
}

#[test]
fn test_error_type() {
    let annotation: anyhow::Error = AnnotationError::MissingPrimaryGeotag {
        annotation: "gslb.firestoned.io/primary-geotag".to_string(),
    }
    .into();
    let zone: anyhow::Error = GslbError::ZoneMismatch {
        host: "app.other.io".to_string(),
        zone: "cloud.example.com".to_string(),
    }
    .into();

    assert_eq!(error_type(&annotation), "annotation_error");
    assert_eq!(error_type(&zone), "zone_mismatch");
    assert_eq!(error_type(&anyhow!("boom")), "unknown");
}

#[test]
fn test_is_owned_by() {
    let owner = ingress("roundrobin", "test-gslb", "frontend-podinfo");
    let dns_endpoint = build_dns_endpoint(&owner, vec![]).unwrap();

    assert!(is_owned_by(&dns_endpoint, &owner));

    // Same name, different object
    let mut recreated = owner.clone();
    recreated.metadata.uid = Some("recreated-uid".to_string());
    assert!(!is_owned_by(&dns_endpoint, &recreated));

    let mut unsaved = owner.clone();
    unsaved.metadata.uid = None;
    assert!(!is_owned_by(&dns_endpoint, &unsaved));

    let mut foreign = dns_endpoint.clone();
    foreign.metadata.owner_references = None;
    assert!(!is_owned_by(&foreign, &owner));
}

#[test]
fn test_forget_deleted_ingress_clears_status() {
    use crate::engine::{HealthStatus, Resolution, Strategy, TargetSet};
    use crate::metrics::{gather_metrics, update_strategy_status};

    let host = "deleted.cloud.example.com";
    update_strategy_status(
        "deleted-ns",
        "deleted",
        &Strategy::Failover {
            primary_geotag: "eu".to_string(),
        },
        &[Resolution {
            host: host.to_string(),
            targets: TargetSet::new(),
            addresses: vec!["10.5.0.1".to_string()],
            is_primary: true,
            health: HealthStatus::Healthy,
        }],
    );
    assert!(gather_metrics().unwrap().contains(host));

    let deleted = ObjectRef::<Ingress>::new("deleted").within("deleted-ns");
    forget_deleted_ingress(&deleted.erase());

    assert!(!gather_metrics().unwrap().contains(host));
}
