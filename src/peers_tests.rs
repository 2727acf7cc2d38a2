// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `peers.rs`

use super::*;

#[test]
fn test_nameserver_name() {
    assert_eq!(
        nameserver_name("eu", "cloud.example.com", "example.com"),
        "gslb-ns-eu-cloud.example.com"
    );
    assert_eq!(
        nameserver_name("za", "apps.cloud.example.com", "example.com"),
        "gslb-ns-za-apps-cloud.example.com"
    );
}

#[test]
fn test_nameserver_name_zone_not_under_edge() {
    // Whole zone is used as the prefix
    assert_eq!(
        nameserver_name("us", "cloud.other.io", "example.com"),
        "gslb-ns-us-cloud-other-io.example.com"
    );
}

#[tokio::test]
async fn test_query_a_records_unreachable_server() {
    let server: SocketAddr = "127.0.0.1:9".parse().unwrap();

    let result = query_a_records(
        server,
        "localtargets-app.cloud.example.com".to_string(),
        Duration::from_millis(200),
    )
    .await;

    assert!(matches!(result, Err(PeerLookupError::QueryFailed { .. })));
}

#[tokio::test]
async fn test_query_peer_unresolvable_nameserver() {
    let peers = DnsExternalTargets::new(
        vec!["us".to_string()],
        "cloud.example.invalid",
        "example.invalid",
        53,
        Duration::from_millis(200),
    );

    let result = peers.query_peer("us", "app.cloud.example.invalid").await;

    assert!(matches!(
        result,
        Err(PeerLookupError::NameserverResolution { .. })
    ));
}

#[tokio::test]
async fn test_external_targets_skips_failing_peers() {
    let peers = DnsExternalTargets::new(
        vec!["us".to_string(), "za".to_string()],
        "cloud.example.invalid",
        "example.invalid",
        53,
        Duration::from_millis(200),
    );

    let targets = peers
        .external_targets("app.cloud.example.invalid")
        .await
        .unwrap();

    assert!(targets.is_empty());
}

fn peers(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| (*t).to_string()).collect()
}

#[tokio::test]
async fn test_gather_peer_targets_queries_peers_concurrently() {
    let geotags = peers(&["us", "za", "cz"]);
    let delay = Duration::from_millis(300);

    let start = std::time::Instant::now();
    let targets = gather_peer_targets(&geotags, "app.cloud.example.com", |geotag| async move {
        tokio::time::sleep(delay).await;
        Ok(vec![format!("10.0.0.{}", geotag.len())])
    })
    .await;

    assert_eq!(targets.len(), 3);
    assert!(
        start.elapsed() < delay * 2,
        "peers were queried one after another: {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_gather_peer_targets_skips_failed_peers() {
    let geotags = peers(&["us", "za"]);

    let targets = gather_peer_targets(&geotags, "app.cloud.example.com", |geotag| async move {
        if geotag == "za" {
            Err(PeerLookupError::QueryFailed {
                fqdn: "localtargets-app.cloud.example.com".to_string(),
                server: "10.9.9.9:53".to_string(),
                reason: "timed out".to_string(),
            })
        } else {
            Ok(vec!["10.1.0.2".to_string(), "10.1.0.1".to_string()])
        }
    })
    .await;

    assert_eq!(
        targets.region("us"),
        Some(&["10.1.0.2".to_string(), "10.1.0.1".to_string()][..])
    );
    assert_eq!(targets.region("za"), None);
}
