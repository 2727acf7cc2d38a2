// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Peer cluster lookups over DNS.
//!
//! Every cluster publishes the addresses it exposes a host on as the
//! `localtargets-<host>` record, served by its own nameserver. This module
//! queries that record on every peer nameserver and groups the answers by the
//! peer's region tag.
//!
//! Peer nameservers are named after their region and the delegated zone:
//!
//! ```text
//! gslb-ns-<geotag>-<dns zone without edge zone, dots as dashes>.<edge zone>
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use futures::future::join_all;
use hickory_client::client::{Client, SyncClient};
use hickory_client::rr::{DNSClass, Name, RData, RecordType};
use hickory_client::udp::UdpClientConnection;
use tracing::{debug, warn};

use crate::constants::PEER_NAMESERVER_PREFIX;
use crate::engine::endpoint::local_targets_name;
use crate::engine::{ExternalTargets, TargetSet};
use crate::gslb_errors::PeerLookupError;

/// Nameserver name of the peer cluster tagged `geotag`.
///
/// # Example
///
/// ```
/// use gslb::peers::nameserver_name;
///
/// assert_eq!(
///     nameserver_name("us", "cloud.example.com", "example.com"),
///     "gslb-ns-us-cloud.example.com"
/// );
/// ```
#[must_use]
pub fn nameserver_name(geotag: &str, dns_zone: &str, edge_dns_zone: &str) -> String {
    let suffix = format!(".{edge_dns_zone}");
    let prefix = dns_zone.strip_suffix(&suffix).unwrap_or(dns_zone);
    format!(
        "{PEER_NAMESERVER_PREFIX}-{geotag}-{}.{edge_dns_zone}",
        prefix.replace('.', "-")
    )
}

/// [`ExternalTargets`] backed by DNS queries to every peer cluster's nameserver.
#[derive(Clone, Debug)]
pub struct DnsExternalTargets {
    peer_geotags: Vec<String>,
    dns_zone: String,
    edge_dns_zone: String,
    port: u16,
    timeout: Duration,
}

impl DnsExternalTargets {
    #[must_use]
    pub fn new(
        peer_geotags: Vec<String>,
        dns_zone: impl Into<String>,
        edge_dns_zone: impl Into<String>,
        port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            peer_geotags,
            dns_zone: dns_zone.into(),
            edge_dns_zone: edge_dns_zone.into(),
            port,
            timeout,
        }
    }

    /// Addresses the peer tagged `geotag` publishes for `host`, sorted.
    ///
    /// # Errors
    ///
    /// Returns a [`PeerLookupError`] if the peer nameserver does not resolve or
    /// the query fails.
    pub async fn query_peer(&self, geotag: &str, host: &str) -> Result<Vec<String>, PeerLookupError> {
        let nameserver = nameserver_name(geotag, &self.dns_zone, &self.edge_dns_zone);
        let server = resolve_nameserver(&nameserver, self.port).await?;
        let fqdn = local_targets_name(host);

        let mut addresses = query_a_records(server, fqdn, self.timeout).await?;
        addresses.sort();
        Ok(addresses)
    }
}

#[async_trait::async_trait]
impl ExternalTargets for DnsExternalTargets {
    async fn external_targets(&self, host: &str) -> Result<TargetSet, PeerLookupError> {
        let targets =
            gather_peer_targets(&self.peer_geotags, host, |geotag| self.query_peer(geotag, host))
                .await;
        Ok(targets)
    }
}

/// Query every peer at once and collect the answers in peer order.
///
/// A failing peer is logged and left out.
async fn gather_peer_targets<'a, F, Fut>(
    peer_geotags: &'a [String],
    host: &str,
    query: F,
) -> TargetSet
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = Result<Vec<String>, PeerLookupError>>,
{
    let answers = join_all(peer_geotags.iter().map(|geotag| query(geotag.as_str()))).await;

    let mut targets = TargetSet::new();
    for (geotag, answer) in peer_geotags.iter().zip(answers) {
        match answer {
            Ok(addresses) => {
                debug!(geotag = %geotag, host = %host, addresses = ?addresses, "Peer targets");
                targets.append(geotag, addresses);
            }
            Err(e) => {
                warn!(geotag = %geotag, host = %host, error = %e, "Skipping unreachable peer cluster");
            }
        }
    }
    targets
}

async fn resolve_nameserver(nameserver: &str, port: u16) -> Result<SocketAddr, PeerLookupError> {
    let resolution_error = |reason: String| PeerLookupError::NameserverResolution {
        nameserver: nameserver.to_string(),
        reason,
    };

    let mut addrs = tokio::net::lookup_host((nameserver, port))
        .await
        .map_err(|e| resolution_error(e.to_string()))?;
    addrs
        .next()
        .ok_or_else(|| resolution_error("no addresses".to_string()))
}

/// Query the A records of `fqdn` on `server`.
///
/// hickory's sync client blocks, so the query runs on the blocking pool.
///
/// # Errors
///
/// Returns [`PeerLookupError::QueryFailed`] if the name is invalid or the query
/// fails or times out, and [`PeerLookupError::Task`] if the blocking task dies.
pub async fn query_a_records(
    server: SocketAddr,
    fqdn: String,
    timeout: Duration,
) -> Result<Vec<String>, PeerLookupError> {
    tokio::task::spawn_blocking(move || {
        let query_failed = |reason: String| PeerLookupError::QueryFailed {
            fqdn: fqdn.clone(),
            server: server.to_string(),
            reason,
        };

        let mut name = Name::from_str(&fqdn).map_err(|e| query_failed(e.to_string()))?;
        name.set_fqdn(true);

        let conn = UdpClientConnection::with_timeout(server, timeout)
            .map_err(|e| query_failed(e.to_string()))?;
        let client = SyncClient::new(conn);
        let response = client
            .query(&name, DNSClass::IN, RecordType::A)
            .map_err(|e| query_failed(e.to_string()))?;

        Ok(response
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                Some(RData::A(ip)) => Some(ip.to_string()),
                _ => None,
            })
            .collect())
    })
    .await?
}

#[cfg(test)]
#[path = "peers_tests.rs"]
mod peers_tests;
