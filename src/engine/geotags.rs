// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Failover priority ordering of region tags.

use std::collections::BTreeSet;

/// Split a declared primary order (`"us, eu"`) into trimmed tags.
///
/// An empty string yields no tags. Anything else is kept verbatim, including
/// empty segments and duplicates.
#[must_use]
pub fn parse_declared_order(declared: &str) -> Vec<String> {
    if declared.is_empty() {
        return Vec::new();
    }
    declared
        .split(',')
        .map(|tag| tag.trim().to_string())
        .collect()
}

/// Build the failover priority list for this cluster.
///
/// The region universe is the peer tags plus the local tag. Declared tags come
/// first, in the given order and unvalidated; every universe member that was not
/// declared follows in ascending lexicographic order.
///
/// # Example
///
/// ```
/// use gslb::engine::geotags::failover_order;
///
/// let peers: Vec<String> = ["eu", "za", "uk", "cz"].iter().map(|t| t.to_string()).collect();
/// assert_eq!(
///     failover_order("us", &peers, "us, eu"),
///     vec!["us", "eu", "cz", "uk", "za"]
/// );
/// ```
#[must_use]
pub fn failover_order(local_geotag: &str, peer_geotags: &[String], declared: &str) -> Vec<String> {
    let mut remaining: BTreeSet<&str> = peer_geotags.iter().map(String::as_str).collect();
    remaining.insert(local_geotag);

    let mut order = parse_declared_order(declared);
    for tag in &order {
        remaining.remove(tag.as_str());
    }
    order.extend(remaining.into_iter().map(str::to_string));
    order
}

#[cfg(test)]
#[path = "geotags_tests.rs"]
mod geotags_tests;
