// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Region-keyed container of target addresses.
//!
//! Regions are kept in a `BTreeMap`, so iteration across regions is always in
//! ascending tag order and every derived output (flattened lists, labels) is
//! reproducible between reconciliations. Within a region, insertion order is kept.

use std::collections::BTreeMap;

/// Target addresses grouped by region tag.
///
/// No deduplication happens here: merging two sets keeps every address of both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetSet {
    regions: BTreeMap<String, Vec<String>>,
}

impl TargetSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append addresses under `region`, after any addresses already stored there.
    ///
    /// Appending nothing does not create the region.
    pub fn append<I, S>(&mut self, region: &str, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut addresses = addresses.into_iter().map(Into::into).peekable();
        if addresses.peek().is_none() {
            return;
        }
        self.regions
            .entry(region.to_string())
            .or_default()
            .extend(addresses);
    }

    /// Region-wise union: addresses of `other` go after the existing ones.
    pub fn merge(&mut self, other: &TargetSet) {
        for (region, addresses) in &other.regions {
            self.append(region, addresses.iter().cloned());
        }
    }

    /// Copy of this set with every region's addresses sorted.
    #[must_use]
    pub fn sorted(&self) -> TargetSet {
        let regions = self
            .regions
            .iter()
            .map(|(region, addresses)| {
                let mut addresses = addresses.clone();
                addresses.sort();
                (region.clone(), addresses)
            })
            .collect();
        TargetSet { regions }
    }

    /// All addresses, flattened and sorted lexicographically.
    ///
    /// Used where presentation order carries no priority (round robin, geo).
    #[must_use]
    pub fn sorted_addresses(&self) -> Vec<String> {
        let mut addresses = self.addresses();
        addresses.sort();
        addresses
    }

    /// All addresses, flattened in region order then insertion order.
    #[must_use]
    pub fn addresses(&self) -> Vec<String> {
        self.regions.values().flatten().cloned().collect()
    }

    /// Restrict the set to the first region of `priority` that has addresses.
    ///
    /// Returns the restricted set and the winning region, or an empty set and
    /// `None` when no listed region has any address.
    #[must_use]
    pub fn project_to_top_priority(&self, priority: &[String]) -> (TargetSet, Option<String>) {
        for region in priority {
            if let Some(addresses) = self.regions.get(region).filter(|a| !a.is_empty()) {
                let mut projected = TargetSet::new();
                projected.append(region, addresses.iter().cloned());
                return (projected, Some(region.clone()));
            }
        }
        (TargetSet::new(), None)
    }

    /// Addresses stored under `region`.
    #[must_use]
    pub fn region(&self, region: &str) -> Option<&[String]> {
        self.regions.get(region).map(Vec::as_slice)
    }

    /// Region tags present in the set, ascending.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// `(region, addresses)` pairs, ascending by region.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.regions
            .iter()
            .map(|(region, addresses)| (region.as_str(), addresses.as_slice()))
    }

    /// Total number of addresses across all regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R, A> FromIterator<(R, A)> for TargetSet
where
    R: AsRef<str>,
    A: IntoIterator,
    A::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (R, A)>>(iter: T) -> Self {
        let mut set = TargetSet::new();
        for (region, addresses) in iter {
            set.append(region.as_ref(), addresses);
        }
        set
    }
}

#[cfg(test)]
#[path = "targets_tests.rs"]
mod targets_tests;
