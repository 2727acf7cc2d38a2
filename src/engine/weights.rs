// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Weighted labels describing which final targets carry a configured weight.

use std::collections::BTreeMap;

use super::targets::TargetSet;
use crate::labels::WEIGHT_LABEL_PREFIX;

/// Label key for the address at `index` of `region` configured with `weight`.
#[must_use]
pub fn weight_label_key(region: &str, index: usize, weight: u32) -> String {
    format!("{WEIGHT_LABEL_PREFIX}-{region}-{index}-{weight}")
}

/// Build `weight-<region>-<index>-<weight>` → address labels.
///
/// Only regions that are both weighted and present in `targets` contribute;
/// a weighted region without final targets is skipped.
#[must_use]
pub fn weight_labels(
    weights: &BTreeMap<String, u32>,
    targets: &TargetSet,
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    for (region, weight) in weights {
        let Some(addresses) = targets.region(region) else {
            continue;
        };
        for (index, address) in addresses.iter().enumerate() {
            labels.insert(weight_label_key(region, index, *weight), address.clone());
        }
    }
    labels
}

#[cfg(test)]
#[path = "weights_tests.rs"]
mod weights_tests;
