// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Strategy configuration read from Ingress annotations.
//!
//! An Ingress opts into traffic steering by setting the strategy annotation.
//! The remaining annotations tune the selected strategy:
//!
//! ```yaml
//! metadata:
//!   annotations:
//!     gslb.firestoned.io/strategy: failover
//!     gslb.firestoned.io/primary-geotag: "us, eu"
//!     gslb.firestoned.io/weights: "eu:5,us:10"
//!     gslb.firestoned.io/dns-ttl-seconds: "60"
//! ```

use std::collections::BTreeMap;

use crate::constants::{
    DEFAULT_DNS_TTL_SECS, STRATEGY_FAILOVER, STRATEGY_GEOIP, STRATEGY_ROUND_ROBIN,
};
use crate::engine::{Strategy, StrategyConfig};
use crate::gslb_errors::AnnotationError;
use crate::labels::{
    ANNOTATION_DNS_TTL_SECONDS, ANNOTATION_PRIMARY_GEOTAG, ANNOTATION_STRATEGY,
    ANNOTATION_WEIGHTS,
};

/// Read the strategy configuration of an Ingress.
///
/// Returns `Ok(None)` when the strategy annotation is absent: the Ingress is not
/// managed.
///
/// # Errors
///
/// Returns an [`AnnotationError`] for an unknown strategy, a failover strategy
/// without primary geotag, or malformed weights or TTL.
pub fn strategy_config(
    annotations: &BTreeMap<String, String>,
) -> Result<Option<StrategyConfig>, AnnotationError> {
    let Some(strategy) = annotations.get(ANNOTATION_STRATEGY) else {
        return Ok(None);
    };

    let strategy = parse_strategy(strategy.trim(), annotations)?;
    let ttl_seconds = annotations
        .get(ANNOTATION_DNS_TTL_SECONDS)
        .map(|value| parse_ttl(value))
        .transpose()?
        .unwrap_or(DEFAULT_DNS_TTL_SECS);
    let weights = annotations
        .get(ANNOTATION_WEIGHTS)
        .map(|value| parse_weights(value))
        .transpose()?
        .unwrap_or_default();

    Ok(Some(
        StrategyConfig::new(strategy, ttl_seconds).with_weights(weights),
    ))
}

fn parse_strategy(
    value: &str,
    annotations: &BTreeMap<String, String>,
) -> Result<Strategy, AnnotationError> {
    match value {
        STRATEGY_ROUND_ROBIN => Ok(Strategy::RoundRobin),
        STRATEGY_GEOIP => Ok(Strategy::Geo),
        STRATEGY_FAILOVER => {
            let primary_geotag = annotations
                .get(ANNOTATION_PRIMARY_GEOTAG)
                .map(|v| v.to_lowercase())
                .unwrap_or_default();
            if primary_geotag.trim().is_empty() {
                return Err(AnnotationError::MissingPrimaryGeotag {
                    annotation: ANNOTATION_PRIMARY_GEOTAG.to_string(),
                });
            }
            Ok(Strategy::Failover { primary_geotag })
        }
        other => Err(AnnotationError::UnknownStrategy {
            annotation: ANNOTATION_STRATEGY.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Parse a `region:weight` list such as `"eu:5,us:10"`.
///
/// Empty entries are skipped, region names are lowercased.
///
/// # Errors
///
/// Returns [`AnnotationError::InvalidWeights`] for an entry without `:`, an
/// empty region, a non-integer weight, or a region listed twice.
pub fn parse_weights(value: &str) -> Result<BTreeMap<String, u32>, AnnotationError> {
    let invalid = |reason: String| AnnotationError::InvalidWeights {
        annotation: ANNOTATION_WEIGHTS.to_string(),
        value: value.to_string(),
        reason,
    };

    let mut weights = BTreeMap::new();
    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (region, weight) = entry
            .split_once(':')
            .ok_or_else(|| invalid(format!("entry '{entry}' is not region:weight")))?;
        let region = region.trim().to_lowercase();
        if region.is_empty() {
            return Err(invalid(format!("entry '{entry}' has an empty region")));
        }
        let weight: u32 = weight
            .trim()
            .parse()
            .map_err(|e| invalid(format!("weight of region {region}: {e}")))?;
        if weights.insert(region.clone(), weight).is_some() {
            return Err(invalid(format!("region {region} is listed more than once")));
        }
    }
    Ok(weights)
}

fn parse_ttl(value: &str) -> Result<u32, AnnotationError> {
    value
        .trim()
        .parse()
        .map_err(|_| AnnotationError::InvalidTtl {
            annotation: ANNOTATION_DNS_TTL_SECONDS.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
#[path = "annotations_tests.rs"]
mod annotations_tests;
