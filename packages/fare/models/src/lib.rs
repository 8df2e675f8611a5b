#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fare tier configuration and resolution result types.

use jeepney_transit_models::FareMethod;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Rounds a peso amount to the nearest centavo.
#[must_use]
pub fn round_to_centavo(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Reference points of the tiered distance fare scale.
///
/// Fares between the reference segment counts are linear interpolations,
/// so the whole scale is described by four amounts and two breakpoints.
/// The defaults match the fleet's current LTFRB-derived scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareTiers {
    /// Minimum fare; also the 0- and 1-segment price.
    pub base_fare: f64,
    /// Fixed price for exactly 2 segments.
    pub short_hop_fare: f64,
    /// Price at `medium_segments` distance.
    pub medium_fare: f64,
    /// Price at `long_segments` distance; distances beyond clamp here.
    pub long_fare: f64,
    /// Segment count where the medium ceiling applies.
    pub medium_segments: i32,
    /// Segment count where the long ceiling applies.
    pub long_segments: i32,
}

impl Default for FareTiers {
    fn default() -> Self {
        Self {
            base_fare: 13.0,
            short_hop_fare: 15.0,
            medium_fare: 30.0,
            long_fare: 50.0,
            medium_segments: 12,
            long_segments: 16,
        }
    }
}

/// A resolved fare and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareResolution {
    /// Fare amount in pesos, rounded to the centavo.
    pub amount: f64,
    /// Whether the pair prices at the base fare.
    pub is_base_fare: bool,
    /// Which resolution rule fired.
    pub method: FareMethod,
}

/// What an upsert actually did to the primary route's entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsertKind {
    /// No active entry existed; one was inserted.
    Created,
    /// An active entry existed with a different amount; it was updated.
    Updated,
    /// The active entry already carried this amount; nothing was written.
    Unchanged,
}

/// Result of a fare entry upsert, including the mirroring outcome.
///
/// `mirrored = false` is a degraded success: the primary write stands but
/// the opposite route's checkpoints could not be located by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    /// What happened on the primary route.
    pub kind: UpsertKind,
    /// Whether the opposite-direction entry was written too.
    pub mirrored: bool,
}

/// Result of bulk matrix generation for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixGeneration {
    /// Active entries written for the route.
    pub entries_written: usize,
    /// Previous-generation entries marked inactive.
    pub entries_deactivated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_centavo() {
        assert!((round_to_centavo(16.333_333) - 16.33).abs() < f64::EPSILON);
        assert!((round_to_centavo(16.335) - 16.34).abs() < f64::EPSILON);
    }

    #[test]
    fn default_tiers_match_reference_scale() {
        let tiers = FareTiers::default();
        assert!((tiers.base_fare - 13.0).abs() < f64::EPSILON);
        assert!((tiers.long_fare - 50.0).abs() < f64::EPSILON);
        assert_eq!(tiers.long_segments, 16);
    }
}
