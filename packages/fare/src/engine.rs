//! Fare resolution: the fallback chain and the tiered distance formula.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use jeepney_database::queries;
use jeepney_database_models::{CheckpointRow, find_checkpoint_by_name};
use jeepney_fare_models::{FareResolution, FareTiers, round_to_centavo};
use jeepney_transit_models::FareMethod;
use switchy_database::Database;

use crate::FareError;

/// Computes the tiered fare for a segment distance.
///
/// - 0 or 1 segments price at the base fare.
/// - 2 segments price at the short-hop fare.
/// - 3 up to `medium_segments` interpolate linearly toward the medium
///   ceiling; `medium_segments + 1` up to `long_segments` interpolate
///   toward the long ceiling.
/// - Anything beyond `long_segments` clamps to the long ceiling.
///
/// Results round to the centavo.
#[must_use]
pub fn tiered_amount(tiers: &FareTiers, segments: i32) -> f64 {
    let amount = if segments <= 1 {
        tiers.base_fare
    } else if segments == 2 {
        tiers.short_hop_fare
    } else if segments <= tiers.medium_segments {
        let span = f64::from(tiers.medium_segments - 2);
        let step = f64::from(segments - 2);
        tiers.short_hop_fare + (tiers.medium_fare - tiers.short_hop_fare) * step / span
    } else if segments <= tiers.long_segments {
        let span = f64::from(tiers.long_segments - tiers.medium_segments);
        let step = f64::from(segments - tiers.medium_segments);
        tiers.medium_fare + (tiers.long_fare - tiers.medium_fare) * step / span
    } else {
        tiers.long_fare
    };

    round_to_centavo(amount)
}

/// Resolves both endpoint names against a route's checkpoint list.
///
/// # Errors
///
/// Returns [`FareError::Unresolvable`] naming whichever endpoint failed.
pub fn resolve_endpoints<'a>(
    route_id: i32,
    checkpoints: &'a [CheckpointRow],
    from: &str,
    to: &str,
    aliases: &BTreeMap<String, String>,
) -> Result<(&'a CheckpointRow, &'a CheckpointRow), FareError> {
    let from_cp = find_checkpoint_by_name(checkpoints, from, aliases).ok_or_else(|| {
        FareError::Unresolvable {
            route_id,
            name: from.to_string(),
        }
    })?;
    let to_cp = find_checkpoint_by_name(checkpoints, to, aliases).ok_or_else(|| {
        FareError::Unresolvable {
            route_id,
            name: to.to_string(),
        }
    })?;
    Ok((from_cp, to_cp))
}

/// Resolves the fare for a checkpoint pair on a route.
///
/// Fallback chain, each step reported through `method`:
/// 1. Active matrix entry for (route, from, to).
/// 2. Active matrix entry for (route, to, from).
/// 3. Tiered distance formula over the sequence-position delta.
///
/// # Errors
///
/// Returns [`FareError::RouteNotFound`] for an unknown route,
/// [`FareError::Unresolvable`] when an endpoint is not a checkpoint of
/// the route, or [`FareError::Db`] if a query fails.
pub async fn resolve_fare(
    db: &dyn Database,
    route_id: i32,
    from: &str,
    to: &str,
    tiers: &FareTiers,
    now: DateTime<Utc>,
) -> Result<FareResolution, FareError> {
    let checkpoints = queries::list_checkpoints(db, route_id).await?;
    if checkpoints.is_empty() {
        return Err(FareError::RouteNotFound { route_id });
    }

    let aliases =
        jeepney_alias::build_alias_map(queries::list_checkpoint_aliases(db).await?);

    let (from_cp, to_cp) = resolve_endpoints(route_id, &checkpoints, from, to, &aliases)?;

    if let Some(entry) =
        queries::find_active_fare_entry(db, route_id, from_cp.id, to_cp.id, now).await?
    {
        return Ok(FareResolution {
            amount: entry.amount,
            is_base_fare: entry.is_base_fare,
            method: FareMethod::ExactEntry,
        });
    }

    if let Some(entry) =
        queries::find_active_fare_entry(db, route_id, to_cp.id, from_cp.id, now).await?
    {
        return Ok(FareResolution {
            amount: entry.amount,
            is_base_fare: entry.is_base_fare,
            method: FareMethod::MirroredEntry,
        });
    }

    let segments = (to_cp.sequence_position - from_cp.sequence_position).abs();
    log::debug!(
        "No matrix entry for route {route_id} {from} -> {to}; synthesizing over {segments} segments"
    );

    Ok(FareResolution {
        amount: tiered_amount(tiers, segments),
        is_base_fare: segments <= 1,
        method: FareMethod::TieredDistance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers() -> FareTiers {
        FareTiers::default()
    }

    #[test]
    fn zero_and_one_segment_price_at_base() {
        assert!((tiered_amount(&tiers(), 0) - 13.0).abs() < f64::EPSILON);
        assert!((tiered_amount(&tiers(), 1) - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn two_segments_price_at_short_hop() {
        assert!((tiered_amount(&tiers(), 2) - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reference_points_match_scale() {
        assert!((tiered_amount(&tiers(), 12) - 30.0).abs() < f64::EPSILON);
        assert!((tiered_amount(&tiers(), 16) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn interpolated_amounts_round_to_centavo() {
        // 3 segments: 15 + 15 * (1/10) = 16.5
        assert!((tiered_amount(&tiers(), 3) - 16.5).abs() < f64::EPSILON);
        // 13 segments: 30 + 20 * (1/4) = 35
        assert!((tiered_amount(&tiers(), 13) - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distances_beyond_long_ceiling_clamp() {
        assert!((tiered_amount(&tiers(), 17) - 50.0).abs() < f64::EPSILON);
        assert!((tiered_amount(&tiers(), 40) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tiered_scale_is_monotonic_in_distance() {
        let tiers = tiers();
        let mut previous = 0.0;
        for segments in 0..=20 {
            let amount = tiered_amount(&tiers, segments);
            assert!(
                amount >= previous,
                "fare decreased at {segments} segments: {amount} < {previous}"
            );
            previous = amount;
        }
    }
}
