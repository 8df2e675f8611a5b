//! Scan-driven trip completion.
//!
//! Drivers do not scan every checkpoint, so completion cannot wait for an
//! exact destination scan: a trip also completes when the driver's
//! scanned sequence position reaches or passes the destination's
//! (pass-through). Destination names resolve through the alias pipeline,
//! absorbing data-entry variants of the same place.

use std::collections::BTreeMap;

use chrono::Duration;
use jeepney_database::queries;
use jeepney_database_models::{
    CheckpointRow, DriverPositionRow, OpenTripsQuery, find_checkpoint_by_name,
};
use jeepney_transit_models::{CompletionReason, TripStatus};
use jeepney_trips_models::{CompletedTrip, ScanEvent, ScanOutcome, TripEngineConfig};
use switchy_database::Database;

use crate::TripError;

/// Decides whether a scan at `scanned` completes a trip bound for
/// `destination`.
///
/// Rules, in order:
/// 1. Exact name equality between the scanned checkpoint and the declared
///    destination.
/// 2. Pass-through: the destination resolves (exactly or through the
///    alias pipeline) to a sequence position on the route, and the
///    scanned position is at or beyond it.
///
/// A destination that resolves to no checkpoint cannot pass-through
/// complete; `None` for an in-transit scan is the expected steady state.
#[must_use]
pub fn completion_for(
    destination: &str,
    scanned: &CheckpointRow,
    route_checkpoints: &[CheckpointRow],
    aliases: &BTreeMap<String, String>,
) -> Option<CompletionReason> {
    if scanned.name == destination {
        return Some(CompletionReason::ExactName);
    }

    let destination_cp = find_checkpoint_by_name(route_checkpoints, destination, aliases)?;
    if scanned.sequence_position >= destination_cp.sequence_position {
        return Some(CompletionReason::PassThrough);
    }

    None
}

/// Processes one checkpoint-scan event.
///
/// Records the position fact, then re-evaluates the driver's open trips
/// on the scanned route (bounded by the configured look-back window):
/// trips satisfying a completion rule are closed with a conditional
/// write, and booked trips that are merely in transit are promoted to
/// in-progress. Re-processing the same event affects zero rows.
///
/// # Errors
///
/// Returns [`TripError::CheckpointNotFound`] for an unknown checkpoint id
/// or [`TripError::Db`] if a query fails.
pub async fn record_scan(
    db: &dyn Database,
    event: &ScanEvent,
    config: &TripEngineConfig,
) -> Result<ScanOutcome, TripError> {
    let checkpoint = queries::get_checkpoint(db, event.checkpoint_id)
        .await?
        .ok_or(TripError::CheckpointNotFound {
            checkpoint_id: event.checkpoint_id,
        })?;

    if let Some(coords) = event.coordinates {
        log::debug!(
            "Scan by driver {} at '{}' reported coordinates ({}, {})",
            event.driver_id,
            checkpoint.name,
            coords.lat,
            coords.lng
        );
    }

    queries::insert_position(
        db,
        &DriverPositionRow {
            driver_id: event.driver_id,
            checkpoint_id: checkpoint.id,
            route_id: checkpoint.route_id,
            scanned_at: event.scanned_at,
        },
    )
    .await?;

    let candidates = queries::find_open_trips(
        db,
        &OpenTripsQuery {
            driver_id: event.driver_id,
            route_id: checkpoint.route_id,
            booked_after: event.scanned_at - Duration::hours(config.lookback_hours),
        },
    )
    .await?;

    if candidates.is_empty() {
        return Ok(ScanOutcome::default());
    }

    let route_checkpoints = queries::list_checkpoints(db, checkpoint.route_id).await?;
    let aliases =
        jeepney_alias::build_alias_map(queries::list_checkpoint_aliases(db).await?);

    let mut outcome = ScanOutcome::default();

    for trip in &candidates {
        match completion_for(&trip.destination, &checkpoint, &route_checkpoints, &aliases) {
            Some(reason) => {
                if queries::complete_trip_if_open(db, trip.trip_id, event.scanned_at, reason)
                    .await?
                {
                    log::info!(
                        "Trip {} completed at '{}' via {}",
                        trip.trip_id,
                        checkpoint.name,
                        reason.as_ref()
                    );
                    outcome.completed.push(CompletedTrip {
                        trip_id: trip.trip_id,
                        reason,
                    });
                }
            }
            None => {
                if trip.status == TripStatus::Booked
                    && queries::mark_trip_in_progress(db, trip.trip_id).await?
                {
                    outcome.promoted.push(trip.trip_id);
                }
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint(id: i32, name: &str, seq: i32) -> CheckpointRow {
        CheckpointRow {
            id,
            route_id: 1,
            name: name.to_string(),
            sequence_position: seq,
            is_origin: seq == 1,
            is_destination: seq == 17,
        }
    }

    fn route() -> Vec<CheckpointRow> {
        vec![
            checkpoint(1, "SM Epza", 1),
            checkpoint(2, "Tejero", 3),
            checkpoint(3, "Bacao", 6),
            checkpoint(4, "Pala-Pala", 15),
            checkpoint(5, "SM Dasmariñas", 17),
        ]
    }

    fn no_aliases() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn exact_name_scan_completes() {
        let route = route();
        let scanned = &route[4];
        assert_eq!(
            completion_for("SM Dasmariñas", scanned, &route, &no_aliases()),
            Some(CompletionReason::ExactName)
        );
    }

    #[test]
    fn fuzzy_variant_completes_via_pass_through_not_exact_match() {
        // Catalog carries the truncated variant; the trip declared the
        // full name. The names are alias-equivalent, so the destination
        // resolves to the scanned stop and the pass-through rule fires.
        let mut route = route();
        route[4] = checkpoint(5, "SM Dasma", 17);
        let scanned = route[4].clone();
        assert_eq!(
            completion_for("SM Dasmariñas", &scanned, &route, &no_aliases()),
            Some(CompletionReason::PassThrough)
        );
    }

    #[test]
    fn scanning_past_the_destination_completes() {
        let route = route();
        let scanned = &route[4]; // seq 17
        assert_eq!(
            completion_for("Pala-Pala", scanned, &route, &no_aliases()),
            Some(CompletionReason::PassThrough)
        );
    }

    #[test]
    fn scan_before_the_destination_leaves_the_trip_open() {
        let route = route();
        let scanned = &route[2]; // Bacao, seq 6
        assert_eq!(
            completion_for("Pala-Pala", scanned, &route, &no_aliases()),
            None
        );
    }

    #[test]
    fn unresolved_destination_never_passes_through() {
        let route = route();
        let scanned = &route[4]; // end of the line
        assert_eq!(
            completion_for("Somewhere Unknown", scanned, &route, &no_aliases()),
            None
        );
    }

    #[test]
    fn unresolved_destination_still_completes_on_exact_name() {
        // The declared destination matches no catalog row except by
        // byte-for-byte name equality with the scanned stop itself.
        let mut route = route();
        route.push(checkpoint(6, "Bagong Bayan Ext", 18));
        let scanned = route[5].clone();
        let mut catalog = route.clone();
        catalog.remove(5);
        assert_eq!(
            completion_for("Bagong Bayan Ext", &scanned, &catalog, &no_aliases()),
            Some(CompletionReason::ExactName)
        );
    }
}
