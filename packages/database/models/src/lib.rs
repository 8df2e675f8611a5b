#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Storage row types and query parameter definitions.
//!
//! These types represent the shapes of data as stored in and retrieved
//! from the database. They are distinct from the API response types in
//! `jeepney_server_models`: rows carry storage concerns (surrogate ids,
//! status columns, audit timestamps) that the API layer does not expose
//! verbatim.

use chrono::{DateTime, NaiveDate, Utc};
use jeepney_transit_models::{CompletionReason, FareEntryStatus, TripStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One directed traversal of a physical jeepney line.
///
/// Each physical line has exactly two route rows, linked through
/// `opposite_route_id`, one per travel direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRow {
    /// Route identifier.
    pub id: i32,
    /// Human-readable route name (e.g. `"EPZA — SM Dasmariñas"`).
    pub name: String,
    /// The route covering the same line in the opposite direction.
    pub opposite_route_id: Option<i32>,
}

/// A named, sequence-ordered stop along a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRow {
    /// Checkpoint identifier.
    pub id: i32,
    /// Owning route.
    pub route_id: i32,
    /// Display name as printed on QR signage.
    pub name: String,
    /// Position along the route; strictly increasing, unique per route.
    pub sequence_position: i32,
    /// Whether this checkpoint is the route origin.
    pub is_origin: bool,
    /// Whether this checkpoint is a route destination.
    pub is_destination: bool,
}

/// Resolves a checkpoint name against a route's checkpoint list.
///
/// Tries exact name equality first, then alias/prefix equivalence through
/// `jeepney_alias`, so booking input like `"SM Dasma"` finds the
/// `"SM Dasmariñas"` checkpoint. Both the booking and the completion
/// logic resolve names through this single function.
#[must_use]
pub fn find_checkpoint_by_name<'a>(
    checkpoints: &'a [CheckpointRow],
    name: &str,
    aliases: &std::collections::BTreeMap<String, String>,
) -> Option<&'a CheckpointRow> {
    checkpoints
        .iter()
        .find(|cp| cp.name == name)
        .or_else(|| {
            checkpoints
                .iter()
                .find(|cp| jeepney_alias::names_equivalent(&cp.name, name, aliases))
        })
}

/// One price cell of the fare matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareEntryRow {
    /// Entry identifier.
    pub id: i64,
    /// Route the pair belongs to.
    pub route_id: i32,
    /// Boarding checkpoint.
    pub from_checkpoint_id: i32,
    /// Alighting checkpoint.
    pub to_checkpoint_id: i32,
    /// Fare amount in pesos.
    pub amount: f64,
    /// Whether this pair prices at the base fare (same-checkpoint pairs).
    pub is_base_fare: bool,
    /// Active entries participate in resolution; inactive are history.
    pub status: FareEntryStatus,
    /// When this price takes effect.
    pub effective_date: DateTime<Utc>,
    /// Optional expiry; expired entries are skipped during resolution.
    pub expiry_date: Option<DateTime<Utc>>,
}

/// A passenger's reservation and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRow {
    /// Globally unique trip identifier.
    pub trip_id: Uuid,
    /// Booking passenger.
    pub passenger_id: i64,
    /// Assigned driver.
    pub driver_id: i64,
    /// Route the trip rides on.
    pub route_id: i32,
    /// Pickup checkpoint name as declared at booking.
    pub pickup: String,
    /// Destination checkpoint name as declared at booking.
    pub destination: String,
    /// Fare agreed at booking time.
    pub fare: f64,
    /// Lifecycle state.
    pub status: TripStatus,
    /// Whether the destination name resolved to a checkpoint at booking
    /// time. When `false`, only exact-name completion can close the trip.
    pub destination_resolved: bool,
    /// When the trip was booked.
    pub booked_at: DateTime<Utc>,
    /// Stamped by the completing scan event.
    pub completed_at: Option<DateTime<Utc>>,
    /// Which completion rule fired, when completed.
    pub completion_reason: Option<CompletionReason>,
}

/// One immutable line of the earnings ledger.
///
/// Rows are append-only: never updated or deleted after creation. All
/// earnings figures are derived from these rows plus an `as_of` instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Ledger row identifier.
    pub id: i64,
    /// Earning driver.
    pub driver_id: i64,
    /// Trip that produced the earning, when applicable.
    pub trip_id: Option<Uuid>,
    /// Paying passenger, when applicable.
    pub passenger_id: Option<i64>,
    /// Fare before discounts.
    pub original_fare: f64,
    /// Discount applied (student/senior/PWD).
    pub discount_amount: f64,
    /// Amount actually received.
    pub final_fare: f64,
    /// Whether this row increments the driver's trip counter. Fare-only
    /// payments set this `false` so revenue and trip stats stay decoupled.
    pub counts_as_trip: bool,
    /// Business day the earning belongs to (05:00 boundary, stamped at
    /// write time).
    pub transaction_date: NaiveDate,
    /// Wall-clock creation instant.
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a new ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEarning {
    /// Earning driver.
    pub driver_id: i64,
    /// Trip that produced the earning, when applicable.
    pub trip_id: Option<Uuid>,
    /// Paying passenger, when applicable.
    pub passenger_id: Option<i64>,
    /// Fare before discounts.
    pub original_fare: f64,
    /// Discount applied.
    pub discount_amount: f64,
    /// Amount actually received.
    pub final_fare: f64,
    /// Whether the row increments the trip counter.
    pub counts_as_trip: bool,
    /// Business day stamped by the caller (see `jeepney_earnings`).
    pub transaction_date: NaiveDate,
}

/// One checkpoint-scan fact for a driver.
///
/// Positions are a keyed fact table: every scan inserts a new row and the
/// "current" position of a driver is the most recent fact, recomputed on
/// read. Rows are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverPositionRow {
    /// Scanning driver.
    pub driver_id: i64,
    /// Scanned checkpoint.
    pub checkpoint_id: i32,
    /// Route the checkpoint belongs to.
    pub route_id: i32,
    /// When the scan happened.
    pub scanned_at: DateTime<Utc>,
}

/// A driver's on-duty period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRow {
    /// Shift identifier.
    pub id: i64,
    /// Driver on duty.
    pub driver_id: i64,
    /// Shift start instant.
    pub started_at: DateTime<Utc>,
    /// Shift end instant; `None` while the shift is open.
    pub ended_at: Option<DateTime<Utc>>,
    /// Business day the shift belongs to.
    pub business_date: NaiveDate,
    /// Trip-count snapshot taken when the shift closed.
    pub trips_total: i64,
    /// Earnings snapshot taken when the shift closed.
    pub earnings_total: f64,
}

/// Parameters for querying a driver's open trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTripsQuery {
    /// Driver whose trips to fetch.
    pub driver_id: i64,
    /// Restrict to trips on this route.
    pub route_id: i32,
    /// Only trips booked at or after this instant (look-back bound, so
    /// stale trips from a previous shift never match a fresh scan).
    pub booked_after: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn checkpoint(id: i32, name: &str, seq: i32) -> CheckpointRow {
        CheckpointRow {
            id,
            route_id: 1,
            name: name.to_string(),
            sequence_position: seq,
            is_origin: seq == 1,
            is_destination: false,
        }
    }

    #[test]
    fn finds_checkpoint_by_exact_name() {
        let checkpoints = vec![checkpoint(1, "SM Epza", 1), checkpoint(2, "Tejero", 2)];
        let found =
            find_checkpoint_by_name(&checkpoints, "Tejero", &BTreeMap::new()).expect("found");
        assert_eq!(found.id, 2);
    }

    #[test]
    fn finds_checkpoint_through_alias_pipeline() {
        let checkpoints = vec![
            checkpoint(1, "SM Epza", 1),
            checkpoint(17, "SM Dasmariñas", 17),
        ];
        let found = find_checkpoint_by_name(&checkpoints, "SM Dasma", &BTreeMap::new())
            .expect("alias resolves");
        assert_eq!(found.id, 17);
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        let checkpoints = vec![checkpoint(1, "SM Epza", 1)];
        assert!(find_checkpoint_by_name(&checkpoints, "Zapote", &BTreeMap::new()).is_none());
    }
}
