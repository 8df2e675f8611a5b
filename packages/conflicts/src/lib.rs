#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Checkpoint conflict detection.
//!
//! Multiple jeepneys idling at one checkpoint must be presented to
//! passengers in a fixed order. A driver "is at" a checkpoint when it is
//! their most recent scan and it happened inside the detection window;
//! qualifiers are ordered first-arrived-first-served and given spaced
//! estimated departures so displays can tell "next" from "following".
//! Zero or one qualifier is the common case, not an error.

use chrono::{DateTime, Duration, Utc};
use jeepney_database::queries;
use jeepney_database_models::DriverPositionRow;
use serde::{Deserialize, Serialize};
use switchy_database::Database;
use thiserror::Error;

/// Detection window when the caller does not supply one.
pub const DEFAULT_WINDOW_MINUTES: i64 = 10;

/// Fixed spacing between consecutive estimated departures.
pub const DEPARTURE_SPACING_MINUTES: i64 = 5;

/// Errors that can occur during conflict detection.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Db(#[from] jeepney_database::DbError),

    /// The checkpoint id does not exist.
    #[error("Checkpoint {checkpoint_id} not found")]
    CheckpointNotFound {
        /// The unknown checkpoint.
        checkpoint_id: i32,
    },
}

/// One driver present at the checkpoint, with their queue slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedDriver {
    /// The present driver.
    pub driver_id: i64,
    /// When they scanned in.
    pub scanned_at: DateTime<Utc>,
    /// 1-based queue position (1 = first arrived, departs next).
    pub position: u32,
    /// Estimated departure assigned from the queue position.
    pub estimated_departure: DateTime<Utc>,
}

/// The drivers present at a checkpoint, in departure order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Checkpoint examined.
    pub checkpoint_id: i32,
    /// `true` when more than one driver is present.
    pub has_conflict: bool,
    /// Present drivers ordered by arrival.
    pub ordered_drivers: Vec<OrderedDriver>,
}

/// Orders present drivers by arrival and assigns departure slots.
///
/// Departures are `now + spacing`, `now + 2*spacing`, ... so offsets are
/// strictly increasing even for drivers who scanned in the same second.
#[must_use]
pub fn order_drivers(
    positions: &[DriverPositionRow],
    now: DateTime<Utc>,
    spacing_minutes: i64,
) -> Vec<OrderedDriver> {
    let mut sorted: Vec<&DriverPositionRow> = positions.iter().collect();
    sorted.sort_by_key(|p| p.scanned_at);

    sorted
        .iter()
        .enumerate()
        .map(|(idx, position)| {
            let slot = i64::try_from(idx).unwrap_or(i64::MAX) + 1;
            OrderedDriver {
                driver_id: position.driver_id,
                scanned_at: position.scanned_at,
                position: u32::try_from(slot).unwrap_or(u32::MAX),
                estimated_departure: now + Duration::minutes(slot * spacing_minutes),
            }
        })
        .collect()
}

/// Detects whether multiple drivers are present at a checkpoint.
///
/// Queries current positions (most recent scan per driver) at the
/// checkpoint within `window_minutes` of `now` and orders qualifiers by
/// arrival.
///
/// # Errors
///
/// Returns [`ConflictError::CheckpointNotFound`] for an unknown
/// checkpoint id or [`ConflictError::Db`] if a query fails.
pub async fn detect_conflicts(
    db: &dyn Database,
    checkpoint_id: i32,
    window_minutes: i64,
    now: DateTime<Utc>,
) -> Result<ConflictReport, ConflictError> {
    if queries::get_checkpoint(db, checkpoint_id).await?.is_none() {
        return Err(ConflictError::CheckpointNotFound { checkpoint_id });
    }

    let since = now - Duration::minutes(window_minutes);
    let positions = queries::current_positions_at(db, checkpoint_id, since).await?;
    let ordered_drivers = order_drivers(&positions, now, DEPARTURE_SPACING_MINUTES);
    let has_conflict = ordered_drivers.len() > 1;

    if has_conflict {
        log::info!(
            "Checkpoint {checkpoint_id}: {} drivers present within {window_minutes} minutes",
            ordered_drivers.len()
        );
    }

    Ok(ConflictReport {
        checkpoint_id,
        has_conflict,
        ordered_drivers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn position(driver_id: i64, scanned_at: DateTime<Utc>) -> DriverPositionRow {
        DriverPositionRow {
            driver_id,
            checkpoint_id: 7,
            route_id: 1,
            scanned_at,
        }
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 8, minute, 0).unwrap()
    }

    #[test]
    fn orders_three_drivers_by_arrival() {
        let now = at(5);
        // Deliberately out of order: second arrival listed first.
        let positions = vec![position(22, at(2)), position(11, at(0)), position(33, at(4))];

        let ordered = order_drivers(&positions, now, DEPARTURE_SPACING_MINUTES);

        assert_eq!(
            ordered.iter().map(|d| d.driver_id).collect::<Vec<_>>(),
            vec![11, 22, 33]
        );
        assert_eq!(
            ordered.iter().map(|d| d.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn departure_offsets_strictly_increase() {
        let now = at(5);
        let positions = vec![position(1, at(0)), position(2, at(2)), position(3, at(4))];

        let ordered = order_drivers(&positions, now, DEPARTURE_SPACING_MINUTES);

        for pair in ordered.windows(2) {
            assert!(pair[1].estimated_departure > pair[0].estimated_departure);
        }
        assert_eq!(ordered[0].estimated_departure, now + Duration::minutes(5));
        assert_eq!(ordered[2].estimated_departure, now + Duration::minutes(15));
    }

    #[test]
    fn simultaneous_scans_still_get_distinct_slots() {
        let now = at(5);
        let positions = vec![position(1, at(3)), position(2, at(3))];

        let ordered = order_drivers(&positions, now, DEPARTURE_SPACING_MINUTES);

        assert_ne!(ordered[0].estimated_departure, ordered[1].estimated_departure);
    }

    #[test]
    fn single_driver_gets_the_first_slot() {
        let now = at(5);
        let ordered = order_drivers(&[position(1, at(0))], now, DEPARTURE_SPACING_MINUTES);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].position, 1);
        assert_eq!(ordered[0].estimated_departure, now + Duration::minutes(5));
    }
}
