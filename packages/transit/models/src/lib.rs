#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Canonical transit taxonomy types for the jeepney fleet engine.
//!
//! This crate defines the shared status and method enums used across the
//! fare, trip, earnings, and conflict packages. All storage rows and API
//! payloads serialize these in `SCREAMING_SNAKE_CASE`, so the wire form,
//! the database form, and the `strum` string form are identical.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lifecycle state of a booked passenger trip.
///
/// Transitions are monotonic: `Booked → InProgress → Completed`, with
/// `Cancelled` reachable from either open state by explicit operator
/// action. There are no transitions out of `Completed` or `Cancelled`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    /// Reserved by a passenger, driver not yet past the destination.
    Booked,
    /// Driver has scanned at least one checkpoint since booking.
    InProgress,
    /// Closed by the scan-driven completion rule.
    Completed,
    /// Closed by explicit operator action.
    Cancelled,
}

impl TripStatus {
    /// The two states a scan event can still act on.
    pub const OPEN: &[Self] = &[Self::Booked, Self::InProgress];

    /// Returns `true` while the trip can still be completed or cancelled.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Booked | Self::InProgress)
    }

    /// Returns `true` once the trip has reached a terminal state.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        !self.is_open()
    }
}

/// Which rule produced a fare amount.
///
/// Every fare resolution reports the rule that fired so ambiguous results
/// stay explainable during audit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FareMethod {
    /// An active matrix entry exists for (route, from, to).
    ExactEntry,
    /// The reversed pair (route, to, from) had an active entry.
    MirroredEntry,
    /// Synthesized from segment distance via the tier table.
    TieredDistance,
}

/// Which rule completed a trip.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionReason {
    /// Scanned checkpoint name matched the trip destination.
    ExactName,
    /// Scanned sequence position reached or passed the destination.
    PassThrough,
}

/// Visibility state of a fare matrix entry.
///
/// Entries are versioned rather than deleted: bulk regeneration marks the
/// previous generation `Inactive` and writes a fresh `Active` set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FareEntryStatus {
    /// Entry participates in fare resolution.
    Active,
    /// Superseded entry kept for history.
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_status_round_trips_through_strings() {
        for status in [
            TripStatus::Booked,
            TripStatus::InProgress,
            TripStatus::Completed,
            TripStatus::Cancelled,
        ] {
            let s = status.to_string();
            assert_eq!(s.parse::<TripStatus>().unwrap(), status);
        }
    }

    #[test]
    fn trip_status_wire_form_is_screaming_snake() {
        assert_eq!(TripStatus::InProgress.as_ref(), "IN_PROGRESS");
        assert_eq!(TripStatus::Booked.as_ref(), "BOOKED");
    }

    #[test]
    fn open_and_closed_partition_the_states() {
        assert!(TripStatus::Booked.is_open());
        assert!(TripStatus::InProgress.is_open());
        assert!(TripStatus::Completed.is_closed());
        assert!(TripStatus::Cancelled.is_closed());
    }

    #[test]
    fn fare_method_wire_form() {
        assert_eq!(FareMethod::TieredDistance.as_ref(), "TIERED_DISTANCE");
        assert_eq!(
            "MIRRORED_ENTRY".parse::<FareMethod>().unwrap(),
            FareMethod::MirroredEntry
        );
    }

    #[test]
    fn completion_reason_wire_form() {
        assert_eq!(CompletionReason::PassThrough.as_ref(), "PASS_THROUGH");
        assert_eq!(CompletionReason::ExactName.as_ref(), "EXACT_NAME");
    }
}
