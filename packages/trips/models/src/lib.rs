#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Scan event, booking, and completion outcome types.

use chrono::{DateTime, Utc};
use jeepney_transit_models::CompletionReason;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// A driver's checkpoint QR scan, as delivered by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Scanning driver.
    pub driver_id: i64,
    /// Checkpoint identified by the QR payload.
    pub checkpoint_id: i32,
    /// When the scan happened.
    pub scanned_at: DateTime<Utc>,
    /// Device-reported coordinates, when present. Carried for audit
    /// logging only; position is checkpoint-derived, not GPS-derived.
    pub coordinates: Option<Coordinates>,
}

/// Device-reported WGS84 coordinates attached to a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// A booking request from the passenger-facing adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookTripRequest {
    /// Booking passenger.
    pub passenger_id: i64,
    /// Chosen driver.
    pub driver_id: i64,
    /// Route the trip rides on.
    pub route_id: i32,
    /// Pickup checkpoint name.
    pub pickup: String,
    /// Destination checkpoint name.
    pub destination: String,
    /// Fare agreed at booking time (already resolved by the fare engine).
    pub fare: f64,
}

/// One trip closed by a scan event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTrip {
    /// The completed trip.
    pub trip_id: Uuid,
    /// Which completion rule fired.
    pub reason: CompletionReason,
}

/// Everything a single scan event did to the driver's open trips.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Trips completed by this scan.
    pub completed: Vec<CompletedTrip>,
    /// Booked trips promoted to in-progress by this scan.
    pub promoted: Vec<Uuid>,
}

/// What to do when a passenger books while an open trip already exists
/// for the same passenger+driver pair.
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
pub enum BookingPolicy {
    /// Reject the new booking.
    Reject,
    /// Cancel the stale open trip and book the new one.
    Supersede,
}

/// Result of an explicit lifecycle transition request.
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
pub enum TransitionOutcome {
    /// The transition was performed by this call.
    Transitioned,
    /// The trip was already completed or cancelled; nothing changed.
    AlreadyClosed,
}

/// Tunables for the trip lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripEngineConfig {
    /// How far back a trip may have been booked and still count as a
    /// completion candidate for an incoming scan. Bounds the candidate
    /// query so stale trips from a previous shift never match.
    pub lookback_hours: i64,
    /// Duplicate-open-trip handling at booking time.
    pub booking_policy: BookingPolicy,
}

impl Default for TripEngineConfig {
    fn default() -> Self {
        Self {
            lookback_hours: 12,
            booking_policy: BookingPolicy::Reject,
        }
    }
}
