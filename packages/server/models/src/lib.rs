#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! API request and response types for the jeepney fleet server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the engine and row types so the API contract can evolve
//! independently of storage shapes.

use chrono::{DateTime, Utc};
use jeepney_conflicts::{ConflictReport, OrderedDriver};
use jeepney_database_models::{CheckpointRow, TripRow};
use jeepney_earnings_models::{EarningsBucket, EarningsSummary, ShiftCloseOutcome};
use jeepney_fare_models::{FareResolution, UpsertKind, UpsertOutcome};
use jeepney_transit_models::{CompletionReason, FareMethod, TripStatus};
use jeepney_trips_models::ScanOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is up.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// A checkpoint as returned by the directory endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCheckpoint {
    /// Checkpoint id (the QR payload).
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Travel order along the route.
    pub sequence_position: i32,
    /// Whether this is the route origin.
    pub is_origin: bool,
    /// Whether this is a route destination.
    pub is_destination: bool,
}

impl From<CheckpointRow> for ApiCheckpoint {
    fn from(row: CheckpointRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            sequence_position: row.sequence_position,
            is_origin: row.is_origin,
            is_destination: row.is_destination,
        }
    }
}

/// Query parameters for fare resolution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareQueryParams {
    /// Route to price on.
    pub route_id: i32,
    /// Boarding checkpoint name.
    pub from: String,
    /// Alighting checkpoint name.
    pub to: String,
}

/// A resolved fare.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFareResolution {
    /// Fare amount in pesos.
    pub amount: f64,
    /// Whether the pair prices at the base fare.
    pub is_base_fare: bool,
    /// Which resolution rule fired.
    pub method: FareMethod,
}

impl From<FareResolution> for ApiFareResolution {
    fn from(resolution: FareResolution) -> Self {
        Self {
            amount: resolution.amount,
            is_base_fare: resolution.is_base_fare,
            method: resolution.method,
        }
    }
}

/// Request body for a fare entry upsert.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareUpsertRequest {
    /// Route to write on (the mirror is located automatically).
    pub route_id: i32,
    /// Boarding checkpoint name.
    pub from: String,
    /// Alighting checkpoint name.
    pub to: String,
    /// New amount in pesos.
    pub amount: f64,
    /// When the price takes effect; defaults to now.
    pub effective_date: Option<DateTime<Utc>>,
}

/// Outcome of a fare entry upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFareUpsert {
    /// What happened on the primary route.
    pub status: UpsertKind,
    /// Whether the opposite-direction entry was written too; `false` is
    /// a degraded success (mirror checkpoints not found).
    pub mirrored: bool,
}

impl From<UpsertOutcome> for ApiFareUpsert {
    fn from(outcome: UpsertOutcome) -> Self {
        Self {
            status: outcome.kind,
            mirrored: outcome.mirrored,
        }
    }
}

/// Request body for bulk matrix generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMatrixRequest {
    /// Route to regenerate.
    pub route_id: i32,
}

/// Request body for booking a trip.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBookTripRequest {
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
    /// Fare agreed at booking time.
    pub fare: f64,
}

/// A booked trip as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBookedTrip {
    /// Trip identifier.
    pub trip_id: Uuid,
    /// Lifecycle state.
    pub status: TripStatus,
    /// Agreed fare.
    pub fare: f64,
    /// Whether the destination resolved to a checkpoint; when `false`,
    /// only exact-name completion will close this trip.
    pub destination_resolved: bool,
    /// When the trip was booked.
    pub booked_at: DateTime<Utc>,
}

impl From<TripRow> for ApiBookedTrip {
    fn from(row: TripRow) -> Self {
        Self {
            trip_id: row.trip_id,
            status: row.status,
            fare: row.fare,
            destination_resolved: row.destination_resolved,
            booked_at: row.booked_at,
        }
    }
}

/// Request body for a checkpoint scan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Scanning driver.
    pub driver_id: i64,
    /// Checkpoint from the QR payload.
    pub checkpoint_id: i32,
    /// When the scan happened; defaults to now.
    pub scanned_at: Option<DateTime<Utc>>,
    /// Device-reported coordinates, if any.
    pub coordinates: Option<ApiCoordinates>,
}

/// WGS84 coordinates attached to a scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCoordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// One trip completed by a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCompletedTrip {
    /// The completed trip.
    pub trip_id: Uuid,
    /// Which completion rule fired.
    pub reason: CompletionReason,
}

/// Response body for a checkpoint scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiScanResponse {
    /// Trips completed by this scan.
    pub completed_trips: Vec<ApiCompletedTrip>,
    /// Booked trips promoted to in-progress.
    pub promoted_trips: Vec<Uuid>,
    /// Present when multiple drivers are at the scanned checkpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ApiConflict>,
}

impl ApiScanResponse {
    /// Builds the response from the engine outcomes.
    #[must_use]
    pub fn from_outcome(outcome: ScanOutcome, conflict: Option<ConflictReport>) -> Self {
        Self {
            completed_trips: outcome
                .completed
                .into_iter()
                .map(|completed| ApiCompletedTrip {
                    trip_id: completed.trip_id,
                    reason: completed.reason,
                })
                .collect(),
            promoted_trips: outcome.promoted,
            conflict: conflict.map(ApiConflict::from),
        }
    }
}

/// One driver in a conflict queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrderedDriver {
    /// The present driver.
    pub driver_id: i64,
    /// When they scanned in.
    pub scanned_at: DateTime<Utc>,
    /// 1-based queue position.
    pub position: u32,
    /// Estimated departure.
    pub estimated_departure: DateTime<Utc>,
}

impl From<OrderedDriver> for ApiOrderedDriver {
    fn from(driver: OrderedDriver) -> Self {
        Self {
            driver_id: driver.driver_id,
            scanned_at: driver.scanned_at,
            position: driver.position,
            estimated_departure: driver.estimated_departure,
        }
    }
}

/// Drivers present at a checkpoint, in departure order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConflict {
    /// Checkpoint examined.
    pub checkpoint_id: i32,
    /// Whether more than one driver is present.
    pub has_conflict: bool,
    /// Present drivers ordered by arrival.
    pub ordered_drivers: Vec<ApiOrderedDriver>,
}

impl From<ConflictReport> for ApiConflict {
    fn from(report: ConflictReport) -> Self {
        Self {
            checkpoint_id: report.checkpoint_id,
            has_conflict: report.has_conflict,
            ordered_drivers: report
                .ordered_drivers
                .into_iter()
                .map(ApiOrderedDriver::from)
                .collect(),
        }
    }
}

/// Request body for recording an earning against the ledger.
///
/// Posted by the payment adapter once a fare payment is confirmed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningRequest {
    /// Trip that produced the earning, when applicable.
    pub trip_id: Option<Uuid>,
    /// Paying passenger, when applicable.
    pub passenger_id: Option<i64>,
    /// Fare before discounts.
    pub original_fare: f64,
    /// Discount applied; defaults to zero.
    pub discount_amount: Option<f64>,
    /// Amount actually received.
    pub final_fare: f64,
    /// Whether the row increments the trip counter; defaults to `true`.
    /// Fare-only top-ups post `false` so revenue and trip stats stay
    /// decoupled.
    pub counts_as_trip: Option<bool>,
}

/// Query parameters for the earnings summary endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsQueryParams {
    /// Instant to aggregate as of; defaults to now.
    pub as_of: Option<DateTime<Utc>>,
}

/// Totals over one reporting window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEarningsBucket {
    /// Trip-counting rows in the window.
    pub trip_count: i64,
    /// Revenue over every row in the window.
    pub total_amount: f64,
}

impl From<EarningsBucket> for ApiEarningsBucket {
    fn from(bucket: EarningsBucket) -> Self {
        Self {
            trip_count: bucket.trip_count,
            total_amount: bucket.total_amount,
        }
    }
}

/// A driver's earnings across the standard windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEarningsSummary {
    /// Current business day.
    pub today: ApiEarningsBucket,
    /// Rolling 7 business days.
    pub week: ApiEarningsBucket,
    /// Calendar month.
    pub month: ApiEarningsBucket,
    /// Calendar year.
    pub year: ApiEarningsBucket,
    /// Permanent record.
    pub all_time: ApiEarningsBucket,
}

impl From<EarningsSummary> for ApiEarningsSummary {
    fn from(summary: EarningsSummary) -> Self {
        Self {
            today: summary.today.into(),
            week: summary.week.into(),
            month: summary.month.into(),
            year: summary.year.into(),
            all_time: summary.all_time.into(),
        }
    }
}

/// Response body for an end-shift call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiShiftClose {
    /// `"CLOSED"` or `"NO_OPEN_SHIFT"`.
    pub status: String,
    /// Business-day totals at close time, when a shift was closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_today_summary: Option<ApiEarningsBucket>,
}

impl From<ShiftCloseOutcome> for ApiShiftClose {
    fn from(outcome: ShiftCloseOutcome) -> Self {
        match outcome {
            ShiftCloseOutcome::Closed(summary) => Self {
                status: "CLOSED".to_string(),
                final_today_summary: Some(summary.today.into()),
            },
            ShiftCloseOutcome::NoOpenShift => Self {
                status: "NO_OPEN_SHIFT".to_string(),
                final_today_summary: None,
            },
        }
    }
}

/// Query parameters for the conflicts endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictQueryParams {
    /// Detection window in minutes; defaults to the engine's window.
    pub window_minutes: Option<i64>,
}

impl From<ApiBookTripRequest> for jeepney_trips_models::BookTripRequest {
    fn from(request: ApiBookTripRequest) -> Self {
        Self {
            passenger_id: request.passenger_id,
            driver_id: request.driver_id,
            route_id: request.route_id,
            pickup: request.pickup,
            destination: request.destination,
            fare: request.fare,
        }
    }
}
