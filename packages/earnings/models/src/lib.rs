#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Earnings summary and shift accounting types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Totals over one reporting window.
///
/// `trip_count` and `total_amount` are deliberately decoupled: fare-only
/// ledger rows add revenue without incrementing the trip counter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EarningsBucket {
    /// Rows with `counts_as_trip = true` in the window.
    pub trip_count: i64,
    /// Sum of `final_fare` over every row in the window.
    pub total_amount: f64,
}

/// A driver's earnings across the standard reporting windows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EarningsSummary {
    /// Current business day (05:00 boundary).
    pub today: EarningsBucket,
    /// Rolling 7 business days ending today, inclusive.
    pub week: EarningsBucket,
    /// Calendar month containing the query instant.
    pub month: EarningsBucket,
    /// Calendar year containing the query instant.
    pub year: EarningsBucket,
    /// Unrestricted sum; the permanent record.
    pub all_time: EarningsBucket,
}

/// Insert shape for an earning, before the business day is stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningDraft {
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
}

/// How a start-shift call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStartOutcome {
    /// A new shift window was opened.
    Opened,
    /// The business day's existing window was reopened.
    Reopened,
}

/// A closed shift with its business-day totals snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSummary {
    /// Driver who was on duty.
    pub driver_id: i64,
    /// When the shift opened.
    pub started_at: DateTime<Utc>,
    /// When the shift closed.
    pub ended_at: DateTime<Utc>,
    /// Business day the shift belongs to.
    pub business_date: NaiveDate,
    /// Business-day totals at the moment the shift closed.
    pub today: EarningsBucket,
}

/// Result of an end-shift call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "status", content = "summary")]
pub enum ShiftCloseOutcome {
    /// The open shift was closed; totals snapshotted.
    Closed(ShiftSummary),
    /// No shift was open; nothing changed.
    NoOpenShift,
}
