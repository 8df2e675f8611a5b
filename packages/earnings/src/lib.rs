#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Earnings aggregation over the append-only ledger.
//!
//! Every figure is re-derived from ledger rows plus an `as_of` instant on
//! each call: the aggregator holds no counters of its own, so there is
//! nothing to drift and nothing to reset. The "today" window follows the
//! fleet's 05:00 business-day boundary — a 02:00 earning belongs to the
//! previous business day.

pub mod business_day;
pub mod shifts;
pub mod summary;

pub use business_day::BusinessCalendar;

use thiserror::Error;

/// Errors that can occur during earnings operations.
#[derive(Debug, Error)]
pub enum EarningsError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Db(#[from] jeepney_database::DbError),

    /// The driver is not in the driver directory.
    #[error("Driver {driver_id} not found")]
    DriverNotFound {
        /// The unknown driver.
        driver_id: i64,
    },

    /// A shift is already open for the driver.
    #[error("Driver {driver_id} already has an open shift")]
    ShiftAlreadyOpen {
        /// The driver with the open shift.
        driver_id: i64,
    },
}
