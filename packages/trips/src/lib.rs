#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Trip lifecycle state machine.
//!
//! Trips move `booked → in_progress → completed`, with `cancelled`
//! reachable from either open state by explicit operator action. State is
//! never advanced from local deltas: every scan event re-evaluates the
//! driver's open trips against current storage, and all transitions are
//! conditional writes guarded on open status, so replaying an event is a
//! no-op.

pub mod booking;
pub mod completion;
pub mod lifecycle;

use thiserror::Error;

/// Errors that can occur during trip operations.
#[derive(Debug, Error)]
pub enum TripError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Db(#[from] jeepney_database::DbError),

    /// The driver is not in the driver directory.
    #[error("Driver {driver_id} not found")]
    DriverNotFound {
        /// The unknown driver.
        driver_id: i64,
    },

    /// The route id does not exist.
    #[error("Route {route_id} not found")]
    RouteNotFound {
        /// The unknown route.
        route_id: i32,
    },

    /// The scanned checkpoint id does not exist.
    #[error("Checkpoint {checkpoint_id} not found")]
    CheckpointNotFound {
        /// The unknown checkpoint.
        checkpoint_id: i32,
    },

    /// The trip id does not exist.
    #[error("Trip {trip_id} not found")]
    TripNotFound {
        /// The unknown trip.
        trip_id: uuid::Uuid,
    },

    /// An open trip already exists for the passenger+driver pair.
    #[error("Passenger {passenger_id} already has an open trip with driver {driver_id}")]
    DuplicateOpenTrip {
        /// The booking passenger.
        passenger_id: i64,
        /// The requested driver.
        driver_id: i64,
        /// The trip already open.
        open_trip_id: uuid::Uuid,
    },
}
