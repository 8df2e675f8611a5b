#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fare matrix engine.
//!
//! Prices any (route, from, to) checkpoint pair through a fixed fallback
//! chain — exact matrix entry, reversed entry (the matrix is logically
//! symmetric), then the tiered distance formula — and manages matrix
//! writes: mirrored upserts onto the opposite-direction route and bulk
//! regeneration of a route's full cross product.

pub mod engine;
pub mod matrix;

use thiserror::Error;

/// Errors that can occur during fare operations.
#[derive(Debug, Error)]
pub enum FareError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Db(#[from] jeepney_database::DbError),

    /// The route id does not exist.
    #[error("Route {route_id} not found")]
    RouteNotFound {
        /// The unknown route.
        route_id: i32,
    },

    /// No pricing rule applies: a checkpoint name did not resolve on the
    /// route. Distinct from not-found; callers must not default to zero.
    #[error("Fare not resolvable on route {route_id}: '{name}' is not a checkpoint of the route")]
    Unresolvable {
        /// Route the resolution ran against.
        route_id: i32,
        /// The name that failed to resolve.
        name: String,
    },
}
