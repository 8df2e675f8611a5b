//! Trip booking.

use chrono::{DateTime, Utc};
use jeepney_database::queries;
use jeepney_database_models::{TripRow, find_checkpoint_by_name};
use jeepney_transit_models::TripStatus;
use jeepney_trips_models::{BookTripRequest, BookingPolicy, TripEngineConfig};
use switchy_database::Database;
use uuid::Uuid;

use crate::TripError;

/// Books a trip for a passenger with a specific driver.
///
/// The fare has already been resolved by the fare engine; booking records
/// it verbatim. An unresolved destination name does not block booking —
/// the trip is stored with `destination_resolved = false` so diagnostics
/// can see that only exact-name completion will close it.
///
/// When an open trip already exists for the passenger+driver pair the
/// configured [`BookingPolicy`] decides: reject, or cancel the stale trip
/// and book the new one.
///
/// # Errors
///
/// Returns [`TripError::DriverNotFound`] / [`TripError::RouteNotFound`]
/// for unknown ids, [`TripError::DuplicateOpenTrip`] under the reject
/// policy, or [`TripError::Db`] if a query fails.
pub async fn book_trip(
    db: &dyn Database,
    request: &BookTripRequest,
    config: &TripEngineConfig,
    now: DateTime<Utc>,
) -> Result<TripRow, TripError> {
    if !queries::driver_exists(db, request.driver_id).await? {
        return Err(TripError::DriverNotFound {
            driver_id: request.driver_id,
        });
    }

    let checkpoints = queries::list_checkpoints(db, request.route_id).await?;
    if checkpoints.is_empty() {
        return Err(TripError::RouteNotFound {
            route_id: request.route_id,
        });
    }

    let aliases =
        jeepney_alias::build_alias_map(queries::list_checkpoint_aliases(db).await?);
    let destination_resolved =
        find_checkpoint_by_name(&checkpoints, &request.destination, &aliases).is_some();
    if !destination_resolved {
        log::warn!(
            "Booking with unresolved destination '{}' on route {}; \
             only exact-name completion will close this trip",
            request.destination,
            request.route_id
        );
    }

    if let Some(open) =
        queries::find_open_trip_for_pair(db, request.passenger_id, request.driver_id).await?
    {
        match config.booking_policy {
            BookingPolicy::Reject => {
                return Err(TripError::DuplicateOpenTrip {
                    passenger_id: request.passenger_id,
                    driver_id: request.driver_id,
                    open_trip_id: open.trip_id,
                });
            }
            BookingPolicy::Supersede => {
                queries::cancel_trip_if_open(db, open.trip_id).await?;
                log::info!(
                    "Superseded open trip {} for passenger {} with driver {}",
                    open.trip_id,
                    request.passenger_id,
                    request.driver_id
                );
            }
        }
    }

    let trip = TripRow {
        trip_id: Uuid::new_v4(),
        passenger_id: request.passenger_id,
        driver_id: request.driver_id,
        route_id: request.route_id,
        pickup: request.pickup.clone(),
        destination: request.destination.clone(),
        fare: request.fare,
        status: TripStatus::Booked,
        destination_resolved,
        booked_at: now,
        completed_at: None,
        completion_reason: None,
    };

    queries::insert_trip(db, &trip).await?;
    log::info!(
        "Booked trip {} passenger {} driver {} route {} -> '{}'",
        trip.trip_id,
        trip.passenger_id,
        trip.driver_id,
        trip.route_id,
        trip.destination
    );

    Ok(trip)
}
