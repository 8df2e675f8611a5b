//! Explicit operator-driven lifecycle transitions.

use jeepney_database::queries;
use jeepney_trips_models::TransitionOutcome;
use switchy_database::Database;
use uuid::Uuid;

use crate::TripError;

/// Cancels a trip by explicit operator action.
///
/// Cancelling a trip that is already completed or cancelled is a
/// descriptive no-op ([`TransitionOutcome::AlreadyClosed`]), not an
/// error — the guard is the same conditional write the scan path uses.
///
/// # Errors
///
/// Returns [`TripError::TripNotFound`] for an unknown trip id or
/// [`TripError::Db`] if a query fails.
pub async fn cancel_trip(db: &dyn Database, trip_id: Uuid) -> Result<TransitionOutcome, TripError> {
    if queries::get_trip(db, trip_id).await?.is_none() {
        return Err(TripError::TripNotFound { trip_id });
    }

    if queries::cancel_trip_if_open(db, trip_id).await? {
        log::info!("Trip {trip_id} cancelled by operator");
        Ok(TransitionOutcome::Transitioned)
    } else {
        Ok(TransitionOutcome::AlreadyClosed)
    }
}
