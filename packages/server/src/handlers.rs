//! HTTP handler functions for the jeepney fleet API.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use jeepney_conflicts::{ConflictError, DEFAULT_WINDOW_MINUTES};
use jeepney_fare::FareError;
use jeepney_earnings::EarningsError;
use jeepney_earnings_models::EarningDraft;
use jeepney_server_models::{
    ApiBookTripRequest, ApiBookedTrip, ApiCheckpoint, ApiConflict, ApiEarningsSummary,
    ApiFareResolution, ApiFareUpsert, ApiHealth, ApiScanResponse, ApiShiftClose,
    ConflictQueryParams, EarningRequest, EarningsQueryParams, FareQueryParams,
    FareUpsertRequest, GenerateMatrixRequest, ScanRequest,
};
use jeepney_trips::TripError;
use jeepney_trips_models::{Coordinates, ScanEvent};
use uuid::Uuid;

use crate::AppState;

fn not_found(message: String) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": message }))
}

fn internal_error(context: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": context }))
}

fn fare_error(e: &FareError, context: &str) -> HttpResponse {
    match e {
        FareError::RouteNotFound { .. } => not_found(e.to_string()),
        FareError::Unresolvable { .. } => {
            HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": e.to_string() }))
        }
        FareError::Db(_) => {
            log::error!("{context}: {e}");
            internal_error(context)
        }
    }
}

fn trip_error(e: &TripError, context: &str) -> HttpResponse {
    match e {
        TripError::DriverNotFound { .. }
        | TripError::RouteNotFound { .. }
        | TripError::CheckpointNotFound { .. }
        | TripError::TripNotFound { .. } => not_found(e.to_string()),
        TripError::DuplicateOpenTrip { open_trip_id, .. } => HttpResponse::Conflict().json(
            serde_json::json!({ "error": e.to_string(), "openTripId": open_trip_id }),
        ),
        TripError::Db(_) => {
            log::error!("{context}: {e}");
            internal_error(context)
        }
    }
}

fn earnings_error(e: &EarningsError, context: &str) -> HttpResponse {
    match e {
        EarningsError::DriverNotFound { .. } => not_found(e.to_string()),
        EarningsError::ShiftAlreadyOpen { .. } => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": e.to_string() }))
        }
        EarningsError::Db(_) => {
            log::error!("{context}: {e}");
            internal_error(context)
        }
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/routes/{route_id}/checkpoints`
///
/// Returns the route's checkpoint directory in travel order.
pub async fn route_checkpoints(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let route_id = path.into_inner();

    match jeepney_database::queries::list_checkpoints(state.db.as_ref(), route_id).await {
        Ok(checkpoints) if checkpoints.is_empty() => {
            not_found(format!("Route {route_id} not found"))
        }
        Ok(checkpoints) => {
            let api: Vec<ApiCheckpoint> = checkpoints.into_iter().map(ApiCheckpoint::from).collect();
            HttpResponse::Ok().json(api)
        }
        Err(e) => {
            log::error!("Failed to list checkpoints: {e}");
            internal_error("Failed to list checkpoints")
        }
    }
}

/// `GET /api/fare`
///
/// Resolves the fare for a checkpoint pair; the response's `method`
/// states which rule fired.
pub async fn fare_resolve(
    state: web::Data<AppState>,
    params: web::Query<FareQueryParams>,
) -> HttpResponse {
    match jeepney_fare::engine::resolve_fare(
        state.db.as_ref(),
        params.route_id,
        &params.from,
        &params.to,
        &state.tiers,
        Utc::now(),
    )
    .await
    {
        Ok(resolution) => HttpResponse::Ok().json(ApiFareResolution::from(resolution)),
        Err(e) => fare_error(&e, "Failed to resolve fare"),
    }
}

/// `POST /api/fare`
///
/// Creates or updates one fare entry and mirrors it onto the opposite
/// route. `mirrored: false` in the response is a degraded success.
pub async fn fare_upsert(
    state: web::Data<AppState>,
    body: web::Json<FareUpsertRequest>,
) -> HttpResponse {
    let now = Utc::now();
    let request = body.into_inner();
    let effective = request.effective_date.unwrap_or(now);

    match jeepney_fare::matrix::upsert_fare_entry(
        state.db.as_ref(),
        request.route_id,
        &request.from,
        &request.to,
        request.amount,
        effective,
        now,
    )
    .await
    {
        Ok(outcome) => HttpResponse::Ok().json(ApiFareUpsert::from(outcome)),
        Err(e) => fare_error(&e, "Failed to upsert fare entry"),
    }
}

/// `POST /api/fare/generate`
///
/// Regenerates the full fare matrix for a route from the tier scale.
pub async fn fare_generate(
    state: web::Data<AppState>,
    body: web::Json<GenerateMatrixRequest>,
) -> HttpResponse {
    match jeepney_fare::matrix::generate_matrix_for_route(
        state.db.as_ref(),
        body.route_id,
        &state.tiers,
        Utc::now(),
    )
    .await
    {
        Ok(generation) => HttpResponse::Ok().json(serde_json::json!({
            "entriesWritten": generation.entries_written,
            "entriesDeactivated": generation.entries_deactivated,
        })),
        Err(e) => fare_error(&e, "Failed to generate fare matrix"),
    }
}

/// `POST /api/trips`
///
/// Books a trip for a passenger with a specific driver.
pub async fn book_trip(
    state: web::Data<AppState>,
    body: web::Json<ApiBookTripRequest>,
) -> HttpResponse {
    let request = body.into_inner().into();

    match jeepney_trips::booking::book_trip(
        state.db.as_ref(),
        &request,
        &state.trip_config,
        Utc::now(),
    )
    .await
    {
        Ok(trip) => HttpResponse::Ok().json(ApiBookedTrip::from(trip)),
        Err(e) => trip_error(&e, "Failed to book trip"),
    }
}

/// `POST /api/trips/{trip_id}/cancel`
///
/// Cancels a trip by operator action; cancelling a closed trip reports a
/// descriptive no-op status.
pub async fn cancel_trip(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    let trip_id = path.into_inner();

    match jeepney_trips::lifecycle::cancel_trip(state.db.as_ref(), trip_id).await {
        Ok(outcome) => HttpResponse::Ok().json(serde_json::json!({ "status": outcome.as_ref() })),
        Err(e) => trip_error(&e, "Failed to cancel trip"),
    }
}

/// `POST /api/scans`
///
/// Processes a driver's checkpoint scan: records the position fact,
/// completes any satisfied trips, and reports a conflict when other
/// drivers are present at the same checkpoint.
pub async fn checkpoint_scan(
    state: web::Data<AppState>,
    body: web::Json<ScanRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    let scanned_at = request.scanned_at.unwrap_or_else(Utc::now);
    let event = ScanEvent {
        driver_id: request.driver_id,
        checkpoint_id: request.checkpoint_id,
        scanned_at,
        coordinates: request
            .coordinates
            .map(|c| Coordinates { lat: c.lat, lng: c.lng }),
    };

    let outcome =
        match jeepney_trips::completion::record_scan(state.db.as_ref(), &event, &state.trip_config)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return trip_error(&e, "Failed to process scan"),
        };

    let conflict = match jeepney_conflicts::detect_conflicts(
        state.db.as_ref(),
        request.checkpoint_id,
        DEFAULT_WINDOW_MINUTES,
        scanned_at,
    )
    .await
    {
        Ok(report) if report.has_conflict => Some(report),
        Ok(_) => None,
        Err(e) => {
            // The scan itself succeeded; a conflict-check failure should
            // not fail the request.
            log::error!("Conflict check failed after scan: {e}");
            None
        }
    };

    HttpResponse::Ok().json(ApiScanResponse::from_outcome(outcome, conflict))
}

/// `POST /api/earnings/{driver_id}`
///
/// Appends one earning to the ledger. Called by the payment adapter when
/// a fare payment is confirmed; the business day is stamped at write
/// time.
pub async fn record_earning(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<EarningRequest>,
) -> HttpResponse {
    let driver_id = path.into_inner();
    let request = body.into_inner();
    let draft = EarningDraft {
        driver_id,
        trip_id: request.trip_id,
        passenger_id: request.passenger_id,
        original_fare: request.original_fare,
        discount_amount: request.discount_amount.unwrap_or(0.0),
        final_fare: request.final_fare,
        counts_as_trip: request.counts_as_trip.unwrap_or(true),
    };

    match jeepney_earnings::summary::append_earning(
        state.db.as_ref(),
        &state.calendar,
        &draft,
        Utc::now(),
    )
    .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "RECORDED" })),
        Err(e) => earnings_error(&e, "Failed to record earning"),
    }
}

/// `GET /api/earnings/{driver_id}`
///
/// Returns the driver's earnings summary, optionally as of a past
/// instant.
pub async fn earnings_summary(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    params: web::Query<EarningsQueryParams>,
) -> HttpResponse {
    let driver_id = path.into_inner();
    let as_of = params.as_of.unwrap_or_else(Utc::now);

    match jeepney_earnings::summary::get_summary(state.db.as_ref(), &state.calendar, driver_id, as_of)
        .await
    {
        Ok(summary) => HttpResponse::Ok().json(ApiEarningsSummary::from(summary)),
        Err(e) => earnings_error(&e, "Failed to compute earnings summary"),
    }
}

/// `POST /api/shifts/{driver_id}/start`
pub async fn start_shift(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let driver_id = path.into_inner();

    match jeepney_earnings::shifts::start_shift(
        state.db.as_ref(),
        &state.calendar,
        driver_id,
        Utc::now(),
    )
    .await
    {
        Ok(outcome) => HttpResponse::Ok().json(serde_json::json!({ "status": outcome })),
        Err(e) => earnings_error(&e, "Failed to start shift"),
    }
}

/// `POST /api/shifts/{driver_id}/end`
pub async fn end_shift(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let driver_id = path.into_inner();

    match jeepney_earnings::shifts::end_shift(
        state.db.as_ref(),
        &state.calendar,
        driver_id,
        Utc::now(),
    )
    .await
    {
        Ok(outcome) => HttpResponse::Ok().json(ApiShiftClose::from(outcome)),
        Err(e) => earnings_error(&e, "Failed to end shift"),
    }
}

/// `GET /api/conflicts/{checkpoint_id}`
///
/// Lists drivers currently present at a checkpoint, in departure order.
pub async fn conflicts(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    params: web::Query<ConflictQueryParams>,
) -> HttpResponse {
    let checkpoint_id = path.into_inner();
    let window = params.window_minutes.unwrap_or(DEFAULT_WINDOW_MINUTES);

    match jeepney_conflicts::detect_conflicts(state.db.as_ref(), checkpoint_id, window, Utc::now())
        .await
    {
        Ok(report) => HttpResponse::Ok().json(ApiConflict::from(report)),
        Err(e) => match e {
            ConflictError::CheckpointNotFound { .. } => not_found(e.to_string()),
            ConflictError::Db(_) => {
                log::error!("Failed to detect conflicts: {e}");
                internal_error("Failed to detect conflicts")
            }
        },
    }
}
