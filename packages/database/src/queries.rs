//! Database query functions for the jeepney fleet engine.
//!
//! Every read the engines perform and every conditional write they issue
//! lives here. Mutating statements that guard on row state (`status IN
//! (...)`, `ended_at IS NULL`) return the affected-row count so callers
//! can distinguish "transitioned" from "already closed" without a second
//! read — replaying the same event is a no-op at this layer.
//!
//! Business-day dates (`transaction_date`, `business_date`) are stored as
//! ISO `YYYY-MM-DD` text; lexicographic range comparisons are equivalent
//! to chronological ones for that form.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use jeepney_database_models::{
    CheckpointRow, DriverPositionRow, FareEntryRow, NewEarning, OpenTripsQuery, RouteRow, ShiftRow,
    TripRow,
};
use jeepney_transit_models::{CompletionReason, FareEntryStatus, TripStatus};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::DbError;

/// ISO date format used for business-day columns.
const DATE_FORMAT: &str = "%Y-%m-%d";

fn conversion(message: String) -> DbError {
    DbError::Conversion { message }
}

fn parse_business_date(raw: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| conversion(format!("Invalid business date '{raw}': {e}")))
}

fn date_param(date: NaiveDate) -> DatabaseValue {
    DatabaseValue::String(date.format(DATE_FORMAT).to_string())
}

fn utc(naive: chrono::NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
}

// ---------------------------------------------------------------------------
// Routes & checkpoints
// ---------------------------------------------------------------------------

fn row_to_route(row: &switchy_database::Row) -> Result<RouteRow, DbError> {
    Ok(RouteRow {
        id: row
            .to_value("id")
            .map_err(|e| conversion(format!("Failed to parse route id: {e}")))?,
        name: row.to_value("name").unwrap_or_default(),
        opposite_route_id: row.to_value("opposite_route_id").unwrap_or(None),
    })
}

fn row_to_checkpoint(row: &switchy_database::Row) -> Result<CheckpointRow, DbError> {
    Ok(CheckpointRow {
        id: row
            .to_value("id")
            .map_err(|e| conversion(format!("Failed to parse checkpoint id: {e}")))?,
        route_id: row
            .to_value("route_id")
            .map_err(|e| conversion(format!("Failed to parse checkpoint route id: {e}")))?,
        name: row.to_value("name").unwrap_or_default(),
        sequence_position: row
            .to_value("sequence_position")
            .map_err(|e| conversion(format!("Failed to parse sequence position: {e}")))?,
        is_origin: row.to_value("is_origin").unwrap_or(false),
        is_destination: row.to_value("is_destination").unwrap_or(false),
    })
}

/// Fetches a route by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_route(db: &dyn Database, route_id: i32) -> Result<Option<RouteRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, opposite_route_id FROM routes WHERE id = $1",
            &[DatabaseValue::Int32(route_id)],
        )
        .await?;

    rows.first().map(row_to_route).transpose()
}

/// Lists all routes, ordered by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_routes(db: &dyn Database) -> Result<Vec<RouteRow>, DbError> {
    let rows = db
        .query_raw_params("SELECT id, name, opposite_route_id FROM routes ORDER BY id", &[])
        .await?;

    rows.iter().map(row_to_route).collect()
}

/// Lists a route's checkpoints ordered by sequence position.
///
/// This is the checkpoint directory contract: the returned order is the
/// travel order of the route.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_checkpoints(
    db: &dyn Database,
    route_id: i32,
) -> Result<Vec<CheckpointRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, route_id, name, sequence_position, is_origin, is_destination
             FROM checkpoints
             WHERE route_id = $1
             ORDER BY sequence_position",
            &[DatabaseValue::Int32(route_id)],
        )
        .await?;

    rows.iter().map(row_to_checkpoint).collect()
}

/// Fetches a checkpoint by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_checkpoint(
    db: &dyn Database,
    checkpoint_id: i32,
) -> Result<Option<CheckpointRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, route_id, name, sequence_position, is_origin, is_destination
             FROM checkpoints
             WHERE id = $1",
            &[DatabaseValue::Int32(checkpoint_id)],
        )
        .await?;

    rows.first().map(row_to_checkpoint).transpose()
}

/// Loads the checkpoint alias table as `(alias, canonical)` pairs.
///
/// Aliases are data: new name variants are inserted as rows, not shipped
/// as code changes. Callers feed the pairs through
/// `jeepney_alias::build_alias_map` before lookups.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_checkpoint_aliases(db: &dyn Database) -> Result<Vec<(String, String)>, DbError> {
    let rows = db
        .query_raw_params("SELECT alias, canonical FROM checkpoint_aliases", &[])
        .await?;

    Ok(rows
        .iter()
        .map(|row| {
            (
                row.to_value("alias").unwrap_or_default(),
                row.to_value("canonical").unwrap_or_default(),
            )
        })
        .collect())
}

/// Checks whether a driver exists in the driver directory.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn driver_exists(db: &dyn Database, driver_id: i64) -> Result<bool, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id FROM drivers WHERE id = $1",
            &[DatabaseValue::Int64(driver_id)],
        )
        .await?;

    Ok(!rows.is_empty())
}

// ---------------------------------------------------------------------------
// Fare matrix
// ---------------------------------------------------------------------------

fn row_to_fare_entry(row: &switchy_database::Row) -> Result<FareEntryRow, DbError> {
    let status_raw: String = row.to_value("status").unwrap_or_default();
    let status: FareEntryStatus = status_raw
        .parse()
        .map_err(|e| conversion(format!("Invalid fare entry status '{status_raw}': {e}")))?;

    let effective_naive: chrono::NaiveDateTime =
        row.to_value("effective_date").unwrap_or_default();
    let expiry_naive: Option<chrono::NaiveDateTime> =
        row.to_value("expiry_date").unwrap_or(None);

    Ok(FareEntryRow {
        id: row
            .to_value("id")
            .map_err(|e| conversion(format!("Failed to parse fare entry id: {e}")))?,
        route_id: row
            .to_value("route_id")
            .map_err(|e| conversion(format!("Failed to parse fare entry route id: {e}")))?,
        from_checkpoint_id: row
            .to_value("from_checkpoint_id")
            .map_err(|e| conversion(format!("Failed to parse from checkpoint id: {e}")))?,
        to_checkpoint_id: row
            .to_value("to_checkpoint_id")
            .map_err(|e| conversion(format!("Failed to parse to checkpoint id: {e}")))?,
        amount: row.to_value("amount").unwrap_or(0.0),
        is_base_fare: row.to_value("is_base_fare").unwrap_or(false),
        status,
        effective_date: utc(effective_naive),
        expiry_date: expiry_naive.map(utc),
    })
}

/// Finds the single active, effective, non-expired fare entry for
/// `(route, from, to)` as of `now`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_active_fare_entry(
    db: &dyn Database,
    route_id: i32,
    from_checkpoint_id: i32,
    to_checkpoint_id: i32,
    now: DateTime<Utc>,
) -> Result<Option<FareEntryRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, route_id, from_checkpoint_id, to_checkpoint_id, amount,
                    is_base_fare, status, effective_date, expiry_date
             FROM fare_matrix
             WHERE route_id = $1
               AND from_checkpoint_id = $2
               AND to_checkpoint_id = $3
               AND status = 'ACTIVE'
               AND effective_date <= $4
               AND (expiry_date IS NULL OR expiry_date > $4)
             ORDER BY effective_date DESC
             LIMIT 1",
            &[
                DatabaseValue::Int32(route_id),
                DatabaseValue::Int32(from_checkpoint_id),
                DatabaseValue::Int32(to_checkpoint_id),
                DatabaseValue::DateTime(now.naive_utc()),
            ],
        )
        .await?;

    rows.first().map(row_to_fare_entry).transpose()
}

/// Inserts a new active fare entry.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_fare_entry(
    db: &dyn Database,
    route_id: i32,
    from_checkpoint_id: i32,
    to_checkpoint_id: i32,
    amount: f64,
    is_base_fare: bool,
    effective_date: DateTime<Utc>,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO fare_matrix (
            route_id, from_checkpoint_id, to_checkpoint_id, amount,
            is_base_fare, status, effective_date
         ) VALUES ($1, $2, $3, $4, $5, 'ACTIVE', $6)",
        &[
            DatabaseValue::Int32(route_id),
            DatabaseValue::Int32(from_checkpoint_id),
            DatabaseValue::Int32(to_checkpoint_id),
            DatabaseValue::Real64(amount),
            DatabaseValue::Bool(is_base_fare),
            DatabaseValue::DateTime(effective_date.naive_utc()),
        ],
    )
    .await?;

    Ok(())
}

/// Updates the amount and effective date of an existing fare entry.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update_fare_entry(
    db: &dyn Database,
    entry_id: i64,
    amount: f64,
    effective_date: DateTime<Utc>,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE fare_matrix SET amount = $2, effective_date = $3 WHERE id = $1",
        &[
            DatabaseValue::Int64(entry_id),
            DatabaseValue::Real64(amount),
            DatabaseValue::DateTime(effective_date.naive_utc()),
        ],
    )
    .await?;

    Ok(())
}

/// Marks every active fare entry on a route inactive.
///
/// Bulk regeneration calls this before writing a fresh generation; old
/// entries are kept as history rather than deleted.
///
/// Returns the number of entries deactivated.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn deactivate_fare_entries(db: &dyn Database, route_id: i32) -> Result<u64, DbError> {
    let affected = db
        .exec_raw_params(
            "UPDATE fare_matrix SET status = 'INACTIVE'
             WHERE route_id = $1 AND status = 'ACTIVE'",
            &[DatabaseValue::Int32(route_id)],
        )
        .await?;

    Ok(affected)
}

// ---------------------------------------------------------------------------
// Trips
// ---------------------------------------------------------------------------

fn row_to_trip(row: &switchy_database::Row) -> Result<TripRow, DbError> {
    let trip_id_raw: String = row.to_value("trip_id").unwrap_or_default();
    let trip_id = Uuid::parse_str(&trip_id_raw)
        .map_err(|e| conversion(format!("Invalid trip id '{trip_id_raw}': {e}")))?;

    let status_raw: String = row.to_value("status").unwrap_or_default();
    let status: TripStatus = status_raw
        .parse()
        .map_err(|e| conversion(format!("Invalid trip status '{status_raw}': {e}")))?;

    let reason_raw: Option<String> = row.to_value("completion_reason").unwrap_or(None);
    let completion_reason = reason_raw
        .as_deref()
        .map(str::parse::<CompletionReason>)
        .transpose()
        .map_err(|e| conversion(format!("Invalid completion reason: {e}")))?;

    let booked_naive: chrono::NaiveDateTime = row.to_value("booked_at").unwrap_or_default();
    let completed_naive: Option<chrono::NaiveDateTime> =
        row.to_value("completed_at").unwrap_or(None);

    Ok(TripRow {
        trip_id,
        passenger_id: row
            .to_value("passenger_id")
            .map_err(|e| conversion(format!("Failed to parse passenger id: {e}")))?,
        driver_id: row
            .to_value("driver_id")
            .map_err(|e| conversion(format!("Failed to parse driver id: {e}")))?,
        route_id: row
            .to_value("route_id")
            .map_err(|e| conversion(format!("Failed to parse trip route id: {e}")))?,
        pickup: row.to_value("pickup").unwrap_or_default(),
        destination: row.to_value("destination").unwrap_or_default(),
        fare: row.to_value("fare").unwrap_or(0.0),
        status,
        destination_resolved: row.to_value("destination_resolved").unwrap_or(false),
        booked_at: utc(booked_naive),
        completed_at: completed_naive.map(utc),
        completion_reason,
    })
}

const TRIP_COLUMNS: &str = "trip_id, passenger_id, driver_id, route_id, pickup, destination,
                            fare, status, destination_resolved, booked_at, completed_at,
                            completion_reason";

/// Inserts a freshly booked trip.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_trip(db: &dyn Database, trip: &TripRow) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO trips (
            trip_id, passenger_id, driver_id, route_id, pickup, destination,
            fare, status, destination_resolved, booked_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        &[
            DatabaseValue::String(trip.trip_id.to_string()),
            DatabaseValue::Int64(trip.passenger_id),
            DatabaseValue::Int64(trip.driver_id),
            DatabaseValue::Int32(trip.route_id),
            DatabaseValue::String(trip.pickup.clone()),
            DatabaseValue::String(trip.destination.clone()),
            DatabaseValue::Real64(trip.fare),
            DatabaseValue::String(trip.status.as_ref().to_string()),
            DatabaseValue::Bool(trip.destination_resolved),
            DatabaseValue::DateTime(trip.booked_at.naive_utc()),
        ],
    )
    .await?;

    Ok(())
}

/// Fetches a trip by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_trip(db: &dyn Database, trip_id: Uuid) -> Result<Option<TripRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {TRIP_COLUMNS} FROM trips WHERE trip_id = $1"),
            &[DatabaseValue::String(trip_id.to_string())],
        )
        .await?;

    rows.first().map(row_to_trip).transpose()
}

/// Fetches a driver's open trips on a route inside the look-back window.
///
/// Only trips with status in `{BOOKED, IN_PROGRESS}` booked at or after
/// `booked_after` qualify as completion candidates.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_open_trips(
    db: &dyn Database,
    query: &OpenTripsQuery,
) -> Result<Vec<TripRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {TRIP_COLUMNS} FROM trips
                 WHERE driver_id = $1
                   AND route_id = $2
                   AND status IN ('BOOKED', 'IN_PROGRESS')
                   AND booked_at >= $3
                 ORDER BY booked_at"
            ),
            &[
                DatabaseValue::Int64(query.driver_id),
                DatabaseValue::Int32(query.route_id),
                DatabaseValue::DateTime(query.booked_after.naive_utc()),
            ],
        )
        .await?;

    rows.iter().map(row_to_trip).collect()
}

/// Finds an open trip for a passenger+driver pair, if any.
///
/// Used to enforce the one-open-trip-per-pair booking rule.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_open_trip_for_pair(
    db: &dyn Database,
    passenger_id: i64,
    driver_id: i64,
) -> Result<Option<TripRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {TRIP_COLUMNS} FROM trips
                 WHERE passenger_id = $1
                   AND driver_id = $2
                   AND status IN ('BOOKED', 'IN_PROGRESS')
                 ORDER BY booked_at DESC
                 LIMIT 1"
            ),
            &[
                DatabaseValue::Int64(passenger_id),
                DatabaseValue::Int64(driver_id),
            ],
        )
        .await?;

    rows.first().map(row_to_trip).transpose()
}

/// Completes a trip if (and only if) it is still open.
///
/// The guard on open status makes completion idempotent: replaying a scan
/// event against an already-completed trip affects zero rows and neither
/// re-stamps `completed_at` nor re-fires completion.
///
/// Returns `true` when this call performed the transition.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn complete_trip_if_open(
    db: &dyn Database,
    trip_id: Uuid,
    completed_at: DateTime<Utc>,
    reason: CompletionReason,
) -> Result<bool, DbError> {
    let affected = db
        .exec_raw_params(
            "UPDATE trips
             SET status = 'COMPLETED', completed_at = $2, completion_reason = $3
             WHERE trip_id = $1 AND status IN ('BOOKED', 'IN_PROGRESS')",
            &[
                DatabaseValue::String(trip_id.to_string()),
                DatabaseValue::DateTime(completed_at.naive_utc()),
                DatabaseValue::String(reason.as_ref().to_string()),
            ],
        )
        .await?;

    Ok(affected > 0)
}

/// Cancels a trip if it is still open.
///
/// Returns `true` when this call performed the transition.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn cancel_trip_if_open(db: &dyn Database, trip_id: Uuid) -> Result<bool, DbError> {
    let affected = db
        .exec_raw_params(
            "UPDATE trips SET status = 'CANCELLED'
             WHERE trip_id = $1 AND status IN ('BOOKED', 'IN_PROGRESS')",
            &[DatabaseValue::String(trip_id.to_string())],
        )
        .await?;

    Ok(affected > 0)
}

/// Promotes a booked trip to in-progress.
///
/// Fired when the driver scans a checkpoint while the trip is still in
/// `BOOKED`; guarded so the promotion happens at most once.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn mark_trip_in_progress(db: &dyn Database, trip_id: Uuid) -> Result<bool, DbError> {
    let affected = db
        .exec_raw_params(
            "UPDATE trips SET status = 'IN_PROGRESS'
             WHERE trip_id = $1 AND status = 'BOOKED'",
            &[DatabaseValue::String(trip_id.to_string())],
        )
        .await?;

    Ok(affected > 0)
}

// ---------------------------------------------------------------------------
// Earnings ledger
// ---------------------------------------------------------------------------

/// Appends one immutable ledger row.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails. Failures are
/// retryable by the caller; the row is keyed by the storage layer, not
/// re-derived, so a retried insert stays idempotent there.
pub async fn insert_earning(db: &dyn Database, earning: &NewEarning) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO earnings_ledger (
            driver_id, trip_id, passenger_id, original_fare, discount_amount,
            final_fare, counts_as_trip, transaction_date
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        &[
            DatabaseValue::Int64(earning.driver_id),
            earning
                .trip_id
                .map_or(DatabaseValue::Null, |id| DatabaseValue::String(id.to_string())),
            earning
                .passenger_id
                .map_or(DatabaseValue::Null, DatabaseValue::Int64),
            DatabaseValue::Real64(earning.original_fare),
            DatabaseValue::Real64(earning.discount_amount),
            DatabaseValue::Real64(earning.final_fare),
            DatabaseValue::Bool(earning.counts_as_trip),
            date_param(earning.transaction_date),
        ],
    )
    .await?;

    Ok(())
}

fn row_to_totals(row: &switchy_database::Row) -> (i64, f64) {
    (
        row.to_value("trip_count").unwrap_or(0),
        row.to_value("total_amount").unwrap_or(0.0),
    )
}

/// Sums a driver's ledger over an inclusive business-date window.
///
/// `trip_count` only counts rows with `counts_as_trip = TRUE`;
/// `total_amount` sums `final_fare` over every row in the window.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn ledger_window_totals(
    db: &dyn Database,
    driver_id: i64,
    from_date: NaiveDate,
    to_date: NaiveDate,
) -> Result<(i64, f64), DbError> {
    let rows = db
        .query_raw_params(
            "SELECT COALESCE(SUM(CASE WHEN counts_as_trip THEN 1 ELSE 0 END), 0) AS trip_count,
                    COALESCE(SUM(final_fare), 0) AS total_amount
             FROM earnings_ledger
             WHERE driver_id = $1
               AND transaction_date >= $2
               AND transaction_date <= $3",
            &[
                DatabaseValue::Int64(driver_id),
                date_param(from_date),
                date_param(to_date),
            ],
        )
        .await?;

    Ok(rows.first().map(row_to_totals).unwrap_or((0, 0.0)))
}

/// Sums a driver's entire ledger (the permanent all-time record).
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn ledger_all_time_totals(
    db: &dyn Database,
    driver_id: i64,
) -> Result<(i64, f64), DbError> {
    let rows = db
        .query_raw_params(
            "SELECT COALESCE(SUM(CASE WHEN counts_as_trip THEN 1 ELSE 0 END), 0) AS trip_count,
                    COALESCE(SUM(final_fare), 0) AS total_amount
             FROM earnings_ledger
             WHERE driver_id = $1",
            &[DatabaseValue::Int64(driver_id)],
        )
        .await?;

    Ok(rows.first().map(row_to_totals).unwrap_or((0, 0.0)))
}

// ---------------------------------------------------------------------------
// Driver positions
// ---------------------------------------------------------------------------

fn row_to_position(row: &switchy_database::Row) -> Result<DriverPositionRow, DbError> {
    let scanned_naive: chrono::NaiveDateTime = row.to_value("scanned_at").unwrap_or_default();

    Ok(DriverPositionRow {
        driver_id: row
            .to_value("driver_id")
            .map_err(|e| conversion(format!("Failed to parse position driver id: {e}")))?,
        checkpoint_id: row
            .to_value("checkpoint_id")
            .map_err(|e| conversion(format!("Failed to parse position checkpoint id: {e}")))?,
        route_id: row
            .to_value("route_id")
            .map_err(|e| conversion(format!("Failed to parse position route id: {e}")))?,
        scanned_at: utc(scanned_naive),
    })
}

/// Records one checkpoint-scan position fact.
///
/// Scans are append-only; a driver's current position is the most recent
/// fact, recomputed on read.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_position(
    db: &dyn Database,
    position: &DriverPositionRow,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO driver_positions (driver_id, checkpoint_id, route_id, scanned_at)
         VALUES ($1, $2, $3, $4)",
        &[
            DatabaseValue::Int64(position.driver_id),
            DatabaseValue::Int32(position.checkpoint_id),
            DatabaseValue::Int32(position.route_id),
            DatabaseValue::DateTime(position.scanned_at.naive_utc()),
        ],
    )
    .await?;

    Ok(())
}

/// Fetches drivers whose current position is `checkpoint_id`, scanned at
/// or after `since`, ordered by scan time ascending (first arrived first).
///
/// "Current" means the driver's most recent scan overall — a driver who
/// scanned here and then scanned elsewhere no longer qualifies.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn current_positions_at(
    db: &dyn Database,
    checkpoint_id: i32,
    since: DateTime<Utc>,
) -> Result<Vec<DriverPositionRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT p.driver_id, p.checkpoint_id, p.route_id, p.scanned_at
             FROM driver_positions p
             JOIN (
                 SELECT driver_id, MAX(scanned_at) AS latest
                 FROM driver_positions
                 GROUP BY driver_id
             ) cur ON cur.driver_id = p.driver_id AND cur.latest = p.scanned_at
             WHERE p.checkpoint_id = $1
               AND p.scanned_at >= $2
             ORDER BY p.scanned_at",
            &[
                DatabaseValue::Int32(checkpoint_id),
                DatabaseValue::DateTime(since.naive_utc()),
            ],
        )
        .await?;

    rows.iter().map(row_to_position).collect()
}

// ---------------------------------------------------------------------------
// Shift windows
// ---------------------------------------------------------------------------

fn row_to_shift(row: &switchy_database::Row) -> Result<ShiftRow, DbError> {
    let started_naive: chrono::NaiveDateTime = row.to_value("started_at").unwrap_or_default();
    let ended_naive: Option<chrono::NaiveDateTime> = row.to_value("ended_at").unwrap_or(None);
    let business_raw: String = row.to_value("business_date").unwrap_or_default();

    Ok(ShiftRow {
        id: row
            .to_value("id")
            .map_err(|e| conversion(format!("Failed to parse shift id: {e}")))?,
        driver_id: row
            .to_value("driver_id")
            .map_err(|e| conversion(format!("Failed to parse shift driver id: {e}")))?,
        started_at: utc(started_naive),
        ended_at: ended_naive.map(utc),
        business_date: parse_business_date(&business_raw)?,
        trips_total: row.to_value("trips_total").unwrap_or(0),
        earnings_total: row.to_value("earnings_total").unwrap_or(0.0),
    })
}

const SHIFT_COLUMNS: &str =
    "id, driver_id, started_at, ended_at, business_date, trips_total, earnings_total";

/// Finds a driver's open shift, if any.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_open_shift(
    db: &dyn Database,
    driver_id: i64,
) -> Result<Option<ShiftRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {SHIFT_COLUMNS} FROM shift_windows
                 WHERE driver_id = $1 AND ended_at IS NULL
                 ORDER BY started_at DESC
                 LIMIT 1"
            ),
            &[DatabaseValue::Int64(driver_id)],
        )
        .await?;

    rows.first().map(row_to_shift).transpose()
}

/// Finds a driver's shift row for a business date, open or closed.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_shift_on_date(
    db: &dyn Database,
    driver_id: i64,
    business_date: NaiveDate,
) -> Result<Option<ShiftRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {SHIFT_COLUMNS} FROM shift_windows
                 WHERE driver_id = $1 AND business_date = $2
                 ORDER BY started_at DESC
                 LIMIT 1"
            ),
            &[DatabaseValue::Int64(driver_id), date_param(business_date)],
        )
        .await?;

    rows.first().map(row_to_shift).transpose()
}

/// Opens a new shift window.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_shift(
    db: &dyn Database,
    driver_id: i64,
    started_at: DateTime<Utc>,
    business_date: NaiveDate,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO shift_windows (driver_id, started_at, business_date)
         VALUES ($1, $2, $3)",
        &[
            DatabaseValue::Int64(driver_id),
            DatabaseValue::DateTime(started_at.naive_utc()),
            date_param(business_date),
        ],
    )
    .await?;

    Ok(())
}

/// Reopens a closed shift on the same business date.
///
/// Restarting a shift within one business day reuses the existing row
/// instead of creating a duplicate.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn reopen_shift(db: &dyn Database, shift_id: i64) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE shift_windows SET ended_at = NULL WHERE id = $1",
        &[DatabaseValue::Int64(shift_id)],
    )
    .await?;

    Ok(())
}

/// Closes an open shift, snapshotting the business-day totals.
///
/// Guarded on `ended_at IS NULL` so a duplicated end-shift call is a
/// no-op. Returns `true` when this call performed the close.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn close_shift_if_open(
    db: &dyn Database,
    shift_id: i64,
    ended_at: DateTime<Utc>,
    trips_total: i64,
    earnings_total: f64,
) -> Result<bool, DbError> {
    let affected = db
        .exec_raw_params(
            "UPDATE shift_windows
             SET ended_at = $2, trips_total = $3, earnings_total = $4
             WHERE id = $1 AND ended_at IS NULL",
            &[
                DatabaseValue::Int64(shift_id),
                DatabaseValue::DateTime(ended_at.naive_utc()),
                DatabaseValue::Int64(trips_total),
                DatabaseValue::Real64(earnings_total),
            ],
        )
        .await?;

    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_dates_round_trip_through_text_form() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let DatabaseValue::String(raw) = date_param(date) else {
            panic!("date params are text");
        };
        assert_eq!(raw, "2025-06-01");
        assert_eq!(parse_business_date(&raw).unwrap(), date);
    }

    #[test]
    fn iso_text_dates_order_chronologically() {
        // Window predicates rely on lexicographic == chronological.
        let earlier = date_param(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
        let later = date_param(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        let (DatabaseValue::String(a), DatabaseValue::String(b)) = (earlier, later) else {
            panic!("date params are text");
        };
        assert!(a < b);
    }
}
