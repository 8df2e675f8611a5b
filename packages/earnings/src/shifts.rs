//! Shift window bracketing.

use chrono::{DateTime, Utc};
use jeepney_database::queries;
use jeepney_earnings_models::{EarningsBucket, ShiftCloseOutcome, ShiftStartOutcome, ShiftSummary};
use switchy_database::Database;

use crate::{BusinessCalendar, EarningsError};

/// Opens a driver's shift for the current business day.
///
/// Rejects when a shift is already open. Restarting on a business day
/// that already has a closed shift reopens that row instead of creating a
/// duplicate.
///
/// # Errors
///
/// Returns [`EarningsError::DriverNotFound`] for an unknown driver,
/// [`EarningsError::ShiftAlreadyOpen`] when one is open, or
/// [`EarningsError::Db`] if a query fails.
pub async fn start_shift(
    db: &dyn Database,
    calendar: &BusinessCalendar,
    driver_id: i64,
    now: DateTime<Utc>,
) -> Result<ShiftStartOutcome, EarningsError> {
    if !queries::driver_exists(db, driver_id).await? {
        return Err(EarningsError::DriverNotFound { driver_id });
    }

    if queries::find_open_shift(db, driver_id).await?.is_some() {
        return Err(EarningsError::ShiftAlreadyOpen { driver_id });
    }

    let business_date = calendar.business_day(now);

    if let Some(existing) = queries::find_shift_on_date(db, driver_id, business_date).await? {
        queries::reopen_shift(db, existing.id).await?;
        log::info!("Driver {driver_id} reopened shift {} on {business_date}", existing.id);
        return Ok(ShiftStartOutcome::Reopened);
    }

    queries::insert_shift(db, driver_id, now, business_date).await?;
    log::info!("Driver {driver_id} started shift on {business_date}");
    Ok(ShiftStartOutcome::Opened)
}

/// Closes a driver's open shift, snapshotting the business-day totals at
/// this moment.
///
/// Ending with no open shift is a descriptive no-op
/// ([`ShiftCloseOutcome::NoOpenShift`]), not an error. The close is a
/// conditional write guarded on `ended_at IS NULL`, so a duplicated call
/// cannot close twice.
///
/// # Errors
///
/// Returns [`EarningsError::DriverNotFound`] for an unknown driver or
/// [`EarningsError::Db`] if a query fails.
pub async fn end_shift(
    db: &dyn Database,
    calendar: &BusinessCalendar,
    driver_id: i64,
    now: DateTime<Utc>,
) -> Result<ShiftCloseOutcome, EarningsError> {
    if !queries::driver_exists(db, driver_id).await? {
        return Err(EarningsError::DriverNotFound { driver_id });
    }

    let Some(open) = queries::find_open_shift(db, driver_id).await? else {
        return Ok(ShiftCloseOutcome::NoOpenShift);
    };

    let business_date = calendar.business_day(now);
    let (trip_count, total_amount) =
        queries::ledger_window_totals(db, driver_id, business_date, business_date).await?;

    if !queries::close_shift_if_open(db, open.id, now, trip_count, total_amount).await? {
        return Ok(ShiftCloseOutcome::NoOpenShift);
    }

    log::info!(
        "Driver {driver_id} ended shift {}: {trip_count} trips, {total_amount} earned",
        open.id
    );

    Ok(ShiftCloseOutcome::Closed(ShiftSummary {
        driver_id,
        started_at: open.started_at,
        ended_at: now,
        business_date,
        today: EarningsBucket {
            trip_count,
            total_amount,
        },
    }))
}
