//! Ledger aggregation into the standard reporting windows.

use chrono::{DateTime, Utc};
use jeepney_database::queries;
use jeepney_database_models::NewEarning;
use jeepney_earnings_models::{EarningDraft, EarningsBucket, EarningsSummary};
use switchy_database::Database;

use crate::{BusinessCalendar, EarningsError};

fn bucket((trip_count, total_amount): (i64, f64)) -> EarningsBucket {
    EarningsBucket {
        trip_count,
        total_amount,
    }
}

/// Computes a driver's earnings summary as of an instant.
///
/// Every bucket is re-derived from the ledger: today is the current
/// business day, week the rolling 7 business days ending at it, month and
/// year the calendar periods containing `as_of`, and all-time the
/// unrestricted sum. Each window resolves to one indexed range query over
/// `(driver_id, transaction_date)`.
///
/// # Errors
///
/// Returns [`EarningsError::DriverNotFound`] for an unknown driver or
/// [`EarningsError::Db`] if a query fails.
pub async fn get_summary(
    db: &dyn Database,
    calendar: &BusinessCalendar,
    driver_id: i64,
    as_of: DateTime<Utc>,
) -> Result<EarningsSummary, EarningsError> {
    if !queries::driver_exists(db, driver_id).await? {
        return Err(EarningsError::DriverNotFound { driver_id });
    }

    let today = calendar.business_day(as_of);
    let (week_from, week_to) = calendar.week_window(as_of);
    let (month_from, month_to) = calendar.month_window(as_of);
    let (year_from, year_to) = calendar.year_window(as_of);

    Ok(EarningsSummary {
        today: bucket(queries::ledger_window_totals(db, driver_id, today, today).await?),
        week: bucket(queries::ledger_window_totals(db, driver_id, week_from, week_to).await?),
        month: bucket(queries::ledger_window_totals(db, driver_id, month_from, month_to).await?),
        year: bucket(queries::ledger_window_totals(db, driver_id, year_from, year_to).await?),
        all_time: bucket(queries::ledger_all_time_totals(db, driver_id).await?),
    })
}

/// Appends one earning to the ledger, stamping the business day from the
/// write instant.
///
/// # Errors
///
/// Returns [`EarningsError::DriverNotFound`] for an unknown driver, or
/// [`EarningsError::Db`] if the insert fails. Insert failures are
/// retryable by the caller; this function never retries internally.
pub async fn append_earning(
    db: &dyn Database,
    calendar: &BusinessCalendar,
    draft: &EarningDraft,
    now: DateTime<Utc>,
) -> Result<(), EarningsError> {
    if !queries::driver_exists(db, draft.driver_id).await? {
        return Err(EarningsError::DriverNotFound {
            driver_id: draft.driver_id,
        });
    }

    let earning = NewEarning {
        driver_id: draft.driver_id,
        trip_id: draft.trip_id,
        passenger_id: draft.passenger_id,
        original_fare: draft.original_fare,
        discount_amount: draft.discount_amount,
        final_fare: draft.final_fare,
        counts_as_trip: draft.counts_as_trip,
        transaction_date: calendar.business_day(now),
    };

    queries::insert_earning(db, &earning).await?;

    log::debug!(
        "Ledger append: driver {} final_fare {} counts_as_trip {} on {}",
        earning.driver_id,
        earning.final_fare,
        earning.counts_as_trip,
        earning.transaction_date
    );

    Ok(())
}
