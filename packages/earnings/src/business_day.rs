//! Business-day calendar math.
//!
//! The fleet's accounting day starts at 05:00 local time, not midnight:
//! a jeepney still out at 02:00 is earning against the previous day. The
//! boundary is computed by shifting the instant back by the day-start
//! hour before taking the calendar date — there are no hour-range special
//! cases and no stored "last reset" state.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};

/// Seconds east of UTC for Philippine Standard Time.
const PST_OFFSET_SECONDS: i32 = 8 * 3600;

/// Fleet-local calendar with a non-midnight day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    /// Local offset from UTC.
    pub utc_offset: FixedOffset,
    /// Hour of the local day at which the business day rolls over.
    pub day_start_hour: u32,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(PST_OFFSET_SECONDS).expect("valid offset"),
            day_start_hour: 5,
        }
    }
}

impl BusinessCalendar {
    /// Returns the business day containing `as_of`.
    #[must_use]
    pub fn business_day(&self, as_of: DateTime<Utc>) -> NaiveDate {
        let local = as_of.with_timezone(&self.utc_offset);
        (local - Duration::hours(i64::from(self.day_start_hour))).date_naive()
    }

    /// Returns the inclusive rolling 7-day window ending at the current
    /// business day.
    #[must_use]
    pub fn week_window(&self, as_of: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        let today = self.business_day(as_of);
        (today - Duration::days(6), today)
    }

    /// Returns the inclusive calendar-month window containing `as_of`.
    #[must_use]
    pub fn month_window(&self, as_of: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        let local = as_of.with_timezone(&self.utc_offset).date_naive();
        let first = local.with_day(1).expect("day 1 exists");
        let next_month = if local.month() == 12 {
            NaiveDate::from_ymd_opt(local.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(local.year(), local.month() + 1, 1)
        }
        .expect("first of month exists");
        (first, next_month - Duration::days(1))
    }

    /// Returns the inclusive calendar-year window containing `as_of`.
    #[must_use]
    pub fn year_window(&self, as_of: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        let local = as_of.with_timezone(&self.utc_offset).date_naive();
        (
            NaiveDate::from_ymd_opt(local.year(), 1, 1).expect("jan 1 exists"),
            NaiveDate::from_ymd_opt(local.year(), 12, 31).expect("dec 31 exists"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn calendar() -> BusinessCalendar {
        BusinessCalendar::default()
    }

    /// Builds a UTC instant from fleet-local (UTC+8) wall-clock time.
    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        calendar()
            .utc_offset
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn four_fifty_nine_belongs_to_previous_day() {
        let date = calendar().business_day(local(2025, 6, 10, 4, 59));
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
    }

    #[test]
    fn five_oh_one_belongs_to_the_calendar_day() {
        let date = calendar().business_day(local(2025, 6, 10, 5, 1));
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
    }

    #[test]
    fn two_am_scan_belongs_to_previous_business_day() {
        let date = calendar().business_day(local(2025, 6, 10, 2, 0));
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
    }

    #[test]
    fn boundary_splits_same_calendar_date() {
        let cal = calendar();
        let before = cal.business_day(local(2025, 6, 10, 4, 59));
        let after = cal.business_day(local(2025, 6, 10, 5, 1));
        assert_ne!(before, after);
    }

    #[test]
    fn week_window_spans_seven_inclusive_days() {
        let (from, to) = calendar().week_window(local(2025, 6, 10, 12, 0));
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 6, 4).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        assert_eq!((to - from).num_days(), 6);
    }

    #[test]
    fn month_window_covers_the_whole_month() {
        let (from, to) = calendar().month_window(local(2025, 6, 10, 12, 0));
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn december_month_window_rolls_the_year() {
        let (from, to) = calendar().month_window(local(2025, 12, 15, 12, 0));
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn year_window_covers_the_whole_year() {
        let (from, to) = calendar().year_window(local(2025, 6, 10, 12, 0));
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }
}
