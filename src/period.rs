//! Reporting-month resolution.
//!
//! Operational reporting periods close on the 25th, so anything issued on
//! or after the 26th is reported in the following calendar month.

use chrono::{Datelike, Months, NaiveDate};

use crate::util::parse_date_safe;

/// First day of the month that belongs to the next reporting period.
pub const CUTOVER_DAY: u32 = 26;

/// Reporting `(year, month0)` for a calendar date, `month0` in `0..12`.
pub fn reporting_period(date: NaiveDate) -> (i32, u32) {
    if date.day() < CUTOVER_DAY {
        return (date.year(), date.month0());
    }
    match date
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
    {
        Some(next) => (next.year(), next.month0()),
        None => (date.year(), date.month0()),
    }
}

/// Month slot (`0..12`) of `date` within `target_year`, or `None` when the
/// date is missing or reports into another year.
pub fn reporting_month(date: Option<NaiveDate>, target_year: i32) -> Option<usize> {
    let (year, month0) = reporting_period(date?);
    (year == target_year).then_some(month0 as usize)
}

/// Parses `date` and resolves its reporting month in `target_year`.
///
/// Empty, malformed and out-of-year dates all give `None`.
pub fn resolve_reporting_month(date: &str, target_year: i32) -> Option<usize> {
    reporting_month(parse_date_safe(Some(date)), target_year)
}
