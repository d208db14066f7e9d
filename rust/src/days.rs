//! Whole-day arithmetic for the solver.
//!
//! All scheduling math runs over signed day numbers. Conversion to and from
//! `NaiveDate` only happens at the edges of the pipeline.

use chrono::{Datelike, NaiveDate};

/// A calendar day expressed as days since 0001-01-01 (CE day 1).
pub type Day = i64;

/// Convert a date to its day number.
#[inline]
pub fn to_day(date: NaiveDate) -> Day {
    date.num_days_from_ce() as Day
}

/// Convert a day number back to a date.
///
/// Returns `None` if the day falls outside chrono's representable range.
pub fn to_date(day: Day) -> Option<NaiveDate> {
    let days = i32::try_from(day).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days)
}
