//! Whole-unit differences between two instants.
//!
//! Every function returns the signed count of whole units from `a` to `b`,
//! so `diff_x(a, b) == -diff_x(b, a)`.
//!
//! Seconds, minutes, hours and days are fixed lengths measured on absolute
//! elapsed time and floored. Months and years are counted on the calendar:
//! the result is the largest `n` such that stepping the earlier instant
//! forward by `n` months (or years) does not pass the later one. Because
//! month steps clamp to the end of the month, Jan 31 → Feb 28 counts as one
//! whole month.

use chrono::Timelike;

use crate::duration::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::error::Result;
use crate::instant::Instant;

/// Whole seconds elapsed from `a` to `b`, floored.
pub fn diff_seconds(a: &Instant, b: &Instant) -> i64 {
    let (a, b) = (a.utc(), b.utc());
    let seconds = b.timestamp() - a.timestamp();
    if b.nanosecond() < a.nanosecond() {
        seconds - 1
    } else {
        seconds
    }
}

pub fn diff_minutes(a: &Instant, b: &Instant) -> i64 {
    diff_seconds(a, b).div_euclid(SECONDS_PER_MINUTE)
}

pub fn diff_hours(a: &Instant, b: &Instant) -> i64 {
    diff_seconds(a, b).div_euclid(SECONDS_PER_HOUR)
}

/// Whole 24-hour periods elapsed, floored. Across a DST change a calendar
/// day may be 23 or 25 hours long; this counts elapsed time, not dates.
pub fn diff_days(a: &Instant, b: &Instant) -> i64 {
    diff_seconds(a, b).div_euclid(SECONDS_PER_DAY)
}

/// Calendar-correct whole years from `a` to `b`.
///
/// # Errors
///
/// Returns [`CalendarError::OutOfRange`](crate::CalendarError::OutOfRange)
/// only if the probe step leaves chrono's representable range.
pub fn diff_years(a: &Instant, b: &Instant) -> Result<i64> {
    let (low, high, sign) = ordered(a, b);
    let years = i64::from(high.year() - low.year());
    if years == 0 {
        return Ok(0);
    }
    let whole = if low.add_years(years)? > high {
        years - 1
    } else {
        years
    };
    Ok(sign * whole)
}

/// Calendar-correct whole months from `a` to `b`.
///
/// # Errors
///
/// Same as [`diff_years`].
pub fn diff_months(a: &Instant, b: &Instant) -> Result<i64> {
    let (low, high, sign) = ordered(a, b);
    let months = i64::from(high.year() - low.year()) * 12 + i64::from(high.month())
        - i64::from(low.month());
    if months == 0 {
        return Ok(0);
    }
    let whole = if low.add_months(months)? > high {
        months - 1
    } else {
        months
    };
    Ok(sign * whole)
}

/// Order the pair and read both in the earlier instant's zone, so calendar
/// fields compare on the same wall clock.
fn ordered(a: &Instant, b: &Instant) -> (Instant, Instant, i64) {
    let (low, high, sign) = if a <= b { (a, b, 1) } else { (b, a, -1) };
    (*low, high.with_zone(low.zone()), sign)
}
