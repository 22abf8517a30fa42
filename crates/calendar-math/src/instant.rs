//! Timezone-aware points in civil time.
//!
//! An [`Instant`] is a `Copy` value: arithmetic returns a new instant and
//! never changes one a caller already holds. Equality and ordering use the
//! absolute instant, so `10:00+01:00 == 09:00Z`.
//!
//! # Arithmetic
//!
//! Every `add_*`, `sub_*` and `set_*` method goes through
//! [`Instant::add_duration`], which applies a [`Duration`] in three steps:
//!
//! 1. years and months on the local calendar, clamping the day to the end of
//!    the target month (Jan 31 + 1 month = Feb 28/29, never Mar 3);
//! 2. days on the local calendar, keeping the wall-clock time;
//! 3. hours, minutes, seconds and fractions as exact elapsed time.
//!
//! Clamping makes month arithmetic lossy: Jan 31 + 1 month − 1 month is
//! Jan 28 (or 29), not Jan 31.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{
    DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta,
    Timelike, Utc,
};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::config::Config;
use crate::duration::Duration;
use crate::error::{CalendarError, Result};
use crate::format;
use crate::phrase;
use crate::range::Granularity;
use crate::zone::{format_offset, Zone};

/// Default print pattern: `2026-02-07 09:05:00.000000 +0100`.
pub const DEFAULT_FORMAT: &str = "Y-m-d H:i:s.u O";

/// A civil date-time with an attached timezone.
#[derive(Debug, Clone, Copy)]
pub struct Instant {
    local: DateTime<FixedOffset>,
    zone: Zone,
}

impl Instant {
    // ── construction ────────────────────────────────────────────────────

    /// Express an absolute UTC instant in `zone`.
    pub fn from_utc(utc: DateTime<Utc>, zone: Zone) -> Self {
        Self {
            local: zone.from_utc(&utc),
            zone,
        }
    }

    /// The current instant, read from the system clock.
    pub fn now(zone: Zone) -> Self {
        Self::from_utc(Utc::now(), zone)
    }

    /// Midnight of the current local day in `zone`.
    pub fn today(zone: Zone) -> Result<Self> {
        Self::now(zone).start_of_day()
    }

    /// Seconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDateSpec`] if the value is outside
    /// the representable range.
    pub fn from_timestamp(seconds: i64, zone: Zone) -> Result<Self> {
        DateTime::from_timestamp(seconds, 0)
            .map(|utc| Self::from_utc(utc, zone))
            .ok_or_else(|| CalendarError::InvalidDateSpec(format!("timestamp {seconds}")))
    }

    /// Fractional seconds since the Unix epoch, kept to the microsecond.
    pub fn from_timestamp_f64(seconds: f64, zone: Zone) -> Result<Self> {
        let invalid = || CalendarError::InvalidDateSpec(format!("timestamp {seconds}"));
        if !seconds.is_finite() {
            return Err(invalid());
        }
        let micros = (seconds * 1_000_000.0).round();
        if micros.abs() >= i64::MAX as f64 {
            return Err(invalid());
        }
        DateTime::from_timestamp_micros(micros as i64)
            .map(|utc| Self::from_utc(utc, zone))
            .ok_or_else(invalid)
    }

    /// Build from civil fields interpreted in `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDateSpec`] if any field is out of range
    /// for the calendar (month 13, February 30, hour 24, ...).
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        zone: Zone,
    ) -> Result<Self> {
        let invalid = || {
            CalendarError::InvalidDateSpec(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            ))
        };
        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .ok_or_else(invalid)?;
        Self::from_naive(&naive, zone).ok_or_else(invalid)
    }

    /// Midnight of the given date in `zone`.
    pub fn from_ymd(year: i32, month: u32, day: u32, zone: Zone) -> Result<Self> {
        Self::from_ymd_hms(year, month, day, 0, 0, 0, zone)
    }

    /// Parse an instant specification, resolving relative phrases against
    /// the system clock. See [`Instant::parse_at`] for the accepted forms.
    pub fn parse(text: &str, zone: Zone) -> Result<Self> {
        Self::parse_at(text, zone, Self::now(zone))
    }

    /// Parse an instant specification with `now` as the reference point.
    ///
    /// Accepted forms, tried in order:
    ///
    /// - `"now"`, `"today"`
    /// - `"@1700000000"` or a bare integer other than four digits: epoch seconds
    /// - RFC 3339, or `YYYY-MM-DD HH:MM:SS[.f]±HH:MM`: the explicit offset fixes
    ///   the absolute instant, which is then expressed in `zone`
    /// - `YYYY-MM-DD[ T]HH:MM[:SS[.f]]`, `YYYY-MM-DD`, `YYYY-MM`, `YYYY`: local
    ///   civil time in `zone`, missing parts defaulting to the start
    /// - a relative phrase applied to `now` (`"+1 day"`, `"2 weeks ago"`)
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDateSpec`] if no form matches.
    pub fn parse_at(text: &str, zone: Zone, now: Instant) -> Result<Self> {
        let s = text.trim();
        let now = now.with_zone(zone);
        let invalid = || CalendarError::InvalidDateSpec(format!("'{s}'"));

        match s.to_ascii_lowercase().as_str() {
            "now" => return Ok(now),
            "today" => return now.start_of_day(),
            _ => {}
        }

        if let Some(epoch) = parse_epoch(s) {
            return Self::from_timestamp(epoch, zone);
        }
        if let Some(absolute) = parse_with_offset(s) {
            return Ok(Self::from_utc(absolute.with_timezone(&Utc), zone));
        }
        if let Some(naive) = parse_naive(s) {
            return Self::from_naive(&naive, zone).ok_or_else(invalid);
        }

        let delta = phrase::evaluate(s).map_err(|_| invalid())?;
        now.add_duration(&Duration::from(delta))
    }

    /// The same absolute instant seen from another zone.
    pub fn with_zone(&self, zone: Zone) -> Self {
        Self::from_utc(self.utc(), zone)
    }

    fn from_naive(naive: &NaiveDateTime, zone: Zone) -> Option<Self> {
        zone.from_local(naive).map(|local| Self { local, zone })
    }

    fn start_of_day(&self) -> Result<Self> {
        let midnight = self.local.date_naive().and_time(chrono::NaiveTime::MIN);
        Self::from_naive(&midnight, self.zone)
            .ok_or_else(|| CalendarError::OutOfRange(format!("start of day of {self}")))
    }

    // ── accessors ───────────────────────────────────────────────────────

    /// The civil date-time with its offset at this instant.
    pub fn local(&self) -> DateTime<FixedOffset> {
        self.local
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.local.with_timezone(&Utc)
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn year(&self) -> i32 {
        self.local.year()
    }

    pub fn month(&self) -> u32 {
        self.local.month()
    }

    pub fn day(&self) -> u32 {
        self.local.day()
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    pub fn minute(&self) -> u32 {
        self.local.minute()
    }

    pub fn second(&self) -> u32 {
        self.local.second()
    }

    pub fn nanosecond(&self) -> u32 {
        self.local.nanosecond()
    }

    /// Quarter of the year, 1–4.
    pub fn quarter(&self) -> u32 {
        (self.month() - 1) / 3 + 1
    }

    /// ISO 8601 week number, 1–53.
    pub fn week(&self) -> u32 {
        self.local.iso_week().week()
    }

    /// ISO weekday, Monday = 1 … Sunday = 7.
    pub fn day_of_week(&self) -> u32 {
        self.local.weekday().number_from_monday()
    }

    /// Day of the year, from 1.
    pub fn day_of_year(&self) -> u32 {
        self.local.ordinal()
    }

    pub fn is_leap_year(&self) -> bool {
        NaiveDate::from_ymd_opt(self.year(), 2, 29).is_some()
    }

    pub fn days_in_month(&self) -> u32 {
        let first = self.local.date_naive().with_day(1);
        let next = first.and_then(|d| d.checked_add_months(Months::new(1)));
        match (first, next) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            // only reachable at the end of chrono's range, which ends in December
            _ => 31,
        }
    }

    /// Seconds since the Unix epoch (absolute, zone-independent).
    pub fn timestamp(&self) -> i64 {
        self.local.timestamp()
    }

    /// Epoch seconds shifted by this instant's UTC offset: the local
    /// wall-clock reading as if it were UTC.
    ///
    /// Two instants that are equal can have different local timestamps; use
    /// [`Instant::timestamp`] for ordering.
    pub fn local_timestamp(&self) -> i64 {
        self.timestamp() + i64::from(self.offset_seconds())
    }

    /// UTC offset in seconds at this instant.
    pub fn offset_seconds(&self) -> i32 {
        self.local.offset().local_minus_utc()
    }

    /// UTC offset as `+HHMM`.
    pub fn timezone_num(&self) -> String {
        format_offset(self.offset_seconds(), false)
    }

    // ── arithmetic ──────────────────────────────────────────────────────

    /// Apply a duration (see the module docs for the order of operations).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the result leaves chrono's
    /// representable range.
    pub fn add_duration(&self, duration: &Duration) -> Result<Instant> {
        let overflow = || CalendarError::OutOfRange(format!("{self} + {duration}"));

        let months = duration
            .years()
            .checked_mul(12)
            .and_then(|m| m.checked_add(duration.months()))
            .ok_or_else(overflow)?;
        let days = duration.days();

        let calendar = if months == 0 && days == 0 {
            self.local
        } else {
            let mut naive = self.local.naive_local();
            if months != 0 {
                let count = Months::new(u32::try_from(months.unsigned_abs()).map_err(|_| overflow())?);
                naive = if months > 0 {
                    naive.checked_add_months(count)
                } else {
                    naive.checked_sub_months(count)
                }
                .ok_or_else(overflow)?;
            }
            if days != 0 {
                naive = TimeDelta::try_days(days)
                    .and_then(|delta| naive.checked_add_signed(delta))
                    .ok_or_else(overflow)?;
            }
            self.zone.from_local(&naive).ok_or_else(overflow)?
        };

        let seconds = duration
            .hours()
            .checked_mul(3_600)
            .zip(duration.minutes().checked_mul(60))
            .and_then(|(h, m)| h.checked_add(m))
            .and_then(|hm| hm.checked_add(duration.seconds()))
            .ok_or_else(overflow)?;
        let exact = TimeDelta::try_seconds(seconds)
            .and_then(|delta| delta.checked_add(&TimeDelta::microseconds(duration.microseconds())))
            .ok_or_else(overflow)?;

        let utc = calendar
            .with_timezone(&Utc)
            .checked_add_signed(exact)
            .ok_or_else(overflow)?;
        Ok(Self::from_utc(utc, self.zone))
    }

    /// Apply a duration backwards.
    pub fn sub_duration(&self, duration: &Duration) -> Result<Instant> {
        self.add_duration(&duration.negated())
    }

    pub fn add_years(&self, years: i64) -> Result<Instant> {
        self.add_duration(&Duration::from_parts(years, 0, 0, 0, 0, 0))
    }

    pub fn add_months(&self, months: i64) -> Result<Instant> {
        self.add_duration(&Duration::from_parts(0, months, 0, 0, 0, 0))
    }

    pub fn add_days(&self, days: i64) -> Result<Instant> {
        self.add_duration(&Duration::from_parts(0, 0, days, 0, 0, 0))
    }

    pub fn add_hours(&self, hours: i64) -> Result<Instant> {
        self.add_duration(&Duration::from_parts(0, 0, 0, hours, 0, 0))
    }

    pub fn add_minutes(&self, minutes: i64) -> Result<Instant> {
        self.add_duration(&Duration::from_parts(0, 0, 0, 0, minutes, 0))
    }

    pub fn add_seconds(&self, seconds: i64) -> Result<Instant> {
        self.add_duration(&Duration::from_parts(0, 0, 0, 0, 0, seconds))
    }

    pub fn sub_years(&self, years: i64) -> Result<Instant> {
        self.add_years(negate(years)?)
    }

    pub fn sub_months(&self, months: i64) -> Result<Instant> {
        self.add_months(negate(months)?)
    }

    pub fn sub_days(&self, days: i64) -> Result<Instant> {
        self.add_days(negate(days)?)
    }

    pub fn sub_hours(&self, hours: i64) -> Result<Instant> {
        self.add_hours(negate(hours)?)
    }

    pub fn sub_minutes(&self, minutes: i64) -> Result<Instant> {
        self.add_minutes(negate(minutes)?)
    }

    pub fn sub_seconds(&self, seconds: i64) -> Result<Instant> {
        self.add_seconds(negate(seconds)?)
    }

    // Setters add the signed difference to the current field, so a value
    // outside the field's range carries into the next unit (set_day(32) in
    // January lands on February 1) and month changes clamp the day.

    pub fn set_year(&self, year: i64) -> Result<Instant> {
        self.add_years(year.saturating_sub(i64::from(self.year())))
    }

    pub fn set_month(&self, month: i64) -> Result<Instant> {
        self.add_months(month.saturating_sub(i64::from(self.month())))
    }

    pub fn set_day(&self, day: i64) -> Result<Instant> {
        self.add_days(day.saturating_sub(i64::from(self.day())))
    }

    pub fn set_hour(&self, hour: i64) -> Result<Instant> {
        self.add_hours(hour.saturating_sub(i64::from(self.hour())))
    }

    pub fn set_minute(&self, minute: i64) -> Result<Instant> {
        self.add_minutes(minute.saturating_sub(i64::from(self.minute())))
    }

    pub fn set_second(&self, second: i64) -> Result<Instant> {
        self.add_seconds(second.saturating_sub(i64::from(self.second())))
    }

    // ── comparison ──────────────────────────────────────────────────────

    /// Compare with an operator token: `<`, `<=`, `=`/`==`, `!=`/`<>`, `>=`,
    /// `>`, or the aliases `lt`, `le`/`lte`, `eq`, `ne`, `ge`/`gte`, `gt`.
    ///
    /// An unknown operator yields `false`. This is kept for compatibility
    /// with callers that pass free-form operator strings.
    pub fn compare(&self, op: &str, other: &Instant) -> bool {
        match CompareOp::parse(op) {
            Some(op) => op.holds(self.cmp(other)),
            None => {
                debug!(op, "unknown comparison operator, treating as false");
                false
            }
        }
    }

    /// Whether this instant lies between `min` and `max`, both bounds
    /// included when `inclusive` is true.
    pub fn between(&self, min: &Instant, max: &Instant, inclusive: bool) -> bool {
        self.between_bounds(min, max, inclusive, inclusive)
    }

    /// Like [`Instant::between`] with each bound's inclusion chosen separately.
    pub fn between_bounds(
        &self,
        min: &Instant,
        max: &Instant,
        include_min: bool,
        include_max: bool,
    ) -> bool {
        let above = if include_min { self >= min } else { self > min };
        let below = if include_max { self <= max } else { self < max };
        above && below
    }

    // ── printing ────────────────────────────────────────────────────────

    /// Format with date-format tokens (see [`format::format`]).
    pub fn format(&self, pattern: &str) -> String {
        format::format(self, pattern)
    }

    /// Format with strftime specifiers plus `%q` (see [`format::strftime`]).
    pub fn strftime(&self, pattern: &str) -> Option<String> {
        format::strftime(self, pattern)
    }

    /// Format with the configured default pattern.
    pub fn to_default_string(&self, config: &Config) -> String {
        self.format(&config.default_format)
    }

    /// The bucket label for a granularity: `"2026-02-07 09:05"` for minutes,
    /// `"2026Q1"` for quarters, and so on.
    pub fn label(&self, granularity: Granularity) -> String {
        self.format(granularity.key_format())
    }
}

fn negate(n: i64) -> Result<i64> {
    n.checked_neg()
        .ok_or_else(|| CalendarError::OutOfRange(format!("cannot negate {n}")))
}

/// Bare integer epoch seconds, or `@`-prefixed. Four-digit values are years.
fn parse_epoch(s: &str) -> Option<i64> {
    if let Some(rest) = s.strip_prefix('@') {
        return rest.parse().ok();
    }
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if s.len() == 4 {
        return None;
    }
    s.parse().ok()
}

/// Text carrying an explicit offset.
fn parse_with_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    [
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f %z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ]
    .iter()
    .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
}

/// Local civil text without an offset.
fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive);
    }

    let date = if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)
    } else if s.len() == 7 {
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
    } else {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }?;
    Some(date.and_time(chrono::NaiveTime::MIN))
}

/// A comparison operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CompareOp {
    /// Parse a symbolic or mnemonic operator; `None` for anything else.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "<" | "lt" => Some(Self::Lt),
            "<=" | "le" | "lte" => Some(Self::Le),
            "=" | "==" | "eq" => Some(Self::Eq),
            "!=" | "<>" | "ne" => Some(Self::Ne),
            ">=" | "ge" | "gte" => Some(Self::Ge),
            ">" | "gt" => Some(Self::Gt),
            _ => None,
        }
    }

    /// Whether `left <op> right` holds given `left.cmp(right)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering.is_lt(),
            Self::Le => ordering.is_le(),
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
            Self::Ge => ordering.is_ge(),
            Self::Gt => ordering.is_gt(),
        }
    }
}

impl PartialEq for Instant {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local
    }
}

impl Eq for Instant {}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.local.cmp(&other.local)
    }
}

impl Hash for Instant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.local.hash(state);
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DEFAULT_FORMAT))
    }
}

impl Serialize for Instant {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.local.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }
}
