//! Calendar-component durations.
//!
//! A [`Duration`] holds six signed components (years, months, days, hours,
//! minutes, seconds) plus a sub-second remainder in microseconds. Months and
//! years have no fixed length, so totals are computed one of two ways:
//!
//! - **anchored** — the duration is applied to a concrete [`Instant`] with
//!   full calendar arithmetic and the real elapsed time is measured. "1
//!   month" from January 1 is 31 days; from February 1 of a leap year, 29.
//! - **nominal** — no anchor is known, so fixed unit lengths are used
//!   (month = 30 days, year = 365 days).
//!
//! # Accepted inputs
//!
//! [`Duration::parse`] tries, in order:
//!
//! 1. a non-negative number: whole seconds plus a fraction (`"100"`, `"1.5"`);
//! 2. an ISO 8601 duration starting with `P` (`"P1Y2M"`, `"PT1.5S"`);
//! 3. a relative phrase (`"2 weeks"`, `"1 day + 12 hours"`, `"next month"`).
//!
//! ISO strings that do not conform are normalized rather than rejected (see
//! [`normalize_iso`]); a string with nothing recognizable becomes `PT0S`.
//! Only the phrase path can fail.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{CalendarError, Result};
use crate::instant::Instant;
use crate::phrase::{self, CalendarDelta};

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;
/// Nominal month: 30 days.
pub const SECONDS_PER_MONTH: i64 = 2_592_000;
/// Nominal year: 365 days.
pub const SECONDS_PER_YEAR: i64 = 31_536_000;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// A signed calendar-component duration, optionally anchored to an instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Duration {
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    microseconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<Instant>,
}

impl Duration {
    /// Build a duration from explicit components.
    pub fn from_parts(
        years: i64,
        months: i64,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    ) -> Self {
        Self {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
            ..Self::default()
        }
    }

    /// A duration of `seconds` seconds; the fractional part is kept to the
    /// microsecond.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDurationFormat`] for negative or
    /// non-finite input.
    pub fn from_seconds(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() || seconds < 0.0 || seconds > i64::MAX as f64 {
            return Err(CalendarError::InvalidDurationFormat(format!(
                "'{seconds}': expected a non-negative number of seconds"
            )));
        }
        let whole = seconds.floor();
        let mut whole_seconds = whole as i64;
        let mut micros = ((seconds - whole) * MICROS_PER_SECOND as f64).round() as i64;
        if micros >= MICROS_PER_SECOND {
            whole_seconds = whole_seconds.saturating_add(1);
            micros = 0;
        }
        Ok(Self {
            seconds: whole_seconds,
            microseconds: micros,
            ..Self::default()
        })
    }

    /// Parse a duration from raw text, optionally binding an anchor.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDurationFormat`] if the input is
    /// neither numeric nor `P`-prefixed and the phrase evaluator rejects it.
    ///
    /// # Examples
    ///
    /// ```
    /// use calendar_math::Duration;
    ///
    /// assert_eq!(Duration::parse("PT120S", None).unwrap().total_seconds(None).unwrap(), 120);
    /// assert_eq!(Duration::parse("2 weeks", None).unwrap().days(), 14);
    /// // Non-conformant ISO input is normalized, not rejected
    /// assert!(Duration::parse("P-nonsense", None).unwrap().is_zero());
    /// ```
    pub fn parse(raw: &str, anchor: Option<Instant>) -> Result<Self> {
        let trimmed = raw.trim();

        let mut duration = if let Some(seconds) = parse_non_negative_number(trimmed) {
            Self::from_seconds(seconds)?
        } else if trimmed.starts_with(['P', 'p']) {
            match scan_iso(trimmed, true) {
                Some(parts) => parts.into_duration(),
                None => {
                    // Compatibility: malformed ISO input degrades to whatever
                    // components can be salvaged, or PT0S, instead of an error.
                    let parts = scan_iso(trimmed, false).unwrap_or_default();
                    debug!(input = trimmed, normalized = %parts.into_duration(), "normalized non-conformant ISO 8601 duration");
                    parts.into_duration()
                }
            }
        } else {
            Self::from(phrase::evaluate(trimmed)?)
        };

        duration.anchor = anchor;
        Ok(duration)
    }

    /// Bind an anchor used to resolve month and year lengths.
    pub fn with_anchor(mut self, anchor: Instant) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn anchor(&self) -> Option<&Instant> {
        self.anchor.as_ref()
    }

    pub fn years(&self) -> i64 {
        self.years
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn hours(&self) -> i64 {
        self.hours
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second remainder in microseconds (same sign as the duration).
    pub fn microseconds(&self) -> i64 {
        self.microseconds
    }

    /// Sub-second remainder as a fraction of a second.
    pub fn fraction(&self) -> f64 {
        self.microseconds as f64 / MICROS_PER_SECOND as f64
    }

    /// Every component negated; the anchor is kept.
    pub fn negated(&self) -> Self {
        Self {
            years: self.years.saturating_neg(),
            months: self.months.saturating_neg(),
            days: self.days.saturating_neg(),
            hours: self.hours.saturating_neg(),
            minutes: self.minutes.saturating_neg(),
            seconds: self.seconds.saturating_neg(),
            microseconds: self.microseconds.saturating_neg(),
            anchor: self.anchor,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
            && self.microseconds == 0
    }

    /// Total length in microseconds.
    ///
    /// With an anchor (`anchor` if given, else the stored one) this is the
    /// real time elapsed from the anchor to `anchor + self`, negative when
    /// the duration moves backwards. Without one, nominal unit lengths apply.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if applying the duration to the
    /// anchor leaves the representable date range.
    pub fn total_microseconds(&self, anchor: Option<&Instant>) -> Result<i64> {
        match anchor.or(self.anchor.as_ref()) {
            Some(base) => {
                let end = base.add_duration(self)?;
                let elapsed = end.local().signed_duration_since(base.local());
                elapsed
                    .num_microseconds()
                    .ok_or_else(|| CalendarError::OutOfRange(format!("'{self}' from {base}")))
            }
            None => self.nominal_microseconds(),
        }
    }

    /// Total length in seconds as a float, fraction included.
    pub fn total_time(&self, anchor: Option<&Instant>) -> Result<f64> {
        Ok(self.total_microseconds(anchor)? as f64 / MICROS_PER_SECOND as f64)
    }

    /// Whole seconds, rounded toward negative infinity.
    pub fn total_seconds(&self, anchor: Option<&Instant>) -> Result<i64> {
        Ok(self
            .total_microseconds(anchor)?
            .div_euclid(MICROS_PER_SECOND))
    }

    pub fn total_minutes(&self, anchor: Option<&Instant>) -> Result<i64> {
        Ok(self.total_seconds(anchor)?.div_euclid(SECONDS_PER_MINUTE))
    }

    pub fn total_hours(&self, anchor: Option<&Instant>) -> Result<i64> {
        Ok(self.total_seconds(anchor)?.div_euclid(SECONDS_PER_HOUR))
    }

    pub fn total_days(&self, anchor: Option<&Instant>) -> Result<i64> {
        Ok(self.total_seconds(anchor)?.div_euclid(SECONDS_PER_DAY))
    }

    fn nominal_microseconds(&self) -> Result<i64> {
        let seconds = i128::from(self.years) * i128::from(SECONDS_PER_YEAR)
            + i128::from(self.months) * i128::from(SECONDS_PER_MONTH)
            + i128::from(self.days) * i128::from(SECONDS_PER_DAY)
            + i128::from(self.hours) * i128::from(SECONDS_PER_HOUR)
            + i128::from(self.minutes) * i128::from(SECONDS_PER_MINUTE)
            + i128::from(self.seconds);
        let micros = seconds * i128::from(MICROS_PER_SECOND) + i128::from(self.microseconds);
        i64::try_from(micros).map_err(|_| CalendarError::OutOfRange(format!("'{self}' in microseconds")))
    }

    /// Canonical ISO 8601 text, e.g. `P1Y2M3DT4H5M6.5S`.
    ///
    /// A duration whose components are all zero or negative prints as
    /// `-P…`; mixed signs print each component with its own sign.
    pub fn to_iso_string(&self) -> String {
        if self.is_zero() {
            return "PT0S".to_string();
        }
        let components = [
            self.years,
            self.months,
            self.days,
            self.hours,
            self.minutes,
            self.seconds,
            self.microseconds,
        ];
        let all_negative = components.iter().all(|c| *c <= 0);
        let (prefix, d) = if all_negative {
            ("-P", self.negated())
        } else {
            ("P", *self)
        };

        let mut out = String::from(prefix);
        for (value, designator) in [(d.years, 'Y'), (d.months, 'M'), (d.days, 'D')] {
            if value != 0 {
                out.push_str(&format!("{value}{designator}"));
            }
        }
        if d.hours != 0 || d.minutes != 0 || d.seconds != 0 || d.microseconds != 0 {
            out.push('T');
            if d.hours != 0 {
                out.push_str(&format!("{}H", d.hours));
            }
            if d.minutes != 0 {
                out.push_str(&format!("{}M", d.minutes));
            }
            if d.seconds != 0 || d.microseconds != 0 {
                out.push_str(&format_seconds(d.seconds, d.microseconds));
                out.push('S');
            }
        }
        out
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl From<CalendarDelta> for Duration {
    fn from(delta: CalendarDelta) -> Self {
        let carry = delta.microseconds / MICROS_PER_SECOND;
        Self {
            years: delta.years,
            months: delta.months,
            days: delta.days,
            hours: delta.hours,
            minutes: delta.minutes,
            seconds: delta.seconds.saturating_add(carry),
            microseconds: delta.microseconds % MICROS_PER_SECOND,
            anchor: None,
        }
    }
}

/// Normalize loosely formatted ISO 8601 duration text to canonical form.
///
/// Recognizes `P[nY][nM][nW][nD][T][nH][nM][nI][nS]` case-insensitively,
/// ignoring anything after the last recognized group. Weeks are folded into
/// days unless a day component is present, in which case they are dropped.
/// The non-standard `I` designator stands for minutes when no `M` minutes
/// group is present. Input with nothing recognizable yields `"PT0S"`.
///
/// ```
/// use calendar_math::duration::normalize_iso;
///
/// assert_eq!(normalize_iso("p2w"), "P14D");
/// assert_eq!(normalize_iso("P1W3D"), "P3D");
/// assert_eq!(normalize_iso("PT5I"), "PT5M");
/// assert_eq!(normalize_iso("garbage"), "PT0S");
/// ```
pub fn normalize_iso(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with(['P', 'p']) {
        return "PT0S".to_string();
    }
    scan_iso(trimmed, false)
        .unwrap_or_default()
        .into_duration()
        .to_iso_string()
}

/// `"100"`, `"1.5"`; rejects signs other than a leading `+`, exponents and
/// non-finite values.
fn parse_non_negative_number(s: &str) -> Option<f64> {
    let digits = s.strip_prefix('+').unwrap_or(s);
    if digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        || !digits.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }
    digits.parse::<f64>().ok()
}

fn format_seconds(seconds: i64, micros: i64) -> String {
    let total = i128::from(seconds) * i128::from(MICROS_PER_SECOND) + i128::from(micros);
    let sign = if total < 0 { "-" } else { "" };
    let abs = total.unsigned_abs();
    let (whole, fraction) = (abs / 1_000_000, abs % 1_000_000);
    if fraction == 0 {
        return format!("{sign}{whole}");
    }
    let fraction = format!("{fraction:06}");
    format!("{sign}{whole}.{}", fraction.trim_end_matches('0'))
}

/// Components recognized by the ISO scanner, before week folding.
#[derive(Debug, Clone, Copy, Default)]
struct IsoParts {
    years: Option<i64>,
    months: Option<i64>,
    weeks: Option<i64>,
    days: Option<i64>,
    hours: Option<i64>,
    minutes: Option<i64>,
    minutes_alias: Option<i64>,
    seconds: Option<(i64, i64)>,
}

impl IsoParts {
    fn into_duration(self) -> Duration {
        let days = match (self.days, self.weeks) {
            (Some(days), _) => days,
            (None, Some(weeks)) => weeks.saturating_mul(7),
            (None, None) => 0,
        };
        let (seconds, microseconds) = self.seconds.unwrap_or((0, 0));
        Duration {
            years: self.years.unwrap_or(0),
            months: self.months.unwrap_or(0),
            days,
            hours: self.hours.unwrap_or(0),
            minutes: self.minutes.or(self.minutes_alias).unwrap_or(0),
            seconds,
            microseconds,
            anchor: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.years.is_none()
            && self.months.is_none()
            && self.weeks.is_none()
            && self.days.is_none()
            && self.hours.is_none()
            && self.minutes.is_none()
            && self.minutes_alias.is_none()
            && self.seconds.is_none()
    }
}

/// Scan `P…` text. `strict` requires the conformant layout (T before time
/// groups, no `I`, nothing left over, at least one group); lenient mode
/// accepts whatever prefix of groups it can find.
fn scan_iso(s: &str, strict: bool) -> Option<IsoParts> {
    let bytes = s.as_bytes();
    if !matches!(bytes.first(), Some(b'P' | b'p')) {
        return None;
    }
    let mut pos = 1;
    let mut parts = IsoParts {
        years: take_group(bytes, &mut pos, b'Y'),
        months: take_group(bytes, &mut pos, b'M'),
        weeks: take_group(bytes, &mut pos, b'W'),
        days: take_group(bytes, &mut pos, b'D'),
        ..IsoParts::default()
    };

    let has_t = matches!(bytes.get(pos), Some(b'T' | b't'));
    if has_t {
        pos += 1;
    }
    if has_t || !strict {
        parts.hours = take_group(bytes, &mut pos, b'H');
        parts.minutes = take_group(bytes, &mut pos, b'M');
        if !strict {
            parts.minutes_alias = take_group(bytes, &mut pos, b'I');
        }
        parts.seconds = take_seconds(bytes, &mut pos);
    }

    if strict {
        let time_empty =
            parts.hours.is_none() && parts.minutes.is_none() && parts.seconds.is_none();
        if pos != bytes.len() || parts.is_empty() || (has_t && time_empty) {
            return None;
        }
    }
    Some(parts)
}

/// Consume `<digits><designator>` at `pos`, leaving `pos` untouched on mismatch.
fn take_group(bytes: &[u8], pos: &mut usize, designator: u8) -> Option<i64> {
    let digits_end = bytes[*pos..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |offset| *pos + offset);
    if digits_end == *pos || !bytes.get(digits_end)?.eq_ignore_ascii_case(&designator) {
        return None;
    }
    let value = std::str::from_utf8(&bytes[*pos..digits_end])
        .ok()?
        .parse::<i64>()
        .ok()?;
    *pos = digits_end + 1;
    Some(value)
}

/// Consume `<digits>[(.|,)<digits>]S`, returning whole seconds and microseconds.
fn take_seconds(bytes: &[u8], pos: &mut usize) -> Option<(i64, i64)> {
    let mut cursor = *pos;
    while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
        cursor += 1;
    }
    let whole_end = cursor;
    if whole_end == *pos {
        return None;
    }
    let mut fraction_digits: &[u8] = &[];
    if matches!(bytes.get(cursor), Some(b'.' | b',')) {
        let start = cursor + 1;
        cursor = start;
        while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
            cursor += 1;
        }
        if cursor == start {
            return None;
        }
        fraction_digits = &bytes[start..cursor];
    }
    if !bytes.get(cursor)?.eq_ignore_ascii_case(&b'S') {
        return None;
    }

    let whole = std::str::from_utf8(&bytes[*pos..whole_end])
        .ok()?
        .parse::<i64>()
        .ok()?;
    let micros = fraction_digits
        .iter()
        .chain(std::iter::repeat(&b'0'))
        .take(6)
        .fold(0i64, |acc, b| acc * 10 + i64::from(b - b'0'));
    *pos = cursor + 1;
    Some((whole, micros))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;

    fn utc(y: i32, m: u32, d: u32) -> Instant {
        Instant::from_ymd(y, m, d, Zone::UTC).unwrap()
    }

    // ── parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_numeric_seconds() {
        let d = Duration::parse("100", None).unwrap();
        assert_eq!(d.seconds(), 100);
        assert_eq!(d.total_seconds(None).unwrap(), 100);
    }

    #[test]
    fn test_numeric_fraction() {
        let d = Duration::from_seconds(1.25).unwrap();
        assert_eq!((d.seconds(), d.microseconds()), (1, 250_000));
        assert!((d.total_time(None).unwrap() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_fraction_rounds_into_next_second() {
        let d = Duration::from_seconds(0.9999996).unwrap();
        assert_eq!((d.seconds(), d.microseconds()), (1, 0));
        assert_eq!(d.to_iso_string(), "PT1S");
    }

    #[test]
    fn test_negative_numeric_rejected() {
        assert!(Duration::from_seconds(-1.0).is_err());
        assert!(Duration::from_seconds(f64::NAN).is_err());
        // Not numeric under the non-negative rule, and not a phrase either
        assert!(Duration::parse("-5", None).is_err());
    }

    #[test]
    fn test_iso_full() {
        let d = Duration::parse("P1Y2M3DT4H5M6S", None).unwrap();
        assert_eq!(
            (d.years(), d.months(), d.days(), d.hours(), d.minutes(), d.seconds()),
            (1, 2, 3, 4, 5, 6)
        );
    }

    #[test]
    fn test_iso_lowercase_designators() {
        let d = Duration::parse("P1y2dt3h", None).unwrap();
        assert_eq!((d.years(), d.days(), d.hours()), (1, 2, 3));
    }

    #[test]
    fn test_iso_fractional_seconds() {
        let d = Duration::parse("PT1.5S", None).unwrap();
        assert_eq!((d.seconds(), d.microseconds()), (1, 500_000));
        let d = Duration::parse("PT0,25S", None).unwrap();
        assert_eq!(d.microseconds(), 250_000);
    }

    #[test]
    fn test_iso_weeks_fold_into_days() {
        assert_eq!(Duration::parse("P2W", None).unwrap().days(), 14);
    }

    #[test]
    fn test_iso_days_win_over_weeks() {
        assert_eq!(Duration::parse("P1W3D", None).unwrap().days(), 3);
    }

    #[test]
    fn test_iso_minute_alias() {
        assert_eq!(Duration::parse("PT5I", None).unwrap().minutes(), 5);
        // A real minutes group wins over the alias
        assert_eq!(Duration::parse("PT5M7I", None).unwrap().minutes(), 5);
    }

    #[test]
    fn test_iso_missing_t_is_salvaged() {
        let d = Duration::parse("P1D2H", None).unwrap();
        assert_eq!((d.days(), d.hours()), (1, 2));
    }

    #[test]
    fn test_iso_malformed_is_zero() {
        assert!(Duration::parse("Pxyz", None).unwrap().is_zero());
        assert!(Duration::parse("P", None).unwrap().is_zero());
        assert!(Duration::parse("PT", None).unwrap().is_zero());
    }

    #[test]
    fn test_phrase() {
        let d = Duration::parse("1 day + 12 hours", None).unwrap();
        assert_eq!((d.days(), d.hours()), (1, 12));
        assert_eq!(d.total_hours(None).unwrap(), 36);
    }

    #[test]
    fn test_phrase_failure_is_invalid_format() {
        let err = Duration::parse("garbage", None).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidDurationFormat(_)));
    }

    #[test]
    fn test_phrase_microsecond_carry() {
        let d = Duration::parse("1500 ms", None).unwrap();
        assert_eq!((d.seconds(), d.microseconds()), (1, 500_000));
    }

    // ── totals ──────────────────────────────────────────────────────────

    #[test]
    fn test_nominal_totals() {
        let d = Duration::parse("P1Y", None).unwrap();
        assert_eq!(d.total_seconds(None).unwrap(), SECONDS_PER_YEAR);
        assert_eq!(d.total_days(None).unwrap(), 365);

        let d = Duration::parse("P1M", None).unwrap();
        assert_eq!(d.total_days(None).unwrap(), 30);

        let d = Duration::parse("PT120S", None).unwrap();
        assert_eq!(d.total_minutes(None).unwrap(), 2);
    }

    #[test]
    fn test_anchored_year_non_leap() {
        let d = Duration::parse("P1Y", Some(utc(2025, 3, 1))).unwrap();
        assert_eq!(d.total_days(None).unwrap(), 365);
    }

    #[test]
    fn test_anchored_year_spanning_leap_day() {
        let d = Duration::parse("P1Y", Some(utc(2024, 1, 1))).unwrap();
        assert_eq!(d.total_days(None).unwrap(), 366);
    }

    #[test]
    fn test_anchored_month_lengths() {
        let d = Duration::parse("P1M", None).unwrap();
        assert_eq!(d.total_days(Some(&utc(2026, 1, 1))).unwrap(), 31);
        assert_eq!(d.total_days(Some(&utc(2026, 2, 1))).unwrap(), 28);
        assert_eq!(d.total_days(Some(&utc(2024, 2, 1))).unwrap(), 29);
    }

    #[test]
    fn test_anchor_override_beats_stored_anchor() {
        let d = Duration::parse("P1M", Some(utc(2026, 2, 1))).unwrap();
        assert_eq!(d.total_days(None).unwrap(), 28);
        assert_eq!(d.total_days(Some(&utc(2026, 3, 1))).unwrap(), 31);
    }

    #[test]
    fn test_anchored_month_across_dst_counts_real_hours() {
        let zone = Zone::parse("Europe/Amsterdam").unwrap();
        let anchor = Instant::from_ymd(2026, 3, 1, zone).unwrap();
        let d = Duration::parse("P1M", Some(anchor)).unwrap();
        // March 2026 loses an hour to the switch to CEST
        assert_eq!(d.total_hours(None).unwrap(), 31 * 24 - 1);
        assert_eq!(d.total_days(None).unwrap(), 30);
    }

    #[test]
    fn test_negative_totals_floor() {
        let d = Duration::parse("PT90S", None).unwrap().negated();
        assert_eq!(d.total_seconds(None).unwrap(), -90);
        assert_eq!(d.total_minutes(None).unwrap(), -2);

        let anchored = d.with_anchor(utc(2026, 1, 1));
        assert_eq!(anchored.total_seconds(None).unwrap(), -90);
    }

    #[test]
    fn test_zero_duration_totals() {
        let d = Duration::parse("PT0S", None).unwrap();
        assert!(d.is_zero());
        assert_eq!(d.total_seconds(None).unwrap(), 0);
        assert_eq!(d.total_days(Some(&utc(2026, 1, 1))).unwrap(), 0);
    }

    // ── printing ────────────────────────────────────────────────────────

    #[test]
    fn test_iso_string() {
        let d = Duration::parse("P1Y2M3DT4H5M6.5S", None).unwrap();
        assert_eq!(d.to_iso_string(), "P1Y2M3DT4H5M6.5S");
        assert_eq!(d.negated().to_string(), "-P1Y2M3DT4H5M6.5S");
        assert_eq!(Duration::default().to_string(), "PT0S");
    }

    #[test]
    fn test_normalize_iso() {
        assert_eq!(normalize_iso("p1y2m"), "P1Y2M");
        assert_eq!(normalize_iso("P1W3D"), "P3D");
        assert_eq!(normalize_iso("PT5I"), "PT5M");
        assert_eq!(normalize_iso("P1DT2Hjunk"), "P1DT2H");
        assert_eq!(normalize_iso("nonsense"), "PT0S");
    }

    #[test]
    fn test_serialize_components() {
        let d = Duration::parse("P1DT2H", None).unwrap();
        let json = serde_json::to_value(d).unwrap();
        assert_eq!(json["days"], 1);
        assert_eq!(json["hours"], 2);
        assert!(json.get("anchor").is_none());
    }

    #[test]
    fn test_huge_seconds_total_is_out_of_range() {
        let d = Duration::parse("PT10000000000000S", None).unwrap();
        assert_eq!(d.seconds(), 10_000_000_000_000);
        assert!(matches!(
            d.total_seconds(None),
            Err(CalendarError::OutOfRange(_))
        ));
        assert_eq!(d.to_iso_string(), "PT10000000000000S");
    }

    #[test]
    fn test_huge_seconds_add_is_out_of_range() {
        let d = Duration::parse("PT10000000000000S", None).unwrap();
        let start = utc(2026, 1, 1);
        assert!(matches!(
            start.add_duration(&d),
            Err(CalendarError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_normalize_huge_seconds() {
        assert_eq!(normalize_iso("PT10000000000000S"), "PT10000000000000S");
    }

    #[test]
    fn test_phrase_carry_saturates() {
        let d = Duration::parse("9223372036854775807 seconds 1500 ms", None).unwrap();
        assert_eq!((d.seconds(), d.microseconds()), (i64::MAX, 500_000));
        assert!(matches!(
            d.total_seconds(None),
            Err(CalendarError::OutOfRange(_))
        ));
        assert_eq!(d.to_iso_string(), "PT9223372036854775807.5S");
    }

    #[test]
    fn test_format_seconds_extremes() {
        assert_eq!(format_seconds(i64::MAX, 999_999), "9223372036854775807.999999");
        assert_eq!(format_seconds(i64::MIN, 0), "-9223372036854775808");
        assert_eq!(format_seconds(-1, 500_000), "-0.5");
    }
}
