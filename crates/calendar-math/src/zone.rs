//! Timezone identities: IANA names through `chrono-tz`, or fixed UTC offsets.
//!
//! A [`Zone`] is resolved once when an [`Instant`](crate::Instant) is built.
//! It answers two questions: which offset applies at a UTC instant, and which
//! absolute instant a local civil time denotes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{CalendarError, Result};

/// A timezone identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// A named IANA zone with its DST rules.
    Named(Tz),
    /// A constant offset from UTC.
    Fixed(FixedOffset),
}

impl Zone {
    pub const UTC: Zone = Zone::Named(Tz::UTC);

    /// Parse a timezone identity.
    ///
    /// Accepts IANA names (`"Europe/Amsterdam"`), `"UTC"` / `"Z"`, and signed
    /// offsets in the forms `±HH:MM`, `±HHMM` or `±HH`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnknownTimezone`] if the name is not a known
    /// IANA zone and not a valid offset.
    pub fn parse(s: &str) -> Result<Zone> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Ok(Zone::UTC);
        }
        if trimmed.starts_with('+') || trimmed.starts_with('-') {
            return parse_offset_seconds(trimmed)
                .and_then(FixedOffset::east_opt)
                .map(Zone::Fixed)
                .ok_or_else(|| CalendarError::UnknownTimezone(format!("'{}'", s)));
        }
        trimmed
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| CalendarError::UnknownTimezone(format!("'{}'", s)))
    }

    /// A fixed zone `seconds` east of UTC.
    pub fn from_offset_seconds(seconds: i32) -> Result<Zone> {
        FixedOffset::east_opt(seconds)
            .map(Zone::Fixed)
            .ok_or_else(|| CalendarError::UnknownTimezone(format!("offset {seconds}s")))
    }

    /// The IANA name, or `±HH:MM` for fixed offsets.
    pub fn name(&self) -> String {
        match self {
            Zone::Named(tz) => tz.name().to_string(),
            Zone::Fixed(offset) => format_offset(offset.local_minus_utc(), true),
        }
    }

    /// The offset in force at the given UTC instant.
    pub fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            Zone::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
            Zone::Fixed(offset) => *offset,
        }
    }

    /// Express an absolute instant in this zone.
    pub fn from_utc(&self, utc: &DateTime<Utc>) -> DateTime<FixedOffset> {
        utc.with_timezone(&self.offset_at(&utc.naive_utc()))
    }

    /// Resolve a local civil time in this zone to an absolute instant.
    ///
    /// Ambiguous times (clocks falling back) take the earlier instant. Times
    /// inside a spring-forward gap are read with the offset in force before
    /// the gap, which moves them forward by the gap length (02:30 becomes
    /// 03:30 on a one-hour transition).
    pub fn from_local(&self, local: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        let tz = match self {
            Zone::Fixed(offset) => return offset.from_local_datetime(local).single(),
            Zone::Named(tz) => tz,
        };
        match tz.from_local_datetime(local) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&dt.offset().fix())),
            LocalResult::Ambiguous(earliest, _) => {
                debug!(local = %local, zone = tz.name(), "ambiguous local time, using earlier offset");
                Some(earliest.with_timezone(&earliest.offset().fix()))
            }
            LocalResult::None => {
                let probe = local.checked_sub_signed(TimeDelta::days(1))?;
                let before = tz.offset_from_utc_datetime(&probe).fix();
                let utc = local
                    .checked_sub_signed(TimeDelta::seconds(before.local_minus_utc() as i64))?;
                debug!(local = %local, zone = tz.name(), "local time falls in a DST gap, shifting forward");
                Some(self.from_utc(&Utc.from_utc_datetime(&utc)))
            }
        }
    }
}

impl Default for Zone {
    fn default() -> Self {
        Zone::UTC
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Zone {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        Zone::parse(s)
    }
}

impl Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Format an offset in seconds as `+01:00` (with colon) or `+0100`.
pub(crate) fn format_offset(offset_secs: i32, colon: bool) -> String {
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    if colon {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}")
    }
}

/// Parse `±HH:MM`, `±HHMM` or `±HH` into seconds east of UTC.
fn parse_offset_seconds(s: &str) -> Option<i32> {
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_iana_name() {
        let zone = Zone::parse("Europe/Amsterdam").unwrap();
        assert_eq!(zone.name(), "Europe/Amsterdam");
    }

    #[test]
    fn test_parse_utc_aliases() {
        assert_eq!(Zone::parse("UTC").unwrap(), Zone::UTC);
        assert_eq!(Zone::parse("z").unwrap(), Zone::UTC);
    }

    #[test]
    fn test_parse_fixed_offsets() {
        assert_eq!(Zone::parse("+05:30").unwrap().name(), "+05:30");
        assert_eq!(Zone::parse("-0330").unwrap().name(), "-03:30");
        assert_eq!(Zone::parse("+02").unwrap().name(), "+02:00");
    }

    #[test]
    fn test_parse_unknown_zone_is_error() {
        let err = Zone::parse("Invalid/Zone").unwrap_err();
        assert!(matches!(err, CalendarError::UnknownTimezone(_)));
        assert!(Zone::parse("+25:00").is_err());
    }

    #[test]
    fn test_from_offset_seconds() {
        let zone = Zone::from_offset_seconds(-18000).unwrap();
        assert_eq!(zone.name(), "-05:00");
        assert!(Zone::from_offset_seconds(90_000).is_err());
    }

    #[test]
    fn test_offset_follows_dst_rules() {
        let ny = Zone::parse("America/New_York").unwrap();
        let winter = ny.offset_at(&naive(2026, 1, 15, 12, 0));
        let summer = ny.offset_at(&naive(2026, 7, 15, 12, 0));
        assert_eq!(winter.local_minus_utc(), -5 * 3600);
        assert_eq!(summer.local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn test_from_local_gap_shifts_forward() {
        // 2026-03-08 02:30 does not exist in New York (clocks jump 02:00 → 03:00)
        let ny = Zone::parse("America/New_York").unwrap();
        let resolved = ny.from_local(&naive(2026, 3, 8, 2, 30)).unwrap();
        assert_eq!(resolved.naive_local(), naive(2026, 3, 8, 3, 30));
    }

    #[test]
    fn test_from_local_ambiguous_takes_earlier() {
        // 2026-11-01 01:30 happens twice in New York
        let ny = Zone::parse("America/New_York").unwrap();
        let resolved = ny.from_local(&naive(2026, 11, 1, 1, 30)).unwrap();
        assert_eq!(resolved.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn test_format_offset_forms() {
        assert_eq!(format_offset(3600, false), "+0100");
        assert_eq!(format_offset(-12600, true), "-03:30");
    }
}
