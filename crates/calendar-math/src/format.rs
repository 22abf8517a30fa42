//! Printing instants.
//!
//! Two pattern languages are supported:
//!
//! - [`format`] — single-letter date-format tokens (`Y-m-d H:i:s`), with a
//!   backslash escaping the next character. `Q` prints the quarter.
//! - [`strftime`] — chrono `%`-specifiers, plus `%q` for the quarter.

use std::fmt::Write;

use chrono::{Datelike, Timelike};

use crate::instant::Instant;
use crate::zone::{format_offset, Zone};

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Format an instant with date-format tokens.
///
/// | token | output |
/// |-------|--------|
/// | `d` `j` | day of month, padded / unpadded |
/// | `D` `l` | weekday, short / long |
/// | `N` `w` | ISO weekday 1–7 / weekday 0 (Sunday)–6 |
/// | `z` | day of year, from 0 |
/// | `W` `o` | ISO week number / ISO week-year |
/// | `F` `M` `m` `n` | month long / short / padded / unpadded |
/// | `t` `L` | days in month / leap year flag |
/// | `Y` `y` | four-digit / two-digit year |
/// | `a` `A` `g` `G` `h` `H` | meridiem and hours |
/// | `i` `s` `u` `v` | minutes, seconds, microseconds, milliseconds |
/// | `e` `T` `O` `P` | zone name, abbreviation, `+0100`, `+01:00` |
/// | `U` | epoch seconds |
/// | `Q` | quarter 1–4 |
///
/// Any other character is copied as-is.
///
/// # Examples
///
/// ```
/// use calendar_math::{Instant, Zone};
///
/// let t = Instant::from_ymd_hms(2026, 2, 7, 9, 5, 0, Zone::UTC).unwrap();
/// assert_eq!(t.format("Y-m-d H:i"), "2026-02-07 09:05");
/// assert_eq!(t.format("Y\\QQ"), "2026Q1");
/// ```
pub fn format(instant: &Instant, pattern: &str) -> String {
    let local = instant.local();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        // write! into a String cannot fail
        let _ = match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                Ok(())
            }
            'd' => write!(out, "{:02}", local.day()),
            'D' => out.write_str(&WEEKDAY_NAMES[weekday_index(instant)][..3]),
            'j' => write!(out, "{}", local.day()),
            'l' => out.write_str(WEEKDAY_NAMES[weekday_index(instant)]),
            'N' => write!(out, "{}", local.weekday().number_from_monday()),
            'w' => write!(out, "{}", local.weekday().num_days_from_sunday()),
            'z' => write!(out, "{}", local.ordinal0()),
            'W' => write!(out, "{:02}", local.iso_week().week()),
            'o' => write!(out, "{}", local.iso_week().year()),
            'F' => out.write_str(MONTH_NAMES[local.month0() as usize]),
            'M' => out.write_str(&MONTH_NAMES[local.month0() as usize][..3]),
            'm' => write!(out, "{:02}", local.month()),
            'n' => write!(out, "{}", local.month()),
            't' => write!(out, "{}", instant.days_in_month()),
            'L' => write!(out, "{}", u8::from(instant.is_leap_year())),
            'Y' => write!(out, "{:04}", local.year()),
            'y' => write!(out, "{:02}", local.year().rem_euclid(100)),
            'a' => out.write_str(if local.hour() < 12 { "am" } else { "pm" }),
            'A' => out.write_str(if local.hour() < 12 { "AM" } else { "PM" }),
            'g' => write!(out, "{}", local.hour12().1),
            'G' => write!(out, "{}", local.hour()),
            'h' => write!(out, "{:02}", local.hour12().1),
            'H' => write!(out, "{:02}", local.hour()),
            'i' => write!(out, "{:02}", local.minute()),
            's' => write!(out, "{:02}", local.second()),
            'u' => write!(out, "{:06}", local.nanosecond() / 1_000),
            'v' => write!(out, "{:03}", local.nanosecond() / 1_000_000),
            'e' => out.write_str(&instant.zone().name()),
            'T' => out.write_str(&zone_abbreviation(instant)),
            'O' => out.write_str(&format_offset(instant.offset_seconds(), false)),
            'P' => out.write_str(&format_offset(instant.offset_seconds(), true)),
            'U' => write!(out, "{}", instant.timestamp()),
            'Q' => write!(out, "{}", instant.quarter()),
            other => {
                out.push(other);
                Ok(())
            }
        };
    }
    out
}

/// Format an instant with chrono strftime specifiers, plus `%q` for the quarter.
///
/// Returns `None` if the pattern contains a specifier chrono does not know.
pub fn strftime(instant: &Instant, pattern: &str) -> Option<String> {
    let pattern = expand_quarter(pattern, instant.quarter());
    let mut out = String::new();
    write!(out, "{}", instant.local().format(&pattern)).ok()?;
    Some(out)
}

/// Replace `%q` with the quarter, leaving escaped `%%` pairs alone.
fn expand_quarter(pattern: &str, quarter: u32) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('q') => {
                let _ = write!(out, "{quarter}");
            }
            Some(next) => {
                out.push('%');
                out.push(next);
            }
            None => out.push('%'),
        }
    }
    out
}

fn weekday_index(instant: &Instant) -> usize {
    instant.local().weekday().num_days_from_monday() as usize
}

/// Short zone name, e.g. `CET`/`CEST`; fixed offsets print as `+01:00`.
fn zone_abbreviation(instant: &Instant) -> String {
    match instant.zone() {
        Zone::Named(tz) => instant.local().with_timezone(&tz).format("%Z").to_string(),
        Zone::Fixed(_) => format_offset(instant.offset_seconds(), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Instant {
        // Thursday, 2024-02-29 15:04:05.123456 in Amsterdam (CET, +01:00)
        let zone = Zone::parse("Europe/Amsterdam").unwrap();
        Instant::from_ymd_hms(2024, 2, 29, 15, 4, 5, zone)
            .unwrap()
            .add_duration(&crate::Duration::parse("123456 usec", None).unwrap())
            .unwrap()
    }

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(format(&sample(), "Y-m-d H:i:s"), "2024-02-29 15:04:05");
        assert_eq!(format(&sample(), "y n j G"), "24 2 29 15");
        assert_eq!(format(&sample(), "u v"), "123456 123");
    }

    #[test]
    fn test_named_tokens() {
        assert_eq!(format(&sample(), "D, d M Y"), "Thu, 29 Feb 2024");
        assert_eq!(format(&sample(), "l F"), "Thursday February");
    }

    #[test]
    fn test_calendar_tokens() {
        assert_eq!(format(&sample(), "z t L N w"), "59 29 1 4 4");
        assert_eq!(format(&sample(), "o\\WW"), "2024W09");
        assert_eq!(format(&sample(), "Y\\QQ"), "2024Q1");
    }

    #[test]
    fn test_twelve_hour_tokens() {
        assert_eq!(format(&sample(), "g:i a / h A"), "3:04 pm / 03 PM");
    }

    #[test]
    fn test_zone_tokens() {
        assert_eq!(format(&sample(), "e O P T"), "Europe/Amsterdam +0100 +01:00 CET");
    }

    #[test]
    fn test_escape_and_literals() {
        assert_eq!(format(&sample(), "\\Y\\m: Y"), "Ym: 2024");
    }

    #[test]
    fn test_strftime_with_quarter() {
        assert_eq!(strftime(&sample(), "%Y-%m %qQ").unwrap(), "2024-02 1Q");
    }

    #[test]
    fn test_strftime_escaped_percent_before_q() {
        assert_eq!(strftime(&sample(), "%%q %q").unwrap(), "%q 1");
        assert_eq!(strftime(&sample(), "%%%q").unwrap(), "%1");
    }

    #[test]
    fn test_strftime_invalid_specifier() {
        assert!(strftime(&sample(), "%Y %!").is_none());
    }
}
