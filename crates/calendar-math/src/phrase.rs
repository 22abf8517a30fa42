//! Relative-phrase evaluation: `"2 weeks"`, `"1 day + 12 hours"`,
//! `"next month"`, `"3 days ago"`, `"+1d2h30m"`.
//!
//! The grammar is deliberately small. A phrase is a sequence of terms, each a
//! signed quantity followed by a unit, optionally joined by `+`, `,` or
//! `and`. `next`/`last` stand for +1/-1 and `a`/`an` for 1. A trailing `ago`
//! negates every term parsed before it. Anything outside this grammar is an
//! error; there is no guessing.

use crate::error::{CalendarError, Result};

/// Signed calendar and clock components, the result of evaluating a phrase.
///
/// Weeks are folded into days. Sub-second parts are kept in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarDelta {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub microseconds: i64,
}

impl CalendarDelta {
    pub fn negated(self) -> Self {
        Self {
            years: self.years.saturating_neg(),
            months: self.months.saturating_neg(),
            days: self.days.saturating_neg(),
            hours: self.hours.saturating_neg(),
            minutes: self.minutes.saturating_neg(),
            seconds: self.seconds.saturating_neg(),
            microseconds: self.microseconds.saturating_neg(),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn add_unit(&mut self, n: i64, unit: Unit) {
        let (field, scale) = match unit {
            Unit::Year => (&mut self.years, 1),
            Unit::Month => (&mut self.months, 1),
            Unit::Fortnight => (&mut self.days, 14),
            Unit::Week => (&mut self.days, 7),
            Unit::Day => (&mut self.days, 1),
            Unit::Hour => (&mut self.hours, 1),
            Unit::Minute => (&mut self.minutes, 1),
            Unit::Second => (&mut self.seconds, 1),
            Unit::Millisecond => (&mut self.microseconds, 1_000),
            Unit::Microsecond => (&mut self.microseconds, 1),
        };
        // saturate; out-of-range totals surface later as OutOfRange
        *field = field.saturating_add(n.saturating_mul(scale));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Year,
    Month,
    Fortnight,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
}

/// Evaluate a relative phrase into signed calendar components.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDurationFormat`] if the phrase is empty,
/// contains a token outside the grammar, or has a quantity without a unit.
///
/// # Examples
///
/// ```
/// use calendar_math::phrase::evaluate;
///
/// let delta = evaluate("1 day + 12 hours").unwrap();
/// assert_eq!((delta.days, delta.hours), (1, 12));
///
/// let delta = evaluate("2 weeks ago").unwrap();
/// assert_eq!(delta.days, -14);
/// ```
pub fn evaluate(phrase: &str) -> Result<CalendarDelta> {
    let normalized = normalize_expression(phrase);
    if normalized.is_empty() {
        return Err(invalid(phrase, "empty phrase"));
    }

    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut delta = CalendarDelta::default();
    let mut found_any = false;
    let mut pending_sign = 1i64;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        i += 1;

        match token {
            "+" | "and" => {
                pending_sign = 1;
                continue;
            }
            "-" => {
                pending_sign = -1;
                continue;
            }
            "now" => {
                found_any = true;
                continue;
            }
            "ago" => {
                if !found_any {
                    return Err(invalid(phrase, "'ago' without a preceding quantity"));
                }
                delta = delta.negated();
                continue;
            }
            _ => {}
        }

        // Glued forms: "+1d2h30m", "2days", "-3weeks"
        if let Some((n, unit)) = split_glued(token) {
            delta.add_unit(n.saturating_mul(pending_sign), unit);
            pending_sign = 1;
            found_any = true;
            continue;
        }
        if let Some(compact) = parse_compact(token) {
            accumulate(&mut delta, pending_sign, &compact);
            pending_sign = 1;
            found_any = true;
            continue;
        }

        let n = match token {
            "a" | "an" | "next" => 1,
            "last" | "previous" => -1,
            _ => parse_signed_number(token)
                .ok_or_else(|| invalid(phrase, &format!("unexpected token '{token}'")))?,
        };

        let unit_token = tokens
            .get(i)
            .ok_or_else(|| invalid(phrase, &format!("'{token}' is not followed by a unit")))?;
        let unit = normalize_time_unit(unit_token)
            .ok_or_else(|| invalid(phrase, &format!("unknown unit '{unit_token}'")))?;
        i += 1;

        delta.add_unit(n.saturating_mul(pending_sign), unit);
        pending_sign = 1;
        found_any = true;
    }

    if !found_any {
        return Err(invalid(phrase, "no quantities"));
    }
    Ok(delta)
}

fn invalid(phrase: &str, reason: &str) -> CalendarError {
    CalendarError::InvalidDurationFormat(format!("'{}': {}", phrase.trim(), reason))
}

/// Normalize expression: trim, lowercase, drop "the", split `+`/`,` into
/// standalone tokens, collapse whitespace.
fn normalize_expression(s: &str) -> String {
    let s = s.trim().to_lowercase().replace(',', " ");
    let mut spaced = String::with_capacity(s.len() + 8);
    let mut prev: Option<char> = None;
    for ch in s.chars() {
        // A "+" between terms is a joiner; a "+" glued to a digit is a sign.
        if ch == '+' && prev.is_some_and(|p| !p.is_whitespace()) {
            spaced.push_str(" + ");
        } else {
            spaced.push(ch);
        }
        prev = Some(ch);
    }
    spaced
        .split_whitespace()
        .filter(|word| *word != "the")
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse `"12"`, `"+12"`, `"-12"`.
fn parse_signed_number(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('+').unwrap_or(s);
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Split a glued `"<number><unit-name>"` token such as `"2days"` or `"-3weeks"`.
fn split_glued(token: &str) -> Option<(i64, Unit)> {
    let split_at = token.find(|c: char| c.is_ascii_alphabetic())?;
    if split_at == 0 {
        return None;
    }
    let n = parse_signed_number(&token[..split_at])?;
    let unit = normalize_time_unit(&token[split_at..])?;
    Some((n, unit))
}

/// Parsed components of a compact adjustment string.
#[derive(Debug, Clone, Default)]
struct CompactDuration {
    sign: i64,
    weeks: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
}

fn accumulate(delta: &mut CalendarDelta, outer_sign: i64, c: &CompactDuration) {
    let sign = outer_sign * c.sign;
    delta.add_unit(sign * c.weeks, Unit::Week);
    delta.add_unit(sign * c.days, Unit::Day);
    delta.add_unit(sign * c.hours, Unit::Hour);
    delta.add_unit(sign * c.minutes, Unit::Minute);
    delta.add_unit(sign * c.seconds, Unit::Second);
}

/// Parse a compact signed duration (e.g., "+2h", "-1d30m", "+1w2d").
fn parse_compact(s: &str) -> Option<CompactDuration> {
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1i64, &s[1..]),
        Some(b'-') => (-1i64, &s[1..]),
        _ => return None,
    };
    if rest.is_empty() {
        return None;
    }

    let mut parsed = CompactDuration {
        sign,
        ..Default::default()
    };
    let mut num_buf = String::new();

    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
            continue;
        }
        if num_buf.is_empty() {
            return None;
        }
        let n: i64 = num_buf.parse().ok()?;
        num_buf.clear();
        match ch {
            'w' => parsed.weeks = parsed.weeks.saturating_add(n),
            'd' => parsed.days = parsed.days.saturating_add(n),
            'h' => parsed.hours = parsed.hours.saturating_add(n),
            'm' => parsed.minutes = parsed.minutes.saturating_add(n),
            's' => parsed.seconds = parsed.seconds.saturating_add(n),
            _ => return None,
        }
    }

    // Trailing number without unit
    if !num_buf.is_empty() {
        return None;
    }
    Some(parsed)
}

/// Normalize a time unit name.
fn normalize_time_unit(s: &str) -> Option<Unit> {
    match s {
        "year" | "years" | "yr" | "yrs" => Some(Unit::Year),
        "month" | "months" => Some(Unit::Month),
        "fortnight" | "fortnights" => Some(Unit::Fortnight),
        "week" | "weeks" | "wk" | "wks" => Some(Unit::Week),
        "day" | "days" => Some(Unit::Day),
        "hour" | "hours" | "hr" | "hrs" => Some(Unit::Hour),
        "minute" | "minutes" | "min" | "mins" => Some(Unit::Minute),
        "second" | "seconds" | "sec" | "secs" => Some(Unit::Second),
        "millisecond" | "milliseconds" | "msec" | "msecs" | "ms" => Some(Unit::Millisecond),
        "microsecond" | "microseconds" | "usec" | "usecs" => Some(Unit::Microsecond),
        _ => None,
    }
}
