//! # calendar-math
//!
//! Calendar-aware date/time arithmetic.
//!
//! Durations can be written as ISO 8601 (`P1Y2M10DT2H30M`), as plain
//! seconds, or as relative phrases (`"+1 month"`, `"2 weeks ago"`). Applying
//! one to an instant respects month lengths, leap years and DST, and
//! differences between instants are counted in whole calendar months and
//! years rather than approximated from elapsed seconds.
//!
//! ## Modules
//!
//! - [`duration`] — Duration parsing, normalization and totals
//! - [`instant`] — Timezone-aware instants: accessors, add/sub/set, comparison
//! - [`diff`] — Whole-unit differences between two instants
//! - [`range`] — Bounded ranges stepped into keyed sequences
//! - [`phrase`] — Relative phrase evaluation (`"next month"` → calendar delta)
//! - [`format`] — Date-format and strftime printing, with a quarter token
//! - [`zone`] — IANA and fixed-offset timezones, DST gap/overlap resolution
//! - [`config`] — Default timezone and print format
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use calendar_math::{diff_months, Duration, Instant, Zone};
//!
//! let zone = Zone::parse("Europe/Amsterdam").unwrap();
//! let start = Instant::from_ymd(2024, 1, 31, zone).unwrap();
//! let end = start.add_duration(&Duration::parse("+1 month", None).unwrap()).unwrap();
//!
//! assert_eq!(end.format("Y-m-d"), "2024-02-29");
//! assert_eq!(diff_months(&start, &end).unwrap(), 1);
//! ```

pub mod config;
pub mod diff;
pub mod duration;
pub mod error;
pub mod format;
pub mod instant;
pub mod phrase;
pub mod range;
pub mod zone;

pub use config::Config;
pub use diff::{diff_days, diff_hours, diff_minutes, diff_months, diff_seconds, diff_years};
pub use duration::{normalize_iso, Duration};
pub use error::{CalendarError, Result};
pub use instant::{CompareOp, Instant};
pub use phrase::CalendarDelta;
pub use range::{Granularity, Range, Sequence, SequenceKey, Steps};
pub use zone::Zone;
