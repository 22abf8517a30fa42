//! Bounded ranges of instants and keyed sequences stepped across them.
//!
//! A [`Range`] holds two instants in the order given; nothing reorders
//! them. [`Range::steps`] walks from the first endpoint toward the second by
//! a fixed [`Duration`], always yielding the first endpoint and then every
//! step that is still `<=` the second. [`Range::sequence_of`] collects that
//! walk into a [`Sequence`] keyed by position or by a formatted label.
//!
//! The step must move forward. A zero or backwards step never passes the
//! second endpoint and the walk does not terminate.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::duration::Duration;
use crate::error::Result;
use crate::instant::Instant;

/// Bucket sizes for the `sequence_of_*` helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// Relative phrase that advances one bucket.
    pub fn step(self) -> &'static str {
        match self {
            Self::Second => "+1 second",
            Self::Minute => "+1 minute",
            Self::Hour => "+1 hour",
            Self::Day => "+1 day",
            Self::Week => "+7 days",
            Self::Month => "+1 month",
            Self::Quarter => "+3 months",
            Self::Year => "+1 year",
        }
    }

    /// Date-format pattern that labels a bucket.
    pub fn key_format(self) -> &'static str {
        match self {
            Self::Second => "Y-m-d H:i:s",
            Self::Minute => "Y-m-d H:i",
            Self::Hour => "Y-m-d H",
            Self::Day => "Y-m-d",
            // ISO week-year, so Dec 29-31 can belong to week 1 of the next year
            Self::Week => "o\\WW",
            Self::Month => "Y-m",
            Self::Quarter => "Y\\QQ",
            Self::Year => "Y",
        }
    }
}

/// Shorthand group format producing `"<year>Q<quarter>"`.
const QUARTER_SHORTHAND: &str = "YQ";

/// Two instants bounding a sequence, kept in construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    first: Instant,
    second: Instant,
}

impl Range {
    pub fn new(first: Instant, second: Instant) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> Instant {
        self.first
    }

    pub fn second(&self) -> Instant {
        self.second
    }

    /// Lazily walk the range by `step`.
    ///
    /// The first endpoint is always yielded, even when it is already past
    /// the second. An arithmetic overflow is yielded once as `Err` and ends
    /// the walk.
    pub fn steps(&self, step: &Duration) -> Steps {
        Steps {
            next: Some(Ok(self.first)),
            end: self.second,
            step: *step,
        }
    }

    /// Collect the walk for a step phrase into a keyed sequence.
    ///
    /// Without `group_format` the keys are `0, 1, 2, ...`. With one, each
    /// instant is keyed by its formatted label (`"YQ"` is accepted as
    /// shorthand for year and quarter). A later instant whose label matches
    /// an earlier one replaces it, so a step finer than the format reduces
    /// the walk to one entry per bucket holding the last instant seen.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDurationFormat`](crate::CalendarError::InvalidDurationFormat)
    /// if `step` does not parse, or
    /// [`CalendarError::OutOfRange`](crate::CalendarError::OutOfRange) if a
    /// step leaves the representable range.
    pub fn sequence_of(&self, step: &str, group_format: Option<&str>) -> Result<Sequence> {
        let step = Duration::parse(step, None)?;
        let mut sequence = Sequence::default();

        for (position, instant) in self.steps(&step).enumerate() {
            let instant = instant?;
            let key = match group_format {
                None => SequenceKey::Index(position),
                Some(QUARTER_SHORTHAND) => {
                    SequenceKey::Label(format!("{}Q{}", instant.year(), instant.quarter()))
                }
                Some(pattern) => SequenceKey::Label(instant.format(pattern)),
            };
            sequence.insert(key, instant);
        }

        debug!(
            step = %step,
            group_format,
            entries = sequence.len(),
            "generated sequence"
        );
        Ok(sequence)
    }

    /// One entry per bucket of `granularity`.
    pub fn sequence_of_granularity(&self, granularity: Granularity) -> Result<Sequence> {
        self.sequence_of(granularity.step(), Some(granularity.key_format()))
    }

    pub fn sequence_of_seconds(&self) -> Result<Sequence> {
        self.sequence_of_granularity(Granularity::Second)
    }

    pub fn sequence_of_minutes(&self) -> Result<Sequence> {
        self.sequence_of_granularity(Granularity::Minute)
    }

    pub fn sequence_of_hours(&self) -> Result<Sequence> {
        self.sequence_of_granularity(Granularity::Hour)
    }

    pub fn sequence_of_days(&self) -> Result<Sequence> {
        self.sequence_of_granularity(Granularity::Day)
    }

    pub fn sequence_of_weeks(&self) -> Result<Sequence> {
        self.sequence_of_granularity(Granularity::Week)
    }

    pub fn sequence_of_months(&self) -> Result<Sequence> {
        self.sequence_of_granularity(Granularity::Month)
    }

    pub fn sequence_of_quarters(&self) -> Result<Sequence> {
        self.sequence_of_granularity(Granularity::Quarter)
    }

    pub fn sequence_of_years(&self) -> Result<Sequence> {
        self.sequence_of_granularity(Granularity::Year)
    }
}

/// Iterator returned by [`Range::steps`].
#[derive(Debug, Clone)]
pub struct Steps {
    next: Option<Result<Instant>>,
    end: Instant,
    step: Duration,
}

impl Iterator for Steps {
    type Item = Result<Instant>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = match self.next.take()? {
            Ok(current) => current,
            Err(err) => return Some(Err(err)),
        };
        self.next = match current.add_duration(&self.step) {
            Ok(following) if following <= self.end => Some(Ok(following)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        };
        trace!(%current, "step");
        Some(Ok(current))
    }
}

/// Key of a [`Sequence`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SequenceKey {
    Index(usize),
    Label(String),
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Keyed instants in first-insertion order.
///
/// Inserting under an existing key replaces that entry's instant and keeps
/// its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    entries: Vec<(SequenceKey, Instant)>,
    positions: HashMap<SequenceKey, usize>,
}

impl Sequence {
    pub fn insert(&mut self, key: SequenceKey, instant: Instant) {
        match self.positions.get(&key) {
            Some(&position) => self.entries[position].1 = instant,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, instant));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &SequenceKey) -> Option<&Instant> {
        self.positions.get(key).map(|&position| &self.entries[position].1)
    }

    /// Look up a label key by its text.
    pub fn get_label(&self, label: &str) -> Option<&Instant> {
        self.get(&SequenceKey::Label(label.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &SequenceKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn instants(&self) -> impl Iterator<Item = &Instant> {
        self.entries.iter().map(|(_, instant)| instant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SequenceKey, &Instant)> {
        self.entries.iter().map(|(key, instant)| (key, instant))
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a (SequenceKey, Instant);
    type IntoIter = std::slice::Iter<'a, (SequenceKey, Instant)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Sequence {
    type Item = (SequenceKey, Instant);
    type IntoIter = std::vec::IntoIter<(SequenceKey, Instant)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Serializes as a map in insertion order.
impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
