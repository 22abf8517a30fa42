//! Explicit configuration threaded through instant construction.
//!
//! There is no process-wide default timezone: callers that want a default
//! build a [`Config`] (or deserialize one) and pass it where a zone would
//! otherwise be implied.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::zone::Zone;

/// Defaults applied when a caller leaves a timezone or print format unspecified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timezone used when no explicit zone is supplied (IANA name or `±HH:MM`).
    pub default_timezone: String,
    /// Date-format pattern used by [`Instant::to_default_string`](crate::Instant::to_default_string).
    pub default_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: "UTC".to_string(),
            default_format: "Y-m-d H:i:s".to_string(),
        }
    }
}

impl Config {
    /// A configuration whose default timezone is `timezone`.
    pub fn with_timezone(timezone: impl Into<String>) -> Self {
        Self {
            default_timezone: timezone.into(),
            ..Self::default()
        }
    }

    /// Resolve `explicit` if given, otherwise the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnknownTimezone`](crate::CalendarError::UnknownTimezone)
    /// if the chosen name cannot be resolved.
    pub fn zone(&self, explicit: Option<&str>) -> Result<Zone> {
        Zone::parse(explicit.unwrap_or(&self.default_timezone))
    }
}
