//! Error types for calendar-math operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid duration format: {0}")]
    InvalidDurationFormat(String),

    #[error("Invalid date spec: {0}")]
    InvalidDateSpec(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_input() {
        let err = CalendarError::UnknownTimezone("'Mars/Olympus'".to_string());
        assert_eq!(err.to_string(), "Unknown timezone: 'Mars/Olympus'");
    }

    #[test]
    fn test_error_is_send_sync_std_error() {
        fn assert_impl<T: std::error::Error + Send + Sync>() {}
        assert_impl::<CalendarError>();
    }
}
