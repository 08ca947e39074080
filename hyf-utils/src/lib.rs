//! Shared utility functions for HYF crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{NaiveDate, NaiveDateTime};

    /// Timestamp layouts accepted by [`parse_datetime`], tried in order.
    pub const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y%m%d %H%M",
    ];

    /// Format a NaiveDateTime as "YYYY-MM-DD HH:MM:SS"
    pub fn format_datetime(time: &NaiveDateTime) -> String {
        time.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| DateError(s.to_string()))
    }

    /// Parse a timestamp in any of [`DATETIME_FORMATS`], or a bare
    /// "YYYY-MM-DD" date taken as midnight.
    pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, DateError> {
        let trimmed = s.trim();
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .or_else(|| {
                parse_date(trimmed)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(|| DateError(s.to_string()))
    }

}

/// Error types
pub mod error {
    use std::fmt;

    /// A string that is not a recognised date or timestamp.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
