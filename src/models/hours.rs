//! Weekly opening-hours model
//!
//! The location repository stores opening hours as a JSON object keyed by
//! three-letter weekday abbreviation; each value is a list of
//! `[open, close]` time-string pairs. An absent key or empty list means the
//! store is closed that day.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Result;
use crate::error::StoreFinderError;

/// Weekday keys in display order
const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Per-weekday opening shifts, as stored in the repository
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct WeeklyHours {
    shifts: HashMap<String, Vec<[String; 2]>>,
}

impl WeeklyHours {
    /// Parse the repository's JSON-encoded hours column
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            StoreFinderError::repository(format!("Invalid open_hours encoding: {e}"))
        })
    }

    /// All shifts for one weekday; empty when closed
    #[must_use]
    pub fn shifts_for(&self, day: &str) -> &[[String; 2]] {
        self.shifts.get(day).map_or(&[], Vec::as_slice)
    }

    /// Format for display: one line per weekday, `<Day>: <open> - <close>`
    /// or `<Day>: Closed`, preceded by a header when any hours exist.
    ///
    /// Only the first shift of a day is surfaced.
    #[must_use]
    pub fn format(&self) -> String {
        let mut lines = Vec::with_capacity(DAYS.len() + 1);
        if self.shifts.values().any(|shifts| !shifts.is_empty()) {
            lines.push("Open hours:".to_string());
        }
        for day in DAYS {
            match self.shifts_for(day).first() {
                Some([open, close]) => lines.push(format!("  {day}: {open} - {close}")),
                None => lines.push(format!("  {day}: Closed")),
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_single_day() {
        let hours = WeeklyHours::parse(r#"{"Mon":[["09:00","17:00"]]}"#).unwrap();
        let formatted = hours.format();
        assert!(formatted.starts_with("Open hours:"));
        assert!(formatted.contains("Mon: 09:00 - 17:00"));
        assert!(formatted.contains("Tue: Closed"));
        assert!(formatted.contains("Sun: Closed"));
    }

    #[test]
    fn test_format_surfaces_first_shift_only() {
        let hours =
            WeeklyHours::parse(r#"{"Sat":[["08:00","12:00"],["14:00","20:00"]]}"#).unwrap();
        let formatted = hours.format();
        assert!(formatted.contains("Sat: 08:00 - 12:00"));
        assert!(!formatted.contains("14:00"));
    }

    #[test]
    fn test_format_empty_object_has_no_header() {
        let hours = WeeklyHours::parse("{}").unwrap();
        let formatted = hours.format();
        assert!(!formatted.contains("Open hours:"));
        assert_eq!(formatted.lines().count(), 7);
        assert!(formatted.lines().all(|line| line.ends_with("Closed")));
    }

    #[test]
    fn test_parse_rejects_malformed_encoding() {
        let result = WeeklyHours::parse(r#"{"Mon":"09:00"}"#);
        assert!(matches!(
            result.unwrap_err(),
            StoreFinderError::Repository { .. }
        ));
    }
}
