//! The compound `date | time | flight` field used for arrivals and departures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The three segments of an arrival or departure field, each trimmed and
/// possibly empty. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeDescriptor {
    pub date: String,
    pub time: String,
    pub flight_code: String,
}

impl DateTimeDescriptor {
    /// The date segment as a calendar date, if it is an ISO `YYYY-MM-DD` value.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let bytes = self.date.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shaped {
            return None;
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// `"{date} {time}"` followed by `" {flight}"` when a flight code is set.
    /// `None` when the date segment is empty.
    pub fn display(&self) -> Option<String> {
        if self.date.is_empty() {
            return None;
        }
        Some(format!("{} {}{}", self.date, self.time, self.flight_suffix()))
    }

    pub(crate) fn flight_suffix(&self) -> String {
        if self.flight_code.is_empty() {
            String::new()
        } else {
            format!(" {}", self.flight_code)
        }
    }
}

/// Split a raw `date | time | flight` field. Absent or blank input yields
/// three empty segments; this never fails.
pub fn parse_date_time(raw: Option<&str>) -> DateTimeDescriptor {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return DateTimeDescriptor::default(),
    };

    let mut segments = raw.split('|').map(|s| s.trim().to_string());
    DateTimeDescriptor {
        date: segments.next().unwrap_or_default(),
        time: segments.next().unwrap_or_default(),
        flight_code: segments.next().unwrap_or_default(),
    }
}
