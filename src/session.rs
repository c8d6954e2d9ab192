//! Completed focus session records
//!
//! A record is created once, when a countdown runs out, and is never mutated
//! afterwards. The serialized field names are the persisted layout.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Categories offered by the selector when the config does not name any
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Study", "Coding", "Reading", "Project"];

/// One completed focus interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Completion timestamp in milliseconds, as a string
    pub id: String,
    /// RFC 3339 completion timestamp
    pub date: String,
    /// Minutes focused
    pub duration: u32,
    /// Free-form category label
    pub category: String,
    /// Number of times focus was lost during the session
    #[serde(rename = "distractionCount")]
    pub distraction_count: u32,
}

impl SessionRecord {
    /// Build the record for a session that just completed at `now`
    pub fn completed(
        category: impl Into<String>,
        duration: u32,
        distraction_count: u32,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            date: now.to_rfc3339(),
            duration,
            category: category.into(),
            distraction_count,
        }
    }

    /// Calendar date the session completed on.
    ///
    /// Uses the date as written in the timestamp, so a record keeps the day the
    /// user saw when it finished regardless of the reader's timezone.
    pub fn day(&self) -> Option<NaiveDate> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.date) {
            return Some(dt.date_naive());
        }
        let prefix = self.date.split('T').next()?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}
