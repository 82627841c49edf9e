//! API request types for logbook operations.
//!
//! Pure data types shared by the handlers and the entry service. Blank
//! descriptions and dates deserialize to `None`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::LogbookEntry;
use crate::serde::{deserialize_optional_date, deserialize_optional_string};
use crate::storage::{DateRange, DateRangeError};

/// Request payload for creating a new entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub activity: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Missing means "today" in the server's local calendar.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_date: Option<NaiveDate>,
}

impl CreateEntryRequest {
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn on(mut self, entry_date: NaiveDate) -> Self {
        self.entry_date = Some(entry_date);
        self
    }

    /// The date this request targets, defaulting to `today`.
    pub fn resolve_date(&self, today: NaiveDate) -> NaiveDate {
        self.entry_date.unwrap_or(today)
    }

    /// Builds the entry this request describes, owned by `user_id`.
    pub fn into_entry(self, user_id: Uuid, entry_date: NaiveDate) -> LogbookEntry {
        let mut entry = LogbookEntry::new(user_id, self.activity, entry_date);
        entry.description = self.description;
        entry
    }
}

/// Request payload for updating an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub activity: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Missing means "keep the current date".
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_date: Option<NaiveDate>,
}

impl UpdateEntryRequest {
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn on(mut self, entry_date: NaiveDate) -> Self {
        self.entry_date = Some(entry_date);
        self
    }

    /// The date the entry will carry once this update is applied.
    pub fn target_date(&self, entry: &LogbookEntry) -> NaiveDate {
        self.entry_date.unwrap_or(entry.entry_date)
    }

    /// Overwrites activity and description, moves the date if one was given
    /// and stamps `updated_at`.
    pub fn apply_to(&self, entry: &mut LogbookEntry, now: DateTime<Utc>) {
        entry.activity = self.activity.clone();
        entry.description = self.description.clone();
        if let Some(date) = self.entry_date {
            entry.entry_date = date;
        }
        entry.updated_at = now;
    }
}

/// One item of a batch update: the target id plus the update fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateEntryRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub update: UpdateEntryRequest,
}

impl BatchUpdateEntryRequest {
    pub fn new(id: Uuid, update: UpdateEntryRequest) -> Self {
        Self { id, update }
    }
}

/// Query parameters for the CSV export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportEntriesQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl ExportEntriesQuery {
    /// Inclusive range for the export; open bounds widen to the calendar limits.
    pub fn date_range(&self) -> Result<DateRange, DateRangeError> {
        DateRange::from_bounds(self.start_date, self.end_date)
    }
}
