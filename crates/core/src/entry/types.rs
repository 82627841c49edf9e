use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single dated activity record owned by one user.
///
/// At most one entry exists per `(user_id, entry_date)`. The store does not
/// enforce this; the entry service checks it before every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogbookEntry {
    pub id: Uuid,
    /// The owning user. Only this user may mutate or delete the entry.
    pub user_id: Uuid,
    pub activity: String,
    pub description: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LogbookEntry {
    /// Creates a new entry for `user_id` on `entry_date`.
    pub fn new(user_id: Uuid, activity: impl Into<String>, entry_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            activity: activity.into(),
            description: None,
            entry_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description for this entry.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if `user_id` owns this entry.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Projects the entry into its read model.
    pub fn to_dto(&self) -> LogbookEntryDto {
        LogbookEntryDto::from(self)
    }
}

/// Read projection of a [`LogbookEntry`].
///
/// This is what API responses, cache values and CSV rows carry. The owner and
/// the creation timestamp stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogbookEntryDto {
    pub id: Uuid,
    pub activity: String,
    pub description: Option<String>,
    pub entry_date: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl From<&LogbookEntry> for LogbookEntryDto {
    fn from(entry: &LogbookEntry) -> Self {
        Self {
            id: entry.id,
            activity: entry.activity.clone(),
            description: entry.description.clone(),
            entry_date: entry.entry_date,
            updated_at: entry.updated_at,
        }
    }
}

impl From<LogbookEntry> for LogbookEntryDto {
    fn from(entry: LogbookEntry) -> Self {
        Self {
            id: entry.id,
            activity: entry.activity,
            description: entry.description,
            entry_date: entry.entry_date,
            updated_at: entry.updated_at,
        }
    }
}
