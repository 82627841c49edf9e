use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::entry::LogbookEntry;
use crate::user::User;

use super::{DateRange, Result};

/// Repository for logbook entry operations.
///
/// Every write call is its own commit. Batch writes are atomic: either every
/// entry is written or none is.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Gets an entry by its ID.
    async fn get_entry(&self, id: Uuid) -> Result<Option<LogbookEntry>>;

    /// Gets every entry whose ID is in `ids`. Unknown IDs are skipped.
    async fn get_entries_by_ids(&self, ids: &[Uuid]) -> Result<Vec<LogbookEntry>>;

    /// Gets every stored entry, ordered by date.
    async fn get_all_entries(&self) -> Result<Vec<LogbookEntry>>;

    /// Gets all entries owned by a user, ordered by date.
    async fn get_entries_for_user(&self, user_id: Uuid) -> Result<Vec<LogbookEntry>>;

    /// Gets the user's entry on a given date, if any.
    async fn get_entry_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<LogbookEntry>>;

    /// Gets the user's entries on any of the given dates.
    async fn get_entries_by_dates(
        &self,
        user_id: Uuid,
        dates: &[NaiveDate],
    ) -> Result<Vec<LogbookEntry>>;

    /// Gets the user's entries within an inclusive date range, ordered by date.
    async fn get_entries_in_range(
        &self,
        user_id: Uuid,
        date_range: DateRange,
    ) -> Result<Vec<LogbookEntry>>;

    /// Creates a new entry.
    async fn create_entry(&self, entry: &LogbookEntry) -> Result<()>;

    /// Creates several entries at once.
    async fn create_entries(&self, entries: &[LogbookEntry]) -> Result<()>;

    /// Updates an existing entry.
    async fn update_entry(&self, entry: &LogbookEntry) -> Result<()>;

    /// Updates several existing entries at once.
    async fn update_entries(&self, entries: &[LogbookEntry]) -> Result<()>;

    /// Deletes an entry by its ID.
    async fn delete_entry(&self, id: Uuid) -> Result<()>;

    /// Deletes several entries at once. Unknown IDs are skipped.
    async fn delete_entries(&self, ids: &[Uuid]) -> Result<()>;
}

/// Repository for account operations.
///
/// User names and emails are unique, compared in their normalized form.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user by email, ignoring case and surrounding whitespace.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Gets a user by user name, ignoring case and surrounding whitespace.
    async fn get_user_by_name(&self, user_name: &str) -> Result<Option<User>>;

    /// Gets every user, ordered by user name.
    async fn get_all_users(&self) -> Result<Vec<User>>;

    /// Creates a user. Fails with `AlreadyExists` if the user name or email is taken.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Updates an existing user.
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Deletes a user together with every entry they own.
    async fn delete_user(&self, id: Uuid) -> Result<()>;
}
