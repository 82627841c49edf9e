//! In-memory repository implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use logbook_core::entry::{sort_entries_by_date, LogbookEntry};
use logbook_core::storage::{DateRange, EntryRepository, RepositoryError, Result, UserRepository};
use logbook_core::user::{normalize, User};

const ENTITY: &str = "LogbookEntry";
const USER_ENTITY: &str = "User";

/// In-memory storage backend.
///
/// Batch writes hold the write lock for the whole batch and validate every
/// item before touching the map, so they apply completely or not at all.
/// Deleting a user takes both locks, users first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<RwLock<HashMap<Uuid, LogbookEntry>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, predicate: impl Fn(&LogbookEntry) -> bool) -> Vec<LogbookEntry> {
        let entries = self.entries.read().await;
        let mut selected: Vec<LogbookEntry> =
            entries.values().filter(|e| predicate(e)).cloned().collect();
        sort_entries_by_date(&mut selected);
        selected
    }

    async fn find_user(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        let users = self.users.read().await;
        users.values().find(|u| predicate(u)).cloned()
    }
}

fn not_found(id: Uuid) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: ENTITY,
        id: id.to_string(),
    }
}

fn already_exists(id: Uuid) -> RepositoryError {
    RepositoryError::AlreadyExists {
        entity_type: ENTITY,
        id: id.to_string(),
    }
}

fn user_not_found(id: Uuid) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: USER_ENTITY,
        id: id.to_string(),
    }
}

/// Returns the identifier `user` would clash on, if another account holds it.
fn clashing_identifier<'a>(users: &HashMap<Uuid, User>, user: &'a User) -> Option<&'a str> {
    let user_name = user.normalized_user_name();
    let email = user.normalized_email();
    users.values().filter(|u| u.id != user.id).find_map(|u| {
        if u.normalized_user_name() == user_name {
            Some(user.user_name.as_str())
        } else if u.normalized_email() == email {
            Some(user.email.as_str())
        } else {
            None
        }
    })
}

#[async_trait]
impl EntryRepository for InMemoryRepository {
    async fn get_entry(&self, id: Uuid) -> Result<Option<LogbookEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).cloned())
    }

    async fn get_entries_by_ids(&self, ids: &[Uuid]) -> Result<Vec<LogbookEntry>> {
        let wanted: HashSet<Uuid> = ids.iter().copied().collect();
        Ok(self.select(|e| wanted.contains(&e.id)).await)
    }

    async fn get_all_entries(&self) -> Result<Vec<LogbookEntry>> {
        Ok(self.select(|_| true).await)
    }

    async fn get_entries_for_user(&self, user_id: Uuid) -> Result<Vec<LogbookEntry>> {
        Ok(self.select(|e| e.user_id == user_id).await)
    }

    async fn get_entry_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<LogbookEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .find(|e| e.user_id == user_id && e.entry_date == date)
            .cloned())
    }

    async fn get_entries_by_dates(
        &self,
        user_id: Uuid,
        dates: &[NaiveDate],
    ) -> Result<Vec<LogbookEntry>> {
        let wanted: HashSet<NaiveDate> = dates.iter().copied().collect();
        Ok(self
            .select(|e| e.user_id == user_id && wanted.contains(&e.entry_date))
            .await)
    }

    async fn get_entries_in_range(
        &self,
        user_id: Uuid,
        date_range: DateRange,
    ) -> Result<Vec<LogbookEntry>> {
        Ok(self
            .select(|e| e.user_id == user_id && date_range.contains(e.entry_date))
            .await)
    }

    async fn create_entry(&self, entry: &LogbookEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.id) {
            return Err(already_exists(entry.id));
        }
        entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn create_entries(&self, new_entries: &[LogbookEntry]) -> Result<()> {
        let mut entries = self.entries.write().await;
        let mut seen = HashSet::new();
        if let Some(dup) = new_entries
            .iter()
            .find(|e| entries.contains_key(&e.id) || !seen.insert(e.id))
        {
            return Err(already_exists(dup.id));
        }
        for entry in new_entries {
            entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    async fn update_entry(&self, entry: &LogbookEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(&entry.id) {
            return Err(not_found(entry.id));
        }
        entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn update_entries(&self, updated: &[LogbookEntry]) -> Result<()> {
        let mut entries = self.entries.write().await;
        if let Some(missing) = updated.iter().find(|e| !entries.contains_key(&e.id)) {
            return Err(not_found(missing.id));
        }
        for entry in updated {
            entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    async fn delete_entry(&self, id: Uuid) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(&id).is_none() {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn delete_entries(&self, ids: &[Uuid]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for id in ids {
            entries.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize(email);
        Ok(self.find_user(|u| u.normalized_email() == email).await)
    }

    async fn get_user_by_name(&self, user_name: &str) -> Result<Option<User>> {
        let user_name = normalize(user_name);
        Ok(self.find_user(|u| u.normalized_user_name() == user_name).await)
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.normalized_user_name());
        Ok(all)
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: USER_ENTITY,
                id: user.id.to_string(),
            });
        }
        if let Some(taken) = clashing_identifier(&users, user) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: USER_ENTITY,
                id: taken.to_string(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(user_not_found(user.id));
        }
        if let Some(taken) = clashing_identifier(&users, user) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: USER_ENTITY,
                id: taken.to_string(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let mut users = self.users.write().await;
        if users.remove(&id).is_none() {
            return Err(user_not_found(id));
        }
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.user_id != id);
        Ok(())
    }
}
