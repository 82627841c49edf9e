use uuid::Uuid;

/// Returns the cache key for a user's entry collection.
pub fn user_entries_key(user_id: Uuid) -> String {
    format!("entries:{}", user_id)
}

/// Returns the cache key for a single entry as seen by `user_id`.
pub fn user_entry_key(user_id: Uuid, entry_id: Uuid) -> String {
    format!("entry:{}:{}", user_id, entry_id)
}
