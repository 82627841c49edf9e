//! SQLite schema definitions and SQL query constants.

/// SQL statement to create all tables.
///
/// One entry per user and date is enforced by the entry service, not here:
/// a batch update may move several entries across each other's dates.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    activity TEXT NOT NULL,
    description TEXT,
    entry_date TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_user_id ON entries(user_id);
CREATE INDEX IF NOT EXISTS idx_entries_user_date ON entries(user_id, entry_date);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    user_name TEXT NOT NULL,
    normalized_user_name TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    normalized_email TEXT NOT NULL UNIQUE,
    phone_country_code TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    roles TEXT NOT NULL,
    refresh_token TEXT,
    refresh_token_expires_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const ENTRY_COLUMNS: &str =
    "id, user_id, activity, description, entry_date, created_at, updated_at";

pub const SELECT_ENTRY_BY_ID: &str = "SELECT id, user_id, activity, description, entry_date, created_at, updated_at FROM entries WHERE id = ?1";

pub const SELECT_ALL_ENTRIES: &str = "SELECT id, user_id, activity, description, entry_date, created_at, updated_at FROM entries ORDER BY entry_date, created_at";

pub const SELECT_ENTRIES_BY_USER: &str = "SELECT id, user_id, activity, description, entry_date, created_at, updated_at FROM entries WHERE user_id = ?1 ORDER BY entry_date, created_at";

pub const SELECT_ENTRY_BY_USER_AND_DATE: &str = "SELECT id, user_id, activity, description, entry_date, created_at, updated_at FROM entries WHERE user_id = ?1 AND entry_date = ?2 LIMIT 1";

pub const SELECT_ENTRIES_BY_USER_AND_DATE_RANGE: &str = "SELECT id, user_id, activity, description, entry_date, created_at, updated_at FROM entries WHERE user_id = ?1 AND entry_date >= ?2 AND entry_date <= ?3 ORDER BY entry_date, created_at";

pub const INSERT_ENTRY: &str = "INSERT INTO entries (id, user_id, activity, description, entry_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

pub const UPDATE_ENTRY: &str = "UPDATE entries SET activity = ?2, description = ?3, entry_date = ?4, updated_at = ?5 WHERE id = ?1";

pub const DELETE_ENTRY: &str = "DELETE FROM entries WHERE id = ?1";

const USER_COLUMNS: &str = "id, user_name, first_name, last_name, email, phone_country_code, phone_number, password_hash, roles, refresh_token, refresh_token_expires_at, created_at, updated_at";

pub fn select_user_by(column: &str) -> String {
    format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1")
}

pub fn select_all_users() -> String {
    format!("SELECT {USER_COLUMNS} FROM users ORDER BY normalized_user_name")
}

pub const INSERT_USER: &str = "INSERT INTO users (id, user_name, normalized_user_name, first_name, last_name, email, normalized_email, phone_country_code, phone_number, password_hash, roles, refresh_token, refresh_token_expires_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";

pub const UPDATE_USER: &str = "UPDATE users SET user_name = ?2, normalized_user_name = ?3, first_name = ?4, last_name = ?5, email = ?6, normalized_email = ?7, phone_country_code = ?8, phone_number = ?9, password_hash = ?10, roles = ?11, refresh_token = ?12, refresh_token_expires_at = ?13, updated_at = ?14 WHERE id = ?1";

pub const DELETE_USER: &str = "DELETE FROM users WHERE id = ?1";

pub const DELETE_ENTRIES_BY_USER: &str = "DELETE FROM entries WHERE user_id = ?1";

/// `?1, ?2, ...` for `count` parameters starting at `first`.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Selects entries whose id is one of `count` bound parameters.
pub fn select_entries_by_ids(count: usize) -> String {
    format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE id IN ({}) ORDER BY entry_date, created_at",
        placeholders(1, count)
    )
}

/// Selects a user's entries on any of `count` dates. The user id binds to `?1`.
pub fn select_entries_by_user_and_dates(count: usize) -> String {
    format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?1 AND entry_date IN ({}) ORDER BY entry_date, created_at",
        placeholders(2, count)
    )
}

/// Deletes entries whose id is one of `count` bound parameters.
pub fn delete_entries_by_ids(count: usize) -> String {
    format!("DELETE FROM entries WHERE id IN ({})", placeholders(1, count))
}
