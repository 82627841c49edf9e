//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use logbook_core::auth::Role;
use logbook_core::entry::LogbookEntry;
use logbook_core::user::User;
use rusqlite::Row;
use uuid::Uuid;

/// Convert a SQLite row to a LogbookEntry.
///
/// Expected columns: id, user_id, activity, description, entry_date, created_at, updated_at
pub fn row_to_entry(row: &Row) -> rusqlite::Result<LogbookEntry> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let activity: String = row.get(2)?;
    let description: Option<String> = row.get(3)?;
    let entry_date: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(LogbookEntry {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        activity,
        description,
        entry_date: parse_date(&entry_date)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Convert a SQLite row to a User.
///
/// Expected columns: id, user_name, first_name, last_name, email,
/// phone_country_code, phone_number, password_hash, roles, refresh_token,
/// refresh_token_expires_at, created_at, updated_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let roles: String = row.get(8)?;
    let refresh_token_expires_at: Option<String> = row.get(10)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;

    Ok(User {
        id: parse_uuid(&id)?,
        user_name: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        phone_country_code: row.get(5)?,
        phone_number: row.get(6)?,
        password_hash: row.get(7)?,
        roles: parse_roles(&roles)?,
        refresh_token: row.get(9)?,
        refresh_token_expires_at: refresh_token_expires_at
            .as_deref()
            .map(parse_datetime)
            .transpose()?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Format roles for storage as a comma-separated list of names.
pub fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_roles(s: &str) -> rusqlite::Result<Vec<Role>> {
    s.split(',')
        .filter(|name| !name.is_empty())
        .map(|name| {
            Role::from_name(name).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    8,
                    rusqlite::types::Type::Text,
                    format!("unknown role: {name}").into(),
                )
            })
        })
        .collect()
}

fn conversion_error(e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(conversion_error)
}

/// Parse a date from ISO 8601 string (YYYY-MM-DD).
fn parse_date(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(conversion_error)
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(conversion_error)
}

/// Format a DateTime for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Format a NaiveDate for SQLite storage (YYYY-MM-DD).
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a range bound so it compares correctly against stored dates.
///
/// Stored dates are four-digit years, and text comparison breaks for signed
/// or longer years, so bounds are clamped to 0000-01-01..=9999-12-31.
pub fn format_range_bound(date: &NaiveDate) -> String {
    match date.year() {
        y if y < 0 => "0000-01-01".to_string(),
        y if y > 9999 => "9999-12-31".to_string(),
        _ => format_date(date),
    }
}
