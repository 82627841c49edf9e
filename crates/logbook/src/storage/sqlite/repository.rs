//! SQLite repository implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::params_from_iter;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use logbook_core::entry::LogbookEntry;
use logbook_core::storage::{DateRange, EntryRepository, RepositoryError, Result, UserRepository};
use logbook_core::user::{normalize, User};

use super::conversions::{
    format_date, format_datetime, format_range_bound, format_roles, row_to_entry, row_to_user,
};
use super::error::map_tokio_rusqlite_error;
use super::schema;

const ENTITY: &str = "LogbookEntry";
const USER_ENTITY: &str = "User";

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Owned column values for an insert, movable into the connection thread.
struct EntryRow {
    id: String,
    user_id: String,
    activity: String,
    description: Option<String>,
    entry_date: String,
    created_at: String,
    updated_at: String,
}

impl From<&LogbookEntry> for EntryRow {
    fn from(entry: &LogbookEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            user_id: entry.user_id.to_string(),
            activity: entry.activity.clone(),
            description: entry.description.clone(),
            entry_date: format_date(&entry.entry_date),
            created_at: format_datetime(&entry.created_at),
            updated_at: format_datetime(&entry.updated_at),
        }
    }
}

fn insert_row(conn: &rusqlite::Connection, row: &EntryRow) -> rusqlite::Result<()> {
    conn.execute(
        schema::INSERT_ENTRY,
        rusqlite::params![
            row.id,
            row.user_id,
            row.activity,
            row.description,
            row.entry_date,
            row.created_at,
            row.updated_at
        ],
    )?;
    Ok(())
}

fn update_row(conn: &rusqlite::Connection, row: &EntryRow) -> rusqlite::Result<()> {
    let changed = conn.execute(
        schema::UPDATE_ENTRY,
        rusqlite::params![
            row.id,
            row.activity,
            row.description,
            row.entry_date,
            row.updated_at
        ],
    )?;
    if changed == 0 {
        return Err(rusqlite::Error::QueryReturnedNoRows);
    }
    Ok(())
}

/// Owned column values for a user insert or update.
struct UserRow {
    id: String,
    user_name: String,
    normalized_user_name: String,
    first_name: String,
    last_name: String,
    email: String,
    normalized_email: String,
    phone_country_code: String,
    phone_number: String,
    password_hash: String,
    roles: String,
    refresh_token: Option<String>,
    refresh_token_expires_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            user_name: user.user_name.clone(),
            normalized_user_name: user.normalized_user_name(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            normalized_email: user.normalized_email(),
            phone_country_code: user.phone_country_code.clone(),
            phone_number: user.phone_number.clone(),
            password_hash: user.password_hash.clone(),
            roles: format_roles(&user.roles),
            refresh_token: user.refresh_token.clone(),
            refresh_token_expires_at: user.refresh_token_expires_at.as_ref().map(format_datetime),
            created_at: format_datetime(&user.created_at),
            updated_at: format_datetime(&user.updated_at),
        }
    }
}

fn query_entries<P: rusqlite::Params>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<Vec<LogbookEntry>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_entry)?;
    rows.collect()
}

/// SQLite-based repository implementation.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn query(
        &self,
        sql: String,
        params: Vec<String>,
        id: String,
    ) -> Result<Vec<LogbookEntry>> {
        self.conn
            .call(move |conn| {
                query_entries(conn, &sql, params_from_iter(params.iter())).map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, ENTITY, id))
    }
}

#[async_trait]
impl EntryRepository for SqliteRepository {
    async fn get_entry(&self, id: Uuid) -> Result<Option<LogbookEntry>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_ENTRY_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_entry) {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, ENTITY, id.to_string()))
    }

    async fn get_entries_by_ids(&self, ids: &[Uuid]) -> Result<Vec<LogbookEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        self.query(
            schema::select_entries_by_ids(params.len()),
            params,
            "unknown".to_string(),
        )
        .await
    }

    async fn get_all_entries(&self) -> Result<Vec<LogbookEntry>> {
        self.query(
            schema::SELECT_ALL_ENTRIES.to_string(),
            Vec::new(),
            "unknown".to_string(),
        )
        .await
    }

    async fn get_entries_for_user(&self, user_id: Uuid) -> Result<Vec<LogbookEntry>> {
        self.query(
            schema::SELECT_ENTRIES_BY_USER.to_string(),
            vec![user_id.to_string()],
            "unknown".to_string(),
        )
        .await
    }

    async fn get_entry_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<LogbookEntry>> {
        let entries = self
            .query(
                schema::SELECT_ENTRY_BY_USER_AND_DATE.to_string(),
                vec![user_id.to_string(), format_date(&date)],
                "unknown".to_string(),
            )
            .await?;
        Ok(entries.into_iter().next())
    }

    async fn get_entries_by_dates(
        &self,
        user_id: Uuid,
        dates: &[NaiveDate],
    ) -> Result<Vec<LogbookEntry>> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }
        let mut params = vec![user_id.to_string()];
        params.extend(dates.iter().map(format_date));
        self.query(
            schema::select_entries_by_user_and_dates(dates.len()),
            params,
            "unknown".to_string(),
        )
        .await
    }

    async fn get_entries_in_range(
        &self,
        user_id: Uuid,
        date_range: DateRange,
    ) -> Result<Vec<LogbookEntry>> {
        self.query(
            schema::SELECT_ENTRIES_BY_USER_AND_DATE_RANGE.to_string(),
            vec![
                user_id.to_string(),
                format_range_bound(&date_range.start),
                format_range_bound(&date_range.end),
            ],
            "unknown".to_string(),
        )
        .await
    }

    async fn create_entry(&self, entry: &LogbookEntry) -> Result<()> {
        let row = EntryRow::from(entry);
        let entry_id = entry.id.to_string();

        self.conn
            .call(move |conn| insert_row(conn, &row).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, ENTITY, entry_id))
    }

    async fn create_entries(&self, entries: &[LogbookEntry]) -> Result<()> {
        let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                for row in &rows {
                    insert_row(&tx, row).map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, ENTITY, "unknown"))
    }

    async fn update_entry(&self, entry: &LogbookEntry) -> Result<()> {
        let row = EntryRow::from(entry);
        let entry_id = entry.id.to_string();

        self.conn
            .call(move |conn| update_row(conn, &row).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, ENTITY, entry_id))
    }

    async fn update_entries(&self, entries: &[LogbookEntry]) -> Result<()> {
        let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                for row in &rows {
                    update_row(&tx, row).map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, ENTITY, "unknown"))
    }

    async fn delete_entry(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_ENTRY, [&id_str])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, ENTITY, id.to_string()))
    }

    async fn delete_entries(&self, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let params: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        let sql = schema::delete_entries_by_ids(params.len());

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(&sql, params_from_iter(params.iter()))
                    .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, ENTITY, "unknown"))
    }
}

impl SqliteRepository {
    async fn query_users(&self, sql: String, param: Option<String>) -> Result<Vec<User>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(params_from_iter(param.iter()), row_to_user)
                    .map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<User>>>().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, USER_ENTITY, "unknown"))
    }

    async fn query_user_by(&self, column: &str, value: String) -> Result<Option<User>> {
        let users = self
            .query_users(schema::select_user_by(column), Some(value))
            .await?;
        Ok(users.into_iter().next())
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.query_user_by("id", id.to_string()).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_user_by("normalized_email", normalize(email)).await
    }

    async fn get_user_by_name(&self, user_name: &str) -> Result<Option<User>> {
        self.query_user_by("normalized_user_name", normalize(user_name)).await
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        self.query_users(schema::select_all_users(), None).await
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let row = UserRow::from(user);
        let user_name = user.user_name.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    rusqlite::params![
                        row.id,
                        row.user_name,
                        row.normalized_user_name,
                        row.first_name,
                        row.last_name,
                        row.email,
                        row.normalized_email,
                        row.phone_country_code,
                        row.phone_number,
                        row.password_hash,
                        row.roles,
                        row.refresh_token,
                        row.refresh_token_expires_at,
                        row.created_at,
                        row.updated_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, USER_ENTITY, user_name))
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let row = UserRow::from(user);
        let user_id = user.id.to_string();

        self.conn
            .call(move |conn| {
                let changed = conn
                    .execute(
                        schema::UPDATE_USER,
                        rusqlite::params![
                            row.id,
                            row.user_name,
                            row.normalized_user_name,
                            row.first_name,
                            row.last_name,
                            row.email,
                            row.normalized_email,
                            row.phone_country_code,
                            row.phone_number,
                            row.password_hash,
                            row.roles,
                            row.refresh_token,
                            row.refresh_token_expires_at,
                            row.updated_at
                        ],
                    )
                    .map_err(wrap_err)?;
                if changed == 0 {
                    return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows));
                }
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, USER_ENTITY, user_id))
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(schema::DELETE_ENTRIES_BY_USER, [&id_str])
                    .map_err(wrap_err)?;
                let rows = tx.execute(schema::DELETE_USER, [&id_str]).map_err(wrap_err)?;
                if rows == 0 {
                    return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows));
                }
                tx.commit().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, USER_ENTITY, id.to_string()))
    }
}
