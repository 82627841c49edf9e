//! Entry service operations.
//!
//! Every public operation returns an [`ApiResponse`]. Store failures are
//! logged and turned into a 500 response here; cache failures are logged and
//! otherwise ignored.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;

use logbook_core::cache::{
    deserialize_entries, deserialize_entry, serialize_entries, serialize_entry, user_entries_key,
    user_entry_key, Cache, CachePolicy,
};
use logbook_core::entry::{
    all_owned_by, classify_creations, classify_updates, is_past_date, sort_entries_by_date,
    BatchUpdateEntryRequest, CreateEntryRequest, LogbookEntry, LogbookEntryDto,
    UpdateEntryRequest,
};
use logbook_core::export::entries_to_csv;
use logbook_core::response::ApiResponse;
use logbook_core::storage::{DateRange, EntryRepository};

use super::ServiceError;

const SUCCESS: &str = "Request successful";
const INTERNAL_ERROR: &str = "An error occurred. Request unsuccessful.";
const ENTRY_NOT_FOUND: &str = "Logbook entry does not exist. Request unsuccessful";
const PAST_DATE: &str = "Bad Request. You cannot add a new entry for past dates.";
const DUPLICATE_DATE: &str = "An entry for this date already exists.";
const UPDATE_FORBIDDEN: &str = "You do not have the access to update this entry";
const DELETE_FORBIDDEN: &str = "You do not have the access to delete this entry";
const BATCH_UPDATE_NOT_FOUND: &str = "No entries found for the provided IDs";
const BATCH_UPDATE_SUCCESS: &str = "All entries updated successfully";
const BATCH_DELETE_NOT_FOUND: &str = "No entries found for deletion";
const BATCH_DELETE_FORBIDDEN: &str =
    "You don't have permission to delete one or more of these entries";

type ServiceResult<T> = Result<ApiResponse<T>, ServiceError>;

/// Logbook entry service.
///
/// Holds the store and the response cache as trait objects so backends are
/// chosen once at startup.
#[derive(Clone)]
pub struct EntryService {
    repo: Arc<dyn EntryRepository>,
    cache: Arc<dyn Cache>,
    policy: CachePolicy,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn failure<T>(status: StatusCode, message: &str) -> ApiResponse<T> {
    ApiResponse::failure(status.as_u16(), message)
}

fn to_dtos(entries: &[LogbookEntry]) -> Vec<LogbookEntryDto> {
    entries.iter().map(LogbookEntryDto::from).collect()
}

fn unique<T: Copy + Eq + std::hash::Hash>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(*item)).collect()
}

/// Collapses a store failure into the generic 500 response.
fn internal_error<T>(operation: &'static str, err: ServiceError) -> ApiResponse<T> {
    tracing::error!(operation, error = %err, "Entry service operation failed");
    failure(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
}

impl EntryService {
    pub fn new(repo: Arc<dyn EntryRepository>, cache: Arc<dyn Cache>, policy: CachePolicy) -> Self {
        Self {
            repo,
            cache,
            policy,
        }
    }

    // ------------------------------------------------------------------
    // Cache helpers
    // ------------------------------------------------------------------

    async fn cache_get(&self, key: &str) -> Option<Vec<u8>> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => {
                tracing::trace!(key, "Cache hit");
                Some(bytes)
            }
            Ok(None) => {
                tracing::trace!(key, "Cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, bytes: &[u8]) {
        if let Err(err) = self.cache.set(key, bytes, self.policy).await {
            tracing::warn!(key, error = %err, "Failed to populate cache");
        }
    }

    async fn invalidate(&self, keys: &[String]) {
        for key in keys {
            if let Err(err) = self.cache.delete(key).await {
                tracing::warn!(key = %key, error = %err, "Failed to invalidate cache");
            }
        }
    }

    // ------------------------------------------------------------------
    // Single-entry operations
    // ------------------------------------------------------------------

    /// Creates one entry. The date defaults to today and must not be in the
    /// past or already taken by another of the caller's entries.
    pub async fn create_entry(
        &self,
        request: CreateEntryRequest,
        user_id: Uuid,
    ) -> ApiResponse<LogbookEntryDto> {
        self.try_create_entry(request, user_id)
            .await
            .unwrap_or_else(|err| internal_error("create_entry", err))
    }

    async fn try_create_entry(
        &self,
        request: CreateEntryRequest,
        user_id: Uuid,
    ) -> ServiceResult<LogbookEntryDto> {
        let today = today();
        let entry_date = request.resolve_date(today);

        if is_past_date(entry_date, today) {
            tracing::debug!(%user_id, %entry_date, "Rejected entry for a past date");
            return Ok(failure(StatusCode::BAD_REQUEST, PAST_DATE));
        }

        if self
            .repo
            .get_entry_by_date(user_id, entry_date)
            .await?
            .is_some()
        {
            tracing::debug!(%user_id, %entry_date, "Rejected entry for an occupied date");
            return Ok(failure(StatusCode::BAD_REQUEST, DUPLICATE_DATE));
        }

        let entry = request.into_entry(user_id, entry_date);
        self.repo.create_entry(&entry).await?;
        self.invalidate(&[user_entries_key(user_id)]).await;

        tracing::info!(%user_id, entry_id = %entry.id, %entry_date, "Created entry");
        Ok(ApiResponse::success(
            StatusCode::CREATED.as_u16(),
            Some(entry.to_dto()),
            SUCCESS,
        ))
    }

    /// Overwrites an entry the caller owns.
    pub async fn update_entry(
        &self,
        id: Uuid,
        request: UpdateEntryRequest,
        user_id: Uuid,
    ) -> ApiResponse<LogbookEntryDto> {
        self.try_update_entry(id, request, user_id)
            .await
            .unwrap_or_else(|err| internal_error("update_entry", err))
    }

    async fn try_update_entry(
        &self,
        id: Uuid,
        request: UpdateEntryRequest,
        user_id: Uuid,
    ) -> ServiceResult<LogbookEntryDto> {
        let Some(mut entry) = self.repo.get_entry(id).await? else {
            return Ok(failure(StatusCode::NOT_FOUND, ENTRY_NOT_FOUND));
        };

        if !entry.is_owned_by(user_id) {
            tracing::debug!(%user_id, entry_id = %id, "Rejected update by non-owner");
            return Ok(failure(StatusCode::FORBIDDEN, UPDATE_FORBIDDEN));
        }

        let target = request.target_date(&entry);
        if target != entry.entry_date {
            let holder = self.repo.get_entry_by_date(user_id, target).await?;
            if holder.is_some_and(|other| other.id != entry.id) {
                return Ok(failure(StatusCode::BAD_REQUEST, DUPLICATE_DATE));
            }
        }

        request.apply_to(&mut entry, Utc::now());
        self.repo.update_entry(&entry).await?;
        self.invalidate(&[user_entries_key(user_id), user_entry_key(user_id, id)])
            .await;

        tracing::info!(%user_id, entry_id = %id, "Updated entry");
        Ok(ApiResponse::success(
            StatusCode::OK.as_u16(),
            Some(entry.to_dto()),
            SUCCESS,
        ))
    }

    /// Removes an entry the caller owns.
    pub async fn delete_entry(&self, id: Uuid, user_id: Uuid) -> ApiResponse<()> {
        self.try_delete_entry(id, user_id)
            .await
            .unwrap_or_else(|err| internal_error("delete_entry", err))
    }

    async fn try_delete_entry(&self, id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let Some(entry) = self.repo.get_entry(id).await? else {
            return Ok(failure(StatusCode::NOT_FOUND, ENTRY_NOT_FOUND));
        };

        if !entry.is_owned_by(user_id) {
            tracing::debug!(%user_id, entry_id = %id, "Rejected delete by non-owner");
            return Ok(failure(StatusCode::FORBIDDEN, DELETE_FORBIDDEN));
        }

        self.repo.delete_entry(id).await?;
        self.invalidate(&[user_entries_key(user_id), user_entry_key(user_id, id)])
            .await;

        tracing::info!(%user_id, entry_id = %id, "Deleted entry");
        Ok(ApiResponse::success(
            StatusCode::NO_CONTENT.as_u16(),
            None,
            SUCCESS,
        ))
    }

    /// Looks an entry up by id through the caller's cache slot.
    ///
    /// Any authenticated caller may read any entry by id.
    pub async fn get_entry_by_id(&self, id: Uuid, user_id: Uuid) -> ApiResponse<LogbookEntryDto> {
        self.try_get_entry_by_id(id, user_id)
            .await
            .unwrap_or_else(|err| internal_error("get_entry_by_id", err))
    }

    async fn try_get_entry_by_id(&self, id: Uuid, user_id: Uuid) -> ServiceResult<LogbookEntryDto> {
        let key = user_entry_key(user_id, id);

        if let Some(bytes) = self.cache_get(&key).await {
            match deserialize_entry(&bytes) {
                Ok(dto) => {
                    return Ok(ApiResponse::success(
                        StatusCode::OK.as_u16(),
                        Some(dto),
                        SUCCESS,
                    ))
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Discarding unreadable cache value")
                }
            }
        }

        let Some(entry) = self.repo.get_entry(id).await? else {
            return Ok(failure(StatusCode::NOT_FOUND, ENTRY_NOT_FOUND));
        };

        let dto = entry.to_dto();
        match serialize_entry(&dto) {
            Ok(bytes) => self.cache_set(&key, &bytes).await,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Failed to serialize entry for cache")
            }
        }

        Ok(ApiResponse::success(StatusCode::OK.as_u16(), Some(dto), SUCCESS))
    }

    /// Lists the caller's entries ordered by date, through the cache.
    pub async fn get_entries_for_user(&self, user_id: Uuid) -> ApiResponse<Vec<LogbookEntryDto>> {
        self.try_get_entries_for_user(user_id)
            .await
            .unwrap_or_else(|err| internal_error("get_entries_for_user", err))
    }

    async fn try_get_entries_for_user(&self, user_id: Uuid) -> ServiceResult<Vec<LogbookEntryDto>> {
        let key = user_entries_key(user_id);

        if let Some(bytes) = self.cache_get(&key).await {
            match deserialize_entries(&bytes) {
                Ok(dtos) => {
                    return Ok(ApiResponse::success(
                        StatusCode::OK.as_u16(),
                        Some(dtos),
                        SUCCESS,
                    ))
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Discarding unreadable cache value")
                }
            }
        }

        let mut entries = self.repo.get_entries_for_user(user_id).await?;
        sort_entries_by_date(&mut entries);
        let dtos = to_dtos(&entries);

        match serialize_entries(&dtos) {
            Ok(bytes) => self.cache_set(&key, &bytes).await,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Failed to serialize entries for cache")
            }
        }

        tracing::debug!(%user_id, count = dtos.len(), "Loaded entries for user");
        Ok(ApiResponse::success(StatusCode::OK.as_u16(), Some(dtos), SUCCESS))
    }

    /// Lists every entry in the store. Not cached.
    pub async fn get_all_entries(&self) -> ApiResponse<Vec<LogbookEntryDto>> {
        self.try_get_all_entries()
            .await
            .unwrap_or_else(|err| internal_error("get_all_entries", err))
    }

    async fn try_get_all_entries(&self) -> ServiceResult<Vec<LogbookEntryDto>> {
        let mut entries = self.repo.get_all_entries().await?;
        sort_entries_by_date(&mut entries);

        tracing::debug!(count = entries.len(), "Loaded all entries");
        Ok(ApiResponse::success(
            StatusCode::OK.as_u16(),
            Some(to_dtos(&entries)),
            SUCCESS,
        ))
    }

    // ------------------------------------------------------------------
    // Batch operations
    // ------------------------------------------------------------------

    /// Creates several entries, accepting each one independently.
    ///
    /// Answers 201 when every item was created and 207 otherwise, with one
    /// reason per rejected item.
    pub async fn create_entries(
        &self,
        requests: Vec<CreateEntryRequest>,
        user_id: Uuid,
    ) -> ApiResponse<Vec<LogbookEntryDto>> {
        self.try_create_entries(requests, user_id)
            .await
            .unwrap_or_else(|err| internal_error("create_entries", err))
    }

    async fn try_create_entries(
        &self,
        requests: Vec<CreateEntryRequest>,
        user_id: Uuid,
    ) -> ServiceResult<Vec<LogbookEntryDto>> {
        let today = today();
        let dates = unique(requests.iter().map(|r| r.resolve_date(today)));

        let existing: HashSet<NaiveDate> = self
            .repo
            .get_entries_by_dates(user_id, &dates)
            .await?
            .into_iter()
            .map(|entry| entry.entry_date)
            .collect();

        let outcome = classify_creations(user_id, requests, &existing, today);

        if !outcome.accepted.is_empty() {
            self.repo.create_entries(&outcome.accepted).await?;
            self.invalidate(&[user_entries_key(user_id)]).await;
        }

        let created = to_dtos(&outcome.accepted);
        tracing::info!(
            %user_id,
            created = created.len(),
            failed = outcome.rejected.len(),
            "Processed batch create"
        );

        if !outcome.has_rejections() {
            return Ok(ApiResponse::success(
                StatusCode::CREATED.as_u16(),
                Some(created),
                SUCCESS,
            ));
        }

        let message = format!(
            "{} entries created successfully. {} entries failed",
            created.len(),
            outcome.rejected.len()
        );
        let errors = outcome.rejected.iter().map(ToString::to_string).collect();
        Ok(ApiResponse::partial_success(created, message, errors))
    }

    /// Applies several updates, each one independently.
    ///
    /// Answers 404 when none of the ids exist, 200 when every item was
    /// applied and 207 otherwise.
    pub async fn update_entries(
        &self,
        requests: Vec<BatchUpdateEntryRequest>,
        user_id: Uuid,
    ) -> ApiResponse<Vec<LogbookEntryDto>> {
        self.try_update_entries(requests, user_id)
            .await
            .unwrap_or_else(|err| internal_error("update_entries", err))
    }

    async fn try_update_entries(
        &self,
        requests: Vec<BatchUpdateEntryRequest>,
        user_id: Uuid,
    ) -> ServiceResult<Vec<LogbookEntryDto>> {
        let ids = unique(requests.iter().map(|r| r.id));
        let found = self.repo.get_entries_by_ids(&ids).await?;

        if found.is_empty() {
            return Ok(failure(StatusCode::NOT_FOUND, BATCH_UPDATE_NOT_FOUND));
        }

        let target_dates = unique(requests.iter().filter_map(|r| r.update.entry_date));
        let occupied: HashMap<NaiveDate, Uuid> = self
            .repo
            .get_entries_by_dates(user_id, &target_dates)
            .await?
            .into_iter()
            .map(|entry| (entry.entry_date, entry.id))
            .collect();

        let outcome = classify_updates(user_id, &requests, found, &occupied, Utc::now());

        if !outcome.accepted.is_empty() {
            self.repo.update_entries(&outcome.accepted).await?;

            let mut keys = vec![user_entries_key(user_id)];
            keys.extend(
                outcome
                    .accepted
                    .iter()
                    .map(|entry| user_entry_key(user_id, entry.id)),
            );
            self.invalidate(&keys).await;
        }

        let updated = to_dtos(&outcome.accepted);
        tracing::info!(
            %user_id,
            updated = updated.len(),
            failed = outcome.rejected.len(),
            "Processed batch update"
        );

        if !outcome.has_rejections() {
            return Ok(ApiResponse::success(
                StatusCode::OK.as_u16(),
                Some(updated),
                BATCH_UPDATE_SUCCESS,
            ));
        }

        let message = format!(
            "{} entries updated successfully. {} entries failed.",
            updated.len(),
            outcome.rejected.len()
        );
        let errors = outcome.rejected.iter().map(ToString::to_string).collect();
        Ok(ApiResponse::partial_success(updated, message, errors))
    }

    /// Removes several entries at once.
    ///
    /// Nothing is removed unless the caller owns every entry that exists.
    pub async fn delete_entries(&self, ids: Vec<Uuid>, user_id: Uuid) -> ApiResponse<()> {
        self.try_delete_entries(ids, user_id)
            .await
            .unwrap_or_else(|err| internal_error("delete_entries", err))
    }

    async fn try_delete_entries(&self, ids: Vec<Uuid>, user_id: Uuid) -> ServiceResult<()> {
        let ids = unique(ids);
        let found = self.repo.get_entries_by_ids(&ids).await?;

        if found.is_empty() {
            return Ok(failure(StatusCode::NOT_FOUND, BATCH_DELETE_NOT_FOUND));
        }

        if !all_owned_by(&found, user_id) {
            tracing::debug!(
                %user_id,
                requested = ids.len(),
                "Rejected batch delete with foreign entries"
            );
            return Ok(failure(StatusCode::FORBIDDEN, BATCH_DELETE_FORBIDDEN));
        }

        let found_ids: Vec<Uuid> = found.iter().map(|entry| entry.id).collect();
        self.repo.delete_entries(&found_ids).await?;

        let mut keys = vec![user_entries_key(user_id)];
        keys.extend(ids.iter().map(|id| user_entry_key(user_id, *id)));
        self.invalidate(&keys).await;

        tracing::info!(%user_id, deleted = found_ids.len(), "Deleted entries");
        Ok(ApiResponse::success(
            StatusCode::NO_CONTENT.as_u16(),
            None,
            SUCCESS,
        ))
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Renders the caller's entries inside `date_range` as CSV bytes.
    ///
    /// An empty range still yields the header row.
    pub async fn export_entries_csv(
        &self,
        date_range: DateRange,
        user_id: Uuid,
    ) -> Result<Vec<u8>, ServiceError> {
        let mut entries = self
            .repo
            .get_entries_in_range(user_id, date_range)
            .await
            .inspect_err(|err| {
                tracing::error!(%user_id, error = %err, "Failed to load entries for export")
            })?;
        sort_entries_by_date(&mut entries);

        let bytes = entries_to_csv(&to_dtos(&entries)).inspect_err(|err| {
            tracing::error!(%user_id, error = %err, "Failed to render CSV export")
        })?;

        tracing::debug!(%user_id, count = entries.len(), "Exported entries");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::Duration;

    use logbook_core::cache::{CacheError, Result as CacheResult};
    use logbook_core::entry::{CreationRejection, RejectionReason};
    use logbook_core::storage::{RepositoryError, Result as RepoResult};

    use crate::cache::MemoryCache;
    use crate::storage::InMemoryRepository;

    struct Harness {
        service: EntryService,
        repo: InMemoryRepository,
        cache: Arc<MemoryCache>,
    }

    fn harness() -> Harness {
        let repo = InMemoryRepository::new();
        let cache = Arc::new(MemoryCache::new(100));
        let service = EntryService::new(
            Arc::new(repo.clone()),
            cache.clone(),
            CachePolicy::default(),
        );
        Harness {
            service,
            repo,
            cache,
        }
    }

    async fn seed(
        repo: &InMemoryRepository,
        user_id: Uuid,
        activity: &str,
        date: NaiveDate,
    ) -> LogbookEntry {
        let entry = LogbookEntry::new(user_id, activity, date);
        repo.create_entry(&entry).await.unwrap();
        entry
    }

    /// Store that fails every call.
    struct FailingRepository;

    fn store_down() -> RepositoryError {
        RepositoryError::ConnectionFailed("database is locked".to_string())
    }

    #[async_trait]
    impl EntryRepository for FailingRepository {
        async fn get_entry(&self, _id: Uuid) -> RepoResult<Option<LogbookEntry>> {
            Err(store_down())
        }
        async fn get_entries_by_ids(&self, _ids: &[Uuid]) -> RepoResult<Vec<LogbookEntry>> {
            Err(store_down())
        }
        async fn get_all_entries(&self) -> RepoResult<Vec<LogbookEntry>> {
            Err(store_down())
        }
        async fn get_entries_for_user(&self, _user_id: Uuid) -> RepoResult<Vec<LogbookEntry>> {
            Err(store_down())
        }
        async fn get_entry_by_date(
            &self,
            _user_id: Uuid,
            _date: NaiveDate,
        ) -> RepoResult<Option<LogbookEntry>> {
            Err(store_down())
        }
        async fn get_entries_by_dates(
            &self,
            _user_id: Uuid,
            _dates: &[NaiveDate],
        ) -> RepoResult<Vec<LogbookEntry>> {
            Err(store_down())
        }
        async fn get_entries_in_range(
            &self,
            _user_id: Uuid,
            _date_range: DateRange,
        ) -> RepoResult<Vec<LogbookEntry>> {
            Err(store_down())
        }
        async fn create_entry(&self, _entry: &LogbookEntry) -> RepoResult<()> {
            Err(store_down())
        }
        async fn create_entries(&self, _entries: &[LogbookEntry]) -> RepoResult<()> {
            Err(store_down())
        }
        async fn update_entry(&self, _entry: &LogbookEntry) -> RepoResult<()> {
            Err(store_down())
        }
        async fn update_entries(&self, _entries: &[LogbookEntry]) -> RepoResult<()> {
            Err(store_down())
        }
        async fn delete_entry(&self, _id: Uuid) -> RepoResult<()> {
            Err(store_down())
        }
        async fn delete_entries(&self, _ids: &[Uuid]) -> RepoResult<()> {
            Err(store_down())
        }
    }

    /// Cache that fails every call.
    struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }
        async fn set(&self, _key: &str, _value: &[u8], _policy: CachePolicy) -> CacheResult<()> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }
        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }
    }

    // ------------------------------------------------------------------
    // create_entry
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_entry_defaults_to_today() {
        let h = harness();
        let user = Uuid::new_v4();

        let response = h
            .service
            .create_entry(CreateEntryRequest::new("Preflight"), user)
            .await;

        assert_eq!(response.status_code, 201);
        assert_eq!(response.message, "Request successful");
        let dto = response.data.unwrap();
        assert_eq!(dto.entry_date, today());
        assert!(h.repo.get_entry(dto.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_entry_rejects_past_date() {
        let h = harness();
        let user = Uuid::new_v4();
        let yesterday = today() - Duration::days(1);

        let response = h
            .service
            .create_entry(CreateEntryRequest::new("Late").on(yesterday), user)
            .await;

        assert_eq!(response.status_code, 400);
        assert!(!response.status);
        assert_eq!(
            response.message,
            "Bad Request. You cannot add a new entry for past dates."
        );
        assert!(h.repo.get_entries_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_entry_rejects_occupied_date() {
        let h = harness();
        let user = Uuid::new_v4();
        let tomorrow = today() + Duration::days(1);
        seed(&h.repo, user, "First", tomorrow).await;

        let response = h
            .service
            .create_entry(CreateEntryRequest::new("Second").on(tomorrow), user)
            .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.message, "An entry for this date already exists.");
        assert_eq!(h.repo.get_entries_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_date_is_free_for_other_users() {
        let h = harness();
        let tomorrow = today() + Duration::days(1);
        seed(&h.repo, Uuid::new_v4(), "Theirs", tomorrow).await;

        let response = h
            .service
            .create_entry(CreateEntryRequest::new("Mine").on(tomorrow), Uuid::new_v4())
            .await;

        assert_eq!(response.status_code, 201);
    }

    #[tokio::test]
    async fn test_create_entry_invalidates_user_listing() {
        let h = harness();
        let user = Uuid::new_v4();

        let before = h.service.get_entries_for_user(user).await;
        assert!(before.data.unwrap().is_empty());

        h.service
            .create_entry(CreateEntryRequest::new("Preflight"), user)
            .await;

        let after = h.service.get_entries_for_user(user).await;
        assert_eq!(after.data.unwrap().len(), 1);
    }

    // ------------------------------------------------------------------
    // update_entry / delete_entry
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_entry_overwrites_fields() {
        let h = harness();
        let user = Uuid::new_v4();
        let entry = seed(&h.repo, user, "Old", today()).await;
        let moved_to = today() + Duration::days(3);

        let response = h
            .service
            .update_entry(
                entry.id,
                UpdateEntryRequest::new("New").with_description("details").on(moved_to),
                user,
            )
            .await;

        assert_eq!(response.status_code, 200);
        let stored = h.repo.get_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(stored.activity, "New");
        assert_eq!(stored.description.as_deref(), Some("details"));
        assert_eq!(stored.entry_date, moved_to);
        assert!(stored.updated_at >= entry.updated_at);
    }

    #[tokio::test]
    async fn test_update_entry_unknown_id_is_not_found() {
        let h = harness();

        let response = h
            .service
            .update_entry(Uuid::new_v4(), UpdateEntryRequest::new("x"), Uuid::new_v4())
            .await;

        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.message,
            "Logbook entry does not exist. Request unsuccessful"
        );
    }

    #[tokio::test]
    async fn test_update_entry_by_non_owner_is_forbidden_and_unchanged() {
        let h = harness();
        let owner = Uuid::new_v4();
        let entry = seed(&h.repo, owner, "Original", today()).await;

        let response = h
            .service
            .update_entry(entry.id, UpdateEntryRequest::new("Hijacked"), Uuid::new_v4())
            .await;

        assert_eq!(response.status_code, 403);
        assert_eq!(
            response.message,
            "You do not have the access to update this entry"
        );
        let stored = h.repo.get_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(stored, entry);
    }

    #[tokio::test]
    async fn test_update_entry_rejects_move_onto_occupied_date() {
        let h = harness();
        let user = Uuid::new_v4();
        let first = seed(&h.repo, user, "First", today()).await;
        let second = seed(&h.repo, user, "Second", today() + Duration::days(1)).await;

        let response = h
            .service
            .update_entry(first.id, UpdateEntryRequest::new("First").on(second.entry_date), user)
            .await;

        assert_eq!(response.status_code, 400);
        let stored = h.repo.get_entry(first.id).await.unwrap().unwrap();
        assert_eq!(stored.entry_date, today());
    }

    #[tokio::test]
    async fn test_update_entry_refreshes_cached_lookup() {
        let h = harness();
        let user = Uuid::new_v4();
        let entry = seed(&h.repo, user, "Before", today()).await;

        let cached = h.service.get_entry_by_id(entry.id, user).await;
        assert_eq!(cached.data.unwrap().activity, "Before");

        h.service
            .update_entry(entry.id, UpdateEntryRequest::new("After"), user)
            .await;

        let fresh = h.service.get_entry_by_id(entry.id, user).await;
        assert_eq!(fresh.data.unwrap().activity, "After");
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let h = harness();
        let user = Uuid::new_v4();
        let entry = seed(&h.repo, user, "Doomed", today()).await;
        h.service.get_entry_by_id(entry.id, user).await;

        let response = h.service.delete_entry(entry.id, user).await;

        assert_eq!(response.status_code, 204);
        assert!(response.data.is_none());
        assert!(h.repo.get_entry(entry.id).await.unwrap().is_none());
        assert_eq!(h.service.get_entry_by_id(entry.id, user).await.status_code, 404);
    }

    #[tokio::test]
    async fn test_delete_entry_unknown_and_foreign() {
        let h = harness();
        let entry = seed(&h.repo, Uuid::new_v4(), "Theirs", today()).await;

        let missing = h.service.delete_entry(Uuid::new_v4(), Uuid::new_v4()).await;
        assert_eq!(missing.status_code, 404);

        let foreign = h.service.delete_entry(entry.id, Uuid::new_v4()).await;
        assert_eq!(foreign.status_code, 403);
        assert_eq!(
            foreign.message,
            "You do not have the access to delete this entry"
        );
        assert!(h.repo.get_entry(entry.id).await.unwrap().is_some());
    }

    // ------------------------------------------------------------------
    // reads
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_entry_by_id_reads_through_cache() {
        let h = harness();
        let user = Uuid::new_v4();
        let entry = seed(&h.repo, user, "Cached", today()).await;

        let first = h.service.get_entry_by_id(entry.id, user).await;
        assert_eq!(first.status_code, 200);
        assert_eq!(h.cache.len().await, 1);

        // Removed behind the service's back: the cached copy still answers.
        h.repo.delete_entry(entry.id).await.unwrap();
        let second = h.service.get_entry_by_id(entry.id, user).await;
        assert_eq!(second.data.unwrap().activity, "Cached");
    }

    #[tokio::test]
    async fn test_get_entry_by_id_does_not_check_owner() {
        let h = harness();
        let entry = seed(&h.repo, Uuid::new_v4(), "Shared", today()).await;

        let response = h.service.get_entry_by_id(entry.id, Uuid::new_v4()).await;

        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn test_get_entry_by_id_unknown_is_not_found() {
        let h = harness();

        let response = h.service.get_entry_by_id(Uuid::new_v4(), Uuid::new_v4()).await;

        assert_eq!(response.status_code, 404);
        assert_eq!(h.cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_get_entries_for_user_is_scoped_and_ordered() {
        let h = harness();
        let user = Uuid::new_v4();
        seed(&h.repo, user, "Later", today() + Duration::days(2)).await;
        seed(&h.repo, user, "Sooner", today()).await;
        seed(&h.repo, Uuid::new_v4(), "Other", today()).await;

        let response = h.service.get_entries_for_user(user).await;

        let activities: Vec<_> = response
            .data
            .unwrap()
            .into_iter()
            .map(|dto| dto.activity)
            .collect();
        assert_eq!(activities, vec!["Sooner", "Later"]);
    }

    #[tokio::test]
    async fn test_get_all_entries_lists_every_user() {
        let h = harness();
        seed(&h.repo, Uuid::new_v4(), "A", today()).await;
        seed(&h.repo, Uuid::new_v4(), "B", today()).await;

        let response = h.service.get_all_entries().await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.data.unwrap().len(), 2);
    }

    // ------------------------------------------------------------------
    // create_entries
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_entries_all_accepted() {
        let h = harness();
        let user = Uuid::new_v4();

        let response = h
            .service
            .create_entries(
                vec![
                    CreateEntryRequest::new("A"),
                    CreateEntryRequest::new("B").on(today() + Duration::days(1)),
                ],
                user,
            )
            .await;

        assert_eq!(response.status_code, 201);
        assert_eq!(response.data.unwrap().len(), 2);
        assert!(response.errors.is_empty());
    }

    #[tokio::test]
    async fn test_create_entries_rejects_duplicate_inside_batch() {
        let h = harness();
        let user = Uuid::new_v4();
        let tomorrow = today() + Duration::days(1);

        let response = h
            .service
            .create_entries(
                vec![
                    CreateEntryRequest::new("A").on(today()),
                    CreateEntryRequest::new("B").on(tomorrow),
                    CreateEntryRequest::new("C").on(today()),
                ],
                user,
            )
            .await;

        assert_eq!(response.status_code, 207);
        assert!(response.status);
        assert_eq!(
            response.message,
            "2 entries created successfully. 1 entries failed"
        );
        let expected = CreationRejection {
            entry_date: today(),
            reason: RejectionReason::DuplicateDate,
        };
        assert_eq!(response.errors, vec![expected.to_string()]);

        let stored = h.repo.get_entries_for_user(user).await.unwrap();
        assert_eq!(stored.len(), 2);
        let dates: HashSet<_> = stored.iter().map(|e| e.entry_date).collect();
        assert_eq!(dates.len(), 2);
    }

    #[tokio::test]
    async fn test_create_entries_reports_past_and_stored_dates() {
        let h = harness();
        let user = Uuid::new_v4();
        let tomorrow = today() + Duration::days(1);
        seed(&h.repo, user, "Existing", tomorrow).await;

        let response = h
            .service
            .create_entries(
                vec![
                    CreateEntryRequest::new("Past").on(today() - Duration::days(2)),
                    CreateEntryRequest::new("Taken").on(tomorrow),
                    CreateEntryRequest::new("Fine").on(today() + Duration::days(5)),
                ],
                user,
            )
            .await;

        assert_eq!(response.status_code, 207);
        assert_eq!(response.errors.len(), 2);
        assert!(response.errors[0].ends_with("Cannot add entries for past dates"));
        assert!(response.errors[1].ends_with("An entry for this date already exists"));
        let created = response.data.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].activity, "Fine");
    }

    // ------------------------------------------------------------------
    // update_entries
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_entries_all_applied() {
        let h = harness();
        let user = Uuid::new_v4();
        let a = seed(&h.repo, user, "A", today()).await;
        let b = seed(&h.repo, user, "B", today() + Duration::days(1)).await;

        let response = h
            .service
            .update_entries(
                vec![
                    BatchUpdateEntryRequest::new(a.id, UpdateEntryRequest::new("A2")),
                    BatchUpdateEntryRequest::new(b.id, UpdateEntryRequest::new("B2")),
                ],
                user,
            )
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.message, "All entries updated successfully");
        assert_eq!(h.repo.get_entry(a.id).await.unwrap().unwrap().activity, "A2");
        assert_eq!(h.repo.get_entry(b.id).await.unwrap().unwrap().activity, "B2");
    }

    #[tokio::test]
    async fn test_update_entries_persists_only_valid_subset() {
        let h = harness();
        let user = Uuid::new_v4();
        let mine = seed(&h.repo, user, "Mine", today()).await;
        let theirs = seed(&h.repo, Uuid::new_v4(), "Theirs", today()).await;
        let ghost = Uuid::new_v4();

        let response = h
            .service
            .update_entries(
                vec![
                    BatchUpdateEntryRequest::new(mine.id, UpdateEntryRequest::new("Mine2")),
                    BatchUpdateEntryRequest::new(ghost, UpdateEntryRequest::new("Ghost")),
                    BatchUpdateEntryRequest::new(theirs.id, UpdateEntryRequest::new("Stolen")),
                ],
                user,
            )
            .await;

        assert_eq!(response.status_code, 207);
        assert_eq!(
            response.message,
            "1 entries updated successfully. 2 entries failed."
        );
        assert_eq!(
            response.errors,
            vec![
                format!("Entry with ID {}: Entry not found", ghost),
                format!(
                    "Entry with ID {}: You do not have permission to update this entry",
                    theirs.id
                ),
            ]
        );
        assert_eq!(response.data.unwrap().len(), 1);
        assert_eq!(h.repo.get_entry(mine.id).await.unwrap().unwrap().activity, "Mine2");
        assert_eq!(h.repo.get_entry(theirs.id).await.unwrap().unwrap(), theirs);
    }

    #[tokio::test]
    async fn test_update_entries_none_found() {
        let h = harness();

        let response = h
            .service
            .update_entries(
                vec![BatchUpdateEntryRequest::new(Uuid::new_v4(), UpdateEntryRequest::new("x"))],
                Uuid::new_v4(),
            )
            .await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.message, "No entries found for the provided IDs");
    }

    #[tokio::test]
    async fn test_update_entries_rejects_move_onto_occupied_date() {
        let h = harness();
        let user = Uuid::new_v4();
        let a = seed(&h.repo, user, "A", today()).await;
        let b = seed(&h.repo, user, "B", today() + Duration::days(1)).await;

        let response = h
            .service
            .update_entries(
                vec![BatchUpdateEntryRequest::new(
                    a.id,
                    UpdateEntryRequest::new("A").on(b.entry_date),
                )],
                user,
            )
            .await;

        assert_eq!(response.status_code, 207);
        assert_eq!(response.data.unwrap().len(), 0);
        assert_eq!(h.repo.get_entry(a.id).await.unwrap().unwrap().entry_date, today());
    }

    #[tokio::test]
    async fn test_update_entries_invalidates_cached_entries() {
        let h = harness();
        let user = Uuid::new_v4();
        let a = seed(&h.repo, user, "A", today()).await;
        h.service.get_entry_by_id(a.id, user).await;
        h.service.get_entries_for_user(user).await;

        h.service
            .update_entries(
                vec![BatchUpdateEntryRequest::new(a.id, UpdateEntryRequest::new("A2"))],
                user,
            )
            .await;

        assert_eq!(
            h.service.get_entry_by_id(a.id, user).await.data.unwrap().activity,
            "A2"
        );
        assert_eq!(
            h.service.get_entries_for_user(user).await.data.unwrap()[0].activity,
            "A2"
        );
    }

    // ------------------------------------------------------------------
    // delete_entries
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_entries_removes_owned() {
        let h = harness();
        let user = Uuid::new_v4();
        let a = seed(&h.repo, user, "A", today()).await;
        let b = seed(&h.repo, user, "B", today() + Duration::days(1)).await;

        let response = h
            .service
            .delete_entries(vec![a.id, b.id, Uuid::new_v4()], user)
            .await;

        assert_eq!(response.status_code, 204);
        assert!(h.repo.get_entries_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_entries_with_mixed_ownership_removes_nothing() {
        let h = harness();
        let user = Uuid::new_v4();
        let mine = seed(&h.repo, user, "Mine", today()).await;
        let theirs = seed(&h.repo, Uuid::new_v4(), "Theirs", today()).await;

        let response = h
            .service
            .delete_entries(vec![mine.id, theirs.id], user)
            .await;

        assert_eq!(response.status_code, 403);
        assert_eq!(
            response.message,
            "You don't have permission to delete one or more of these entries"
        );
        assert!(h.repo.get_entry(mine.id).await.unwrap().is_some());
        assert!(h.repo.get_entry(theirs.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_entries_none_found() {
        let h = harness();

        let response = h
            .service
            .delete_entries(vec![Uuid::new_v4()], Uuid::new_v4())
            .await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.message, "No entries found for deletion");
    }

    // ------------------------------------------------------------------
    // export
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_export_filters_by_range_and_owner() {
        let h = harness();
        let user = Uuid::new_v4();
        seed(&h.repo, user, "Early", today()).await;
        seed(&h.repo, user, "Inside", today() + Duration::days(3)).await;
        seed(&h.repo, Uuid::new_v4(), "Foreign", today() + Duration::days(3)).await;

        let range =
            DateRange::new(today() + Duration::days(1), today() + Duration::days(5)).unwrap();
        let bytes = h.service.export_entries_csv(range, user).await.unwrap();
        let csv = String::from_utf8(bytes).unwrap();

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "id,activity,description,entry_date,updated_at");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Inside"));
    }

    #[tokio::test]
    async fn test_export_empty_is_header_only() {
        let h = harness();

        let bytes = h
            .service
            .export_entries_csv(DateRange::unbounded(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap().trim_end(),
            "id,activity,description,entry_date,updated_at"
        );
    }

    // ------------------------------------------------------------------
    // failure handling
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_store_failure_becomes_internal_error() {
        let service = EntryService::new(
            Arc::new(FailingRepository),
            Arc::new(MemoryCache::new(10)),
            CachePolicy::default(),
        );
        let user = Uuid::new_v4();

        let created = service.create_entry(CreateEntryRequest::new("x"), user).await;
        let listed = service.get_entries_for_user(user).await;
        let deleted = service.delete_entries(vec![Uuid::new_v4()], user).await;

        for (code, message) in [
            (created.status_code, created.message),
            (listed.status_code, listed.message),
            (deleted.status_code, deleted.message),
        ] {
            assert_eq!(code, 500);
            assert_eq!(message, "An error occurred. Request unsuccessful.");
        }
    }

    #[tokio::test]
    async fn test_export_store_failure_is_an_error() {
        let service = EntryService::new(
            Arc::new(FailingRepository),
            Arc::new(MemoryCache::new(10)),
            CachePolicy::default(),
        );

        let result = service
            .export_entries_csv(DateRange::unbounded(), Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(ServiceError::Repository(_))));
    }

    #[tokio::test]
    async fn test_cache_failure_never_fails_request() {
        let repo = InMemoryRepository::new();
        let service = EntryService::new(
            Arc::new(repo.clone()),
            Arc::new(BrokenCache),
            CachePolicy::default(),
        );
        let user = Uuid::new_v4();

        let created = service.create_entry(CreateEntryRequest::new("x"), user).await;
        assert_eq!(created.status_code, 201);
        let id = created.data.unwrap().id;

        assert_eq!(service.get_entry_by_id(id, user).await.status_code, 200);
        assert_eq!(service.get_entries_for_user(user).await.status_code, 200);
        assert_eq!(service.delete_entry(id, user).await.status_code, 204);
    }
}
