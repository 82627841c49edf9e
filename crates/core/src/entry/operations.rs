use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

use super::error::{
    RejectionReason, ValidationError, MAX_BATCH_SIZE, MAX_DESCRIPTION_LENGTH, MAX_ENTRY_YEAR,
    MIN_ENTRY_YEAR,
};
use super::requests::{BatchUpdateEntryRequest, CreateEntryRequest, UpdateEntryRequest};
use super::types::LogbookEntry;

fn validate_fields(
    activity: &str,
    description: Option<&str>,
    entry_date: Option<NaiveDate>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if activity.trim().is_empty() {
        errors.push(ValidationError::EmptyActivity);
    }
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
        errors.push(ValidationError::DescriptionTooLong);
    }
    if entry_date.is_some_and(|d| !is_storable_date(d)) {
        errors.push(ValidationError::DateOutOfRange);
    }
    errors
}

/// Returns true if `date` has a four-digit, positive year.
///
/// Stores keep dates as `YYYY-MM-DD` text, which only orders correctly
/// inside this range.
pub fn is_storable_date(date: NaiveDate) -> bool {
    (MIN_ENTRY_YEAR..=MAX_ENTRY_YEAR).contains(&date.year())
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a create payload, collecting every violation.
pub fn validate_create_request(request: &CreateEntryRequest) -> Result<(), Vec<ValidationError>> {
    into_result(validate_fields(
        &request.activity,
        request.description.as_deref(),
        request.entry_date,
    ))
}

/// Validates an update payload, collecting every violation.
pub fn validate_update_request(request: &UpdateEntryRequest) -> Result<(), Vec<ValidationError>> {
    into_result(validate_fields(
        &request.activity,
        request.description.as_deref(),
        request.entry_date,
    ))
}

/// Validates one batch update item. The nil UUID counts as a missing id.
pub fn validate_batch_update_request(
    request: &BatchUpdateEntryRequest,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if request.id.is_nil() {
        errors.push(ValidationError::MissingId);
    }
    errors.extend(validate_fields(
        &request.update.activity,
        request.update.description.as_deref(),
        request.update.entry_date,
    ));
    into_result(errors)
}

/// Rejects batches with more than [`MAX_BATCH_SIZE`] items.
pub fn validate_batch_size(len: usize) -> Result<(), ValidationError> {
    if len > MAX_BATCH_SIZE {
        Err(ValidationError::BatchTooLarge)
    } else {
        Ok(())
    }
}

/// Returns true if `date` lies strictly before `today`.
pub fn is_past_date(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// Returns true if every entry belongs to `user_id`.
pub fn all_owned_by(entries: &[LogbookEntry], user_id: Uuid) -> bool {
    entries.iter().all(|entry| entry.is_owned_by(user_id))
}

/// Sorts entries by date, oldest first. Ties fall back to creation time.
pub fn sort_entries_by_date(entries: &mut [LogbookEntry]) {
    entries.sort_by(|a, b| {
        a.entry_date
            .cmp(&b.entry_date)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// A batch create item that was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRejection {
    pub entry_date: NaiveDate,
    pub reason: RejectionReason,
}

impl fmt::Display for CreationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry for {}: {}", self.entry_date, self.reason)
    }
}

/// A batch update item that was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRejection {
    pub id: Uuid,
    pub reason: RejectionReason,
}

impl fmt::Display for UpdateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry with ID {}: {}", self.id, self.reason)
    }
}

/// Outcome of classifying a batch: what to persist and what was turned down.
///
/// Both lists keep the order of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<R> {
    pub accepted: Vec<LogbookEntry>,
    pub rejected: Vec<R>,
}

impl<R> BatchOutcome<R> {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Classifies a batch of creations for `user_id`.
///
/// `existing` holds the dates on which the user already has an entry. A date
/// accepted earlier in the batch counts as taken for the items after it.
pub fn classify_creations(
    user_id: Uuid,
    requests: Vec<CreateEntryRequest>,
    existing: &HashSet<NaiveDate>,
    today: NaiveDate,
) -> BatchOutcome<CreationRejection> {
    let mut taken: HashSet<NaiveDate> = existing.clone();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for request in requests {
        let entry_date = request.resolve_date(today);

        let reason = if is_past_date(entry_date, today) {
            Some(RejectionReason::PastDate)
        } else if !taken.insert(entry_date) {
            Some(RejectionReason::DuplicateDate)
        } else {
            None
        };

        match reason {
            Some(reason) => rejected.push(CreationRejection { entry_date, reason }),
            None => accepted.push(request.into_entry(user_id, entry_date)),
        }
    }

    BatchOutcome { accepted, rejected }
}

/// Classifies a batch of updates for `user_id`.
///
/// `found` holds the stored entries for the referenced ids. `occupied` maps
/// each date the user already uses to the entry sitting on it. Items are
/// applied in order, so a date freed by an earlier item is available to later
/// ones. An id repeated in the batch yields one accepted entry carrying the
/// last applied update.
pub fn classify_updates(
    user_id: Uuid,
    requests: &[BatchUpdateEntryRequest],
    found: Vec<LogbookEntry>,
    occupied: &HashMap<NaiveDate, Uuid>,
    now: DateTime<Utc>,
) -> BatchOutcome<UpdateRejection> {
    let mut working: HashMap<Uuid, LogbookEntry> =
        found.into_iter().map(|entry| (entry.id, entry)).collect();
    let mut dates = occupied.clone();
    for entry in working.values().filter(|e| e.is_owned_by(user_id)) {
        dates.insert(entry.entry_date, entry.id);
    }

    let mut order: Vec<Uuid> = Vec::new();
    let mut rejected = Vec::new();

    for request in requests {
        let Some(entry) = working.get_mut(&request.id) else {
            rejected.push(UpdateRejection {
                id: request.id,
                reason: RejectionReason::NotFound,
            });
            continue;
        };

        if !entry.is_owned_by(user_id) {
            rejected.push(UpdateRejection {
                id: request.id,
                reason: RejectionReason::Forbidden,
            });
            continue;
        }

        let current = entry.entry_date;
        let target = request.update.target_date(entry);
        if target != current {
            if dates.get(&target).is_some_and(|holder| *holder != entry.id) {
                rejected.push(UpdateRejection {
                    id: request.id,
                    reason: RejectionReason::DuplicateDate,
                });
                continue;
            }
            if dates.get(&current) == Some(&entry.id) {
                dates.remove(&current);
            }
            dates.insert(target, entry.id);
        }

        request.update.apply_to(entry, now);
        if !order.contains(&entry.id) {
            order.push(entry.id);
        }
    }

    let accepted = order
        .into_iter()
        .filter_map(|id| working.remove(&id))
        .collect();

    BatchOutcome { accepted, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user_id() -> Uuid {
        Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap()
    }

    fn other_user_id() -> Uuid {
        Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_validate_create_request_ok() {
        let request = CreateEntryRequest::new("Flight").with_description("Local pattern work");
        assert!(validate_create_request(&request).is_ok());
    }

    #[test]
    fn test_validate_create_request_collects_all_errors() {
        let request = CreateEntryRequest::new("   ").with_description("x".repeat(251));

        let errors = validate_create_request(&request).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyActivity,
                ValidationError::DescriptionTooLong
            ]
        );
    }

    #[test]
    fn test_validate_description_limit_counts_characters() {
        let request = UpdateEntryRequest::new("Flight").with_description("é".repeat(250));
        assert!(validate_update_request(&request).is_ok());
    }

    #[test]
    fn test_validate_batch_update_request_nil_id() {
        let request = BatchUpdateEntryRequest::new(Uuid::nil(), UpdateEntryRequest::new("Flight"));
        assert_eq!(
            validate_batch_update_request(&request),
            Err(vec![ValidationError::MissingId])
        );
    }

    #[test]
    fn test_validate_rejects_dates_past_year_9999() {
        let far = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        let create = CreateEntryRequest::new("Flight").on(far);
        let update = UpdateEntryRequest::new("Flight").on(far);
        let batch = BatchUpdateEntryRequest::new(Uuid::new_v4(), update.clone());

        assert_eq!(
            validate_create_request(&create),
            Err(vec![ValidationError::DateOutOfRange])
        );
        assert_eq!(
            validate_update_request(&update),
            Err(vec![ValidationError::DateOutOfRange])
        );
        assert_eq!(
            validate_batch_update_request(&batch),
            Err(vec![ValidationError::DateOutOfRange])
        );
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size(0).is_ok());
        assert!(validate_batch_size(MAX_BATCH_SIZE).is_ok());
        assert_eq!(
            validate_batch_size(MAX_BATCH_SIZE + 1),
            Err(ValidationError::BatchTooLarge)
        );
    }

    #[test]
    fn test_is_storable_date_bounds() {
        assert!(is_storable_date(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()));
        assert!(is_storable_date(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()));
        assert!(!is_storable_date(NaiveDate::from_ymd_opt(0, 12, 31).unwrap()));
        assert!(!is_storable_date(NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap()));
    }

    #[test]
    fn test_is_past_date() {
        assert!(is_past_date(day(9), day(10)));
        assert!(!is_past_date(day(10), day(10)));
        assert!(!is_past_date(day(11), day(10)));
    }

    #[test]
    fn test_all_owned_by() {
        let mine = LogbookEntry::new(test_user_id(), "A", day(1));
        let theirs = LogbookEntry::new(other_user_id(), "B", day(1));

        assert!(all_owned_by(&[mine.clone()], test_user_id()));
        assert!(!all_owned_by(&[mine, theirs], test_user_id()));
        assert!(all_owned_by(&[], test_user_id()));
    }

    #[test]
    fn test_sort_entries_by_date() {
        let mut entries = vec![
            LogbookEntry::new(test_user_id(), "C", day(3)),
            LogbookEntry::new(test_user_id(), "A", day(1)),
            LogbookEntry::new(test_user_id(), "B", day(2)),
        ];

        sort_entries_by_date(&mut entries);

        let activities: Vec<_> = entries.iter().map(|e| e.activity.as_str()).collect();
        assert_eq!(activities, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_classify_creations_rejects_past_and_existing_dates() {
        let today = day(10);
        let existing = HashSet::from([day(12)]);
        let requests = vec![
            CreateEntryRequest::new("past").on(day(9)),
            CreateEntryRequest::new("taken").on(day(12)),
            CreateEntryRequest::new("ok").on(day(11)),
        ];

        let outcome = classify_creations(test_user_id(), requests, &existing, today);

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].activity, "ok");
        assert_eq!(outcome.accepted[0].user_id, test_user_id());
        assert_eq!(
            outcome.rejected,
            vec![
                CreationRejection {
                    entry_date: day(9),
                    reason: RejectionReason::PastDate
                },
                CreationRejection {
                    entry_date: day(12),
                    reason: RejectionReason::DuplicateDate
                },
            ]
        );
    }

    #[test]
    fn test_classify_creations_detects_duplicates_within_batch() {
        let today = day(10);
        let requests = vec![
            CreateEntryRequest::new("first"),
            CreateEntryRequest::new("second").on(day(11)),
            CreateEntryRequest::new("third").on(today),
        ];

        let outcome = classify_creations(test_user_id(), requests, &HashSet::new(), today);

        let accepted: Vec<_> = outcome.accepted.iter().map(|e| e.activity.as_str()).collect();
        assert_eq!(accepted, vec!["first", "second"]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(
            outcome.rejected[0].to_string(),
            "Entry for 2024-06-10: An entry for this date already exists"
        );
    }

    #[test]
    fn test_classify_creations_past_date_does_not_reserve_date() {
        let today = day(10);
        let requests = vec![CreateEntryRequest::new("past").on(day(1))];

        let outcome = classify_creations(test_user_id(), requests, &HashSet::new(), today);

        assert!(outcome.accepted.is_empty());
        assert!(outcome.has_rejections());
    }

    #[test]
    fn test_classify_updates_mixed_batch() {
        let mine = LogbookEntry::new(test_user_id(), "mine", day(1));
        let theirs = LogbookEntry::new(other_user_id(), "theirs", day(1));
        let unknown = Uuid::new_v4();
        let requests = vec![
            BatchUpdateEntryRequest::new(mine.id, UpdateEntryRequest::new("mine v2")),
            BatchUpdateEntryRequest::new(unknown, UpdateEntryRequest::new("ghost")),
            BatchUpdateEntryRequest::new(theirs.id, UpdateEntryRequest::new("hijack")),
        ];
        let now = Utc::now();

        let outcome = classify_updates(
            test_user_id(),
            &requests,
            vec![mine.clone(), theirs.clone()],
            &HashMap::new(),
            now,
        );

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].id, mine.id);
        assert_eq!(outcome.accepted[0].activity, "mine v2");
        assert_eq!(outcome.accepted[0].updated_at, now);
        assert_eq!(
            outcome.rejected,
            vec![
                UpdateRejection {
                    id: unknown,
                    reason: RejectionReason::NotFound
                },
                UpdateRejection {
                    id: theirs.id,
                    reason: RejectionReason::Forbidden
                },
            ]
        );
        assert_eq!(
            outcome.rejected[1].to_string(),
            format!(
                "Entry with ID {}: You do not have permission to update this entry",
                theirs.id
            )
        );
    }

    #[test]
    fn test_classify_updates_rejects_move_onto_occupied_date() {
        let entry = LogbookEntry::new(test_user_id(), "mine", day(1));
        let blocker = Uuid::new_v4();
        let occupied = HashMap::from([(day(2), blocker)]);
        let requests = vec![BatchUpdateEntryRequest::new(
            entry.id,
            UpdateEntryRequest::new("moved").on(day(2)),
        )];

        let outcome =
            classify_updates(test_user_id(), &requests, vec![entry], &occupied, Utc::now());

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected[0].reason, RejectionReason::DuplicateDate);
    }

    #[test]
    fn test_classify_updates_frees_date_for_later_items() {
        let first = LogbookEntry::new(test_user_id(), "first", day(1));
        let second = LogbookEntry::new(test_user_id(), "second", day(2));
        let requests = vec![
            BatchUpdateEntryRequest::new(first.id, UpdateEntryRequest::new("first").on(day(5))),
            BatchUpdateEntryRequest::new(second.id, UpdateEntryRequest::new("second").on(day(1))),
        ];

        let outcome = classify_updates(
            test_user_id(),
            &requests,
            vec![first, second],
            &HashMap::new(),
            Utc::now(),
        );

        assert!(!outcome.has_rejections());
        let dates: Vec<_> = outcome.accepted.iter().map(|e| e.entry_date).collect();
        assert_eq!(dates, vec![day(5), day(1)]);
    }

    #[test]
    fn test_classify_updates_repeated_id_is_accepted_once() {
        let entry = LogbookEntry::new(test_user_id(), "v1", day(1));
        let requests = vec![
            BatchUpdateEntryRequest::new(entry.id, UpdateEntryRequest::new("v2")),
            BatchUpdateEntryRequest::new(entry.id, UpdateEntryRequest::new("v3")),
        ];

        let outcome = classify_updates(
            test_user_id(),
            &requests,
            vec![entry],
            &HashMap::new(),
            Utc::now(),
        );

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].activity, "v3");
    }
}
