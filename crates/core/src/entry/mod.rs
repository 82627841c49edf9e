mod error;
mod operations;
mod requests;
mod types;

pub use error::{RejectionReason, ValidationError, MAX_BATCH_SIZE};
pub use operations::{
    all_owned_by, classify_creations, classify_updates, is_past_date, sort_entries_by_date,
    validate_batch_size, validate_batch_update_request, validate_create_request,
    validate_update_request, BatchOutcome, CreationRejection, UpdateRejection,
};
pub use requests::{
    BatchUpdateEntryRequest, CreateEntryRequest, ExportEntriesQuery, UpdateEntryRequest,
};
pub use types::{LogbookEntry, LogbookEntryDto};
