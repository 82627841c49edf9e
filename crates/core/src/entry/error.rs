use thiserror::Error;

/// Maximum length of an entry description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 250;

/// Maximum number of items a single batch request may carry.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Earliest and latest years an entry date may fall in.
pub const MIN_ENTRY_YEAR: i32 = 1;
pub const MAX_ENTRY_YEAR: i32 = 9999;

/// Payload validation failures for entry requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Activity is required")]
    EmptyActivity,
    #[error("Description cannot exceed 250 characters")]
    DescriptionTooLong,
    #[error("Entry ID is required")]
    MissingId,
    #[error("Entry date must be between 0001-01-01 and 9999-12-31")]
    DateOutOfRange,
    #[error("A batch cannot contain more than 1000 items")]
    BatchTooLarge,
}

/// Why a single item of a batch was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("Cannot add entries for past dates")]
    PastDate,
    #[error("An entry for this date already exists")]
    DuplicateDate,
    #[error("Entry not found")]
    NotFound,
    #[error("You do not have permission to update this entry")]
    Forbidden,
}
