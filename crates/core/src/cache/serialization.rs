//! Pure functions for serializing entry DTOs to and from cache bytes.
//!
//! Cache values are JSON so they stay readable when inspected.

use thiserror::Error;

use crate::entry::LogbookEntryDto;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes an entry DTO to JSON bytes.
pub fn serialize_entry(entry: &LogbookEntryDto) -> Result<Vec<u8>> {
    serde_json::to_vec(entry).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to an entry DTO.
pub fn deserialize_entry(bytes: &[u8]) -> Result<LogbookEntryDto> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a slice of entry DTOs to JSON bytes.
pub fn serialize_entries(entries: &[LogbookEntryDto]) -> Result<Vec<u8>> {
    serde_json::to_vec(entries).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a vector of entry DTOs.
pub fn deserialize_entries(bytes: &[u8]) -> Result<Vec<LogbookEntryDto>> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}
