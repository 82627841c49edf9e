mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{user_entries_key, user_entry_key};
pub use serialization::{
    deserialize_entries, deserialize_entry, serialize_entries, serialize_entry,
    SerializationError,
};
pub use traits::{Cache, CachePolicy};
