//! Affix Record Library
//!
//! Persistence backends for mountable records. Both backends drive the same
//! mount lifecycle: validations and the identifier write before the row is
//! written, file storage after it, file removal after a successful delete.

pub mod memory;
#[cfg(feature = "backend-sqlite")]
pub mod sqlite;
pub mod store;

// Re-export commonly used types
pub use memory::{MemoryRecord, MemoryStore};
#[cfg(feature = "backend-sqlite")]
pub use sqlite::{SqliteRecord, SqliteStore};
pub use store::{BackendError, DestroyError, RecordStore, SaveError};
