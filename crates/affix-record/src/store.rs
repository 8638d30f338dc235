//! Record store abstraction
//!
//! A `RecordStore` persists mountable records and drives the mount lifecycle
//! around every write:
//!
//! * save: run mount validations, run before-save callbacks, write the row,
//!   run after-save callbacks
//! * destroy: delete the row, then run after-destroy callbacks
//!
//! Validation failure aborts the save before any callback or write happens.
//! After-destroy callbacks run only when the row was actually deleted, so a
//! failed destroy never removes stored files.

use affix_mount::{Errors, MountError, Mountable};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BackendError {
    #[cfg(feature = "backend-sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt record data: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum SaveError {
    /// Mount validations rejected the record. The same messages are left on
    /// the record's error bag.
    #[error("record failed validation with {} error(s)", .0.count())]
    Invalid(Errors),

    #[error(transparent)]
    Hook(#[from] MountError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error)]
pub enum DestroyError {
    #[error("record was never saved")]
    NotPersisted,

    #[error("record {0} no longer exists")]
    Missing(Uuid),

    #[error(transparent)]
    Hook(#[from] MountError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Persistence backend for one record type.
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Record: Mountable;

    /// Builds a new, unsaved record.
    fn build(&self) -> Self::Record;

    /// Validates and writes the record, driving the mount lifecycle.
    async fn save(&self, record: &mut Self::Record) -> Result<(), SaveError>;

    /// Deletes the record's row, then lets mounts clean up their files.
    async fn destroy(&self, record: &mut Self::Record) -> Result<(), DestroyError>;

    /// Loads a record by id. Mount state starts empty; uploaders are
    /// resolved lazily from the stored identifiers.
    async fn find(&self, id: Uuid) -> Result<Option<Self::Record>, BackendError>;
}
