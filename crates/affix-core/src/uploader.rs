//! Uploader abstraction trait
//!
//! This module defines the Uploader trait that wraps a single uploaded file's
//! staging, storage, retrieval and removal behavior. The mount layer drives
//! these operations from the record lifecycle and never talks to storage
//! directly.

use async_trait::async_trait;

use crate::error::UploadResult;
use crate::file::UploadedFile;

/// One uploaded file's storage behavior.
///
/// An uploader instance belongs to exactly one (record instance, mounted
/// column) pair. Its lifecycle is: constructed lazily on first access or on
/// assignment, populated by [`cache`](Uploader::cache) when a file is
/// assigned, committed by [`store`](Uploader::store) after the record is
/// saved, and cleared by [`remove`](Uploader::remove) after the record is
/// destroyed.
///
/// `cache` must report rejected files as [`UploadError::Integrity`] and
/// failed transformation steps as [`UploadError::Processing`]; those two
/// variants are captured as validation flags by the mount layer rather than
/// raised to the caller. Every other error propagates.
///
/// [`UploadError::Integrity`]: crate::UploadError::Integrity
/// [`UploadError::Processing`]: crate::UploadError::Processing
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Validate and stage a newly assigned file.
    ///
    /// After a successful call the uploader holds the file in a staged state
    /// and [`identifier`](Uploader::identifier) returns the name it will be
    /// persisted under.
    async fn cache(&mut self, file: UploadedFile) -> UploadResult<()>;

    /// Identifier of the currently held file, if any.
    ///
    /// This is the value written into the record's mounted column before
    /// save. `None` when nothing has been assigned or retrieved.
    fn identifier(&self) -> Option<String>;

    /// Commit the staged file into permanent storage.
    ///
    /// Called after the record row was written. Must be a no-op when nothing
    /// is staged.
    async fn store(&mut self) -> UploadResult<()>;

    /// Remove the stored file from permanent storage.
    ///
    /// Called after the record was destroyed.
    async fn remove(&mut self) -> UploadResult<()>;

    /// Rehydrate the uploader from a persisted identifier.
    ///
    /// Called when a record loaded from its backing store needs its uploader
    /// (for access or for removal) and no instance exists yet.
    async fn retrieve(&mut self, identifier: &str) -> UploadResult<()>;
}
