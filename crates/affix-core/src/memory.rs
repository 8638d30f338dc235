//! In-memory reference uploader.
//!
//! Keeps file bytes in a shared map instead of a real storage backend. This
//! is the implementation the integration tests run against and a starting
//! point for applications that want to exercise mounted records without
//! wiring up storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::error::{UploadError, UploadResult};
use crate::file::UploadedFile;
use crate::uploader::Uploader;

/// Shared backing map for [`MemoryUploader`] instances.
///
/// Clones share the same underlying storage, so a test can keep a handle and
/// assert which files are present after save/destroy.
#[derive(Clone, Default)]
pub struct MemoryFileStore {
    files: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, identifier: impl Into<String>, data: Bytes) {
        self.files.lock().await.insert(identifier.into(), data);
    }

    pub async fn remove(&self, identifier: &str) {
        self.files.lock().await.remove(identifier);
    }

    pub async fn contains(&self, identifier: &str) -> bool {
        self.files.lock().await.contains_key(identifier)
    }

    pub async fn get(&self, identifier: &str) -> Option<Bytes> {
        self.files.lock().await.get(identifier).cloned()
    }

    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }
}

/// Transformation applied to a file while it is being staged.
///
/// Returning `Err` surfaces as [`UploadError::Processing`], which the mount
/// layer captures as a processing flag on the record.
pub type Processor = Arc<dyn Fn(&UploadedFile) -> Result<Bytes, String> + Send + Sync>;

/// Tracks where the held file currently lives.
struct HeldFile {
    identifier: String,
    /// `Some` while staged, `None` once committed or when rehydrated from
    /// the store.
    staged: Option<Bytes>,
}

/// Reference [`Uploader`] backed by a [`MemoryFileStore`].
pub struct MemoryUploader {
    store: MemoryFileStore,
    allowed_extensions: Option<Vec<String>>,
    max_size_bytes: Option<usize>,
    processor: Option<Processor>,
    current: Option<HeldFile>,
}

impl MemoryUploader {
    /// Create an uploader that accepts any file.
    pub fn new(store: MemoryFileStore) -> Self {
        Self {
            store,
            allowed_extensions: None,
            max_size_bytes: None,
            processor: None,
            current: None,
        }
    }

    /// Restrict staging to the given lowercase extensions.
    pub fn allow_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.into().to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// Reject files larger than `bytes`.
    pub fn max_size(mut self, bytes: usize) -> Self {
        self.max_size_bytes = Some(bytes);
        self
    }

    /// Run a transformation over the file during staging.
    pub fn with_processor(mut self, processor: Processor) -> Self {
        self.processor = Some(processor);
        self
    }

    fn check_integrity(&self, file: &UploadedFile) -> UploadResult<()> {
        if let Some(allowed) = &self.allowed_extensions {
            match file.extension() {
                Some(ext) if allowed.iter().any(|a| a == &ext) => {}
                Some(ext) => {
                    return Err(UploadError::Integrity(format!(
                        "extension `{}` is not allowed (allowed: {})",
                        ext,
                        allowed.join(", ")
                    )));
                }
                None => {
                    return Err(UploadError::Integrity(format!(
                        "file has no extension (allowed: {})",
                        allowed.join(", ")
                    )));
                }
            }
        }

        if let Some(max) = self.max_size_bytes {
            if file.size() > max {
                return Err(UploadError::Integrity(format!(
                    "file is {} bytes, maximum is {}",
                    file.size(),
                    max
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Uploader for MemoryUploader {
    async fn cache(&mut self, file: UploadedFile) -> UploadResult<()> {
        self.check_integrity(&file)?;

        let data = match &self.processor {
            Some(processor) => processor(&file).map_err(UploadError::Processing)?,
            None => file.data().clone(),
        };

        let identifier = file.sanitized_filename();
        tracing::debug!(
            identifier = %identifier,
            size_bytes = data.len(),
            "staged upload"
        );
        self.current = Some(HeldFile {
            identifier,
            staged: Some(data),
        });

        Ok(())
    }

    fn identifier(&self) -> Option<String> {
        self.current.as_ref().map(|held| held.identifier.clone())
    }

    async fn store(&mut self) -> UploadResult<()> {
        if let Some(held) = &mut self.current {
            if let Some(data) = held.staged.take() {
                let size = data.len();
                self.store.insert(held.identifier.clone(), data).await;
                tracing::info!(
                    identifier = %held.identifier,
                    size_bytes = size,
                    "stored upload"
                );
            }
        }
        Ok(())
    }

    async fn remove(&mut self) -> UploadResult<()> {
        if let Some(held) = self.current.take() {
            self.store.remove(&held.identifier).await;
            tracing::info!(identifier = %held.identifier, "removed upload");
        }
        Ok(())
    }

    async fn retrieve(&mut self, identifier: &str) -> UploadResult<()> {
        if !self.store.contains(identifier).await {
            return Err(UploadError::Retrieve(format!(
                "no stored file named `{}`",
                identifier
            )));
        }
        self.current = Some(HeldFile {
            identifier: identifier.to_string(),
            staged: None,
        });
        Ok(())
    }
}
