//! Per-record mount state
//!
//! Each record instance carries one `MountState` per mounted column. The
//! state owns the live uploader (if one has been assigned or resolved) and
//! the capture flags raised by a failed assignment. Flags survive until the
//! next assignment so validators can inspect them at save time.

use std::collections::HashMap;
use std::fmt;

use affix_core::Uploader;

/// Instance-level state for a single mounted column.
#[derive(Default)]
pub struct MountState {
    uploader: Option<Box<dyn Uploader>>,
    integrity_error: Option<String>,
    processing_error: Option<String>,
}

impl MountState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploader(&self) -> Option<&dyn Uploader> {
        self.uploader.as_deref()
    }

    // The explicit object bound matches the boxed uploader; eliding it would
    // shorten the bound to the borrow, which `&mut` does not allow.
    pub fn uploader_mut(&mut self) -> Option<&mut (dyn Uploader + 'static)> {
        self.uploader.as_deref_mut()
    }

    pub fn has_uploader(&self) -> bool {
        self.uploader.is_some()
    }

    pub fn set_uploader(&mut self, uploader: Box<dyn Uploader>) {
        self.uploader = Some(uploader);
    }

    pub fn take_uploader(&mut self) -> Option<Box<dyn Uploader>> {
        self.uploader.take()
    }

    /// Identifier of the currently held upload, if any.
    pub fn identifier(&self) -> Option<String> {
        self.uploader.as_ref().and_then(|uploader| uploader.identifier())
    }

    pub fn integrity_error(&self) -> Option<&str> {
        self.integrity_error.as_deref()
    }

    pub fn processing_error(&self) -> Option<&str> {
        self.processing_error.as_deref()
    }

    pub fn set_integrity_error(&mut self, detail: String) {
        self.integrity_error = Some(detail);
    }

    pub fn set_processing_error(&mut self, detail: String) {
        self.processing_error = Some(detail);
    }

    /// Clears both capture flags. Called at the start of every assignment.
    pub fn clear_errors(&mut self) {
        self.integrity_error = None;
        self.processing_error = None;
    }
}

impl fmt::Debug for MountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountState")
            .field("has_uploader", &self.uploader.is_some())
            .field("integrity_error", &self.integrity_error)
            .field("processing_error", &self.processing_error)
            .finish()
    }
}

/// All mount states of one record instance, keyed by column name.
#[derive(Debug, Default)]
pub struct MountSet {
    states: HashMap<String, MountState>,
}

impl MountSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, column: &str) -> Option<&MountState> {
        self.states.get(column)
    }

    pub fn state_mut(&mut self, column: &str) -> Option<&mut MountState> {
        self.states.get_mut(column)
    }

    /// Returns the state for `column`, creating an empty one if absent.
    pub fn ensure(&mut self, column: &str) -> &mut MountState {
        self.states.entry(column.to_string()).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use affix_core::{MemoryFileStore, MemoryUploader, UploadedFile};
    use bytes::Bytes;

    #[test]
    fn test_ensure_creates_empty_state() {
        let mut mounts = MountSet::new();
        assert!(mounts.is_empty());
        assert!(mounts.state("avatar").is_none());

        mounts.ensure("avatar");
        assert!(!mounts.is_empty());
        let state = mounts.state("avatar").unwrap();
        assert!(!state.has_uploader());
        assert!(state.integrity_error().is_none());
        assert!(state.processing_error().is_none());
    }

    #[tokio::test]
    async fn test_uploader_mut_drives_storage() {
        let files = MemoryFileStore::new();
        let mut uploader = MemoryUploader::new(files.clone());
        uploader
            .cache(UploadedFile::new("avatar.png", Bytes::from_static(b"png")))
            .await
            .unwrap();

        let mut state = MountState::new();
        state.set_uploader(Box::new(uploader));
        assert_eq!(state.identifier().as_deref(), Some("avatar.png"));

        state.uploader_mut().unwrap().store().await.unwrap();
        assert!(files.contains("avatar.png").await);

        state.uploader_mut().unwrap().remove().await.unwrap();
        assert!(files.is_empty().await);
        assert!(state.identifier().is_none());
    }

    #[test]
    fn test_clear_errors_resets_flags() {
        let mut state = MountState::new();
        state.set_integrity_error("bad extension".to_string());
        state.set_processing_error("resize failed".to_string());
        assert_eq!(state.integrity_error(), Some("bad extension"));
        assert_eq!(state.processing_error(), Some("resize failed"));

        state.clear_errors();
        assert!(state.integrity_error().is_none());
        assert!(state.processing_error().is_none());
    }

    #[test]
    fn test_debug_does_not_require_uploader_debug() {
        let state = MountState::new();
        let printed = format!("{state:?}");
        assert!(printed.contains("has_uploader: false"));
    }
}
