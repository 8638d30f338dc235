//! Error types for uploader implementations.
//!
//! The taxonomy distinguishes failures that are captured as validation flags
//! on the owning record (`Integrity`, `Processing`) from failures that
//! propagate to the caller of save/destroy (`Store`, `Retrieve`, `Remove`,
//! `Other`). The mount layer inspects the variant to decide which path a
//! failure takes.

use thiserror::Error;

/// Upload operation errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file was rejected before staging (wrong type, too large, ...).
    /// Captured as an integrity flag on the mounted attribute.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// A post-upload processing step failed.
    /// Captured as a processing flag on the mounted attribute.
    #[error("processing failed: {0}")]
    Processing(String),

    #[error("store failed: {0}")]
    Store(String),

    #[error("retrieve failed: {0}")]
    Retrieve(String),

    #[error("remove failed: {0}")]
    Remove(String),

    /// Escape hatch for custom uploader implementations.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

impl UploadError {
    /// Whether this error is captured as a flag on the mounted attribute
    /// instead of propagating out of an assignment.
    pub fn is_captured_as_flag(&self) -> bool {
        matches!(self, UploadError::Integrity(_) | UploadError::Processing(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_and_processing_are_flag_errors() {
        assert!(UploadError::Integrity("bad extension".into()).is_captured_as_flag());
        assert!(UploadError::Processing("resize failed".into()).is_captured_as_flag());
        assert!(!UploadError::Store("disk full".into()).is_captured_as_flag());
        assert!(!UploadError::Retrieve("gone".into()).is_captured_as_flag());
    }

    #[test]
    fn test_other_wraps_anyhow() {
        let err: UploadError = anyhow::anyhow!("backend exploded").into();
        assert!(!err.is_captured_as_flag());
        assert_eq!(err.to_string(), "backend exploded");
    }
}
