//! Error types for mount operations

use affix_core::UploadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("no uploader is mounted on column `{0}`")]
    NotMounted(String),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

pub type MountResult<T> = Result<T, MountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_mounted_display() {
        let err = MountError::NotMounted("avatar".to_string());
        assert_eq!(err.to_string(), "no uploader is mounted on column `avatar`");
    }

    #[test]
    fn test_upload_error_passes_through() {
        let err = MountError::from(UploadError::Store("disk full".to_string()));
        assert_eq!(err.to_string(), "store failed: disk full");
    }
}
