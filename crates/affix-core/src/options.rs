//! Mount-time options.

use serde::{Deserialize, Serialize};

/// Configuration fixed for the lifetime of a mount definition.
///
/// These are class-level settings supplied when an uploader is mounted on a
/// column, not per-record state. Serde-derived so applications can read them
/// from their own configuration files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MountOptions {
    /// Fail validation when the mounted attribute carries an integrity error.
    pub validate_integrity: bool,

    /// Fail validation when the mounted attribute carries a processing error.
    pub validate_processing: bool,

    /// Message override for integrity failures on this mount. When unset the
    /// message resolves through the catalog, then the default literal.
    pub integrity_message: Option<String>,

    /// Message override for processing failures on this mount.
    pub processing_message: Option<String>,
}
