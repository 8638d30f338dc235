//! Affix Core Library
//!
//! This crate provides the uploader abstraction shared by all affix
//! components: the [`Uploader`] trait, the uploaded-file type, the upload
//! error taxonomy, mount-time options, and validation message lookup. The
//! mount layer (`affix-mount`) binds these into a record's save/destroy
//! lifecycle; the record backends (`affix-record`) drive that lifecycle.

pub mod error;
pub mod file;
pub mod memory;
pub mod messages;
pub mod options;
pub mod uploader;

// Re-export commonly used types
pub use error::{UploadError, UploadResult};
pub use file::UploadedFile;
pub use memory::{MemoryFileStore, MemoryUploader, Processor};
pub use messages::{resolve_message, MessageCatalog, MessageKey, StaticCatalog};
pub use options::MountOptions;
pub use uploader::Uploader;
