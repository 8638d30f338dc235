//! Affix Mount Library
//!
//! Binds uploaders to record columns. A record type implements
//! [`AttributeAccessor`] and [`Mountable`], a [`MountRegistry`] holds its
//! mount definitions, and the registry's lifecycle callbacks keep the column
//! value and the stored file in step with saves and destroys.

pub mod access;
pub mod error;
pub mod hooks;
pub mod registry;
pub mod state;
pub mod validation;

// Re-export commonly used types
pub use access::{AttributeAccessor, Mountable};
pub use error::{MountError, MountResult};
pub use hooks::{CallbackSet, HookFn, HookFuture, Stage};
pub use registry::{MountDefinition, MountRegistry, UploaderFactory};
pub use state::{MountSet, MountState};
pub use validation::Errors;
