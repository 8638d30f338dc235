//! Record access traits
//!
//! Mounting works against two small trait seams instead of a concrete record
//! type. `AttributeAccessor` is the raw column view a persistence backend
//! already has. `Mountable` adds the mount states and the validation error
//! bag. Any type implementing both can host mounted uploaders.

use crate::state::MountSet;
use crate::validation::Errors;

/// Raw, uninterpreted column access.
///
/// `read_attribute` must return the stored value even when an uploader is
/// mounted on the column; the mount layer builds its interpreted views on
/// top of this.
pub trait AttributeAccessor {
    fn read_attribute(&self, name: &str) -> Option<String>;

    fn write_attribute(&mut self, name: &str, value: Option<String>);
}

/// A record that can host mounted uploaders.
pub trait Mountable: AttributeAccessor + Send {
    fn mounts(&self) -> &MountSet;

    fn mounts_mut(&mut self) -> &mut MountSet;

    fn errors(&self) -> &Errors;

    fn errors_mut(&mut self) -> &mut Errors;
}
