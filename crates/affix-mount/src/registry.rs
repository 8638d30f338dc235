//! Mount registry
//!
//! A `MountRegistry` holds the class-level mount definitions for one record
//! type: which columns carry uploaders, how to build those uploaders, and
//! which lifecycle callbacks and validations each mount contributed. Record
//! stores keep one registry per record type and drive it from their save and
//! destroy paths.
//!
//! Mounting a column registers three lifecycle callbacks:
//!
//! * before save, copy the staged identifier into the column
//! * after save, commit the staged file to storage
//! * after destroy, remove the stored file
//!
//! plus the integrity and processing validations the mount options ask for.
//! Mounting the same column again replaces the definition and everything the
//! previous mount registered.

use std::collections::HashMap;
use std::sync::Arc;

use affix_core::{
    resolve_message, MessageCatalog, MessageKey, MountOptions, StaticCatalog, UploadError,
    UploadedFile, Uploader,
};
use futures::FutureExt;

use crate::access::Mountable;
use crate::error::{MountError, MountResult};
use crate::hooks::{CallbackSet, HookFn, HookFuture, Stage};
use crate::validation::{Errors, Validator};

/// Builds a fresh uploader instance for one mount.
pub type UploaderFactory = Box<dyn Fn() -> Box<dyn Uploader> + Send + Sync>;

/// Class-level description of one mounted column.
pub struct MountDefinition {
    column: String,
    factory: UploaderFactory,
    options: MountOptions,
}

impl MountDefinition {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn options(&self) -> &MountOptions {
        &self.options
    }

    pub(crate) fn build_uploader(&self) -> Box<dyn Uploader> {
        (self.factory)()
    }
}

/// All mounts of one record type.
pub struct MountRegistry<R> {
    mounts: HashMap<String, Arc<MountDefinition>>,
    callbacks: CallbackSet<R>,
    validators: Vec<Validator<R>>,
    catalog: Arc<dyn MessageCatalog>,
}

impl<R: Mountable + 'static> MountRegistry<R> {
    pub fn new() -> Self {
        Self {
            mounts: HashMap::new(),
            callbacks: CallbackSet::new(),
            validators: Vec::new(),
            catalog: Arc::new(StaticCatalog::new()),
        }
    }

    /// Replaces the catalog used to resolve validation messages.
    pub fn set_catalog(&mut self, catalog: Arc<dyn MessageCatalog>) {
        self.catalog = catalog;
    }

    /// Mounts an uploader on `column`.
    ///
    /// `factory` builds one uploader per assignment or resolution. Mounting
    /// a column that is already mounted replaces the previous definition:
    /// its callbacks and validations are dropped before the new ones are
    /// registered, so repeated mounts never stack duplicate hooks.
    pub fn mount<F>(&mut self, column: &str, factory: F, options: MountOptions)
    where
        F: Fn() -> Box<dyn Uploader> + Send + Sync + 'static,
    {
        if self.mounts.remove(column).is_some() {
            self.callbacks.unregister_owner(column);
            self.validators.retain(|validator| validator.owner != column);
        }

        let definition = Arc::new(MountDefinition {
            column: column.to_string(),
            factory: Box::new(factory),
            options,
        });
        self.register_validations(&definition);
        self.register_lifecycle(&definition);

        tracing::debug!(
            column = %column,
            validate_integrity = definition.options().validate_integrity,
            validate_processing = definition.options().validate_processing,
            "mounted uploader"
        );
        self.mounts.insert(column.to_string(), definition);
    }

    pub fn definition(&self, column: &str) -> Option<&MountDefinition> {
        self.mounts.get(column).map(|definition| definition.as_ref())
    }

    pub fn is_mounted(&self, column: &str) -> bool {
        self.mounts.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.mounts.keys().map(String::as_str)
    }

    /// Assigns a file to a mounted column.
    ///
    /// The previous uploader (if any) is discarded, a fresh one is built and
    /// the file staged into it. Integrity and processing failures do not
    /// error: they are captured as flags on the mount state for the
    /// validations to pick up at save time. Any other failure propagates.
    pub async fn assign(
        &self,
        record: &mut R,
        column: &str,
        file: UploadedFile,
    ) -> MountResult<()> {
        let definition = self
            .mounts
            .get(column)
            .ok_or_else(|| MountError::NotMounted(column.to_string()))?;

        let mut uploader = definition.build_uploader();
        let filename = file.filename().to_string();

        let state = record.mounts_mut().ensure(column);
        state.clear_errors();
        state.take_uploader();

        match uploader.cache(file).await {
            Ok(()) => {
                tracing::debug!(column = %column, filename = %filename, "assigned upload");
                state.set_uploader(uploader);
                Ok(())
            }
            Err(UploadError::Integrity(detail)) => {
                tracing::debug!(
                    column = %column,
                    filename = %filename,
                    detail = %detail,
                    "integrity failure captured"
                );
                state.set_integrity_error(detail);
                Ok(())
            }
            Err(UploadError::Processing(detail)) => {
                tracing::debug!(
                    column = %column,
                    filename = %filename,
                    detail = %detail,
                    "processing failure captured"
                );
                state.set_processing_error(detail);
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Returns the uploader for `column`, resolving it from the persisted
    /// identifier on first access. `None` means nothing was assigned and the
    /// column holds no identifier.
    pub async fn uploader<'a>(
        &self,
        record: &'a mut R,
        column: &str,
    ) -> MountResult<Option<&'a dyn Uploader>> {
        let definition = self
            .mounts
            .get(column)
            .ok_or_else(|| MountError::NotMounted(column.to_string()))?;

        let resolved = record
            .mounts()
            .state(column)
            .map_or(false, |state| state.has_uploader());
        if !resolved {
            match record.read_attribute(column) {
                Some(identifier) if !identifier.is_empty() => {
                    let mut uploader = definition.build_uploader();
                    uploader.retrieve(&identifier).await?;
                    record.mounts_mut().ensure(column).set_uploader(uploader);
                }
                _ => return Ok(None),
            }
        }

        Ok(record
            .mounts()
            .state(column)
            .and_then(|state| state.uploader()))
    }

    /// Current identifier for `column`: the staged one if a file is held,
    /// otherwise whatever the column stores.
    pub fn identifier(&self, record: &R, column: &str) -> Option<String> {
        record
            .mounts()
            .state(column)
            .and_then(|state| state.identifier())
            .or_else(|| record.read_attribute(column))
    }

    /// Runs every mount validation and replaces the record's error bag with
    /// the outcome. Returns `true` when the record is valid.
    pub fn validate(&self, record: &mut R) -> bool {
        let mut errors = Errors::new();
        for validator in &self.validators {
            (validator.check)(record, self.catalog.as_ref(), &mut errors);
        }

        let valid = errors.is_empty();
        if !valid {
            tracing::debug!(error_count = errors.count(), "mount validations failed");
        }
        *record.errors_mut() = errors;
        valid
    }

    /// Runs the callbacks registered for `stage`, in mount order.
    pub async fn run_callbacks(&self, stage: Stage, record: &mut R) -> MountResult<()> {
        self.callbacks.run(stage, record).await
    }

    pub fn callbacks(&self) -> &CallbackSet<R> {
        &self.callbacks
    }

    fn register_validations(&mut self, definition: &Arc<MountDefinition>) {
        let options = definition.options();

        if options.validate_integrity {
            let column = definition.column().to_string();
            let override_message = options.integrity_message.clone();
            self.validators.push(Validator {
                owner: column.clone(),
                check: Box::new(move |record: &R, catalog, errors| {
                    let flagged = record
                        .mounts()
                        .state(&column)
                        .and_then(|state| state.integrity_error())
                        .is_some();
                    if flagged {
                        errors.add(
                            column.clone(),
                            resolve_message(
                                catalog,
                                MessageKey::Integrity,
                                override_message.as_deref(),
                            ),
                        );
                    }
                }),
            });
        }

        if options.validate_processing {
            let column = definition.column().to_string();
            let override_message = options.processing_message.clone();
            self.validators.push(Validator {
                owner: column.clone(),
                check: Box::new(move |record: &R, catalog, errors| {
                    let flagged = record
                        .mounts()
                        .state(&column)
                        .and_then(|state| state.processing_error())
                        .is_some();
                    if flagged {
                        errors.add(
                            column.clone(),
                            resolve_message(
                                catalog,
                                MessageKey::Processing,
                                override_message.as_deref(),
                            ),
                        );
                    }
                }),
            });
        }
    }

    fn register_lifecycle(&mut self, definition: &Arc<MountDefinition>) {
        let column = definition.column().to_string();
        self.callbacks.register(
            Stage::BeforeSave,
            definition.column(),
            boxed_hook(move |record| {
                let column = column.clone();
                async move { write_identifier(record, &column) }.boxed()
            }),
        );

        let column = definition.column().to_string();
        self.callbacks.register(
            Stage::AfterSave,
            definition.column(),
            boxed_hook(move |record| {
                let column = column.clone();
                async move { store_upload(record, &column).await }.boxed()
            }),
        );

        let column = definition.column().to_string();
        let definition_for_remove = Arc::clone(definition);
        self.callbacks.register(
            Stage::AfterDestroy,
            definition.column(),
            boxed_hook(move |record| {
                let column = column.clone();
                let definition = Arc::clone(&definition_for_remove);
                async move { remove_upload(record, &column, &definition).await }.boxed()
            }),
        );
    }
}

impl<R: Mountable + 'static> Default for MountRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn boxed_hook<R, F>(hook: F) -> HookFn<R>
where
    F: for<'a> Fn(&'a mut R) -> HookFuture<'a> + Send + Sync + 'static,
{
    Box::new(hook)
}

/// Before-save: copy the staged identifier into the mounted column.
fn write_identifier<R: Mountable>(record: &mut R, column: &str) -> MountResult<()> {
    let identifier = record
        .mounts()
        .state(column)
        .and_then(|state| state.identifier());
    if let Some(identifier) = identifier {
        tracing::debug!(column = %column, identifier = %identifier, "writing upload identifier");
        record.write_attribute(column, Some(identifier));
    }
    Ok(())
}

/// After-save: commit the staged file to storage.
async fn store_upload<R: Mountable>(record: &mut R, column: &str) -> MountResult<()> {
    if let Some(state) = record.mounts_mut().state_mut(column) {
        if let Some(uploader) = state.uploader_mut() {
            uploader.store().await?;
            tracing::debug!(column = %column, "stored mounted upload");
        }
    }
    Ok(())
}

/// After-destroy: remove the stored file.
///
/// The uploader may never have been touched on this instance, so it is
/// rebuilt from the persisted identifier first.
async fn remove_upload<R: Mountable>(
    record: &mut R,
    column: &str,
    definition: &MountDefinition,
) -> MountResult<()> {
    let resolved = record
        .mounts()
        .state(column)
        .map_or(false, |state| state.has_uploader());
    if !resolved {
        let identifier = match record.read_attribute(column) {
            Some(identifier) if !identifier.is_empty() => identifier,
            _ => return Ok(()),
        };
        let mut uploader = definition.build_uploader();
        uploader.retrieve(&identifier).await?;
        record.mounts_mut().ensure(column).set_uploader(uploader);
    }

    if let Some(state) = record.mounts_mut().state_mut(column) {
        if let Some(uploader) = state.uploader_mut() {
            uploader.remove().await?;
            tracing::debug!(column = %column, "removed mounted upload");
        }
    }
    Ok(())
}
