//! Lifecycle callback registry
//!
//! Mounting an uploader registers closures against the three lifecycle
//! stages a record store drives. Each closure is tagged with the column that
//! registered it so a remount can replace exactly its own callbacks.
//! Callbacks run sequentially in registration order; the first error aborts
//! the stage.

use std::fmt;

use futures::future::BoxFuture;

use crate::error::MountResult;

/// The three points in a record's lifecycle where mounts participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Runs before the row is written. Mount hooks copy the staged
    /// identifier into the column here.
    BeforeSave,
    /// Runs after a successful write. Mount hooks commit the staged file
    /// to storage here.
    AfterSave,
    /// Runs after a successful delete. Mount hooks remove the stored file
    /// here.
    AfterDestroy,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::BeforeSave => "before_save",
            Stage::AfterSave => "after_save",
            Stage::AfterDestroy => "after_destroy",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type HookFuture<'a> = BoxFuture<'a, MountResult<()>>;

/// A lifecycle callback. Borrows the record mutably for the duration of its
/// future, so callbacks can both read attributes and drive uploaders.
pub type HookFn<R> = Box<dyn for<'a> Fn(&'a mut R) -> HookFuture<'a> + Send + Sync>;

struct RegisteredHook<R> {
    owner: String,
    hook: HookFn<R>,
}

/// Callbacks grouped by stage, in registration order.
pub struct CallbackSet<R> {
    before_save: Vec<RegisteredHook<R>>,
    after_save: Vec<RegisteredHook<R>>,
    after_destroy: Vec<RegisteredHook<R>>,
}

impl<R> Default for CallbackSet<R> {
    fn default() -> Self {
        Self {
            before_save: Vec::new(),
            after_save: Vec::new(),
            after_destroy: Vec::new(),
        }
    }
}

impl<R> CallbackSet<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, stage: Stage, owner: impl Into<String>, hook: HookFn<R>) {
        self.stage_hooks_mut(stage).push(RegisteredHook {
            owner: owner.into(),
            hook,
        });
    }

    /// Drops every callback registered by `owner`, across all stages.
    pub fn unregister_owner(&mut self, owner: &str) {
        self.before_save.retain(|registered| registered.owner != owner);
        self.after_save.retain(|registered| registered.owner != owner);
        self.after_destroy.retain(|registered| registered.owner != owner);
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.stage_hooks(stage).len()
    }

    /// Runs every callback for `stage` in order, stopping at the first
    /// error.
    pub async fn run(&self, stage: Stage, record: &mut R) -> MountResult<()> {
        for registered in self.stage_hooks(stage) {
            tracing::trace!(
                stage = %stage,
                column = %registered.owner,
                "running lifecycle callback"
            );
            (registered.hook)(record).await?;
        }
        Ok(())
    }

    fn stage_hooks(&self, stage: Stage) -> &[RegisteredHook<R>] {
        match stage {
            Stage::BeforeSave => &self.before_save,
            Stage::AfterSave => &self.after_save,
            Stage::AfterDestroy => &self.after_destroy,
        }
    }

    fn stage_hooks_mut(&mut self, stage: Stage) -> &mut Vec<RegisteredHook<R>> {
        match stage {
            Stage::BeforeSave => &mut self.before_save,
            Stage::AfterSave => &mut self.after_save,
            Stage::AfterDestroy => &mut self.after_destroy,
        }
    }
}
