//! In-memory record store
//!
//! Keeps rows in a shared map. This backend powers the integration tests and
//! works as a scaffold while an application's real backend is still in flux.
//! It drives the exact same mount lifecycle as the SQLite backend.

use std::collections::HashMap;
use std::sync::Arc;

use affix_core::UploadedFile;
use affix_mount::{
    AttributeAccessor, Errors, MountRegistry, MountResult, MountSet, Mountable, Stage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{BackendError, DestroyError, RecordStore, SaveError};

/// A record held by a [`MemoryStore`].
pub struct MemoryRecord {
    id: Uuid,
    persisted: bool,
    attributes: HashMap<String, String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    mounts: MountSet,
    errors: Errors,
}

impl MemoryRecord {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            persisted: false,
            attributes: HashMap::new(),
            created_at: now,
            updated_at: now,
            mounts: MountSet::new(),
            errors: Errors::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl AttributeAccessor for MemoryRecord {
    fn read_attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn write_attribute(&mut self, name: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.attributes.insert(name.to_string(), value);
            }
            None => {
                self.attributes.remove(name);
            }
        }
    }
}

impl Mountable for MemoryRecord {
    fn mounts(&self) -> &MountSet {
        &self.mounts
    }

    fn mounts_mut(&mut self) -> &mut MountSet {
        &mut self.mounts
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }
}

struct StoredRow {
    attributes: HashMap<String, String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Record store backed by a shared in-memory map.
///
/// Clones share the same rows and the same mount registry.
#[derive(Clone)]
pub struct MemoryStore {
    registry: Arc<MountRegistry<MemoryRecord>>,
    rows: Arc<RwLock<HashMap<Uuid, StoredRow>>>,
}

impl MemoryStore {
    pub fn new(registry: MountRegistry<MemoryRecord>) -> Self {
        Self {
            registry: Arc::new(registry),
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &MountRegistry<MemoryRecord> {
        &self.registry
    }

    /// Stages `file` on the record's mounted column.
    pub async fn assign(
        &self,
        record: &mut MemoryRecord,
        column: &str,
        file: UploadedFile,
    ) -> MountResult<()> {
        self.registry.assign(record, column, file).await
    }

    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    type Record = MemoryRecord;

    fn build(&self) -> MemoryRecord {
        MemoryRecord::new()
    }

    #[tracing::instrument(skip(self, record), fields(record.id = %record.id()))]
    async fn save(&self, record: &mut MemoryRecord) -> Result<(), SaveError> {
        if !self.registry.validate(record) {
            return Err(SaveError::Invalid(record.errors().clone()));
        }
        self.registry.run_callbacks(Stage::BeforeSave, record).await?;

        record.updated_at = Utc::now();
        {
            let mut rows = self.rows.write().await;
            rows.insert(
                record.id,
                StoredRow {
                    attributes: record.attributes.clone(),
                    created_at: record.created_at,
                    updated_at: record.updated_at,
                },
            );
        }
        record.persisted = true;
        tracing::debug!("saved record");

        self.registry.run_callbacks(Stage::AfterSave, record).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, record), fields(record.id = %record.id()))]
    async fn destroy(&self, record: &mut MemoryRecord) -> Result<(), DestroyError> {
        if !record.persisted {
            return Err(DestroyError::NotPersisted);
        }

        let removed = self.rows.write().await.remove(&record.id);
        if removed.is_none() {
            return Err(DestroyError::Missing(record.id));
        }
        record.persisted = false;
        tracing::debug!("destroyed record");

        self.registry
            .run_callbacks(Stage::AfterDestroy, record)
            .await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<MemoryRecord>, BackendError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).map(|row| MemoryRecord {
            id,
            persisted: true,
            attributes: row.attributes.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            mounts: MountSet::new(),
            errors: Errors::new(),
        }))
    }
}
