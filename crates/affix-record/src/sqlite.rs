//! SQLite-backed record store
//!
//! Rows live in a single `records` table, one JSON document per record,
//! scoped by a collection name so several record types can share one
//! database file. The mount lifecycle runs around every write exactly as in
//! the in-memory backend.

use std::collections::HashMap;
use std::sync::Arc;

use affix_core::UploadedFile;
use affix_mount::{
    AttributeAccessor, Errors, MountRegistry, MountResult, MountSet, Mountable, Stage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

use crate::store::{BackendError, DestroyError, RecordStore, SaveError};

/// A record held by a [`SqliteStore`].
pub struct SqliteRecord {
    id: Uuid,
    persisted: bool,
    attributes: HashMap<String, String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    mounts: MountSet,
    errors: Errors,
}

impl SqliteRecord {
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

impl AttributeAccessor for SqliteRecord {
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

impl Mountable for SqliteRecord {
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

/// Row type for the records table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: String,
    data: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RecordRow {
    fn into_record(self) -> Result<SqliteRecord, BackendError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|err| BackendError::Corrupt(format!("bad record id `{}`: {err}", self.id)))?;
        let attributes: HashMap<String, String> = serde_json::from_str(&self.data)?;
        Ok(SqliteRecord {
            id,
            persisted: true,
            attributes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            mounts: MountSet::new(),
            errors: Errors::new(),
        })
    }
}

/// Record store backed by a SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    collection: String,
    registry: Arc<MountRegistry<SqliteRecord>>,
}

impl SqliteStore {
    /// Opens the database at `url` and ensures the records table exists.
    ///
    /// The pool is capped at one connection so that `sqlite::memory:`
    /// databases keep a single shared view.
    pub async fn connect(
        url: &str,
        collection: &str,
        registry: MountRegistry<SqliteRecord>,
    ) -> Result<Self, BackendError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;
        tracing::info!(collection = %collection, "connected record store");

        Ok(Self {
            pool,
            collection: collection.to_string(),
            registry: Arc::new(registry),
        })
    }

    pub fn registry(&self) -> &MountRegistry<SqliteRecord> {
        &self.registry
    }

    /// Stages `file` on the record's mounted column.
    pub async fn assign(
        &self,
        record: &mut SqliteRecord,
        column: &str,
        file: UploadedFile,
    ) -> MountResult<()> {
        self.registry.assign(record, column, file).await
    }

    /// Number of rows in this store's collection.
    pub async fn count(&self) -> Result<u64, BackendError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM records WHERE collection = $1")
                .bind(&self.collection)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 as u64)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    type Record = SqliteRecord;

    fn build(&self) -> SqliteRecord {
        SqliteRecord::new()
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "records", record.id = %record.id()))]
    async fn save(&self, record: &mut SqliteRecord) -> Result<(), SaveError> {
        if !self.registry.validate(record) {
            return Err(SaveError::Invalid(record.errors().clone()));
        }
        self.registry.run_callbacks(Stage::BeforeSave, record).await?;

        record.updated_at = Utc::now();
        let data = serde_json::to_string(&record.attributes).map_err(BackendError::from)?;
        sqlx::query(
            r#"
            INSERT INTO records (id, collection, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(record.id.to_string())
        .bind(&self.collection)
        .bind(&data)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(BackendError::from)?;
        record.persisted = true;

        self.registry.run_callbacks(Stage::AfterSave, record).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "records", record.id = %record.id()))]
    async fn destroy(&self, record: &mut SqliteRecord) -> Result<(), DestroyError> {
        if !record.persisted {
            return Err(DestroyError::NotPersisted);
        }

        let result = sqlx::query("DELETE FROM records WHERE id = $1 AND collection = $2")
            .bind(record.id.to_string())
            .bind(&self.collection)
            .execute(&self.pool)
            .await
            .map_err(BackendError::from)?;
        if result.rows_affected() == 0 {
            return Err(DestroyError::Missing(record.id));
        }
        record.persisted = false;

        self.registry
            .run_callbacks(Stage::AfterDestroy, record)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "records", record.id = %id))]
    async fn find(&self, id: Uuid) -> Result<Option<SqliteRecord>, BackendError> {
        let row: Option<RecordRow> = sqlx::query_as::<Sqlite, RecordRow>(
            "SELECT id, data, created_at, updated_at FROM records WHERE id = $1 AND collection = $2",
        )
        .bind(id.to_string())
        .bind(&self.collection)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RecordRow::into_record).transpose()
    }
}
