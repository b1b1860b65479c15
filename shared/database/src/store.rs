//! Durable SKU store.
//!
//! All writes go through a single in-process writer gate. Allocation runs as
//! one SQLite transaction holding that gate, so a counter never advances
//! without the record that consumed it.

use std::sync::Arc;

use sqlx::{Sqlite, Transaction};
use tokio::sync::{Mutex, OwnedMutexGuard};

use partcode_models::{BucketKey, SkuRecord};
use partcode_utils::{DatabaseConfig, PartcodeError, PartcodeResult};

use crate::repositories::counter::{read_counter, write_counter};
use crate::repositories::sku::{fingerprint_sku, insert_record};
use crate::repositories::{CounterRepository, SkuRepository};
use crate::sqlite::SqlitePool;

#[derive(Clone)]
pub struct SkuStore {
    pool: SqlitePool,
    records: SkuRepository,
    counters: CounterRepository,
    writer: Arc<Mutex<()>>,
}

impl SkuStore {
    /// Opens (creating if needed) and migrates the database named by `config`.
    pub async fn open(config: &DatabaseConfig) -> PartcodeResult<Self> {
        let pool = crate::initialize_database(config)
            .await
            .map_err(|e| PartcodeError::database(format!("{:#}", e)))?;
        Ok(Self::new(pool))
    }

    /// Wraps an already migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            records: SkuRepository::new(pool.clone()),
            counters: CounterRepository::new(pool.clone()),
            pool,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn records(&self) -> &SkuRepository {
        &self.records
    }

    pub fn counters(&self) -> &CounterRepository {
        &self.counters
    }

    /// Inserts a record outside any allocation.
    pub async fn put(&self, record: &SkuRecord) -> PartcodeResult<()> {
        let _gate = self.writer.lock().await;
        self.records.create(record).await
    }

    pub async fn get_by_sku(&self, sku: &str) -> PartcodeResult<Option<SkuRecord>> {
        self.records.find_by_sku(sku).await
    }

    pub async fn get_by_fingerprint(&self, fingerprint: &str) -> PartcodeResult<Option<String>> {
        self.records.find_sku_by_fingerprint(fingerprint).await
    }

    /// Read-only counter value for diagnostics.
    pub async fn counter(&self, key: &BucketKey) -> PartcodeResult<u64> {
        self.counters.current(key).await
    }

    /// Starts an allocation transaction. Dropping it without `commit` rolls
    /// everything back.
    pub async fn begin_allocation(&self) -> PartcodeResult<AllocationTx> {
        // Gate first, then the connection: the reverse order can starve a
        // single-connection pool.
        let gate = self.writer.clone().lock_owned().await;
        let mut tx = self.pool.begin().await?;

        // A write as the first statement takes SQLite's write lock now, so
        // other processes wait on busy_timeout instead of failing mid-way.
        sqlx::query("UPDATE sku_counters SET value = value WHERE 0")
            .execute(&mut *tx)
            .await?;

        Ok(AllocationTx { tx, _gate: gate })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Exclusive write scope for one allocation.
pub struct AllocationTx {
    // Declared before the gate so the rollback is issued before another
    // writer can start.
    tx: Transaction<'static, Sqlite>,
    _gate: OwnedMutexGuard<()>,
}

impl AllocationTx {
    pub async fn fingerprint_sku(&mut self, fingerprint: &str) -> PartcodeResult<Option<String>> {
        fingerprint_sku(&mut *self.tx, fingerprint).await
    }

    /// Last issued sequence for `key`, 0 for a fresh bucket.
    pub async fn counter(&mut self, key: &BucketKey) -> PartcodeResult<u64> {
        Ok(read_counter(&mut *self.tx, key).await?.unwrap_or(0))
    }

    pub async fn set_counter(&mut self, key: &BucketKey, value: u64) -> PartcodeResult<()> {
        write_counter(&mut *self.tx, key, value).await
    }

    pub async fn insert_record(&mut self, record: &SkuRecord) -> PartcodeResult<()> {
        insert_record(&mut *self.tx, record).await
    }

    pub async fn commit(self) -> PartcodeResult<()> {
        let Self { tx, _gate } = self;
        tx.commit().await?;
        Ok(())
    }
}
