//! Counter Repository
//!
//! Per-bucket sequence counters. Writes only happen inside an allocation
//! transaction; the repository itself is read-only.

use chrono::Utc;
use sqlx::Sqlite;

use partcode_models::BucketKey;
use partcode_utils::{PartcodeError, PartcodeResult};

use crate::sqlite::SqlitePool;

#[derive(Clone)]
pub struct CounterRepository {
    pool: SqlitePool,
}

impl CounterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Last sequence issued for `key`, 0 when the bucket was never used.
    pub async fn current(&self, key: &BucketKey) -> PartcodeResult<u64> {
        Ok(read_counter(&self.pool, key).await?.unwrap_or(0))
    }

    pub async fn bucket_count(&self) -> PartcodeResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sku_counters")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

pub(crate) async fn read_counter<'e, E>(executor: E, key: &BucketKey) -> PartcodeResult<Option<u64>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let (domain, route, routing, type_code) = key.storage_columns();

    let value: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT value FROM sku_counters
        WHERE domain = ? AND route = ? AND routing = ? AND type_code = ?
        "#,
    )
    .bind(domain)
    .bind(route)
    .bind(routing)
    .bind(type_code)
    .fetch_optional(executor)
    .await?;

    value
        .map(|v| {
            u64::try_from(v).map_err(|_| PartcodeError::internal(format!("negative counter for {}", key)))
        })
        .transpose()
}

pub(crate) async fn write_counter<'e, E>(executor: E, key: &BucketKey, value: u64) -> PartcodeResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let (domain, route, routing, type_code) = key.storage_columns();
    let value = i64::try_from(value)
        .map_err(|_| PartcodeError::internal(format!("counter {} out of range for {}", value, key)))?;

    sqlx::query(
        r#"
        INSERT INTO sku_counters (domain, route, routing, type_code, value, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (domain, route, routing, type_code)
        DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(domain)
    .bind(route)
    .bind(routing)
    .bind(type_code)
    .bind(value)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}
