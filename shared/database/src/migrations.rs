use anyhow::Result;

use crate::sqlite::SqlitePool;

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Running SQLite migrations");

    // One row per issued SKU; the fingerprint maps to at most one SKU.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sku_records (
            sku TEXT PRIMARY KEY NOT NULL,
            fingerprint TEXT NOT NULL UNIQUE,
            layout TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            domain TEXT NOT NULL,
            component_type TEXT NOT NULL,
            route TEXT NOT NULL,
            routing TEXT NOT NULL,
            type_code TEXT NOT NULL,
            sequence INTEGER NOT NULL CHECK (sequence >= 1),
            manufacturer TEXT,
            manufacturer_part TEXT,
            quantity REAL,
            designator TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Last issued sequence per bucket. Simplified buckets leave route and routing empty.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sku_counters (
            domain TEXT NOT NULL,
            route TEXT NOT NULL,
            routing TEXT NOT NULL,
            type_code TEXT NOT NULL,
            value INTEGER NOT NULL CHECK (value >= 0),
            updated_at TEXT NOT NULL,
            PRIMARY KEY (domain, route, routing, type_code)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sku_records_bucket ON sku_records(domain, component_type)")
        .execute(pool)
        .await?;

    tracing::info!("SQLite migrations completed successfully");
    Ok(())
}
