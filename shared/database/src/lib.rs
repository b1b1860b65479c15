pub mod sqlite;
pub mod migrations;
pub mod repositories;
pub mod store;

pub use sqlite::{SqlitePool, create_sqlite_pool, health_check as sqlite_health_check};
pub use repositories::*;
pub use store::{AllocationTx, SkuStore};

use anyhow::Result;
use partcode_utils::DatabaseConfig;

/// Opens the pool and brings the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool = create_sqlite_pool(config).await?;

    // Run migrations
    migrations::run_sqlite_migrations(&pool).await?;

    Ok(pool)
}
