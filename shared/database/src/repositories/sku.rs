//! SKU Repository
//!
//! Reads and writes of issued SKU records.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Sqlite};

use partcode_models::{CatalogStats, CategoryCount, Domain, SkuLayout, SkuRecord};
use partcode_utils::{PartcodeError, PartcodeResult};

use crate::sqlite::SqlitePool;

const RECORD_COLUMNS: &str = "sku, fingerprint, layout, name, description, domain, component_type, \
     route, routing, type_code, sequence, manufacturer, manufacturer_part, quantity, designator, created_at";

#[derive(Clone)]
pub struct SkuRepository {
    pool: SqlitePool,
}

impl SkuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores a new record. An existing SKU or fingerprint is a `StoreWriteConflict`.
    pub async fn create(&self, record: &SkuRecord) -> PartcodeResult<()> {
        insert_record(&self.pool, record).await
    }

    /// Find record by SKU
    pub async fn find_by_sku(&self, sku: &str) -> PartcodeResult<Option<SkuRecord>> {
        let row: Option<SkuRecordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sku_records WHERE sku = ?",
            RECORD_COLUMNS
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SkuRecord::try_from).transpose()
    }

    /// SKU previously issued for `fingerprint`, if any.
    pub async fn find_sku_by_fingerprint(&self, fingerprint: &str) -> PartcodeResult<Option<String>> {
        fingerprint_sku(&self.pool, fingerprint).await
    }

    /// Case-insensitive substring search over SKUs, ordered by SKU.
    pub async fn find_by_pattern(&self, fragment: &str, limit: u32) -> PartcodeResult<Vec<SkuRecord>> {
        let pattern = format!("%{}%", escape_like(&fragment.trim().to_uppercase()));

        let rows: Vec<SkuRecordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sku_records WHERE sku LIKE ? ESCAPE '\\' ORDER BY sku LIMIT ?",
            RECORD_COLUMNS
        ))
        .bind(pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SkuRecord::try_from).collect()
    }

    /// Records of one domain and component type, newest first.
    pub async fn find_by_bucket(
        &self,
        domain: Domain,
        component_type: &str,
        limit: u32,
    ) -> PartcodeResult<Vec<SkuRecord>> {
        let rows: Vec<SkuRecordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sku_records WHERE domain = ? AND component_type = ? \
             ORDER BY rowid DESC LIMIT ?",
            RECORD_COLUMNS
        ))
        .bind(domain.code())
        .bind(component_type.trim())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SkuRecord::try_from).collect()
    }

    pub async fn list_recent(&self, limit: u32) -> PartcodeResult<Vec<SkuRecord>> {
        let rows: Vec<SkuRecordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sku_records ORDER BY rowid DESC LIMIT ?",
            RECORD_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SkuRecord::try_from).collect()
    }

    pub async fn stats(&self) -> PartcodeResult<CatalogStats> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sku_records")
            .fetch_one(&self.pool)
            .await?;

        Ok(CatalogStats {
            total: total.max(0) as u64,
            by_domain: self.count_by("domain").await?,
            by_route: self.count_by("route").await?,
            by_routing: self.count_by("routing").await?,
        })
    }

    async fn count_by(&self, column: &'static str) -> PartcodeResult<Vec<CategoryCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
            "SELECT {column}, COUNT(*) FROM sku_records GROUP BY {column} ORDER BY COUNT(*) DESC, {column}"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(key, count)| CategoryCount {
                key,
                count: count.max(0) as u64,
            })
            .collect())
    }
}

/// Escapes LIKE wildcards so user input only matches literally.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) async fn fingerprint_sku<'e, E>(executor: E, fingerprint: &str) -> PartcodeResult<Option<String>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sku: Option<String> = sqlx::query_scalar("SELECT sku FROM sku_records WHERE fingerprint = ?")
        .bind(fingerprint)
        .fetch_optional(executor)
        .await?;
    Ok(sku)
}

pub(crate) async fn insert_record<'e, E>(executor: E, record: &SkuRecord) -> PartcodeResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sequence = i64::try_from(record.sequence)
        .map_err(|_| PartcodeError::internal(format!("sequence {} out of range", record.sequence)))?;

    sqlx::query(&format!(
        "INSERT INTO sku_records ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        RECORD_COLUMNS
    ))
    .bind(&record.sku)
    .bind(&record.fingerprint)
    .bind(record.layout.as_str())
    .bind(&record.name)
    .bind(&record.description)
    .bind(record.domain.code())
    .bind(&record.component_type)
    .bind(&record.route)
    .bind(&record.routing)
    .bind(&record.type_code)
    .bind(sequence)
    .bind(&record.manufacturer)
    .bind(&record.manufacturer_part)
    .bind(record.quantity)
    .bind(&record.designator)
    .bind(record.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

#[derive(Debug, FromRow)]
struct SkuRecordRow {
    sku: String,
    fingerprint: String,
    layout: String,
    name: String,
    description: String,
    domain: String,
    component_type: String,
    route: String,
    routing: String,
    type_code: String,
    sequence: i64,
    manufacturer: Option<String>,
    manufacturer_part: Option<String>,
    quantity: Option<f64>,
    designator: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SkuRecordRow> for SkuRecord {
    type Error = PartcodeError;

    fn try_from(row: SkuRecordRow) -> Result<Self, Self::Error> {
        let domain: Domain = row
            .domain
            .parse()
            .map_err(|e| PartcodeError::internal(format!("record {}: {}", row.sku, e)))?;
        let layout: SkuLayout = row
            .layout
            .parse()
            .map_err(|e| PartcodeError::internal(format!("record {}: {}", row.sku, e)))?;
        let sequence = u64::try_from(row.sequence)
            .map_err(|_| PartcodeError::internal(format!("record {}: negative sequence", row.sku)))?;

        Ok(Self {
            sku: row.sku,
            fingerprint: row.fingerprint,
            layout,
            name: row.name,
            description: row.description,
            domain,
            component_type: row.component_type,
            route: row.route,
            routing: row.routing,
            type_code: row.type_code,
            sequence,
            manufacturer: row.manufacturer,
            manufacturer_part: row.manufacturer_part,
            quantity: row.quantity,
            designator: row.designator,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialize_database;
    use partcode_utils::DatabaseConfig;

    async fn memory_pool() -> SqlitePool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        initialize_database(&config).await.unwrap()
    }

    fn record(sku: &str, fingerprint: &str, component_type: &str) -> SkuRecord {
        SkuRecord {
            sku: sku.to_string(),
            fingerprint: fingerprint.to_string(),
            layout: SkuLayout::Simplified,
            name: format!("part {}", sku),
            description: "Description non fournie".to_string(),
            domain: Domain::Electrical,
            component_type: component_type.to_string(),
            route: "PWR".to_string(),
            routing: "STD".to_string(),
            type_code: "RESIST".to_string(),
            sequence: 1,
            manufacturer: Some("Vishay".to_string()),
            manufacturer_part: None,
            quantity: Some(2.5),
            designator: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = SkuRepository::new(memory_pool().await);
        let stored = record("ELEC-RESIST-AAAA", "fp-1", "Résistances");
        repo.create(&stored).await.unwrap();

        let found = repo.find_by_sku("ELEC-RESIST-AAAA").await.unwrap().unwrap();
        assert_eq!(found.fingerprint, "fp-1");
        assert_eq!(found.domain, Domain::Electrical);
        assert_eq!(found.quantity, Some(2.5));
        assert_eq!(found.manufacturer_part, None);

        assert_eq!(
            repo.find_sku_by_fingerprint("fp-1").await.unwrap().as_deref(),
            Some("ELEC-RESIST-AAAA")
        );
        assert!(repo.find_by_sku("ELEC-RESIST-AAAB").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_or_fingerprint_conflicts() {
        let repo = SkuRepository::new(memory_pool().await);
        repo.create(&record("ELEC-RESIST-AAAA", "fp-1", "Résistances")).await.unwrap();

        let same_fingerprint = repo.create(&record("ELEC-RESIST-AAAB", "fp-1", "Résistances")).await;
        assert!(matches!(same_fingerprint, Err(PartcodeError::StoreWriteConflict { .. })));

        let same_sku = repo.create(&record("ELEC-RESIST-AAAA", "fp-2", "Résistances")).await;
        assert!(matches!(same_sku, Err(PartcodeError::StoreWriteConflict { .. })));
    }

    #[tokio::test]
    async fn test_pattern_search_is_literal_and_ordered() {
        let repo = SkuRepository::new(memory_pool().await);
        repo.create(&record("ELEC-RESIST-AAAB", "fp-2", "Résistances")).await.unwrap();
        repo.create(&record("ELEC-RESIST-AAAA", "fp-1", "Résistances")).await.unwrap();

        let found = repo.find_by_pattern("resist-aa", 15).await.unwrap();
        let skus: Vec<_> = found.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["ELEC-RESIST-AAAA", "ELEC-RESIST-AAAB"]);

        assert!(repo.find_by_pattern("%", 15).await.unwrap().is_empty());
        assert_eq!(repo.find_by_pattern("RESIST", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bucket_and_recent_are_newest_first() {
        let repo = SkuRepository::new(memory_pool().await);
        repo.create(&record("ELEC-RESIST-AAAA", "fp-1", "Résistances")).await.unwrap();
        repo.create(&record("ELEC-RESIST-AAAB", "fp-2", "Résistances")).await.unwrap();
        repo.create(&record("ELEC-DIODES-AAAA", "fp-3", "Diodes")).await.unwrap();

        let similar = repo
            .find_by_bucket(Domain::Electrical, "Résistances", 20)
            .await
            .unwrap();
        let skus: Vec<_> = similar.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["ELEC-RESIST-AAAB", "ELEC-RESIST-AAAA"]);

        let recent = repo.list_recent(2).await.unwrap();
        assert_eq!(recent[0].sku, "ELEC-DIODES-AAAA");
        assert_eq!(recent.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_group_counts() {
        let repo = SkuRepository::new(memory_pool().await);
        assert_eq!(repo.stats().await.unwrap(), CatalogStats::default());

        repo.create(&record("ELEC-RESIST-AAAA", "fp-1", "Résistances")).await.unwrap();
        let mut meca = record("MECA-VISSER-AAAA", "fp-2", "Boulonnerie");
        meca.domain = Domain::Mechanical;
        meca.route = "MECA".to_string();
        repo.create(&meca).await.unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.count_for_domain(Domain::Mechanical), 1);
        assert_eq!(stats.by_routing, vec![CategoryCount { key: "STD".to_string(), count: 2 }]);
        assert_eq!(stats.by_route.len(), 2);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("A_B%C\\"), "A\\_B\\%C\\\\");
        assert_eq!(escape_like("ELEC"), "ELEC");
    }
}
