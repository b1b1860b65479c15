//! Read-side lookup API over issued SKUs.

use serde::{Deserialize, Serialize};

use partcode_database::SkuStore;
use partcode_models::{CatalogStats, Domain, SkuRecord};
use partcode_utils::{EngineConfig, PartcodeError, PartcodeResult};

use crate::decoder::{DecodedSku, SkuDecoder};

/// A stored record together with its decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuDescription {
    pub record: SkuRecord,
    pub decoded: DecodedSku,
    pub process: Option<String>,
}

#[derive(Clone)]
pub struct SkuCatalog {
    store: SkuStore,
    decoder: SkuDecoder,
    partial_search_limit: u32,
    similar_limit: u32,
    recent_limit: u32,
}

impl SkuCatalog {
    pub fn new(store: SkuStore, decoder: SkuDecoder, config: &EngineConfig) -> Self {
        Self {
            store,
            decoder,
            partial_search_limit: config.partial_search_limit,
            similar_limit: config.similar_limit,
            recent_limit: config.recent_limit,
        }
    }

    pub fn decoder(&self) -> &SkuDecoder {
        &self.decoder
    }

    pub async fn search_by_sku(&self, sku: &str) -> PartcodeResult<Option<SkuRecord>> {
        self.store.get_by_sku(&sku.trim().to_uppercase()).await
    }

    pub async fn search_by_partial_sku(&self, fragment: &str) -> PartcodeResult<Vec<SkuRecord>> {
        self.store
            .records()
            .find_by_pattern(fragment, self.partial_search_limit)
            .await
    }

    /// Components of the same domain and type, newest first.
    pub async fn find_similar(&self, domain: &str, component_type: &str) -> PartcodeResult<Vec<SkuRecord>> {
        let domain: Domain = domain
            .parse()
            .map_err(|e: partcode_models::UnknownDomain| {
                PartcodeError::invalid_component("domain", "unknown_domain", e.to_string())
            })?;

        self.store
            .records()
            .find_by_bucket(domain, component_type, self.similar_limit)
            .await
    }

    /// Most recent records; `None` uses the configured default.
    pub async fn list_recent(&self, limit: Option<u32>) -> PartcodeResult<Vec<SkuRecord>> {
        self.store
            .records()
            .list_recent(limit.unwrap_or(self.recent_limit))
            .await
    }

    pub async fn aggregate_stats(&self) -> PartcodeResult<CatalogStats> {
        self.store.records().stats().await
    }

    pub fn decode(&self, sku: &str) -> PartcodeResult<DecodedSku> {
        self.decoder.decode(sku)
    }

    /// Malformed input is `InvalidSkuFormat`; a well-formed SKU that was never
    /// issued is `NotFound`.
    pub async fn describe(&self, sku: &str) -> PartcodeResult<SkuDescription> {
        let decoded = self.decoder.decode(sku)?;
        let record = self
            .search_by_sku(sku)
            .await?
            .ok_or_else(|| PartcodeError::not_found(format!("SKU {}", sku.trim().to_uppercase())))?;

        Ok(SkuDescription {
            process: decoded.process(),
            record,
            decoded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::AlphabetCodec;
    use crate::generator::SkuGenerator;
    use crate::tables::ClassificationTables;
    use partcode_models::{Component, SkuLayout};
    use partcode_utils::DatabaseConfig;
    use std::sync::Arc;

    async fn setup() -> (SkuGenerator, SkuCatalog) {
        let store = SkuStore::open(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        })
        .await
        .unwrap();
        let tables = Arc::new(ClassificationTables::standard());
        let config = EngineConfig {
            partial_search_limit: 2,
            ..EngineConfig::default()
        };

        let generator = SkuGenerator::new(store.clone(), tables.clone(), &config).unwrap();
        let catalog = SkuCatalog::new(store, SkuDecoder::new(tables, AlphabetCodec::default()), &config);
        (generator, catalog)
    }

    fn diode(name: &str) -> Component {
        Component::new(name, Domain::Electrical, "Diodes")
    }

    #[tokio::test]
    async fn test_lookups() {
        let (generator, catalog) = setup().await;
        for name in ["1N4148", "1N4007", "BAT54"] {
            generator.generate(&diode(name)).await.unwrap();
        }

        let found = catalog.search_by_sku(" elec-diodes-aaab ").await.unwrap().unwrap();
        assert_eq!(found.name, "1N4007");

        let partial = catalog.search_by_partial_sku("diodes").await.unwrap();
        assert_eq!(partial.len(), 2);
        assert_eq!(partial[0].sku, "ELEC-DIODES-AAAA");

        let similar = catalog.find_similar("elec", "Diodes").await.unwrap();
        let names: Vec<_> = similar.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["BAT54", "1N4007", "1N4148"]);

        assert_eq!(catalog.list_recent(Some(1)).await.unwrap()[0].name, "BAT54");
        assert_eq!(catalog.list_recent(None).await.unwrap().len(), 3);
        assert_eq!(catalog.aggregate_stats().await.unwrap().total, 3);
    }

    #[tokio::test]
    async fn test_find_similar_rejects_unknown_domain() {
        let (_, catalog) = setup().await;
        let error = catalog.find_similar("HYDR", "Pompes").await.unwrap_err();
        assert_eq!(error.error_code(), "INVALID_COMPONENT");
    }

    #[tokio::test]
    async fn test_describe_distinguishes_malformed_and_missing() {
        let (generator, catalog) = setup().await;
        let outcome = generator.generate(&diode("1N4148")).await.unwrap();

        let description = catalog.describe(&outcome.sku).await.unwrap();
        assert_eq!(description.record.sku, outcome.sku);
        assert_eq!(description.decoded.layout(), SkuLayout::Simplified);
        assert_eq!(description.process, None);

        let missing = catalog.describe("ELEC-DIODES-AAAZ").await.unwrap_err();
        assert_eq!(missing.error_code(), "NOT_FOUND");

        let malformed = catalog.describe("ELEC").await.unwrap_err();
        assert_eq!(malformed.error_code(), "INVALID_SKU_FORMAT");
    }
}
