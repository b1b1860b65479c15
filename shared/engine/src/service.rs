//! Engine entry point wiring the store, tables, generator and catalog.

use std::sync::Arc;

use partcode_database::SkuStore;
use partcode_models::Component;
use partcode_utils::{AppConfig, EngineConfig, PartcodeResult};

use crate::batch::{run_batch, BatchReport};
use crate::catalog::SkuCatalog;
use crate::decoder::SkuDecoder;
use crate::generator::{AnalysisReport, GenerationOutcome, SkuGenerator};
use crate::tables::ClassificationTables;

#[derive(Clone)]
pub struct SkuEngine {
    store: SkuStore,
    generator: SkuGenerator,
    catalog: SkuCatalog,
}

impl SkuEngine {
    /// Opens the configured database and classification tables.
    pub async fn open(config: &AppConfig) -> PartcodeResult<Self> {
        let tables = ClassificationTables::load_or_standard(config.engine.tables_path.as_deref())?;
        let store = SkuStore::open(&config.database).await?;
        Self::with_store(store, Arc::new(tables), &config.engine)
    }

    pub fn with_store(
        store: SkuStore,
        tables: Arc<ClassificationTables>,
        config: &EngineConfig,
    ) -> PartcodeResult<Self> {
        let generator = SkuGenerator::new(store.clone(), tables.clone(), config)?;
        let decoder = SkuDecoder::new(tables, *generator.codec());
        let catalog = SkuCatalog::new(store.clone(), decoder, config);

        tracing::info!(
            layout = generator.layout().as_str(),
            sequence_width = generator.codec().width(),
            "SKU engine ready"
        );
        Ok(Self {
            store,
            generator,
            catalog,
        })
    }

    pub fn store(&self) -> &SkuStore {
        &self.store
    }

    pub fn generator(&self) -> &SkuGenerator {
        &self.generator
    }

    pub fn catalog(&self) -> &SkuCatalog {
        &self.catalog
    }

    pub async fn generate(&self, component: &Component) -> PartcodeResult<GenerationOutcome> {
        self.generator.generate(component).await
    }

    pub async fn generate_batch(&self, components: &[Component]) -> BatchReport {
        run_batch(&self.generator, components).await
    }

    pub async fn analyze(&self, components: &[Component]) -> PartcodeResult<AnalysisReport> {
        self.generator.analyze(components).await
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
