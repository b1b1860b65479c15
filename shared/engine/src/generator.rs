//! SKU generation.
//!
//! A component is validated, classified, optimized and fingerprinted without
//! touching the store. A fingerprint already on record returns the SKU issued
//! for it. Otherwise the fingerprint re-check, the counter increment and the
//! record insert run in one allocation transaction.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use partcode_database::SkuStore;
use partcode_models::{BucketKey, Component, Domain, SkuLayout, SkuRecord};
use partcode_utils::{validate_model, EngineConfig, ErrorResponse, PartcodeError, PartcodeResult};

use crate::allocator::SequenceAllocator;
use crate::classifier::{BucketClassifier, Classification};
use crate::codec::AlphabetCodec;
use crate::fingerprint::{fingerprint, ContentDeduplicator};
use crate::optimizer::RedundancyOptimizer;
use crate::tables::ClassificationTables;

/// Order in which invalid fields are reported.
const FIELD_ORDER: &[&str] = &["name", "domain", "component_type"];

/// Where a component lands, computed without any store access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub domain: Domain,
    /// Classification after redundancy optimization.
    pub classification: Classification,
    pub bucket: BucketKey,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub sku: String,
    /// True when the SKU was issued earlier for the same content.
    pub reused: bool,
    pub record: SkuRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisStatus {
    New { bucket: String },
    Existing { sku: String },
    Invalid { error: ErrorResponse },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub index: usize,
    pub name: String,
    #[serde(flatten)]
    pub status: AnalysisStatus,
}

/// New-versus-existing breakdown of a component list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total: usize,
    pub new: usize,
    pub existing: usize,
    pub invalid: usize,
    pub entries: Vec<AnalysisEntry>,
}

#[derive(Clone)]
pub struct SkuGenerator {
    store: SkuStore,
    classifier: BucketClassifier,
    optimizer: RedundancyOptimizer,
    deduplicator: ContentDeduplicator,
    allocator: SequenceAllocator,
    codec: AlphabetCodec,
    layout: SkuLayout,
}

impl SkuGenerator {
    pub fn new(store: SkuStore, tables: Arc<ClassificationTables>, config: &EngineConfig) -> PartcodeResult<Self> {
        let codec = AlphabetCodec::new(config.sequence_width)?;

        Ok(Self {
            classifier: BucketClassifier::new(tables.clone()),
            optimizer: RedundancyOptimizer::new(tables),
            deduplicator: ContentDeduplicator::new(store.clone()),
            allocator: SequenceAllocator::new(&codec),
            store,
            codec,
            layout: config.layout,
        })
    }

    pub fn codec(&self) -> &AlphabetCodec {
        &self.codec
    }

    pub fn layout(&self) -> SkuLayout {
        self.layout
    }

    /// Validates and classifies `component`.
    pub fn place(&self, component: &Component) -> PartcodeResult<Placement> {
        let (cleaned, domain) = validated(component)?;
        Ok(self.place_cleaned(&cleaned, domain))
    }

    fn place_cleaned(&self, cleaned: &Component, domain: Domain) -> Placement {
        let raw = self.classifier.classify(domain, &cleaned.component_type);
        let classification = self.optimizer.optimize_classification(&raw);

        let bucket = match self.layout {
            SkuLayout::Legacy => BucketKey::Legacy {
                domain,
                route: classification.route.clone(),
                routing: classification.routing.clone(),
                type_code: classification.type_code.clone(),
            },
            SkuLayout::Simplified => BucketKey::Simplified {
                domain,
                type_code: classification.type_code.clone(),
            },
        };

        Placement {
            domain,
            classification,
            bucket,
            fingerprint: fingerprint(cleaned),
        }
    }

    pub async fn generate(&self, component: &Component) -> PartcodeResult<GenerationOutcome> {
        let (cleaned, domain) = validated(component)?;
        let placement = self.place_cleaned(&cleaned, domain);

        if let Some(sku) = self.deduplicator.find_by_fingerprint(&placement.fingerprint).await? {
            return self.reuse(sku).await;
        }

        let mut tx = self.store.begin_allocation().await?;

        // Another writer may have stored the same content since the lookup.
        if let Some(sku) = tx.fingerprint_sku(&placement.fingerprint).await? {
            drop(tx);
            return self.reuse(sku).await;
        }

        let sequence = self.allocator.next_sequence(&mut tx, &placement.bucket).await?;
        let sku = placement.bucket.render(&self.codec.encode(sequence)?);
        let record = build_record(&cleaned, &placement, &sku, sequence, self.layout);

        tx.insert_record(&record).await?;
        tx.commit().await?;

        tracing::info!(sku = %sku, bucket = %placement.bucket, sequence, "Generated new SKU");
        Ok(GenerationOutcome {
            sku,
            reused: false,
            record,
        })
    }

    async fn reuse(&self, sku: String) -> PartcodeResult<GenerationOutcome> {
        let record = self
            .store
            .get_by_sku(&sku)
            .await?
            .ok_or_else(|| PartcodeError::internal(format!("fingerprint points at missing SKU {}", sku)))?;

        tracing::debug!(sku = %sku, "Reused existing SKU");
        Ok(GenerationOutcome {
            sku,
            reused: true,
            record,
        })
    }

    /// Sorts `components` into new, existing and invalid without writing.
    pub async fn analyze(&self, components: &[Component]) -> PartcodeResult<AnalysisReport> {
        let mut report = AnalysisReport {
            total: components.len(),
            ..AnalysisReport::default()
        };

        for (index, component) in components.iter().enumerate() {
            let status = match self.place(component) {
                Err(error) if error.is_rejection() => {
                    report.invalid += 1;
                    AnalysisStatus::Invalid {
                        error: ErrorResponse::from(error),
                    }
                }
                Err(error) => return Err(error),
                Ok(placement) => match self.deduplicator.find_by_fingerprint(&placement.fingerprint).await? {
                    Some(sku) => {
                        report.existing += 1;
                        AnalysisStatus::Existing { sku }
                    }
                    None => {
                        report.new += 1;
                        AnalysisStatus::New {
                            bucket: placement.bucket.to_string(),
                        }
                    }
                },
            };

            report.entries.push(AnalysisEntry {
                index,
                name: component.name.trim().to_string(),
                status,
            });
        }

        tracing::info!(
            total = report.total,
            new = report.new,
            existing = report.existing,
            invalid = report.invalid,
            "Analyzed components"
        );
        Ok(report)
    }
}

/// Cleaned copy of a valid component, with its parsed domain.
fn validated(component: &Component) -> PartcodeResult<(Component, Domain)> {
    if let Err(error) = validate_model(component, FIELD_ORDER) {
        if let PartcodeError::InvalidComponent { field, rule, .. } = &error {
            tracing::warn!(name = %component.name, field = %field, rule = %rule, "Rejected component");
        }
        return Err(error);
    }

    let cleaned = component.cleaned();
    let domain = cleaned
        .parsed_domain()
        .map_err(|e| PartcodeError::invalid_component("domain", "unknown_domain", e.to_string()))?;
    Ok((cleaned, domain))
}

fn build_record(
    cleaned: &Component,
    placement: &Placement,
    sku: &str,
    sequence: u64,
    layout: SkuLayout,
) -> SkuRecord {
    SkuRecord {
        sku: sku.to_string(),
        fingerprint: placement.fingerprint.clone(),
        layout,
        name: cleaned.name.clone(),
        description: cleaned.effective_description().to_string(),
        domain: placement.domain,
        component_type: cleaned.component_type.clone(),
        route: placement.classification.route.clone(),
        routing: placement.classification.routing.clone(),
        type_code: placement.classification.type_code.clone(),
        sequence,
        manufacturer: cleaned.manufacturer.clone(),
        manufacturer_part: cleaned.manufacturer_part.clone(),
        quantity: cleaned.quantity,
        designator: cleaned.designator.clone(),
        created_at: Utc::now(),
    }
}
