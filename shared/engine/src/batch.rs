//! Batch generation with per-record outcomes.
//!
//! A rejected or failed component never stops the batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use partcode_models::Component;
use partcode_utils::ErrorResponse;

use crate::generator::SkuGenerator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Generated { sku: String },
    Reused { sku: String },
    /// The component itself is invalid.
    Rejected { error: ErrorResponse },
    /// The component was valid but could not be stored.
    Failed { error: ErrorResponse },
}

impl RecordOutcome {
    pub fn sku(&self) -> Option<&str> {
        match self {
            Self::Generated { sku } | Self::Reused { sku } => Some(sku),
            Self::Rejected { .. } | Self::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub index: usize,
    pub name: String,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub generated: usize,
    pub reused: usize,
    pub rejected: usize,
    pub failed: usize,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            batch_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            generated: 0,
            reused: 0,
            rejected: 0,
            failed: 0,
            entries: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    fn record(&mut self, index: usize, name: &str, outcome: RecordOutcome) {
        match &outcome {
            RecordOutcome::Generated { .. } => self.generated += 1,
            RecordOutcome::Reused { .. } => self.reused += 1,
            RecordOutcome::Rejected { .. } => self.rejected += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
        self.entries.push(BatchEntry {
            index,
            name: name.trim().to_string(),
            outcome,
        });
    }
}

/// Generates SKUs for `components` in order.
pub async fn run_batch(generator: &SkuGenerator, components: &[Component]) -> BatchReport {
    let mut report = BatchReport::start();
    tracing::info!(batch_id = %report.batch_id, size = components.len(), "Starting SKU batch");

    for (index, component) in components.iter().enumerate() {
        let outcome = match generator.generate(component).await {
            Ok(generated) if generated.reused => RecordOutcome::Reused { sku: generated.sku },
            Ok(generated) => RecordOutcome::Generated { sku: generated.sku },
            Err(error) if error.is_rejection() => RecordOutcome::Rejected {
                error: ErrorResponse::from(error),
            },
            Err(error) => {
                tracing::error!(
                    batch_id = %report.batch_id,
                    index,
                    name = %component.name,
                    error = %error,
                    "Failed to generate SKU"
                );
                RecordOutcome::Failed {
                    error: ErrorResponse::from(error),
                }
            }
        };
        report.record(index, &component.name, outcome);
    }

    report.finished_at = Utc::now();
    tracing::info!(
        batch_id = %report.batch_id,
        generated = report.generated,
        reused = report.reused,
        rejected = report.rejected,
        failed = report.failed,
        "Finished SKU batch"
    );
    report
}
