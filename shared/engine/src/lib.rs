//! # Partcode SKU Engine
//!
//! Assigns stable, decodable SKUs to bill-of-materials components.
//!
//! - **codec**: sequence numbers to fixed-width codes over a 28-character alphabet
//! - **tables**, **normalizer**, **classifier**: route, routing and type token
//!   from free text
//! - **optimizer**: removes redundant route/routing information
//! - **fingerprint**: content identity and duplicate lookup
//! - **allocator**: per-bucket counters inside the store's allocation transaction
//! - **generator**, **batch**: single and batch generation
//! - **decoder**, **catalog**: decoding and lookups

pub mod allocator;
pub mod batch;
pub mod catalog;
pub mod classifier;
pub mod codec;
pub mod decoder;
pub mod fingerprint;
pub mod generator;
pub mod normalizer;
pub mod optimizer;
pub mod service;
pub mod tables;

pub use batch::{run_batch, BatchEntry, BatchReport, RecordOutcome};
pub use catalog::{SkuCatalog, SkuDescription};
pub use classifier::{BucketClassifier, Classification};
pub use codec::{AlphabetCodec, CodecError, SKU_ALPHABET};
pub use decoder::{describe_process, CodeLabel, DecodedSku, SequenceSegment, SkuDecoder};
pub use fingerprint::{fingerprint, ContentDeduplicator};
pub use generator::{AnalysisEntry, AnalysisReport, AnalysisStatus, GenerationOutcome, Placement, SkuGenerator};
pub use optimizer::RedundancyOptimizer;
pub use service::SkuEngine;
pub use tables::{ClassificationTables, LabelCode, RedundantPair};
