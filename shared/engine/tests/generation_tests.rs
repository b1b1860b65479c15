//! End-to-end SKU generation against SQLite database files.

use std::collections::HashSet;
use std::path::Path;

use partcode_engine::{RecordOutcome, SkuEngine};
use partcode_models::{BucketKey, Component, Domain, SkuLayout, SKU_SEPARATOR};
use partcode_utils::{AppConfig, DatabaseConfig, EngineConfig, PartcodeError};
use tempfile::TempDir;

async fn open_engine(path: &Path, engine: EngineConfig) -> SkuEngine {
    let config = AppConfig {
        database: DatabaseConfig::for_path(path),
        engine,
        ..AppConfig::default()
    };
    SkuEngine::open(&config).await.unwrap()
}

async fn default_engine(dir: &TempDir) -> SkuEngine {
    open_engine(&dir.path().join("catalog.db"), EngineConfig::default()).await
}

fn resistor() -> Component {
    Component::new("Résistance 100Ω", Domain::Electrical, "Résistances")
}

fn resist_bucket() -> BucketKey {
    BucketKey::Simplified {
        domain: Domain::Electrical,
        type_code: "RESIST".to_string(),
    }
}

#[tokio::test]
async fn test_same_content_same_sku_counter_unchanged() {
    let dir = TempDir::new().unwrap();
    let engine = default_engine(&dir).await;

    let first = engine.generate(&resistor()).await.unwrap();
    assert_eq!(first.sku, "ELEC-RESIST-AAAA");
    assert!(!first.reused);
    assert_eq!(engine.store().counter(&resist_bucket()).await.unwrap(), 1);

    let second = engine.generate(&resistor()).await.unwrap();
    assert_eq!(second.sku, first.sku);
    assert!(second.reused);
    assert_eq!(engine.store().counter(&resist_bucket()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_distinct_components_get_gap_free_sequences() {
    let dir = TempDir::new().unwrap();
    let engine = default_engine(&dir).await;

    let mut sequences = Vec::new();
    for value in 1..=10 {
        let component = Component::new(format!("Résistance {}k", value), Domain::Electrical, "Résistances");
        sequences.push(engine.generate(&component).await.unwrap().record.sequence);
    }

    assert_eq!(sequences, (1..=10).collect::<Vec<u64>>());
    assert_eq!(engine.store().counter(&resist_bucket()).await.unwrap(), 10);
}

#[tokio::test]
async fn test_screws_differ_only_in_sequence() {
    let dir = TempDir::new().unwrap();
    let engine = default_engine(&dir).await;

    let first = Component::new("Vis M6x20", Domain::Mechanical, "Boulonnerie").with_manufacturer("Bossard", "BN 610");
    let second = Component::new("Vis M6x20", Domain::Mechanical, "Boulonnerie").with_manufacturer("Bossard", "BN 611");

    let a = engine.generate(&first).await.unwrap().sku;
    let b = engine.generate(&second).await.unwrap().sku;

    let a_parts: Vec<&str> = a.split(SKU_SEPARATOR).collect();
    let b_parts: Vec<&str> = b.split(SKU_SEPARATOR).collect();
    assert_eq!(a_parts[..2], b_parts[..2]);
    assert_ne!(a_parts[2], b_parts[2]);

    let decode = |sku: &str| engine.catalog().decode(sku).unwrap().sequence().value.unwrap();
    assert!(decode(&b) > decode(&a));
}

#[tokio::test]
async fn test_two_part_sku_is_invalid_format() {
    let dir = TempDir::new().unwrap();
    let engine = default_engine(&dir).await;

    let error = engine.catalog().decode("ELEC-RESIST").unwrap_err();
    assert!(matches!(error, PartcodeError::InvalidSkuFormat { parts: 2, .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_generation_in_one_bucket() {
    let dir = TempDir::new().unwrap();
    let engine = default_engine(&dir).await;

    let mut handles = Vec::new();
    for index in 0..50 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let component = Component::new(format!("Diode D{}", index), Domain::Electrical, "Diodes");
            engine.generate(&component).await
        }));
    }

    let mut skus = HashSet::new();
    let mut sequences = Vec::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(!outcome.reused);
        sequences.push(outcome.record.sequence);
        skus.insert(outcome.sku);
    }

    sequences.sort_unstable();
    assert_eq!(sequences, (1..=50).collect::<Vec<u64>>());
    assert_eq!(skus.len(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicates_share_one_sku() {
    let dir = TempDir::new().unwrap();
    let engine = default_engine(&dir).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.generate(&resistor()).await }));
    }

    let mut skus = HashSet::new();
    for handle in handles {
        skus.insert(handle.await.unwrap().unwrap().sku);
    }

    assert_eq!(skus.len(), 1);
    assert_eq!(engine.store().counter(&resist_bucket()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_counters_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.db");

    let engine = open_engine(&path, EngineConfig::default()).await;
    for name in ["BAV99", "1N4148"] {
        engine
            .generate(&Component::new(name, Domain::Electrical, "Diodes"))
            .await
            .unwrap();
    }
    engine.close().await;

    let reopened = open_engine(&path, EngineConfig::default()).await;
    let outcome = reopened
        .generate(&Component::new("BAT54", Domain::Electrical, "Diodes"))
        .await
        .unwrap();
    assert_eq!(outcome.sku, "ELEC-DIODES-AAAC");

    let again = reopened
        .generate(&Component::new("BAV99", Domain::Electrical, "Diodes"))
        .await
        .unwrap();
    assert!(again.reused);
    assert_eq!(again.sku, "ELEC-DIODES-AAAA");
}

#[tokio::test]
async fn test_exhausted_bucket_rejects_without_advancing() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(
        &dir.path().join("narrow.db"),
        EngineConfig {
            sequence_width: 1,
            ..EngineConfig::default()
        },
    )
    .await;

    for index in 0..28 {
        let component = Component::new(format!("Résistance R{}", index), Domain::Electrical, "Résistances");
        engine.generate(&component).await.unwrap();
    }

    let overflow = Component::new("Résistance R28", Domain::Electrical, "Résistances");
    let error = engine.generate(&overflow).await.unwrap_err();
    assert!(matches!(error, PartcodeError::SequenceExhausted { capacity: 28, .. }));

    assert_eq!(engine.store().counter(&resist_bucket()).await.unwrap(), 28);
    assert_eq!(engine.catalog().aggregate_stats().await.unwrap().total, 28);
    assert_eq!(engine.generator().analyze(&[overflow]).await.unwrap().new, 1);
}

#[tokio::test]
async fn test_legacy_layout_end_to_end() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(
        &dir.path().join("legacy.db"),
        EngineConfig {
            layout: SkuLayout::Legacy,
            ..EngineConfig::default()
        },
    )
    .await;

    let sheet = Component::new("Équerre 40x40", Domain::Mechanical, "Pièces pliées");
    let outcome = engine.generate(&sheet).await.unwrap();
    assert_eq!(outcome.sku, "MECA-STD-BEND-PLIAGE-AAAA");

    let description = engine.catalog().describe(&outcome.sku).await.unwrap();
    assert_eq!(description.process.as_deref(), Some("Processus mécanique (STD → BEND)"));
    assert_eq!(description.record.name, "Équerre 40x40");
}

#[tokio::test]
async fn test_batch_continues_past_invalid_records() {
    let dir = TempDir::new().unwrap();
    let engine = default_engine(&dir).await;

    let components = vec![
        resistor(),
        Component::new("nan", Domain::Electrical, "Résistances"),
        Component {
            domain: "HYDR".to_string(),
            ..Component::new("Pompe", Domain::Mechanical, "Pompes")
        },
        resistor(),
        Component::new("Condensateur 10µF", Domain::Electrical, "Condensateurs"),
    ];

    let report = engine.generate_batch(&components).await;

    assert_eq!(report.total(), 5);
    assert_eq!((report.generated, report.reused, report.rejected, report.failed), (2, 1, 2, 0));
    assert_eq!(report.entries[0].outcome.sku(), Some("ELEC-RESIST-AAAA"));
    assert_eq!(report.entries[3].outcome, RecordOutcome::Reused { sku: "ELEC-RESIST-AAAA".to_string() });
    assert_eq!(report.entries[4].outcome.sku(), Some("ELEC-CONDEN-AAAA"));

    match &report.entries[2].outcome {
        RecordOutcome::Rejected { error } => assert_eq!(
            error.details,
            Some(serde_json::json!({ "field": "domain", "rule": "unknown_domain" }))
        ),
        other => panic!("unexpected outcome: {other:?}"),
    }
}
