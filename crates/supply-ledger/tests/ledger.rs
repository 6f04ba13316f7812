//! End-to-end tests: ledger, chain and both store backends together.

use anyhow::Result;
use supply_ledger::core::{
    block_hash, is_valid_hash_format, Chain, HashFormat, Product, StepPatch, StepRecord,
    TamperKind,
};
use supply_ledger::store::{ChainStore, MemoryStore, SqliteStore};
use supply_ledger::{Ledger, LedgerConfig, LoadOutcome};
use supply_ledger_testkit::fixtures::{simple_step, sweatshirt_journey, ChainBuilder, TestFixture};
use supply_ledger_testkit::vectors::BROWSER_EXPORT_JSON;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn three_block_chain() -> Chain {
    let mut chain = Chain::new();
    chain.create_genesis_block(simple_step("Origin")).unwrap();
    chain.add_block(simple_step("Mill")).unwrap();
    chain.add_block(simple_step("Factory")).unwrap();
    chain
}

#[test]
fn test_genesis_only_chain() {
    let mut chain = Chain::new();
    chain.create_genesis_block(simple_step("Origin")).unwrap();
    assert!(chain.validate_chain().is_valid);
    assert_eq!(chain.len(), 1);
}

#[test]
fn test_empty_chain() {
    let chain = Chain::new();
    let result = chain.validate_chain();
    assert!(!result.is_valid);
    assert_eq!(result.invalid_blocks.len(), 1);
    assert_eq!(result.invalid_blocks[0].index, -1);
    assert_eq!(result.invalid_blocks[0].reason, "Chain is empty");
    assert!(chain.latest_block().is_none());
}

#[test]
fn test_hash_ignores_field_order() {
    let a: StepRecord = serde_json::from_str(
        r#"{"step":"Mill","company":"Co","location":{"name":"X","coordinates":{"lat":1.5,"lng":2.5}},
            "product":{"name":"Yarn","quantity":3,"batchId":"B"},"metadata":{"z":1,"a":2}}"#,
    )
    .unwrap();
    let b: StepRecord = serde_json::from_str(
        r#"{"metadata":{"a":2,"z":1},"product":{"batchId":"B","quantity":3,"name":"Yarn"},
            "location":{"coordinates":{"lng":2.5,"lat":1.5},"name":"X"},"company":"Co","step":"Mill"}"#,
    )
    .unwrap();

    for format in [HashFormat::Sorted, HashFormat::Legacy] {
        assert_eq!(
            block_hash(4, "0", 99, &a, 1, format).unwrap(),
            block_hash(4, "0", 99, &b, 1, format).unwrap()
        );
    }
}

#[test]
fn test_modify_scenario() {
    let mut chain = three_block_chain();
    chain
        .modify_block(
            1,
            StepPatch {
                product: Some(Product::new("Widget", 11.0, "BATCH-TEST-001")),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

    let result = chain.validate_chain();
    assert!(!result.is_valid);
    assert_eq!(result.failures_at(0).count(), 0);
    assert_eq!(result.failures_at(1).count(), 0);
    assert_eq!(result.failures_at(2).count(), 1);

    let tamper = chain.detect_tampering();
    assert_eq!(tamper.tampered_blocks.len(), 1);
    let entry = &tamper.tampered_blocks[0];
    assert_eq!(entry.index, 2);
    assert_eq!(entry.reason, "Previous hash link is broken");
    assert_eq!(entry.expected_hash, chain.blocks()[1].hash);
    assert_eq!(entry.actual_hash, chain.blocks()[2].previous_hash);
}

#[test]
fn test_tamper_scenario() {
    let mut chain = three_block_chain();
    chain.tamper_block(
        1,
        StepPatch {
            product: Some(Product::new("Widget", 11.0, "BATCH-TEST-001")),
            ..Default::default()
        },
    );

    let result = chain.validate_chain();
    assert_eq!(result.failures_at(0).count(), 0);
    let at_one: Vec<_> = result.failures_at(1).collect();
    assert_eq!(at_one.len(), 1);
    assert!(at_one[0].reason.starts_with("Block hash mismatch. Expected: "));

    let tamper = chain.detect_tampering();
    assert_eq!(tamper.tampered_blocks.len(), 1);
    assert_eq!(tamper.tampered_blocks[0].kind(), Some(TamperKind::DataModified));
}

#[test]
fn test_modify_then_tamper_reports_both() {
    // Rehash block 1 after an edit, then alter it again without rehashing.
    let mut chain = three_block_chain();
    chain
        .modify_block(1, StepPatch { step: Some("Edited".into()), ..Default::default() })
        .unwrap();
    chain.tamper_block(1, StepPatch { company: Some("Other".into()), ..Default::default() });

    let result = chain.validate_chain();
    assert_eq!(result.failures_at(1).count(), 1);
    assert_eq!(result.failures_at(2).count(), 1);
}

#[test]
fn test_validation_idempotent() {
    let chain = ChainBuilder::new().journey().build();
    assert_eq!(chain.validate_chain(), chain.validate_chain());
    assert_eq!(chain.detect_tampering(), chain.detect_tampering());
}

#[test]
fn test_export_shape() {
    let chain = ChainBuilder::new().step(simple_step("Mill")).build();
    let json: serde_json::Value = serde_json::from_str(&chain.export_json().unwrap()).unwrap();

    let blocks = json.as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block["index"], i as i64);
        for field in ["previousHash", "timestamp", "data", "hash", "nonce"] {
            assert!(block.get(field).is_some(), "missing {}", field);
        }
        assert!(is_valid_hash_format(block["hash"].as_str().unwrap()));
    }
    assert_eq!(blocks[0]["previousHash"], "0");
}

#[test]
fn test_imported_negative_index_is_reported() {
    let mut records = ChainBuilder::new().step(simple_step("Mill")).build().export_chain();
    records[1].index = -3;

    let mut chain = Chain::new();
    chain.import_chain(records);
    let result = chain.validate_chain();
    let reasons: Vec<_> = result.failures_at(1).map(|f| f.reason.as_str()).collect();
    assert_eq!(reasons, vec!["Index must be non-negative"]);
}

#[tokio::test]
async fn test_ledger_roundtrip_sqlite() -> Result<()> {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ledger.db");

    let exported = {
        let mut ledger = Ledger::new(SqliteStore::open(&path)?, LedgerConfig::default());
        ledger.init_default_genesis()?;
        for step in sweatshirt_journey() {
            ledger.append(step)?;
        }
        ledger.save().await?;
        ledger.chain().export_chain()
    };

    let mut ledger = Ledger::new(SqliteStore::open(&path)?, LedgerConfig::default());
    match ledger.load().await? {
        LoadOutcome::Loaded { report: Some(report) } => assert!(report.is_valid),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(ledger.chain().export_chain(), exported);
    assert_eq!(ledger.chain().len(), 8);
    Ok(())
}

#[tokio::test]
async fn test_ledger_loads_tampered_export() -> Result<()> {
    init_tracing();

    let fixture = TestFixture::new();
    let mut records = ChainBuilder::new().journey().build().export_chain();
    records[3].data.product.quantity = 999.0;
    fixture
        .seed_records("supply-chain-blockchain", HashFormat::Sorted, &records)
        .await?;

    let mut ledger = Ledger::new(fixture.store, LedgerConfig::default());
    let LoadOutcome::Loaded { report: Some(report) } = ledger.load().await? else {
        panic!("expected a validated load");
    };
    assert!(!report.is_valid);
    assert_eq!(report.failures_at(3).count(), 1);

    let tamper = ledger.detect_tampering();
    assert!(tamper.is_tampered);
    assert_eq!(tamper.tampered_blocks[0].index, 3);
    Ok(())
}

#[tokio::test]
async fn test_ledger_without_load_validation() -> Result<()> {
    let store = MemoryStore::new();
    store
        .save_chain("custom", HashFormat::Sorted, &ChainBuilder::new().build().export_chain())
        .await?;

    let config = LedgerConfig {
        storage_key: "custom".into(),
        validate_on_load: false,
        ..Default::default()
    };
    let mut ledger = Ledger::new(store, config);
    assert_eq!(ledger.load().await?, LoadOutcome::Loaded { report: None });
    assert_eq!(ledger.chain().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_legacy_ledger_roundtrip() -> Result<()> {
    let config = LedgerConfig {
        hash_format: HashFormat::Legacy,
        ..Default::default()
    };
    let mut ledger = Ledger::new(MemoryStore::new(), config.clone());
    ledger.init_default_genesis()?;
    ledger.append(simple_step("Mill"))?;
    ledger.save().await?;

    let mut reloaded = Ledger::new(MemoryStore::new(), config);
    let stored = ledger
        .store()
        .load_chain("supply-chain-blockchain")
        .await?
        .expect("chain was saved");
    reloaded
        .store()
        .save_chain("supply-chain-blockchain", stored.hash_format, &stored.blocks)
        .await?;

    match reloaded.load().await? {
        LoadOutcome::Loaded { report: Some(report) } => assert!(report.is_valid),
        other => panic!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_legacy_chain_loads_under_default_config_sqlite() -> Result<()> {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ledger.db");
    let legacy = LedgerConfig {
        hash_format: HashFormat::Legacy,
        ..Default::default()
    };

    {
        let mut ledger = Ledger::new(SqliteStore::open(&path)?, legacy);
        ledger.init_default_genesis()?;
        for step in sweatshirt_journey() {
            ledger.append(step)?;
        }
        ledger.save().await?;
    }

    let mut ledger = Ledger::new(SqliteStore::open(&path)?, LedgerConfig::default());
    match ledger.load().await? {
        LoadOutcome::Loaded { report: Some(report) } => {
            assert!(report.is_valid, "{:?}", report.invalid_blocks)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(ledger.chain().format(), HashFormat::Legacy);
    Ok(())
}

#[tokio::test]
async fn test_browser_local_storage_slot_loads() -> Result<()> {
    // The browser keeps a bare array of blocks under the storage key.
    let store = MemoryStore::new();
    store.insert_raw("supply-chain-blockchain", BROWSER_EXPORT_JSON)?;

    let mut ledger = Ledger::new(store, LedgerConfig::default());
    let LoadOutcome::Loaded { report: Some(report) } = ledger.load().await? else {
        panic!("expected a validated load");
    };
    assert_eq!(ledger.chain().format(), HashFormat::Legacy);
    let indices: Vec<i64> = report.invalid_blocks.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![2]);

    ledger.save().await?;
    let stored = ledger.store().load_chain("supply-chain-blockchain").await?;
    let reexported = serde_json::to_value(stored.expect("chain was saved").blocks)?;
    assert_eq!(reexported, serde_json::from_str::<serde_json::Value>(BROWSER_EXPORT_JSON)?);
    Ok(())
}
