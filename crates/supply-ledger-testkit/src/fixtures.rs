//! Test fixtures and helpers.
//!
//! Sample step records and deterministic chain construction for tests and
//! benchmarks.

use serde_json::{Map, Value};
use supply_ledger_core::{
    AddedBy, BlockRecord, Certification, Chain, DocumentRef, HashFormat, Location, Product,
    StepRecord, Transport,
};
use supply_ledger_store::{ChainStore, MemoryStore, StoreError};

/// Timestamp the deterministic builder starts from (2025-01-14T16:00:00Z).
pub const FIXTURE_EPOCH_MS: i64 = 1_736_870_400_000;

/// A minimal step record.
pub fn simple_step(name: &str) -> StepRecord {
    StepRecord::new(
        name,
        "Test Co.",
        Location::new("Warehouse 7"),
        Product::new("Widget", 10.0, "BATCH-TEST-001"),
    )
}

const BATCH: &str = "BATCH-2024-001";
const PRODUCT: &str = "Organic Sweatshirt";

fn journey_step(
    step: &str,
    company: &str,
    (place, lat, lng): (&str, f64, f64),
    description: &str,
) -> StepRecord {
    let mut product = Product::new(PRODUCT, 1000.0, BATCH);
    product.description = Some(description.to_string());
    StepRecord::new(step, company, Location::at(place, lat, lng), product)
}

fn transport(vehicle_id: &str, route: &str, carrier: &str) -> Option<Transport> {
    Some(Transport {
        vehicle_id: Some(vehicle_id.into()),
        route: Some(route.into()),
        carrier: Some(carrier.into()),
        extra: Map::new(),
    })
}

fn document(kind: &str, document_id: &str) -> DocumentRef {
    DocumentRef {
        kind: kind.into(),
        document_hash: supply_ledger_core::digest(document_id.as_bytes()),
        document_id: document_id.into(),
        url: None,
        extra: Map::new(),
    }
}

fn certification(kind: &str, issuer: &str, id: &str, valid_until: &str) -> Certification {
    Certification {
        kind: kind.into(),
        issuer: issuer.into(),
        certificate_id: id.into(),
        valid_until: Some(valid_until.into()),
        extra: Map::new(),
    }
}

fn added_by(employee_id: &str, name: &str, role: &str, timestamp: i64) -> Option<AddedBy> {
    Some(AddedBy {
        employee_id: employee_id.into(),
        employee_name: name.into(),
        employee_role: role.into(),
        timestamp,
        extra: Map::new(),
    })
}

/// A seven-step journey of one garment batch, farm to shop floor.
pub fn sweatshirt_journey() -> Vec<StepRecord> {
    let mut farm = journey_step(
        "Cotton Farm",
        "Organic Cotton Farm Co.",
        ("Texas, USA", 31.9686, -99.9018),
        "Organic cotton harvest",
    );
    farm.certifications = Some(vec![certification(
        "ORGANIC",
        "USDA Organic",
        "USDA-ORG-2024-12345",
        "2025-12-31",
    )]);
    farm.documents = Some(vec![document("CERTIFICATE", "CERT-001")]);
    farm.added_by = added_by("EMP001", "Sarah Johnson", "farm_manager", 1_705_307_400_000);

    let mut processing = journey_step(
        "Cotton Processing",
        "Textile Processing Inc.",
        ("North Carolina, USA", 35.2271, -80.8431),
        "Cotton ginning and cleaning",
    );
    processing.transport = transport("TRUCK-789", "Texas → North Carolina", "Green Logistics LLC");
    processing.documents = Some(vec![
        document("INVOICE", "INV-001"),
        document("SHIPPING_MANIFEST", "SHIP-001"),
    ]);
    processing.added_by = added_by("EMP002", "Michael Chen", "textile_manager", 1_705_745_700_000);

    let mut weaving = journey_step(
        "Textile Manufacturing",
        "Fabric Weavers Ltd.",
        ("Georgia, USA", 33.749, -84.388),
        "Cotton yarn spinning and fabric weaving",
    );
    weaving.transport = transport("TRUCK-790", "North Carolina → Georgia", "Green Logistics LLC");
    weaving.certifications = Some(vec![certification(
        "CO2_NEUTRAL",
        "Carbon Trust",
        "CT-CO2-2024-67890",
        "2025-06-30",
    )]);
    weaving.documents = Some(vec![
        document("INVOICE", "INV-002"),
        document("QUALITY_REPORT", "QUAL-001"),
    ]);

    let mut garment = journey_step(
        "Garment Manufacturing",
        "Coastal Garment Works",
        ("Porto, Portugal", 41.1579, -8.6291),
        "Cutting, sewing, and assembly",
    );
    garment.transport = transport(
        "SHIP-ATLANTIC-001",
        "Georgia → Portugal (via Atlantic)",
        "Ocean Freight International",
    );
    garment.documents = Some(vec![document("INVOICE", "INV-003")]);

    let mut inspection = journey_step(
        "Quality Control",
        "Coastal Garment Works QA",
        ("Porto, Portugal", 41.1579, -8.6291),
        "Quality inspection and testing",
    );
    inspection.documents = Some(vec![document("QUALITY_REPORT", "QUAL-002")]);
    let mut results = Map::new();
    results.insert("sampleSize".into(), Value::from(50));
    results.insert("defects".into(), Value::from(0));
    results.insert("passed".into(), Value::Bool(true));
    inspection.metadata = Some(results);

    let mut distribution = journey_step(
        "Distribution Center",
        "Iberian Distribution Hub",
        ("Madrid, Spain", 40.4168, -3.7038),
        "Warehousing and distribution preparation",
    );
    distribution.transport = transport("TRUCK-ESP-456", "Porto → Madrid", "Iberian Logistics");

    let mut retail = journey_step(
        "Retail Store",
        "Barcelona Flagship Store",
        ("Barcelona, Spain", 41.3851, 2.1734),
        "Final retail destination",
    );
    retail.transport = transport("TRUCK-ESP-457", "Madrid → Barcelona", "Iberian Logistics");

    vec![farm, processing, weaving, garment, inspection, distribution, retail]
}

/// Builds chains with fixed timestamps so that hashes are reproducible.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    format: HashFormat,
    start_ms: i64,
    interval_ms: i64,
    genesis_nonce: u64,
    steps: Vec<StepRecord>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            format: HashFormat::default(),
            start_ms: FIXTURE_EPOCH_MS,
            interval_ms: 60_000,
            genesis_nonce: 0,
            steps: Vec::new(),
        }
    }

    pub fn format(mut self, format: HashFormat) -> Self {
        self.format = format;
        self
    }

    /// Genesis timestamp; block `i` is stamped `start + i * interval`.
    pub fn starting_at(mut self, start_ms: i64, interval_ms: i64) -> Self {
        self.start_ms = start_ms;
        self.interval_ms = interval_ms;
        self
    }

    pub fn genesis_nonce(mut self, nonce: u64) -> Self {
        self.genesis_nonce = nonce;
        self
    }

    pub fn step(mut self, record: StepRecord) -> Self {
        self.steps.push(record);
        self
    }

    pub fn steps(mut self, records: impl IntoIterator<Item = StepRecord>) -> Self {
        self.steps.extend(records);
        self
    }

    /// Append the sample garment journey.
    pub fn journey(self) -> Self {
        self.steps(sweatshirt_journey())
    }

    /// Build the chain: the origin record as genesis, then every step.
    ///
    /// # Panics
    ///
    /// Panics if a step holds a non-finite number.
    pub fn build(self) -> Chain {
        let mut chain = Chain::with_format(self.format);
        chain
            .create_genesis_block_at(StepRecord::origin(self.start_ms), self.start_ms, self.genesis_nonce)
            .expect("origin record hashes");

        for (i, record) in self.steps.into_iter().enumerate() {
            let timestamp = self.start_ms + (i as i64 + 1) * self.interval_ms;
            chain
                .add_block_at(record, timestamp)
                .expect("fixture step hashes");
        }
        chain
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A memory store plus helpers for seeding it.
pub struct TestFixture {
    pub store: MemoryStore,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    /// Save `chain` under `key`.
    pub async fn seed(&self, key: &str, chain: &Chain) -> Result<(), StoreError> {
        self.store
            .save_chain(key, chain.format(), &chain.export_chain())
            .await
    }

    /// Save raw records hashed under `format`, e.g. a hand-edited export.
    pub async fn seed_records(
        &self,
        key: &str,
        format: HashFormat,
        records: &[BlockRecord],
    ) -> Result<(), StoreError> {
        self.store.save_chain(key, format, records).await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
