#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use survey_bridge::enrichment::EnrichmentService;
use survey_bridge::geocode::{GeocodeError, GeocodeResult, MapitResponse, PostcodeLookup};
use survey_bridge::reference::ReferenceTables;
use tempfile::TempDir;

pub const IMD_JSON: &str = r#"{
    "E01000001": {"E_d": 9, "UK_d": 8},
    "W01000002": {"W_d": 2},
    "S01008677": {"S_d": 7, "UK_d": 6},
    "95AA01S1": {"N_d": 3, "UK_d": 4}
}"#;

pub const REGION_CSV: &str = "local-authority-code,official-name,nation,region\n\
CMD,London Borough of Camden,England,London\n\
CRF,Cardiff Council,Wales,Wales\n\
EDH,City of Edinburgh Council,Scotland,Scotland\n";

pub const RURALITY_CSV: &str = "lsoa,ukruc-2,ukruc-3\n\
E01000001,0,0\n\
W01000002,1,2\n\
S01008677,0,0\n\
E01099999,1,5\n";

pub const CATEGORY_CSV: &str = "category,cat_a,cat_b,cat_c\n\
Pothole,A,B,C\n\
Flytipping,Environment,Waste,Fly-tipping\n";

/// Reference files for one test, removed when dropped.
pub struct Fixture {
    pub dir: TempDir,
    pub tables: Arc<ReferenceTables>,
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("temp dir");
    write_reference_files(dir.path());
    let tables = Arc::new(ReferenceTables::new(dir.path()));
    Fixture { dir, tables }
}

pub fn write_reference_files(dir: &Path) {
    fs::write(dir.join("imd_lsoa.json"), IMD_JSON).expect("write imd");
    fs::write(dir.join("uk_local_authorities.csv"), REGION_CSV).expect("write regions");
    fs::write(dir.join("composite_ruc.csv"), RURALITY_CSV).expect("write rurality");
    fs::write(dir.join("full_table.csv"), CATEGORY_CSV).expect("write categories");
}

/// Serves a fixed MapIt body for every postcode.
pub struct StaticGeocoder {
    body: Value,
    calls: AtomicUsize,
    postcodes: Mutex<Vec<String>>,
}

impl StaticGeocoder {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            calls: AtomicUsize::new(0),
            postcodes: Mutex::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Postcodes looked up so far, in call order.
    pub fn postcodes(&self) -> Vec<String> {
        self.postcodes.lock().expect("postcodes mutex poisoned").clone()
    }
}

impl PostcodeLookup for StaticGeocoder {
    async fn lookup(&self, postcode: &str) -> Result<GeocodeResult, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.postcodes
            .lock()
            .expect("postcodes mutex poisoned")
            .push(postcode.to_string());
        let response: MapitResponse =
            serde_json::from_value(self.body.clone()).map_err(GeocodeError::Decode)?;
        Ok(response.to_geocode())
    }
}

/// Always fails as if the upstream were down.
pub struct DownGeocoder;

impl PostcodeLookup for DownGeocoder {
    async fn lookup(&self, _postcode: &str) -> Result<GeocodeResult, GeocodeError> {
        Err(GeocodeError::Status { status: 502 })
    }
}

pub fn service<G: PostcodeLookup>(
    tables: &Arc<ReferenceTables>,
    geocoder: G,
) -> Arc<EnrichmentService<G>> {
    Arc::new(EnrichmentService::new(Arc::clone(tables), geocoder))
}
