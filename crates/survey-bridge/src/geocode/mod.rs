mod client;
mod response;

pub use client::MapitClient;
pub use response::{
    first_present, MapitArea, MapitResponse, AREA_CODE_FIELDS, CONSTITUENCY_AREA_TYPE,
    COUNCIL_CODE_FIELDS, LSOA_AREA_TYPE,
};

use crate::nation::Nation;
use std::future::Future;
use std::time::Duration;

/// Geographic codes resolved for a single postcode.
///
/// Every field is optional: absence means the postcode service could not
/// place the postcode in that geography.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodeResult {
    pub lsoa: Option<String>,
    pub parl_con: Option<String>,
    pub council: Option<String>,
    pub nation: Option<Nation>,
}

impl GeocodeResult {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The postcode service could not be used for this request.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("postcode service request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("postcode service did not respond within {0:?}")]
    Timeout(Duration),
    #[error("postcode service returned HTTP {status}")]
    Status { status: u16 },
    #[error("postcode service returned an unreadable body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("postcode service URL {0} cannot take a path")]
    InvalidBaseUrl(String),
}

/// Resolves a postcode to the geographies the join engine consumes.
pub trait PostcodeLookup: Send + Sync {
    fn lookup(
        &self,
        postcode: &str,
    ) -> impl Future<Output = Result<GeocodeResult, GeocodeError>> + Send;
}
