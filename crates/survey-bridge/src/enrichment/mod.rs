//! Joins geocoder output and category text against the reference tables.

mod form;

pub use form::FormFields;

use crate::geocode::{GeocodeError, GeocodeResult, PostcodeLookup};
use crate::reference::{
    CategoryLabels, ImdDeciles, ReferenceError, ReferenceTables, Rurality, RuralityError,
};
use std::sync::Arc;
use tracing::debug;

/// Field the survey platform uses as an always-present placeholder.
pub const BLANK_VALUE_FIELD: &str = "blank_value";

/// Hard failures that abort an enrichment request.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Rurality(#[from] RuralityError),
    #[error("reference join task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Postcode enrichment returned to the caller.
///
/// `ruc` and `imd` are only attempted when an LSOA was found, `region` only
/// when a council was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedResult {
    pub geocode: GeocodeResult,
    pub ruc: Option<Rurality>,
    pub imd: Option<ImdDeciles>,
    pub region: Option<String>,
}

impl FormFields for EnrichedResult {
    fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let geocode = &self.geocode;
        let mut fields = vec![(BLANK_VALUE_FIELD, "")];

        let codes = [
            ("lsoa", geocode.lsoa.as_deref()),
            ("parl_con", geocode.parl_con.as_deref()),
            ("council", geocode.council.as_deref()),
            ("nation", geocode.nation.map(|nation| nation.label())),
            ("ruc", self.ruc.map(Rurality::label)),
        ];
        fields.extend(
            codes
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value))),
        );

        if let Some(imd) = &self.imd {
            fields.extend(imd.fields());
        }
        if let Some(region) = &self.region {
            fields.push(("region", region.as_str()));
        }
        fields
    }
}

impl FormFields for CategoryLabels {
    fn form_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("cat_a", self.cat_a.as_str()),
            ("cat_b", self.cat_b.as_str()),
            ("cat_c", self.cat_c.as_str()),
        ]
    }
}

/// Joins a geocode result against the rurality, IMD and region tables.
///
/// Table misses resolve to absent or empty fields. Failing to load a table,
/// or finding an unknown rurality code, aborts the join.
pub fn enrich(
    tables: &ReferenceTables,
    geocode: GeocodeResult,
) -> Result<EnrichedResult, EnrichmentError> {
    let mut result = EnrichedResult {
        geocode,
        ..EnrichedResult::default()
    };

    if let Some(lsoa) = result.geocode.lsoa.as_deref() {
        result.ruc = tables.rurality_table()?.lookup(lsoa)?;
        result.imd = Some(tables.imd_table()?.deciles(lsoa));
    }

    if let Some(council) = result.geocode.council.as_deref() {
        let region = tables.region_table()?.region(council).unwrap_or_default();
        result.region = Some(region.to_string());
    }

    Ok(result)
}

/// Exact-match category classification with the unclassified fallback.
pub fn classify(
    tables: &ReferenceTables,
    category: &str,
) -> Result<CategoryLabels, EnrichmentError> {
    Ok(tables.category_table()?.classify(category))
}

/// Entry point for both bridge operations.
///
/// Table joins run on the blocking pool, since a cold table is read and
/// parsed from disk on first use.
#[derive(Debug)]
pub struct EnrichmentService<G> {
    tables: Arc<ReferenceTables>,
    geocoder: G,
}

impl<G> EnrichmentService<G>
where
    G: PostcodeLookup,
{
    pub fn new(tables: Arc<ReferenceTables>, geocoder: G) -> Self {
        Self { tables, geocoder }
    }

    pub async fn postcode(&self, postcode: &str) -> Result<EnrichedResult, EnrichmentError> {
        let geocode = self.geocoder.lookup(postcode).await?;
        debug!(
            %postcode,
            lsoa = geocode.lsoa.as_deref().unwrap_or_default(),
            council = geocode.council.as_deref().unwrap_or_default(),
            "postcode geocoded"
        );
        let tables = Arc::clone(&self.tables);
        tokio::task::spawn_blocking(move || enrich(&tables, geocode)).await?
    }

    pub async fn category(&self, category: &str) -> Result<CategoryLabels, EnrichmentError> {
        let tables = Arc::clone(&self.tables);
        let category = category.to_owned();
        tokio::task::spawn_blocking(move || classify(&tables, &category)).await?
    }
}
