use super::GeocodeResult;
use crate::nation::Nation;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// MapIt area type for lower layer super output areas.
pub const LSOA_AREA_TYPE: &str = "OLF";
/// MapIt area type for Westminster constituencies.
pub const CONSTITUENCY_AREA_TYPE: &str = "WMC";

pub const AREA_CODE_FIELDS: &[&str] = &["ons", "gss"];
pub const COUNCIL_CODE_FIELDS: &[&str] = &["local-authority-canonical", "gss"];

/// Body of a MapIt `/postcode/{postcode}` response.
///
/// Error bodies (`{"code": 404, "error": "..."}`) deserialize to an empty
/// response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapitResponse {
    #[serde(default)]
    pub areas: HashMap<String, MapitArea>,
    #[serde(default)]
    pub shortcuts: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapitArea {
    #[serde(rename = "type", default)]
    pub area_type: String,
    #[serde(default)]
    pub codes: Map<String, Value>,
}

/// Reference from a shortcut to an entry in `areas`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum AreaRef {
    Number(u64),
    Text(String),
}

impl AreaRef {
    fn key(&self) -> String {
        match self {
            AreaRef::Number(id) => id.to_string(),
            AreaRef::Text(id) => id.clone(),
        }
    }
}

/// The `council` shortcut: a single id, or county and district ids in
/// two-tier areas.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum CouncilShortcut {
    Single(AreaRef),
    TwoTier { district: AreaRef },
}

impl CouncilShortcut {
    fn area(&self) -> &AreaRef {
        match self {
            CouncilShortcut::Single(area) | CouncilShortcut::TwoTier { district: area } => area,
        }
    }
}

/// Returns the first candidate field holding a non-empty string.
pub fn first_present<'a>(fields: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        fields
            .get(*candidate)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    })
}

impl MapitResponse {
    /// Areas in ascending id order.
    pub fn ordered_areas(&self) -> Vec<(&str, &MapitArea)> {
        let mut areas: Vec<(&str, &MapitArea)> = self
            .areas
            .iter()
            .map(|(id, area)| (id.as_str(), area))
            .collect();
        // Length first so unpadded numeric ids sort numerically.
        areas.sort_by(|(left, _), (right, _)| {
            left.len().cmp(&right.len()).then_with(|| left.cmp(right))
        });
        areas
    }

    /// The area the `council` shortcut points at, if both exist.
    pub fn council_area(&self) -> Option<&MapitArea> {
        let raw = self.shortcuts.get("council")?;
        let shortcut = match CouncilShortcut::deserialize(raw) {
            Ok(shortcut) => shortcut,
            Err(err) => {
                debug!(%err, "ignoring unrecognized council shortcut");
                return None;
            }
        };
        self.areas.get(&shortcut.area().key())
    }

    /// Normalizes the response into the fields the join engine consumes.
    ///
    /// For each recognized area type the first area (in id order) with a
    /// usable code wins.
    pub fn to_geocode(&self) -> GeocodeResult {
        let mut result = GeocodeResult::default();

        for (_, area) in self.ordered_areas() {
            let slot = match area.area_type.as_str() {
                LSOA_AREA_TYPE => &mut result.lsoa,
                CONSTITUENCY_AREA_TYPE => &mut result.parl_con,
                _ => continue,
            };
            if slot.is_none() {
                *slot = first_present(&area.codes, AREA_CODE_FIELDS).map(str::to_owned);
            }
        }

        result.council = self
            .council_area()
            .and_then(|area| first_present(&area.codes, COUNCIL_CODE_FIELDS))
            .map(str::to_owned);
        result.nation = result.lsoa.as_deref().and_then(Nation::from_area_code);

        result
    }
}
