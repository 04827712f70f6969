use super::{ReferenceTable, TableParseError};
use crate::nation::Nation;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{BufReader, Read};

/// Deprivation deciles published for one LSOA.
///
/// Values keep the textual form they had in the source file so the survey
/// receives exactly what mySociety publishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImdRecord {
    #[serde(rename = "E_d", default, deserialize_with = "decile_text")]
    pub england: Option<String>,
    #[serde(rename = "S_d", default, deserialize_with = "decile_text")]
    pub scotland: Option<String>,
    #[serde(rename = "W_d", default, deserialize_with = "decile_text")]
    pub wales: Option<String>,
    #[serde(rename = "N_d", default, deserialize_with = "decile_text")]
    pub northern_ireland: Option<String>,
    #[serde(rename = "UK_d", default, deserialize_with = "decile_text")]
    pub uk: Option<String>,
}

impl ImdRecord {
    pub fn nation(&self, nation: Nation) -> Option<&str> {
        let value = match nation {
            Nation::England => &self.england,
            Nation::Scotland => &self.scotland,
            Nation::Wales => &self.wales,
            Nation::NorthernIreland => &self.northern_ireland,
        };
        value.as_deref()
    }
}

/// IMD lookup keyed by LSOA code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImdTable {
    records: HashMap<String, ImdRecord>,
}

impl ImdTable {
    pub fn get(&self, lsoa: &str) -> Option<&ImdRecord> {
        self.records.get(lsoa)
    }

    /// Expands the record for `lsoa` into the decile fields returned to callers.
    ///
    /// Nation deciles are left out when the source has none; the UK decile
    /// falls back to an empty string. An unknown LSOA expands like an empty
    /// record.
    pub fn deciles(&self, lsoa: &str) -> ImdDeciles {
        let record = self.get(lsoa);
        let decile = |nation: Nation| {
            record
                .and_then(|record| record.nation(nation))
                .map(str::to_owned)
        };

        ImdDeciles {
            england: decile(Nation::England),
            scotland: decile(Nation::Scotland),
            wales: decile(Nation::Wales),
            northern_ireland: decile(Nation::NorthernIreland),
            uk: record
                .and_then(|record| record.uk.clone())
                .unwrap_or_default(),
        }
    }
}

impl ReferenceTable for ImdTable {
    const FILE_NAME: &'static str = "imd_lsoa.json";

    fn parse<R: Read>(reader: R) -> Result<Self, TableParseError> {
        let records: HashMap<String, ImdRecord> = serde_json::from_reader(BufReader::new(reader))?;
        Ok(Self { records })
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Decile fields for one enriched postcode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImdDeciles {
    pub england: Option<String>,
    pub scotland: Option<String>,
    pub wales: Option<String>,
    pub northern_ireland: Option<String>,
    pub uk: String,
}

impl ImdDeciles {
    pub fn nation(&self, nation: Nation) -> Option<&str> {
        let value = match nation {
            Nation::England => &self.england,
            Nation::Scotland => &self.scotland,
            Nation::Wales => &self.wales,
            Nation::NorthernIreland => &self.northern_ireland,
        };
        value.as_deref()
    }

    /// Field/value pairs in output order, skipping absent nation deciles.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields: Vec<(&'static str, &str)> = Nation::DECILE_ORDER
            .iter()
            .filter_map(|&nation| {
                self.nation(nation)
                    .map(|value| (nation.decile_field(), value))
            })
            .collect();
        fields.push(("UK_IMD_decile", self.uk.as_str()));
        fields
    }
}

fn decile_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Err(D::Error::custom(format!(
            "expected a decile number, found {other}"
        ))),
    }
}
