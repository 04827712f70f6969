use super::{require_columns, ReferenceTable, TableParseError};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

const LSOA_COLUMN: &str = "lsoa";
const CLASS_COLUMN: &str = "ukruc-3";

/// Three-way UK rural/urban classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rurality {
    Urban,
    Rural,
    MoreRural,
}

impl Rurality {
    pub fn from_code(code: i64) -> Result<Self, RuralityError> {
        match code {
            0 => Ok(Self::Urban),
            1 => Ok(Self::Rural),
            2 => Ok(Self::MoreRural),
            other => Err(RuralityError::UnrecognizedCode(other)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Urban => "Urban",
            Self::Rural => "Rural",
            Self::MoreRural => "More rural",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuralityError {
    #[error("unrecognized UK rural/urban class code {0}")]
    UnrecognizedCode(i64),
}

/// Rural/urban class codes keyed by LSOA.
///
/// Codes are stored raw; translation happens on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuralityTable {
    codes: HashMap<String, i64>,
}

impl RuralityTable {
    /// `Ok(None)` when the LSOA has no classification.
    pub fn lookup(&self, lsoa: &str) -> Result<Option<Rurality>, RuralityError> {
        self.codes
            .get(lsoa)
            .map(|&code| Rurality::from_code(code))
            .transpose()
    }
}

impl ReferenceTable for RuralityTable {
    const FILE_NAME: &'static str = "composite_ruc.csv";

    fn parse<R: Read>(reader: R) -> Result<Self, TableParseError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        require_columns(csv_reader.headers()?, &[LSOA_COLUMN, CLASS_COLUMN])?;

        let mut codes = HashMap::new();
        for record in csv_reader.deserialize::<RuralityRow>() {
            let row = record?;
            if let Some(code) = row.class_code {
                codes.insert(row.lsoa, code);
            }
        }

        Ok(Self { codes })
    }

    fn len(&self) -> usize {
        self.codes.len()
    }
}

#[derive(Debug, Deserialize)]
struct RuralityRow {
    #[serde(rename = "lsoa")]
    lsoa: String,
    #[serde(rename = "ukruc-3")]
    class_code: Option<i64>,
}
