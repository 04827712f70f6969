use super::{require_columns, ReferenceTable, TableParseError};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

const CODE_COLUMN: &str = "local-authority-code";
const REGION_COLUMN: &str = "region";

/// Region names keyed by local authority code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    regions: HashMap<String, String>,
}

impl RegionTable {
    pub fn region(&self, council: &str) -> Option<&str> {
        self.regions.get(council).map(String::as_str)
    }
}

impl ReferenceTable for RegionTable {
    const FILE_NAME: &'static str = "uk_local_authorities.csv";

    fn parse<R: Read>(reader: R) -> Result<Self, TableParseError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        require_columns(csv_reader.headers()?, &[CODE_COLUMN, REGION_COLUMN])?;

        let mut regions = HashMap::new();
        for record in csv_reader.deserialize::<RegionRow>() {
            let row = record?;
            regions.insert(row.code, row.region.unwrap_or_default());
        }

        Ok(Self { regions })
    }

    fn len(&self) -> usize {
        self.regions.len()
    }
}

#[derive(Debug, Deserialize)]
struct RegionRow {
    #[serde(rename = "local-authority-code")]
    code: String,
    #[serde(rename = "region")]
    region: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_region_by_local_authority_code() {
        let csv = "local-authority-code,official-name,nation,region,gss-code\n\
ABE,Aberdeen City Council,Scotland,Scotland,S12000033\n\
HAC,London Borough of Hackney,England,London,E09000012\n\
BIR,Birmingham City Council,England,,E08000025\n";
        let table = RegionTable::parse(csv.as_bytes()).expect("region csv parses");

        assert_eq!(table.region("HAC"), Some("London"));
        assert_eq!(table.region("ABE"), Some("Scotland"));
        assert_eq!(table.region("BIR"), Some(""));
        assert_eq!(table.region("E09000012"), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn later_rows_replace_earlier_duplicates() {
        let csv = "local-authority-code,region\nHAC,Greater London\nHAC,London\n";
        let table = RegionTable::parse(csv.as_bytes()).expect("region csv parses");
        assert_eq!(table.region("HAC"), Some("London"));
    }

    #[test]
    fn missing_region_column_is_rejected() {
        let err = RegionTable::parse("local-authority-code,nation\nHAC,England\n".as_bytes())
            .expect_err("region column required");
        assert!(matches!(err, TableParseError::MissingColumns(_)));
    }
}
