use super::{ReferenceTable, TableParseError};
use std::collections::HashMap;
use std::io::Read;

pub const UNCLASSIFIED: &str = "Unclassified";

/// Meta-category triple assigned to a free-text report category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryLabels {
    pub cat_a: String,
    pub cat_b: String,
    pub cat_c: String,
}

impl CategoryLabels {
    pub fn new(cat_a: impl Into<String>, cat_b: impl Into<String>, cat_c: impl Into<String>) -> Self {
        Self {
            cat_a: cat_a.into(),
            cat_b: cat_b.into(),
            cat_c: cat_c.into(),
        }
    }

    pub fn unclassified() -> Self {
        Self::new(UNCLASSIFIED, UNCLASSIFIED, UNCLASSIFIED)
    }
}

/// Category lookup: first column is the key, the next three the labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    labels: HashMap<String, CategoryLabels>,
}

impl CategoryTable {
    pub fn get(&self, category: &str) -> Option<&CategoryLabels> {
        self.labels.get(category)
    }

    /// Exact-match lookup falling back to the unclassified triple.
    pub fn classify(&self, category: &str) -> CategoryLabels {
        self.get(category)
            .cloned()
            .unwrap_or_else(CategoryLabels::unclassified)
    }
}

impl ReferenceTable for CategoryTable {
    const FILE_NAME: &'static str = "full_table.csv";

    fn parse<R: Read>(reader: R) -> Result<Self, TableParseError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = csv_reader.headers()?;
        if headers.len() < 4 {
            let missing = (headers.len()..4)
                .map(|index| format!("column {}", index + 1))
                .collect();
            return Err(TableParseError::MissingColumns(missing));
        }

        let mut labels = HashMap::new();
        for record in csv_reader.records() {
            let record = record?;
            let field = |index: usize| record.get(index).unwrap_or_default().to_string();
            labels.insert(
                field(0),
                CategoryLabels::new(field(1), field(2), field(3)),
            );
        }

        Ok(Self { labels })
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}
