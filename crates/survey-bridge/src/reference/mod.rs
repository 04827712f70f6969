//! Reference datasets the bridge joins geocoder output against.
//!
//! Each table is read from the resources directory the first time it is
//! needed and then kept for the life of the process. Concurrent first
//! callers block on a single load; a failed load leaves the slot empty so
//! the next request tries again.

mod category;
pub mod fetch;
mod imd;
mod region;
mod rurality;

pub use category::{CategoryLabels, CategoryTable, UNCLASSIFIED};
pub use imd::{ImdDeciles, ImdRecord, ImdTable};
pub use region::RegionTable;
pub use rurality::{Rurality, RuralityError, RuralityTable};

use once_cell::sync::OnceCell;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A reference dataset backed by a single file in the resources directory.
pub trait ReferenceTable: Sized {
    const FILE_NAME: &'static str;

    fn parse<R: Read>(reader: R) -> Result<Self, TableParseError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Problems with the contents of a reference file.
#[derive(Debug, thiserror::Error)]
pub enum TableParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// A reference table could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference file {} is unavailable: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reference file {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: TableParseError,
    },
}

pub(crate) fn require_columns(
    headers: &csv::StringRecord,
    required: &[&str],
) -> Result<(), TableParseError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TableParseError::MissingColumns(missing))
    }
}

/// Process-wide cache of the four reference tables.
#[derive(Debug)]
pub struct ReferenceTables {
    dir: PathBuf,
    imd: OnceCell<ImdTable>,
    region: OnceCell<RegionTable>,
    rurality: OnceCell<RuralityTable>,
    category: OnceCell<CategoryTable>,
}

impl ReferenceTables {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            imd: OnceCell::new(),
            region: OnceCell::new(),
            rurality: OnceCell::new(),
            category: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn imd_table(&self) -> Result<&ImdTable, ReferenceError> {
        self.imd.get_or_try_init(|| self.load())
    }

    pub fn region_table(&self) -> Result<&RegionTable, ReferenceError> {
        self.region.get_or_try_init(|| self.load())
    }

    pub fn rurality_table(&self) -> Result<&RuralityTable, ReferenceError> {
        self.rurality.get_or_try_init(|| self.load())
    }

    pub fn category_table(&self) -> Result<&CategoryTable, ReferenceError> {
        self.category.get_or_try_init(|| self.load())
    }

    /// Loads every table up front, stopping at the first failure.
    pub fn preload(&self) -> Result<(), ReferenceError> {
        self.imd_table()?;
        self.region_table()?;
        self.rurality_table()?;
        self.category_table()?;
        Ok(())
    }

    fn load<T: ReferenceTable>(&self) -> Result<T, ReferenceError> {
        let path = self.dir.join(T::FILE_NAME);
        let file = File::open(&path).map_err(|source| {
            warn!(path = %path.display(), %source, "reference file unavailable");
            ReferenceError::Io {
                path: path.clone(),
                source,
            }
        })?;

        let table = T::parse(file).map_err(|source| {
            warn!(path = %path.display(), %source, "reference file malformed");
            ReferenceError::Malformed {
                path: path.clone(),
                source,
            }
        })?;

        if table.is_empty() {
            warn!(path = %path.display(), "reference table loaded with no rows");
        }
        info!(path = %path.display(), rows = table.len(), "reference table loaded");
        Ok(table)
    }
}
