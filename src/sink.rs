use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ScrapeError;

pub const CSV_HEADER: [&str; 6] = [
    "product_url",
    "name",
    "price",
    "currency",
    "brand",
    "category",
];

/// One extracted product, in output column order.
///
/// `price` is kept exactly as the page stated it; it is a label, not money
/// arithmetic. `category` is always populated, with `"N/A"` standing in for
/// pages that do not declare one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub product_url: String,
    pub name: String,
    pub price: String,
    pub currency: String,
    pub brand: String,
    pub category: String,
}

/// Append-only CSV output.
///
/// The file handle is not held across the run: `create` writes the header
/// and closes, `append` reopens, writes one row, flushes and closes. A run
/// that dies mid-loop leaves every previously written row intact and
/// readable.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Create (or truncate) the output file and write the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref().to_path_buf();
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(Self { path })
    }

    /// Append exactly one row in header column order.
    pub fn append(&self, record: &ProductRecord) -> Result<(), ScrapeError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}
