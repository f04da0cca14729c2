//! Tabular result set and CSV export.

use crate::error::Result;
use crate::record::NormalizedRecord;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// CSV column order for exported results
pub const COLUMNS: &[&str] = &[
    "Title",
    "First Author",
    "Year",
    "Journal",
    "DOI",
    "Link",
    "Volume",
    "Page Range",
    "ISSN",
    "Affiliations",
    "Cited By Count",
];

/// Ordered search results, in the order Scopus returned them across pages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultTable {
    records: Vec<NormalizedRecord>,
}

impl ResultTable {
    pub fn new(records: Vec<NormalizedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the table as CSV. The header row is written even when empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        wtr.write_record(COLUMNS)?;
        for record in &self.records {
            wtr.write_record(record.fields())?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Render the table as a CSV string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        let csv = String::from_utf8(buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(csv)
    }

    /// Save the table as a CSV file at `path`.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)?;
        info!(path = %path.display(), rows = self.records.len(), "Saved CSV");
        Ok(())
    }
}

/// Default download name for a search over `[start_year, end_year]`.
pub fn export_file_name(start_year: i32, end_year: i32) -> String {
    format!("scopus_articles_{}_{}.csv", start_year, end_year)
}
