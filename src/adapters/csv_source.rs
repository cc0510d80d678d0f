use crate::domain::model::{FlowRecord, FlowScope};
use crate::domain::ports::FlowSource;
use crate::utils::error::{IcioError, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Flow source backed by a local CSV snapshot, optionally inside a zip
/// archive (ICIO releases ship zipped). The snapshot is loaded once at
/// construction; scope queries filter in memory.
///
/// Expected header: buyer_country,buyer_sector,supplier_country,year,value,buyer_total
#[derive(Debug, Clone)]
pub struct CsvFlowSource {
    rows: Vec<FlowRecord>,
}

impl CsvFlowSource {
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        tracing::debug!("Loading flow snapshot from {}", path.as_ref().display());
        Self::from_reader(file)
    }

    /// Load from a zip archive. `entry` picks the member to read; when
    /// omitted, the first `.csv` member is used.
    pub fn from_zip_path<P: AsRef<Path>>(path: P, entry: Option<&str>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut archive = zip::ZipArchive::new(file)?;

        let name = match entry {
            Some(name) => name.to_string(),
            None => archive
                .file_names()
                .find(|name| name.ends_with(".csv"))
                .map(|name| name.to_string())
                .ok_or_else(|| IcioError::ProcessingError {
                    message: format!(
                        "no .csv entry found in archive {}",
                        path.as_ref().display()
                    ),
                })?,
        };

        tracing::debug!(
            "Loading flow snapshot entry '{}' from {}",
            name,
            path.as_ref().display()
        );
        let member = archive.by_name(&name)?;
        Self::from_reader(member)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for record in csv_reader.deserialize() {
            let row: FlowRecord = record?;
            rows.push(row);
        }
        tracing::debug!("Loaded {} flow rows", rows.len());
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl FlowSource for CsvFlowSource {
    async fn fetch(&self, scope: &FlowScope) -> Result<Vec<FlowRecord>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| scope.matches(row))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        // The snapshot already lives in memory; loading succeeded.
        Ok(())
    }
}
