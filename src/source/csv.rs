use crate::model::Table;
use crate::source::TableSource;
use crate::{utils, CpiError, Result};
use anyhow::Context;
use std::path::PathBuf;
use tracing::{trace, warn};

/// Reads the published quarterly CPI file. The file starts with `skip_rows` lines of metadata,
/// then a header row, then the data rows, then footnotes. Only the first `row_count` data rows
/// are read.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    skip_rows: usize,
    row_count: usize,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, skip_rows: usize, row_count: usize) -> Self {
        Self {
            path: path.into(),
            skip_rows,
            row_count,
        }
    }

    /// Parses CSV text that has already been read from disk.
    pub(crate) fn parse(&self, content: &str) -> Result<Table> {
        let body: String = content
            .split_inclusive('\n')
            .skip(self.skip_rows)
            .collect();

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .context("Unable to read the CSV header row")?
            .iter()
            .map(String::from)
            .collect();
        trace!("CSV headers: {headers:?}");

        let mut rows = Vec::with_capacity(self.row_count);
        for (ix, record) in reader.records().take(self.row_count).enumerate() {
            let record = record.with_context(|| format!("Unable to read CSV data row {}", ix + 1))?;
            rows.push(record.iter().map(String::from).collect::<Vec<String>>());
        }
        if rows.len() < self.row_count {
            warn!(
                "Expected {} data rows in '{}' but found {}",
                self.row_count,
                self.path.display(),
                rows.len()
            );
        }

        Table::new(headers, rows)
    }
}

#[async_trait::async_trait]
impl TableSource for CsvSource {
    async fn load(&mut self) -> Result<Table> {
        let content = utils::read(&self.path)
            .await
            .with_context(|| CpiError::Load(format!("cannot read '{}'", self.path.display())))?;
        self.parse(&content)
            .with_context(|| CpiError::Load(format!("'{}' is malformed", self.path.display())))
    }
}
