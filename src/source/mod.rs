//! Table sources. A `TableSource` produces the raw quarterly CPI `Table`, either from the
//! published CSV file or from a SQLite database that the CSV was previously imported into.

mod csv;
mod sqlite;

use crate::db::Db;
use crate::model::{CpiTable, Table};
use crate::{Config, CpiError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::csv::CsvSource;
pub use self::sqlite::SqliteSource;

/// Selects the implementation of `TableSource`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Read the published CSV file.
    #[default]
    Csv,
    /// Read the table previously stored with `pcpi import`.
    Sqlite,
}

serde_plain::derive_display_from_serialize!(SourceKind);
serde_plain::derive_fromstr_from_deserialize!(SourceKind);

/// Anything that can produce the raw CPI table.
#[async_trait::async_trait]
pub trait TableSource {
    async fn load(&mut self) -> Result<Table>;
}

/// Constructs the `TableSource` chosen by `kind`, configured from `config`.
pub async fn table_source(config: &Config, kind: SourceKind) -> Result<Box<dyn TableSource + Send>> {
    debug!("Using the {kind} table source");
    Ok(match kind {
        SourceKind::Csv => Box::new(CsvSource::new(
            config.csv_path(),
            config.skip_rows(),
            config.row_count(),
        )),
        SourceKind::Sqlite => {
            let path = config.sqlite_path();
            if !path.is_file() {
                return Err(CpiError::Load(format!(
                    "'{}' does not exist, run `pcpi import` first",
                    path.display()
                ))
                .into());
            }
            Box::new(SqliteSource::new(Db::open(path).await?))
        }
    })
}

/// Loads the raw table from the chosen source and cleans it into a `CpiTable`.
pub async fn load_cpi_table(config: &Config, kind: SourceKind) -> Result<CpiTable> {
    let mut source = table_source(config, kind).await?;
    let table = source.load().await?;
    debug!("Loaded {} rows from the {kind} table source", table.len());
    CpiTable::from_table(&table, &config.quarters())
}
