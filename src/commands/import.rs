use crate::commands::Out;
use crate::db::Db;
use crate::model::CpiTable;
use crate::source::{CsvSource, TableSource};
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;

/// What `import` stored.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    rows: u64,
    from: PathBuf,
    to: PathBuf,
}

impl ImportReport {
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

/// Reads the CSV source and stores its raw table in the SQLite database, replacing whatever was
/// there. The table is checked first, so a file that cannot be used is never stored.
pub async fn import(config: Config) -> Result<Out<ImportReport>> {
    let from = config.csv_path();
    let mut csv = CsvSource::new(&from, config.skip_rows(), config.row_count());
    let table = csv.load().await?;
    CpiTable::from_table(&table, &config.quarters())?;

    let to = config.sqlite_path();
    let db = Db::open(&to).await?;
    db.save_table(&table).await?;
    let rows = db.count_rows().await?;

    Ok(Out::new(
        format!("Imported {rows} rows from {} into {}", from.display(), to.display()),
        ImportReport { rows, from, to },
    ))
}
