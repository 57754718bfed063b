//! This module is responsible for reading and writing the SQLite database that holds an imported
//! copy of the CPI table.

mod migrations;

use crate::model::Table;
use crate::{CpiError, Result};
use anyhow::{ensure, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// The schema version that this build of the program expects.
const CURRENT_VERSION: i32 = 1;

#[derive(Debug, Clone)]
pub(crate) struct Db {
    path: PathBuf,
    pool: SqlitePool,
}

impl Db {
    /// - Opens the SQLite file at `path`, creating it if it does not exist
    /// - Updates the database schema with migrations if it is out-of-date
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .context("Failed to parse SQLite connection string")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite DB at {}", path.display()))?;

        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Failed to create schema_version table")?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .context("Failed to count schema_version rows")?;
        if count == 0 {
            sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
                .execute(&pool)
                .await
                .context("Failed to insert initial schema version")?;
        }

        let (version,): (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
            .fetch_one(&pool)
            .await
            .context("Failed to query schema version")?;
        debug!("SQLite DB at {} is at schema version {version}", path.display());
        migrations::run(&pool, version, CURRENT_VERSION).await?;

        Ok(Self {
            path: path.to_path_buf(),
            pool,
        })
    }

    /// Replaces whatever table is stored with `table`.
    pub(crate) async fn save_table(&self, table: &Table) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM cpi_cells")
            .execute(&mut *tx)
            .await
            .context("Failed to clear cpi_cells")?;
        sqlx::query("DELETE FROM cpi_columns")
            .execute(&mut *tx)
            .await
            .context("Failed to clear cpi_columns")?;

        for (col_ix, name) in table.headers().iter().enumerate() {
            sqlx::query("INSERT INTO cpi_columns (col_ix, name) VALUES (?, ?)")
                .bind(col_ix as i64)
                .bind(name)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert column '{name}'"))?;
        }

        for (row_ix, row) in table.rows().iter().enumerate() {
            for (col_ix, value) in row.iter().enumerate() {
                sqlx::query("INSERT INTO cpi_cells (row_ix, col_ix, value) VALUES (?, ?, ?)")
                    .bind(row_ix as i64)
                    .bind(col_ix as i64)
                    .bind(value)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("Failed to insert cell ({row_ix}, {col_ix})"))?;
            }
        }

        tx.commit().await.context("Failed to commit transaction")?;
        debug!(
            "Saved {} rows to SQLite DB at {}",
            table.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Reads the stored table back in its original shape.
    ///
    /// # Errors
    /// Returns `CpiError::Load` if nothing has been imported yet.
    pub(crate) async fn load_table(&self) -> Result<Table> {
        let columns: Vec<(i64, String)> =
            sqlx::query_as("SELECT col_ix, name FROM cpi_columns ORDER BY col_ix")
                .fetch_all(&self.pool)
                .await
                .context("Failed to query cpi_columns")?;
        if columns.is_empty() {
            return Err(CpiError::Load(format!(
                "no table has been imported into '{}', run `pcpi import` first",
                self.path.display()
            ))
            .into());
        }

        let cells: Vec<(i64, i64, String)> =
            sqlx::query_as("SELECT row_ix, col_ix, value FROM cpi_cells ORDER BY row_ix, col_ix")
                .fetch_all(&self.pool)
                .await
                .context("Failed to query cpi_cells")?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for (row_ix, col_ix, value) in cells {
            let row_ix = usize::try_from(row_ix).context("Negative row index in cpi_cells")?;
            while rows.len() <= row_ix {
                rows.push(Vec::new());
            }
            let row = rows
                .get_mut(row_ix)
                .context("Row index out of bounds in cpi_cells")?;
            ensure!(
                i64::try_from(row.len()).ok() == Some(col_ix),
                "Missing cell before ({row_ix}, {col_ix}) in cpi_cells"
            );
            row.push(value);
        }

        let headers: Vec<String> = columns.into_iter().map(|(_, name)| name).collect();
        Table::new(headers, rows)
    }

    /// Returns the number of data rows stored.
    pub(crate) async fn count_rows(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(DISTINCT row_ix) FROM cpi_cells")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count rows")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load_table() {
        let dir = TempDir::new().unwrap();
        let db = Db::open(dir.path().join("test.sqlite")).await.unwrap();
        let table = Table::new(
            vec!["Data Series", "2023 2Q", "2019 1Q"],
            vec![
                vec!["All Items", "112.0", "100.0"],
                vec!["  Food", "121.46", "na"],
                vec!["Rice"],
            ],
        )
        .unwrap();
        db.save_table(&table).await.unwrap();
        assert_eq!(db.count_rows().await.unwrap(), 3);
        assert_eq!(db.load_table().await.unwrap(), table);

        // Saving again replaces the table.
        let smaller = Table::new(vec!["Data Series"], vec![vec!["Food"]]).unwrap();
        db.save_table(&smaller).await.unwrap();
        assert_eq!(db.load_table().await.unwrap(), smaller);
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.sqlite");
        let table = Table::new(vec!["a", "b"], vec![vec!["1", "2"]]).unwrap();
        {
            let db = Db::open(&path).await.unwrap();
            db.save_table(&table).await.unwrap();
        }
        let db = Db::open(&path).await.unwrap();
        assert_eq!(db.load_table().await.unwrap(), table);
    }

    #[tokio::test]
    async fn test_load_empty_db() {
        let dir = TempDir::new().unwrap();
        let db = Db::open(dir.path().join("test.sqlite")).await.unwrap();
        let err = db.load_table().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CpiError>(),
            Some(CpiError::Load(_))
        ));
    }
}
