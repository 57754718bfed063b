//! Configuration file handling.
//!
//! The configuration file is stored at `$CPI_HOME/config.json`. It chooses the table source,
//! the locations of the data files and the chart, and the layout of the published CSV.

use crate::model::QuarterColumns;
use crate::model::{DEFAULT_BASELINE_QUARTER, DEFAULT_LATEST_QUARTER};
use crate::source::SourceKind;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "pcpi";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const CSV_FILE: &str = "CPI_Quarterly.csv";
const SQLITE_FILE: &str = "cpi.sqlite";
const CHART_FILE: &str = "cpi.svg";
const SKIP_ROWS: usize = 10;
const ROW_COUNT: usize = 152;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CPI_HOME` and from there it loads `$CPI_HOME/config.json`, falling back to
/// defaults when that file does not exist.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/cpi`
    /// - `csv_file` - The published quarterly CPI file. When omitted the program looks for
    ///   `CPI_Quarterly.csv` in the home directory.
    ///
    /// # Errors
    /// - Returns an error if a `config.json` already exists, if `csv_file` does not exist, or if
    ///   any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, csv_file: Option<&Path>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the CPI home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!("A config file already exists at '{}'", config_path.display())
        }

        let csv_path = match csv_file {
            Some(p) => Some(
                utils::canonicalize(p)
                    .await
                    .context("The CPI data file could not be found")?,
            ),
            None => None,
        };

        let config_file = ConfigFile {
            csv_path,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `cpi_home` exists
    /// - load the config file if there is one, otherwise use the defaults
    /// - return the loaded configuration object
    pub async fn load(cpi_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = cpi_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The CPI home directory is missing, run `pcpi init` to create it")?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            debug!(
                "No config file at '{}', using defaults",
                config_path.display()
            );
            ConfigFile::default()
        };

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Which table source to use when none is given on the command line.
    pub fn source(&self) -> SourceKind {
        self.config_file.source
    }

    pub fn csv_path(&self) -> PathBuf {
        self.resolve(self.config_file.csv_path.as_deref(), CSV_FILE)
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.resolve(self.config_file.sqlite_path.as_deref(), SQLITE_FILE)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.resolve(self.config_file.chart_path.as_deref(), CHART_FILE)
    }

    /// The number of metadata lines before the CSV header row.
    pub fn skip_rows(&self) -> usize {
        self.config_file.skip_rows
    }

    /// The maximum number of data rows read after the CSV header row.
    pub fn row_count(&self) -> usize {
        self.config_file.row_count
    }

    pub fn quarters(&self) -> QuarterColumns {
        QuarterColumns {
            latest: self.config_file.latest_quarter.clone(),
            baseline: self.config_file.baseline_quarter.clone(),
        }
    }

    /// Returns `p` if it is absolute, joins it to the home directory if it is relative, and uses
    /// `default` in the home directory if it is `None`.
    fn resolve(&self, p: Option<&Path>, default: &str) -> PathBuf {
        match p {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.root.join(p),
            None => self.root.join(default),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pcpi",
///   "config_version": 1,
///   "source": "csv",
///   "csv_path": "/home/me/Downloads/CPI_Quarterly.csv",
///   "skip_rows": 10,
///   "row_count": 152,
///   "latest_quarter": "2023 2Q",
///   "baseline_quarter": "2019 1Q"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
struct ConfigFile {
    /// Application name, should always be "pcpi"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Where the CPI table is loaded from
    source: SourceKind,

    /// Path to the published CSV (relative to the home directory or absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    csv_path: Option<PathBuf>,

    /// Path to the SQLite database (relative to the home directory or absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    sqlite_path: Option<PathBuf>,

    /// Where the chart is written. The extension chooses the image format.
    #[serde(skip_serializing_if = "Option::is_none")]
    chart_path: Option<PathBuf>,

    skip_rows: usize,
    row_count: usize,
    latest_quarter: String,
    baseline_quarter: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            source: SourceKind::default(),
            csv_path: None,
            sqlite_path: None,
            chart_path: None,
            skip_rows: SKIP_ROWS,
            row_count: ROW_COUNT,
            latest_quarter: DEFAULT_LATEST_QUARTER.to_string(),
            baseline_quarter: DEFAULT_BASELINE_QUARTER.to_string(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
