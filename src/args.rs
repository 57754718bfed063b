//! These structs provide the CLI interface for the pcpi CLI.

use crate::source::SourceKind;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// pcpi: Compute your personal Consumer Price Index.
///
/// You tell the program how much of your spending goes to each of the ten main CPI categories
/// (Food, Transport, Housing & Utilities, ...). It weighs the latest price level of each
/// category by your answers, compares the result with the general household CPI, and draws a
/// chart of both.
///
/// The price levels come from the quarterly CPI table published as a CSV file. Run
/// `pcpi init --csv <file>` once to tell the program where that file is.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and its configuration file.
    ///
    /// The configuration file records where the published quarterly CPI CSV lives. Download it
    /// and pass it as --csv, or copy it to $CPI_HOME/CPI_Quarterly.csv.
    Init(InitArgs),
    /// Ask for your weights, compute your personal CPI and draw the comparison chart.
    Compute(ComputeArgs),
    /// Print the cleaned CPI table.
    Categories(CategoriesArgs),
    /// Store the CSV table in the SQLite database so it can be used with --source sqlite.
    Import,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and data are held. Defaults to ~/cpi
    #[arg(long, env = "CPI_HOME", default_value_t = default_cpi_home())]
    cpi_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, cpi_home: PathBuf) -> Self {
        Self {
            log_level,
            cpi_home: cpi_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn cpi_home(&self) -> &DisplayPath {
        &self.cpi_home
    }
}

/// Args for the `pcpi init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to the published quarterly CPI CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(csv: Option<PathBuf>) -> Self {
        Self { csv }
    }

    pub fn csv(&self) -> Option<&Path> {
        self.csv.as_deref()
    }
}

/// Args for the `pcpi compute` command.
#[derive(Debug, Parser, Clone)]
pub struct ComputeArgs {
    /// Where to load the CPI table from. Defaults to the `source` in config.json.
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Give all ten weights at once, comma separated and in table order, instead of answering
    /// the prompts.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    weights: Option<Vec<String>>,

    /// Where to write the chart (.svg or .png). Defaults to the `chart_path` in config.json.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip drawing the chart.
    #[arg(long)]
    no_chart: bool,
}

impl ComputeArgs {
    pub fn new(
        source: Option<SourceKind>,
        weights: Option<Vec<String>>,
        output: Option<PathBuf>,
        no_chart: bool,
    ) -> Self {
        Self {
            source,
            weights,
            output,
            no_chart,
        }
    }

    pub fn source(&self) -> Option<SourceKind> {
        self.source
    }

    pub fn weights(&self) -> Option<&[String]> {
        self.weights.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn no_chart(&self) -> bool {
        self.no_chart
    }
}

/// Args for the `pcpi categories` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    /// Where to load the CPI table from. Defaults to the `source` in config.json.
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Include the sub categories, not just the ten main ones.
    #[arg(long)]
    all: bool,
}

impl CategoriesArgs {
    pub fn new(source: Option<SourceKind>, all: bool) -> Self {
        Self { source, all }
    }

    pub fn source(&self) -> Option<SourceKind> {
        self.source
    }

    pub fn all(&self) -> bool {
        self.all
    }
}

fn default_cpi_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("cpi"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --cpi-home or CPI_HOME instead of relying on the default \
                directory.",
            );
            PathBuf::from("cpi")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compute_args() {
        let args = Args::try_parse_from([
            "pcpi",
            "--cpi-home",
            "/tmp/cpi",
            "--log-level",
            "debug",
            "compute",
            "--source",
            "sqlite",
            "--weights",
            "10,20,0,-1,5,6,7,8,9,10",
            "--no-chart",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert_eq!(args.common().cpi_home().path(), Path::new("/tmp/cpi"));
        match args.command() {
            Command::Compute(c) => {
                assert_eq!(c.source(), Some(SourceKind::Sqlite));
                let weights = c.weights().unwrap();
                assert_eq!(weights.len(), 10);
                assert_eq!(weights[3], "-1");
                assert!(c.no_chart());
                assert!(c.output().is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_init_and_categories() {
        let args = Args::try_parse_from(["pcpi", "init", "--csv", "data.csv"]).unwrap();
        assert!(matches!(
            args.command(),
            Command::Init(i) if i.csv() == Some(Path::new("data.csv"))
        ));

        let args = Args::try_parse_from(["pcpi", "categories", "--all"]).unwrap();
        assert!(matches!(args.command(), Command::Categories(c) if c.all()));

        assert!(Args::try_parse_from(["pcpi", "compute", "--source", "mysql"]).is_err());
    }
}
