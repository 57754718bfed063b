use crate::model::Table;
use crate::{CpiError, Result};
use serde::{Deserialize, Serialize};

/// The ten top-level expenditure groups that a user assigns weights to. This is also the order
/// used when the table itself does not decide one.
pub const MAIN_CATEGORIES: [&str; 10] = [
    "Food",
    "Clothing & Footwear",
    "Housing & Utilities",
    "Household Durables & Services",
    "Health Care",
    "Transport",
    "Communication",
    "Recreation & Culture",
    "Education",
    "Miscellaneous Goods & Services",
];

/// The column header that identifies each series in the published file.
pub const DATA_SERIES: &str = "Data Series";

/// The name that `DATA_SERIES` is given in a cleaned table.
pub const ITEMS: &str = "items";

/// The most recent quarter, whose price levels feed the personal index.
pub const DEFAULT_LATEST_QUARTER: &str = "2023 2Q";

/// The earlier quarter that `diff` is measured against.
pub const DEFAULT_BASELINE_QUARTER: &str = "2019 1Q";

/// Whether a row is one of the ten weighted categories or a finer line item.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Group {
    Main,
    Sub,
}

serde_plain::derive_display_from_serialize!(Group);
serde_plain::derive_fromstr_from_deserialize!(Group);

impl Group {
    pub fn classify(item: &str) -> Self {
        if MAIN_CATEGORIES.iter().any(|c| *c == item) {
            Group::Main
        } else {
            Group::Sub
        }
    }
}

/// Names the two quarter columns used to build a `CpiTable`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QuarterColumns {
    pub latest: String,
    pub baseline: String,
}

impl Default for QuarterColumns {
    fn default() -> Self {
        Self {
            latest: DEFAULT_LATEST_QUARTER.to_string(),
            baseline: DEFAULT_BASELINE_QUARTER.to_string(),
        }
    }
}

/// One cleaned row of the CPI table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryRecord {
    #[serde(rename = "items")]
    name: String,
    group: Group,
    latest_price: Option<f64>,
    baseline_price: Option<f64>,
    #[serde(rename = "diff")]
    price_diff: Option<f64>,
}

impl CategoryRecord {
    pub fn new(name: impl Into<String>, latest: Option<f64>, baseline: Option<f64>) -> Self {
        let name = name.into();
        let group = Group::classify(&name);
        let price_diff = latest.zip(baseline).map(|(l, b)| round_1(l - b));
        Self {
            name,
            group,
            latest_price: latest,
            baseline_price: baseline,
            price_diff,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.latest_price
    }

    pub fn baseline_price(&self) -> Option<f64> {
        self.baseline_price
    }

    pub fn price_diff(&self) -> Option<f64> {
        self.price_diff
    }
}

/// A main category together with the price level that its weight applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MainCategory {
    pub name: String,
    pub latest_price: f64,
}

/// The cleaned CPI table: every record, plus the ten main categories in table row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CpiTable {
    records: Vec<CategoryRecord>,
    mains: Vec<MainCategory>,
}

impl CpiTable {
    /// Cleans a raw table:
    /// - trims headers and finds the `Data Series` (a.k.a. `items`) column
    /// - trims every item label
    /// - reads the latest and baseline quarter prices and derives `diff`
    /// - classifies each row as `Main` or `Sub`
    ///
    /// # Errors
    /// Returns `CpiError::Load` when a required column is missing, when a main category is
    /// missing, duplicated or has no latest price, or when a price cell is not numeric.
    pub fn from_table(table: &Table, quarters: &QuarterColumns) -> Result<Self> {
        let items_col = table
            .column(DATA_SERIES)
            .or_else(|| table.column(ITEMS))
            .ok_or_else(|| CpiError::Load(format!("the '{DATA_SERIES}' column is missing")))?;
        let latest_col = required_column(table, &quarters.latest)?;
        let baseline_col = required_column(table, &quarters.baseline)?;

        let mut records = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let name = table.cell(row, items_col).trim();
            let latest = parse_price(table.cell(row, latest_col), name, &quarters.latest)?;
            let baseline = parse_price(table.cell(row, baseline_col), name, &quarters.baseline)?;
            records.push(CategoryRecord::new(name, latest, baseline));
        }

        let mut mains: Vec<MainCategory> = Vec::with_capacity(MAIN_CATEGORIES.len());
        for record in records.iter().filter(|r| r.group == Group::Main) {
            if mains.iter().any(|m| m.name == record.name) {
                return Err(CpiError::Load(format!(
                    "the main category '{}' appears more than once",
                    record.name
                ))
                .into());
            }
            let latest_price = record.latest_price.ok_or_else(|| {
                CpiError::Load(format!(
                    "the main category '{}' has no value for '{}'",
                    record.name, quarters.latest
                ))
            })?;
            mains.push(MainCategory {
                name: record.name.clone(),
                latest_price,
            });
        }

        if let Some(missing) = MAIN_CATEGORIES
            .iter()
            .find(|c| !mains.iter().any(|m| m.name == **c))
        {
            return Err(CpiError::Load(format!("the main category '{missing}' is missing")).into());
        }

        Ok(Self { records, mains })
    }

    pub fn records(&self) -> &[CategoryRecord] {
        &self.records
    }

    pub fn mains(&self) -> &[MainCategory] {
        &self.mains
    }

    pub fn main_names(&self) -> Vec<&str> {
        self.mains.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn main_prices(&self) -> Vec<f64> {
        self.mains.iter().map(|m| m.latest_price).collect()
    }
}

fn required_column(table: &Table, name: &str) -> Result<usize> {
    table
        .column(name)
        .ok_or_else(|| CpiError::Load(format!("the '{name}' column is missing")).into())
}

/// Parses a price cell. Blank cells and the published placeholders for unavailable values are
/// `None`.
fn parse_price(cell: &str, item: &str, column: &str) -> Result<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "-" || cell.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    cell.replace(',', "")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| {
            CpiError::Load(format!("'{cell}' is not a number ('{item}', '{column}')")).into()
        })
}

fn round_1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
