//! Types that represent the core data model, such as `CpiTable`, `Weights` and `CpiResult`.
mod category;
mod cpi;
mod table;
mod weight;

pub use category::{
    CategoryRecord, CpiTable, Group, MainCategory, QuarterColumns, DATA_SERIES,
    DEFAULT_BASELINE_QUARTER, DEFAULT_LATEST_QUARTER, ITEMS, MAIN_CATEGORIES,
};
pub use cpi::{weighted_index, Comparison, CpiResult, BENCHMARK_CPI};
pub use table::Table;
pub use weight::{parse_weight, UserWeight, Weights, MAX_WEIGHT, NORMALIZED_TOTAL};
