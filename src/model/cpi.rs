use crate::model::Weights;
use crate::Result;
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The published general-household CPI that a personal index is compared against.
pub const BENCHMARK_CPI: f64 = 113.6;

/// The benchmark and the user's personal index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CpiResult {
    benchmark: f64,
    computed: f64,
}

impl CpiResult {
    /// Computes the personal index from the latest price of each main category and the user's
    /// weights. `prices` and `weights` must be in the same order.
    pub fn compute(prices: &[f64], weights: &Weights) -> Result<Self> {
        ensure!(
            prices.len() == weights.len(),
            "Expected one price per weight, got {} prices and {} weights",
            prices.len(),
            weights.len()
        );
        Ok(Self {
            benchmark: BENCHMARK_CPI,
            computed: weighted_index(prices, &weights.fractions()),
        })
    }

    pub fn benchmark(&self) -> f64 {
        self.benchmark
    }

    pub fn computed(&self) -> f64 {
        self.computed
    }

    pub fn comparison(&self) -> Comparison {
        Comparison::between(self.computed, self.benchmark)
    }
}

/// Σ(priceᵢ × fractionᵢ).
pub fn weighted_index(prices: &[f64], fractions: &[f64]) -> f64 {
    prices.iter().zip(fractions).map(|(p, f)| p * f).sum()
}

/// How a computed index relates to the benchmark. The payload is the absolute difference as a
/// percentage of the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Greater(f64),
    Less(f64),
    Same,
}

impl Comparison {
    /// Compares `computed` against `benchmark`.
    pub fn between(computed: f64, benchmark: f64) -> Self {
        let pct = ((computed - benchmark) / benchmark).abs() * 100.0;
        if computed > benchmark {
            Comparison::Greater(pct)
        } else if benchmark > computed {
            Comparison::Less(pct)
        } else {
            Comparison::Same
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparison::Greater(pct) => write!(
                f,
                "Your computed CPI is greater than the general household benchmark by {pct:.1}%"
            ),
            Comparison::Less(pct) => write!(
                f,
                "Your computed CPI is less than the general household benchmark by {pct:.1}%"
            ),
            Comparison::Same => {
                write!(f, "Your computed CPI is the same as the general household benchmark")
            }
        }
    }
}
