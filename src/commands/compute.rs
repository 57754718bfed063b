use crate::args::ComputeArgs;
use crate::commands::Out;
use crate::model::{Comparison, CpiResult, Weights};
use crate::{input, render, source, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything `compute` worked out, for the structured output.
#[derive(Debug, Clone, Serialize)]
pub struct ComputeReport {
    weights: Weights,
    result: CpiResult,
    comparison: Comparison,
    chart: Option<PathBuf>,
}

impl ComputeReport {
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn result(&self) -> &CpiResult {
        &self.result
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn chart(&self) -> Option<&Path> {
        self.chart.as_deref()
    }
}

/// Runs the whole pipeline:
/// - loads the CPI table from the chosen source
/// - takes one weight per main category, from `args` or by prompting on `input`/`out`
/// - normalizes the weights and prints them
/// - computes the personal CPI and compares it with the benchmark
/// - draws the chart, unless `--no-chart` was given
///
/// Any failure stops the pipeline, so no chart is drawn for bad or incomplete input.
pub async fn compute<R, W>(
    config: Config,
    args: &ComputeArgs,
    input: R,
    mut out: W,
) -> Result<Out<ComputeReport>>
where
    R: BufRead,
    W: Write,
{
    let kind = args.source().unwrap_or_else(|| config.source());
    let table = source::load_cpi_table(&config, kind).await?;
    let names = table.main_names();

    let raw = match args.weights() {
        Some(values) => input::weights_from_args(&names, values)?,
        None => input::collect_weights(&names, input, &mut out)?,
    };
    let weights = Weights::normalize(names.iter().copied().zip(raw))?;
    write!(out, "{}", weights.listing()).context("Unable to write to the console")?;

    let result = CpiResult::compute(&table.main_prices(), &weights)?;
    let comparison = result.comparison();
    debug!(
        "Computed CPI {} against benchmark {}",
        result.computed(),
        result.benchmark()
    );
    writeln!(
        out,
        "\nYour CPI: {:.1}\nGeneral household CPI: {:.1}\n{comparison}",
        result.computed(),
        result.benchmark()
    )
    .context("Unable to write to the console")?;

    let chart = if args.no_chart() {
        None
    } else {
        let path = args
            .output()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.chart_path());
        render::render(&path, &weights, &result)?;
        Some(path)
    };

    Ok(Out::new(
        comparison.to_string(),
        ComputeReport {
            weights,
            result,
            comparison,
            chart,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;
    use crate::test::{TestEnv, MAIN_PRICES};
    use crate::CpiError;
    use std::io::Cursor;

    async fn run(env: &TestEnv, args: &ComputeArgs, input: &str) -> (Result<Out<ComputeReport>>, String) {
        let mut out = Vec::new();
        let result = compute(env.config(), args, Cursor::new(input.to_string()), &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_compute_with_prompts() {
        let env = TestEnv::new().await;
        let args = ComputeArgs::new(None, None, None, true);
        let (result, out) = run(&env, &args, &"10\n".repeat(10)).await;
        let out_struct = result.unwrap();
        let report = out_struct.structure().unwrap();

        let expected = MAIN_PRICES.iter().sum::<f64>() / 10.0;
        assert!((report.result().computed() - expected).abs() < 1e-9);
        assert!(matches!(report.comparison(), Comparison::Less(_)));
        assert_eq!(
            out_struct.message(),
            "Your computed CPI is less than the general household benchmark by 2.2%"
        );
        assert!(report.chart().is_none());
        assert!(out.contains("Value for Food: "));
        assert!(out.contains("Your CPI Weightage refactored to 100%:"));
        assert!(out.contains("Transport: 10.0"));
        assert!(out.contains("Your CPI: 111.1"));
    }

    #[tokio::test]
    async fn test_compute_with_weights_argument() {
        let env = TestEnv::new().await;
        let weights: Vec<String> = ["0", "0", "0", "0", "0", "50", "0", "0", "0", "0"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let args = ComputeArgs::new(Some(SourceKind::Csv), Some(weights), None, true);
        let (result, out) = run(&env, &args, "").await;
        let report = result.unwrap().structure().cloned().unwrap();
        assert!((report.result().computed() - 131.1).abs() < 1e-9);
        assert!(!out.contains("Value for"));
        assert!(out.contains("Transport: 100.0"));
    }

    #[tokio::test]
    async fn test_compute_draws_chart() {
        let env = TestEnv::new().await;
        let args = ComputeArgs::new(None, None, None, false);
        let (result, _) = run(&env, &args, &"10\n".repeat(10)).await;
        let out_struct = result.unwrap();
        let chart = out_struct.structure().unwrap().chart().unwrap();
        assert_eq!(chart, env.config().chart_path());
        assert!(chart.is_file());
        let svg = std::fs::read_to_string(chart).unwrap();
        assert!(svg.contains(out_struct.message()));
    }

    #[tokio::test]
    async fn test_out_of_range_draws_no_chart() {
        let env = TestEnv::new().await;
        let chart = env.config().root().join("chart.svg");
        let args = ComputeArgs::new(None, None, Some(chart.clone()), false);
        for bad in ["101", "-1"] {
            let (result, out) = run(&env, &args, &format!("10\n10\n{bad}\n")).await;
            let err = result.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<CpiError>(),
                Some(CpiError::OutOfRange(_))
            ));
            assert!(out.contains("Invalid input!"));
            assert!(!out.contains("refactored"));
            assert!(!chart.exists());
        }
    }

    #[tokio::test]
    async fn test_not_an_integer_draws_no_chart() {
        let env = TestEnv::new().await;
        let chart = env.config().root().join("chart.svg");
        let args = ComputeArgs::new(None, None, Some(chart.clone()), false);
        let (result, out) = run(&env, &args, "abc\n").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CpiError>(),
            Some(CpiError::NotAnInteger(_))
        ));
        assert!(out.contains("Invalid input! Please enter an integer."));
        assert!(!chart.exists());
    }

    #[tokio::test]
    async fn test_all_zero_weights() {
        let env = TestEnv::new().await;
        let args = ComputeArgs::new(None, None, None, true);
        let (result, _) = run(&env, &args, &"0\n".repeat(10)).await;
        let err = result.unwrap_err();
        assert_eq!(err.downcast_ref::<CpiError>(), Some(&CpiError::ZeroWeight));
    }

    #[tokio::test]
    async fn test_interrupted_input() {
        let env = TestEnv::new().await;
        let args = ComputeArgs::new(None, None, None, true);
        let (result, _) = run(&env, &args, "10\n10\n").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CpiError>(),
            Some(CpiError::Interrupted(_))
        ));
    }
}
