//! Console collection of the user's category weights.

use crate::model::parse_weight;
use crate::{CpiError, Result};
use anyhow::Context;
use std::io::{BufRead, Write};
use tracing::debug;

/// Printed once before the first prompt.
pub const INTRO: &str = "Enter a numeric value between 0 to 100 for each of the CPI components \
based on the relative weight which you spend on the respective items";

/// Prompts for one weight per category, in the order given, and returns the raw weights in that
/// same order. Collection stops at the first bad answer: the error message is written to `out`
/// and the error is returned, so nothing downstream runs on a partial set of weights.
///
/// # Errors
/// - `CpiError::OutOfRange` or `CpiError::NotAnInteger` for a bad answer.
/// - `CpiError::Interrupted` if `input` ends or cannot be read before every category has a value.
pub fn collect_weights<R, W>(categories: &[&str], mut input: R, mut out: W) -> Result<Vec<u8>>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "\n{INTRO}\n").context("Unable to write to the console")?;
    let mut weights = Vec::with_capacity(categories.len());
    for category in categories {
        write!(out, "Value for {category}: ").context("Unable to write to the console")?;
        out.flush().context("Unable to flush the console")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| CpiError::Interrupted(format!("unable to read input: {e}")))?;
        if read == 0 {
            return Err(CpiError::Interrupted(format!(
                "input ended before a value for '{category}' was given"
            ))
            .into());
        }

        match parse_weight(&line) {
            Ok(weight) => {
                debug!("{category} = {weight}");
                weights.push(weight);
            }
            Err(e) => {
                writeln!(out, "{e}").context("Unable to write to the console")?;
                return Err(e.into());
            }
        }
    }
    Ok(weights)
}

/// Validates weights given up front (e.g. on the command line) with the same rules as
/// `collect_weights`.
pub fn weights_from_args<S>(categories: &[&str], values: &[S]) -> Result<Vec<u8>>
where
    S: AsRef<str>,
{
    anyhow::ensure!(
        values.len() == categories.len(),
        "Expected {} weights, one for each of: {}; got {}",
        categories.len(),
        categories.join(", "),
        values.len()
    );
    let weights = values
        .iter()
        .map(|v| parse_weight(v.as_ref()))
        .collect::<std::result::Result<Vec<u8>, CpiError>>()?;
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MAIN_CATEGORIES;
    use std::io::Cursor;

    fn run(input: &str) -> (Result<Vec<u8>>, String) {
        let mut out = Vec::new();
        let result = collect_weights(&MAIN_CATEGORIES, Cursor::new(input), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_collect_all_weights() {
        let (result, out) = run("10\n20\n0\n100\n 5 \n6\n7\n8\n9\n10\n");
        assert_eq!(result.unwrap(), vec![10, 20, 0, 100, 5, 6, 7, 8, 9, 10]);
        assert!(out.contains(INTRO));
        assert!(out.contains("Value for Food: "));
        assert!(out.contains("Value for Miscellaneous Goods & Services: "));
    }

    #[test]
    fn test_out_of_range_stops_collection() {
        for bad in ["101", "-1"] {
            let (result, out) = run(&format!("10\n{bad}\n10\n"));
            let err = result.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<CpiError>(),
                Some(CpiError::OutOfRange(_))
            ));
            assert!(out.contains("Invalid input! Please enter a numeric value between 0 and 100."));
            assert!(!out.contains("Value for Housing & Utilities"));
        }
    }

    #[test]
    fn test_not_an_integer_stops_collection() {
        let (result, out) = run("abc\n");
        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<CpiError>(),
            Some(&CpiError::NotAnInteger("abc".to_string()))
        );
        assert!(out.contains("Invalid input! Please enter an integer."));
    }

    #[test]
    fn test_closed_input_aborts() {
        let (result, _) = run("10\n20\n");
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CpiError>(),
            Some(CpiError::Interrupted(msg)) if msg.contains("Housing & Utilities")
        ));
    }

    #[test]
    fn test_weights_from_args() {
        let values = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"];
        assert_eq!(
            weights_from_args(&MAIN_CATEGORIES, &values).unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
        );
        assert!(weights_from_args(&MAIN_CATEGORIES, &values[..9]).is_err());

        let mut bad = values;
        bad[3] = "101";
        let err = weights_from_args(&MAIN_CATEGORIES, &bad).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CpiError>(),
            Some(CpiError::OutOfRange(101))
        ));
    }
}
