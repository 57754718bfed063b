use crate::{CpiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::num::IntErrorKind;

/// The largest weight a user may give to a category.
pub const MAX_WEIGHT: u8 = 100;

/// The total that normalized weights add up to.
pub const NORMALIZED_TOTAL: f64 = 100.0;

const BANNER_WIDTH: usize = 40;

/// Parses one user-supplied weight.
///
/// # Errors
/// - `CpiError::NotAnInteger` when `text` is not an integer.
/// - `CpiError::OutOfRange` when it is an integer outside of `0..=100`.
pub fn parse_weight(text: &str) -> std::result::Result<u8, CpiError> {
    let text = text.trim();
    let value = match text.parse::<i64>() {
        Ok(value) => value,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => return Err(CpiError::OutOfRange(i64::MAX)),
            IntErrorKind::NegOverflow => return Err(CpiError::OutOfRange(i64::MIN)),
            _ => return Err(CpiError::NotAnInteger(text.to_string())),
        },
    };
    match u8::try_from(value) {
        Ok(weight) if weight <= MAX_WEIGHT => Ok(weight),
        _ => Err(CpiError::OutOfRange(value)),
    }
}

/// A user's weight for one main category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserWeight {
    category_name: String,
    raw_value: u8,
    normalized_value: f64,
}

impl UserWeight {
    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    pub fn raw_value(&self) -> u8 {
        self.raw_value
    }

    /// The share of the total, on a 0 to 100 scale.
    pub fn normalized_value(&self) -> f64 {
        self.normalized_value
    }

    /// The share of the total, on a 0 to 1 scale.
    pub fn fraction(&self) -> f64 {
        self.normalized_value / NORMALIZED_TOTAL
    }
}

/// The ordered set of weights, one per main category, rescaled to add up to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights(Vec<UserWeight>);

impl Weights {
    /// Rescales `raw` so that the weights add up to 100, keeping the order given.
    ///
    /// # Errors
    /// Returns `CpiError::ZeroWeight` when every weight is zero (or there are none).
    pub fn normalize<S>(raw: impl IntoIterator<Item = (S, u8)>) -> Result<Self>
    where
        S: Into<String>,
    {
        let raw: Vec<(String, u8)> = raw.into_iter().map(|(s, v)| (s.into(), v)).collect();
        let sum: u32 = raw.iter().map(|(_, v)| u32::from(*v)).sum();
        if sum == 0 {
            return Err(CpiError::ZeroWeight.into());
        }
        let total = f64::from(sum);
        let data = raw
            .into_iter()
            .map(|(category_name, raw_value)| UserWeight {
                category_name,
                raw_value,
                normalized_value: f64::from(raw_value) / total * NORMALIZED_TOTAL,
            })
            .collect();
        Ok(Self(data))
    }

    pub fn data(&self) -> &[UserWeight] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fractions(&self) -> Vec<f64> {
        self.0.iter().map(UserWeight::fraction).collect()
    }

    /// The weights ordered by ascending raw value. Ties keep their original order.
    pub fn sorted_by_raw(&self) -> Vec<&UserWeight> {
        let mut sorted: Vec<&UserWeight> = self.0.iter().collect();
        sorted.sort_by_key(|w| w.raw_value);
        sorted
    }

    /// The console listing of the normalized weights, one line per category.
    pub fn listing(&self) -> String {
        let banner = "#".repeat(BANNER_WIDTH);
        let mut s = format!("\n{banner}\nYour CPI Weightage refactored to 100%:\n\n");
        for w in &self.0 {
            let _ = writeln!(s, "{}: {:.1}", w.category_name, w.normalized_value);
        }
        let _ = writeln!(s, "\n{banner}");
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MAIN_CATEGORIES;

    fn weights(raw: [u8; 10]) -> Weights {
        Weights::normalize(MAIN_CATEGORIES.iter().copied().zip(raw)).unwrap()
    }

    #[test]
    fn test_parse_weight_bounds() {
        assert_eq!(parse_weight("0").unwrap(), 0);
        assert_eq!(parse_weight(" 100\n").unwrap(), 100);
        assert_eq!(parse_weight("+7").unwrap(), 7);
        assert_eq!(parse_weight("101").unwrap_err(), CpiError::OutOfRange(101));
        assert_eq!(parse_weight("-1").unwrap_err(), CpiError::OutOfRange(-1));
        assert!(matches!(
            parse_weight("99999999999999999999999").unwrap_err(),
            CpiError::OutOfRange(_)
        ));
    }

    #[test]
    fn test_parse_weight_not_an_integer() {
        assert_eq!(
            parse_weight("abc").unwrap_err(),
            CpiError::NotAnInteger("abc".to_string())
        );
        assert!(matches!(
            parse_weight("12.5").unwrap_err(),
            CpiError::NotAnInteger(_)
        ));
        assert!(matches!(
            parse_weight("").unwrap_err(),
            CpiError::NotAnInteger(_)
        ));
    }

    #[test]
    fn test_normalize_equal_weights() {
        let w = weights([10; 10]);
        for uw in w.data() {
            assert!((uw.normalized_value() - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_already_at_100() {
        let raw = [100, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let w = weights(raw);
        for (uw, r) in w.data().iter().zip(raw) {
            assert_eq!(uw.normalized_value(), f64::from(r));
        }
    }

    #[test]
    fn test_normalize_sums_to_100() {
        let samples = [
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
            [0, 0, 0, 1, 0, 0, 0, 0, 0, 0],
            [100; 10],
            [33, 33, 33, 0, 0, 0, 0, 0, 0, 1],
            [7, 0, 13, 99, 42, 5, 61, 3, 17, 88],
        ];
        for raw in samples {
            let w = weights(raw);
            let sum: f64 = w.data().iter().map(UserWeight::normalized_value).sum();
            assert!((sum - 100.0).abs() < 1e-6, "{raw:?} summed to {sum}");
            assert!(w.data().iter().all(|uw| uw.normalized_value() >= 0.0));
            let fractions: f64 = w.fractions().iter().sum();
            assert!((fractions - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_all_zero() {
        let err = Weights::normalize(MAIN_CATEGORIES.iter().copied().zip([0u8; 10])).unwrap_err();
        assert_eq!(err.downcast_ref::<CpiError>(), Some(&CpiError::ZeroWeight));
    }

    #[test]
    fn test_sorted_by_raw_is_stable() {
        let w = weights([5, 1, 5, 0, 9, 1, 5, 0, 2, 3]);
        let names: Vec<&str> = w
            .sorted_by_raw()
            .into_iter()
            .map(UserWeight::category_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "Household Durables & Services",
                "Recreation & Culture",
                "Clothing & Footwear",
                "Transport",
                "Education",
                "Miscellaneous Goods & Services",
                "Food",
                "Housing & Utilities",
                "Communication",
                "Health Care",
            ]
        );
    }

    #[test]
    fn test_listing() {
        let listing = weights([10; 10]).listing();
        assert!(listing.contains("Your CPI Weightage refactored to 100%:"));
        assert!(listing.contains("Food: 10.0\n"));
        assert!(listing.contains("Miscellaneous Goods & Services: 10.0\n"));
        assert_eq!(listing.matches(&"#".repeat(40)).count(), 2);
    }
}
