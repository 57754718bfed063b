use thiserror::Error as ThisError;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The failures that the CPI pipeline reports to the user. These are raised inside of (or as
/// context on) an `anyhow::Error`, so callers can `downcast_ref::<CpiError>()` to find out which
/// step went wrong.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum CpiError {
    /// The table source was missing, malformed, or lacked an expected column or category.
    #[error("Unable to load the CPI table: {0}")]
    Load(String),

    /// A weight was an integer, but not within 0..=100.
    #[error("Invalid input! Please enter a numeric value between 0 and 100.")]
    OutOfRange(i64),

    /// A weight could not be parsed as an integer.
    #[error("Invalid input! Please enter an integer.")]
    NotAnInteger(String),

    /// Every weight was zero so there is nothing to normalize against.
    #[error("All weights are zero, at least one category needs a positive weight")]
    ZeroWeight,

    /// Weight collection stopped before all categories had a value.
    #[error("Weight collection was interrupted: {0}")]
    Interrupted(String),
}
