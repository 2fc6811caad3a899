use std::fmt;

/// Failure converting a flat list of numbers into controller gains.
#[derive(Debug, Clone, PartialEq)]
pub enum GainsError {
    /// The slice did not hold the expected number of values.
    Length { expected: usize, found: usize },
    /// A value was NaN or infinite.
    NonFinite { index: usize },
}

impl fmt::Display for GainsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GainsError::Length { expected, found } => {
                write!(f, "expected {} gain values, found {}", expected, found)
            }
            GainsError::NonFinite { index } => {
                write!(f, "gain value at index {} is not a finite number", index)
            }
        }
    }
}

impl std::error::Error for GainsError {}
