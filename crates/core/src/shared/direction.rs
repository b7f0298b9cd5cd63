use std::fmt;
use std::str::FromStr;

use crate::shared::error::ExtractError;

/// Direction the camera travelled relative to the desired output.
///
/// `Reverse` mirrors every saved frame and numbers the source indices from
/// the end. Decoding itself always runs front to back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl FromStr for Direction {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Direction::Forward),
            "reverse" => Ok(Direction::Reverse),
            other => Err(ExtractError::Configuration(format!(
                "direction must be 'forward' or 'reverse', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Reverse => f.write_str("reverse"),
        }
    }
}
