//! Parsers for the values typed at the console prompts.

use mission_control_core::{Coordinate, Direction, ParseCoordinateError, ParseDirectionError};
use thiserror::Error;

/// Failure to interpret a line typed by the operator.
///
/// Every variant renders as the same terse console message; the source is
/// kept for logging.
#[derive(Clone, Debug, PartialEq, Error)]
pub(crate) enum InputError {
    /// The line was not an `X,Y` coordinate.
    #[error("Invalid input.")]
    Coordinate(#[source] ParseCoordinateError),
    /// The line was not one of `n`, `s`, `e` or `w`.
    #[error("Invalid input.")]
    Direction(#[source] ParseDirectionError),
    /// The line was not a number greater than zero.
    #[error("Invalid input.")]
    Distance(String),
    /// The line was not exactly one character long.
    #[error("Invalid input.")]
    MenuCode(String),
}

/// Parses an `X,Y` coordinate.
pub(crate) fn parse_coordinate(line: &str) -> Result<Coordinate, InputError> {
    line.trim().parse().map_err(InputError::Coordinate)
}

/// Parses a facing given as `n`, `s`, `e` or `w` in either case.
pub(crate) fn parse_direction(line: &str) -> Result<Direction, InputError> {
    line.trim().parse().map_err(InputError::Direction)
}

/// Parses a strictly positive distance such as a range or a depth.
pub(crate) fn parse_distance(line: &str) -> Result<f64, InputError> {
    let trimmed = line.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value > 0.0 => Ok(value),
        _ => Err(InputError::Distance(trimmed.to_owned())),
    }
}

/// Parses a single-character menu code, folding it to lower case.
pub(crate) fn parse_option(line: &str) -> Result<char, InputError> {
    let trimmed = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(code), None) => Ok(code.to_ascii_lowercase()),
        _ => Err(InputError::MenuCode(trimmed.to_owned())),
    }
}
