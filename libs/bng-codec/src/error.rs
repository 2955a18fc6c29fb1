//! Error types for bng-codec

use serde::Serialize;
use thiserror::Error;

/// Result type for codec and datum operations
pub type Result<T> = std::result::Result<T, BngError>;

/// Grid reference and coordinate conversion errors
///
/// The `Display` text of the first three variants is shown to end users
/// verbatim by the validator, so it must not change.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BngError {
    /// Reference string has the wrong total length
    #[error("Input data must be exactly {expected} characters long.")]
    Length { expected: usize, actual: usize },

    /// First two characters are not a known 100 km square
    #[error("Invalid grid square identifier in input data.")]
    InvalidGridSquare(String),

    /// Characters after the grid square are not a plain unsigned integer
    #[error("Numeric part of the input data is not a valid integer.")]
    NumericFormat(String),

    /// Projected point lies outside the 700 km x 1300 km national grid
    #[error("Point ({easting:.3}, {northing:.3}) lies outside the national grid extent")]
    OutOfGrid { easting: f64, northing: f64 },

    /// Coordinate cannot be transformed between OSGB36 and WGS84
    #[error("Coordinate out of datum range: {0}")]
    OutOfDatumRange(String),

    /// GeoJSON payload does not carry a usable point
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Anything not covered above
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Failure classification exposed to validation consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BngErrorKind {
    Length,
    InvalidGridSquare,
    NumericFormat,
    OutOfGrid,
    OutOfDatumRange,
    InvalidGeometry,
    Unexpected,
}

impl BngError {
    pub fn out_of_datum_range(msg: impl Into<String>) -> Self {
        BngError::OutOfDatumRange(msg.into())
    }

    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        BngError::InvalidGeometry(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        BngError::Unexpected(msg.into())
    }

    pub fn kind(&self) -> BngErrorKind {
        match self {
            BngError::Length { .. } => BngErrorKind::Length,
            BngError::InvalidGridSquare(_) => BngErrorKind::InvalidGridSquare,
            BngError::NumericFormat(_) => BngErrorKind::NumericFormat,
            BngError::OutOfGrid { .. } => BngErrorKind::OutOfGrid,
            BngError::OutOfDatumRange(_) => BngErrorKind::OutOfDatumRange,
            BngError::InvalidGeometry(_) => BngErrorKind::InvalidGeometry,
            BngError::Unexpected(_) => BngErrorKind::Unexpected,
        }
    }
}

impl From<serde_json::Error> for BngError {
    fn from(err: serde_json::Error) -> Self {
        BngError::InvalidGeometry(err.to_string())
    }
}
