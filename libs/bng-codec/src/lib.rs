//! British National Grid codec
//!
//! Provides the conversions needed to store a location both as a BNG
//! reference and as a WGS84 point:
//! - grid reference encode/decode over the 91 lettered 100 km squares
//! - OSGB36 National Grid <-> WGS84 datum transform
//! - validation of stored reference values
//! - the single-point GeoJSON interchange type

pub mod datum;
pub mod error;
pub mod geojson;
pub mod grid;
pub mod types;
pub mod validation;

pub use datum::{geographic_to_projected, projected_to_geographic, DatumTransform};
pub use error::{BngError, BngErrorKind, Result};
pub use geojson::FeatureCollection;
pub use grid::{decode, encode, normalize, GridRefCodec, GridSquare, Resolution};
pub use types::{GeographicPoint, ProjectedPoint};
pub use validation::{validate, BngValidator, ValidationError};

/// Grid reference -> WGS84 point using the given codec
pub fn reference_to_point(codec: &GridRefCodec, reference: &str) -> Result<GeographicPoint> {
    projected_to_geographic(codec.decode(reference)?)
}

/// WGS84 point -> grid reference using the given codec
pub fn point_to_reference(codec: &GridRefCodec, point: GeographicPoint) -> Result<String> {
    codec.encode(geographic_to_projected(point)?)
}
