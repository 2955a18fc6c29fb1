//! Point types shared by the codec and the datum transform

use serde::{Deserialize, Serialize};
use std::fmt;

/// Easting/northing in metres on the OSGB36 National Grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub easting: f64,
    pub northing: f64,
}

impl ProjectedPoint {
    pub const fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    /// Planar distance in metres
    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        (self.easting - other.easting).hypot(self.northing - other.northing)
    }
}

impl fmt::Display for ProjectedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E {:.3} N {:.3}", self.easting, self.northing)
    }
}

/// Longitude/latitude in decimal degrees on WGS84
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeographicPoint {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }
}

impl fmt::Display for GeographicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.longitude, self.latitude)
    }
}
