//! Datum Transform
//!
//! Converts OSGB36 National Grid coordinates to WGS84 longitude/latitude and back:
//! 1. Transverse Mercator projection on the Airy 1830 ellipsoid
//! 2. Geodetic <-> geocentric cartesian coordinates
//! 3. Seven-parameter Helmert shift between OSGB36 and WGS84
//!
//! Formulas and constants follow the Ordnance Survey publication
//! "A guide to coordinate systems in Great Britain". The Helmert shift is
//! good to a few metres against OSTN15. Grid -> WGS84 is solved against the
//! forward path, so projecting its result lands back on the input grid point.

use crate::error::{BngError, Result};
use crate::types::{GeographicPoint, ProjectedPoint};
use tracing::trace;

/// Iteration cap for the meridional arc and geodetic latitude solvers
const MAX_ITERATIONS: usize = 64;

/// Meridional arc residual accepted by the inverse projection (0.01 mm)
const ARC_TOLERANCE_M: f64 = 1e-5;

/// Latitude change accepted by the cartesian -> geodetic solver (~6 um)
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

/// Grid residual accepted when solving grid -> WGS84 against the forward path
const GRID_TOLERANCE_M: f64 = 1e-6;

const ARCSECONDS_PER_RADIAN: f64 = 206_264.806_247_096_36;

// ============================================================================
// Ellipsoids and cartesian coordinates
// ============================================================================

/// Reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major: f64,
    pub semi_minor: f64,
}

/// Earth-centred, earth-fixed coordinates in metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cartesian {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ellipsoid {
    pub const AIRY_1830: Ellipsoid = Ellipsoid {
        semi_major: 6_377_563.396,
        semi_minor: 6_356_256.909,
    };

    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major: 6_378_137.0,
        semi_minor: 6_356_752.314_245,
    };

    pub fn eccentricity_squared(&self) -> f64 {
        1.0 - (self.semi_minor * self.semi_minor) / (self.semi_major * self.semi_major)
    }

    /// Geodetic (radians, metres above ellipsoid) to cartesian
    pub fn geodetic_to_cartesian(&self, latitude: f64, longitude: f64, height: f64) -> Cartesian {
        let e2 = self.eccentricity_squared();
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let nu = self.semi_major / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        Cartesian {
            x: (nu + height) * cos_lat * longitude.cos(),
            y: (nu + height) * cos_lat * longitude.sin(),
            z: ((1.0 - e2) * nu + height) * sin_lat,
        }
    }

    /// Cartesian to geodetic (latitude, longitude) in radians; height is dropped
    pub fn cartesian_to_geodetic(&self, point: Cartesian) -> Result<(f64, f64)> {
        let e2 = self.eccentricity_squared();
        let p = point.x.hypot(point.y);
        let longitude = point.y.atan2(point.x);
        let mut latitude = point.z.atan2(p * (1.0 - e2));

        for _ in 0..MAX_ITERATIONS {
            let sin_lat = latitude.sin();
            let nu = self.semi_major / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            let next = (point.z + e2 * nu * sin_lat).atan2(p);
            if (next - latitude).abs() < LATITUDE_TOLERANCE_RAD {
                return Ok((next, longitude));
            }
            latitude = next;
        }

        Err(BngError::out_of_datum_range(format!(
            "geodetic latitude did not converge for cartesian ({:.3}, {:.3}, {:.3})",
            point.x, point.y, point.z
        )))
    }
}

// ============================================================================
// Helmert shift
// ============================================================================

/// Seven-parameter similarity transform between two datums
///
/// Translations in metres, scale in parts per million, rotations in arc-seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmertParams {
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub scale_ppm: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl HelmertParams {
    /// Published OS parameters for WGS84 (ETRS89) -> OSGB36
    pub const WGS84_TO_OSGB36: HelmertParams = HelmertParams {
        tx: -446.448,
        ty: 125.157,
        tz: -542.060,
        scale_ppm: 20.4894,
        rx: -0.1502,
        ry: -0.2470,
        rz: -0.8421,
    };

    fn scale(&self) -> f64 {
        1.0 + self.scale_ppm * 1e-6
    }

    /// Rotation vector in radians
    fn rotation(&self) -> (f64, f64, f64) {
        (
            self.rx / ARCSECONDS_PER_RADIAN,
            self.ry / ARCSECONDS_PER_RADIAN,
            self.rz / ARCSECONDS_PER_RADIAN,
        )
    }

    pub fn apply(&self, point: Cartesian) -> Cartesian {
        let s = self.scale();
        let (rx, ry, rz) = self.rotation();
        let Cartesian { x, y, z } = point;

        Cartesian {
            x: self.tx + s * x - rz * y + ry * z,
            y: self.ty + rz * x + s * y - rx * z,
            z: self.tz - ry * x + rx * y + s * z,
        }
    }

    /// Exact inverse of [`apply`](Self::apply)
    ///
    /// The linear part is `s*I + W` with `W` the cross-product matrix of the
    /// rotation vector `w`, whose inverse is
    /// `(s^2*I - s*W + w*w^T) / (s * (s^2 + |w|^2))`.
    pub fn apply_inverse(&self, point: Cartesian) -> Cartesian {
        let s = self.scale();
        let (rx, ry, rz) = self.rotation();
        let (vx, vy, vz) = (point.x - self.tx, point.y - self.ty, point.z - self.tz);

        let cross = (ry * vz - rz * vy, rz * vx - rx * vz, rx * vy - ry * vx);
        let dot = rx * vx + ry * vy + rz * vz;
        let denom = s * (s * s + rx * rx + ry * ry + rz * rz);

        Cartesian {
            x: (s * s * vx - s * cross.0 + rx * dot) / denom,
            y: (s * s * vy - s * cross.1 + ry * dot) / denom,
            z: (s * s * vz - s * cross.2 + rz * dot) / denom,
        }
    }
}

// ============================================================================
// Transverse Mercator
// ============================================================================

/// Transverse Mercator projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    pub ellipsoid: Ellipsoid,
    /// Scale factor on the central meridian (F0)
    pub scale_factor: f64,
    /// True origin latitude in degrees
    pub origin_latitude: f64,
    /// True origin longitude (central meridian) in degrees
    pub origin_longitude: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl TransverseMercator {
    pub const NATIONAL_GRID: TransverseMercator = TransverseMercator {
        ellipsoid: Ellipsoid::AIRY_1830,
        scale_factor: 0.999_601_271_7,
        origin_latitude: 49.0,
        origin_longitude: -2.0,
        false_easting: 400_000.0,
        false_northing: -100_000.0,
    };

    fn third_flattening(&self) -> f64 {
        let Ellipsoid {
            semi_major: a,
            semi_minor: b,
        } = self.ellipsoid;
        (a - b) / (a + b)
    }

    /// Developed meridional arc from the origin latitude to `latitude` (radians)
    fn meridional_arc(&self, latitude: f64) -> f64 {
        let n = self.third_flattening();
        let n2 = n * n;
        let n3 = n2 * n;
        let lat0 = self.origin_latitude.to_radians();
        let diff = latitude - lat0;
        let sum = latitude + lat0;

        self.ellipsoid.semi_minor
            * self.scale_factor
            * ((1.0 + n + 1.25 * n2 + 1.25 * n3) * diff
                - (3.0 * n + 3.0 * n2 + 21.0 / 8.0 * n3) * diff.sin() * sum.cos()
                + (15.0 / 8.0 * n2 + 15.0 / 8.0 * n3) * (2.0 * diff).sin() * (2.0 * sum).cos()
                - 35.0 / 24.0 * n3 * (3.0 * diff).sin() * (3.0 * sum).cos())
    }

    /// Radii of curvature (nu, rho) and eta^2 at a latitude
    fn curvature(&self, latitude: f64) -> (f64, f64, f64) {
        let a = self.ellipsoid.semi_major;
        let e2 = self.ellipsoid.eccentricity_squared();
        let sin_lat = latitude.sin();
        let denom = 1.0 - e2 * sin_lat * sin_lat;
        let nu = a * self.scale_factor / denom.sqrt();
        let rho = a * self.scale_factor * (1.0 - e2) / denom.powf(1.5);
        (nu, rho, nu / rho - 1.0)
    }

    /// Project geodetic latitude/longitude (radians) on this ellipsoid
    pub fn forward(&self, latitude: f64, longitude: f64) -> ProjectedPoint {
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let tan_lat = latitude.tan();
        let tan2 = tan_lat * tan_lat;
        let tan4 = tan2 * tan2;
        let (nu, rho, eta2) = self.curvature(latitude);
        let m = self.meridional_arc(latitude);

        let i = m + self.false_northing;
        let ii = nu / 2.0 * sin_lat * cos_lat;
        let iii = nu / 24.0 * sin_lat * cos_lat.powi(3) * (5.0 - tan2 + 9.0 * eta2);
        let iiia = nu / 720.0 * sin_lat * cos_lat.powi(5) * (61.0 - 58.0 * tan2 + tan4);
        let iv = nu * cos_lat;
        let v = nu / 6.0 * cos_lat.powi(3) * (nu / rho - tan2);
        let vi = nu / 120.0
            * cos_lat.powi(5)
            * (5.0 - 18.0 * tan2 + tan4 + 14.0 * eta2 - 58.0 * tan2 * eta2);

        let dl = longitude - self.origin_longitude.to_radians();
        let dl2 = dl * dl;

        ProjectedPoint {
            easting: self.false_easting + iv * dl + v * dl * dl2 + vi * dl * dl2 * dl2,
            northing: i + ii * dl2 + iii * dl2 * dl2 + iiia * dl2 * dl2 * dl2,
        }
    }

    /// Inverse projection to geodetic (latitude, longitude) in radians
    pub fn inverse(&self, point: ProjectedPoint) -> Result<(f64, f64)> {
        let a = self.ellipsoid.semi_major;
        let target = point.northing - self.false_northing;

        let mut latitude = self.origin_latitude.to_radians();
        let mut arc = 0.0;
        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            latitude += (target - arc) / (a * self.scale_factor);
            arc = self.meridional_arc(latitude);
            if (target - arc).abs() < ARC_TOLERANCE_M {
                converged = true;
                break;
            }
        }

        if !converged || !latitude.is_finite() || latitude.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err(BngError::out_of_datum_range(format!(
                "meridional arc did not converge for {}",
                point
            )));
        }

        let cos_lat = latitude.cos();
        let tan_lat = latitude.tan();
        let tan2 = tan_lat * tan_lat;
        let tan4 = tan2 * tan2;
        let tan6 = tan4 * tan2;
        let (nu, rho, eta2) = self.curvature(latitude);
        let nu3 = nu.powi(3);
        let nu5 = nu.powi(5);
        let nu7 = nu.powi(7);

        let vii = tan_lat / (2.0 * rho * nu);
        let viii = tan_lat / (24.0 * rho * nu3) * (5.0 + 3.0 * tan2 + eta2 - 9.0 * tan2 * eta2);
        let ix = tan_lat / (720.0 * rho * nu5) * (61.0 + 90.0 * tan2 + 45.0 * tan4);
        let x = 1.0 / (cos_lat * nu);
        let xi = 1.0 / (cos_lat * 6.0 * nu3) * (nu / rho + 2.0 * tan2);
        let xii = 1.0 / (cos_lat * 120.0 * nu5) * (5.0 + 28.0 * tan2 + 24.0 * tan4);
        let xiia = 1.0 / (cos_lat * 5040.0 * nu7)
            * (61.0 + 662.0 * tan2 + 1320.0 * tan4 + 720.0 * tan6);

        let de = point.easting - self.false_easting;
        let de2 = de * de;
        let de3 = de2 * de;
        let de5 = de3 * de2;

        let lat = latitude - vii * de2 + viii * de2 * de2 - ix * de3 * de3;
        let lon =
            self.origin_longitude.to_radians() + x * de - xi * de3 + xii * de5 - xiia * de5 * de2;
        Ok((lat, lon))
    }
}

// ============================================================================
// Datum transform
// ============================================================================

/// Longitude/latitude window (degrees) a transform accepts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeographicExtent {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl GeographicExtent {
    /// Covers every corner of the 700 km x 1300 km grid with some margin
    pub const NATIONAL_GRID: GeographicExtent = GeographicExtent {
        min_longitude: -10.0,
        max_longitude: 4.0,
        min_latitude: 49.0,
        max_latitude: 62.0,
    };

    pub fn contains(&self, point: &GeographicPoint) -> bool {
        (self.min_longitude..=self.max_longitude).contains(&point.longitude)
            && (self.min_latitude..=self.max_latitude).contains(&point.latitude)
    }
}

/// National Grid <-> WGS84 transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumTransform {
    projection: TransverseMercator,
    wgs84_to_grid: HelmertParams,
    geographic_ellipsoid: Ellipsoid,
    extent: GeographicExtent,
}

impl Default for DatumTransform {
    fn default() -> Self {
        Self::NATIONAL_GRID
    }
}

impl DatumTransform {
    pub const NATIONAL_GRID: DatumTransform = DatumTransform {
        projection: TransverseMercator::NATIONAL_GRID,
        wgs84_to_grid: HelmertParams::WGS84_TO_OSGB36,
        geographic_ellipsoid: Ellipsoid::WGS84,
        extent: GeographicExtent::NATIONAL_GRID,
    };

    pub fn extent(&self) -> GeographicExtent {
        self.extent
    }

    /// ProjectedToGeographic: grid easting/northing -> WGS84 degrees
    ///
    /// The inverse series is refined until [`to_projected`](Self::to_projected)
    /// of the result reproduces `point` to within a micrometre.
    pub fn to_geographic(self, point: ProjectedPoint) -> Result<GeographicPoint> {
        if !point.easting.is_finite() || !point.northing.is_finite() {
            return Err(BngError::out_of_datum_range(format!(
                "non-finite grid coordinate {}",
                point
            )));
        }

        let mut target = point;
        let mut geodetic = self.unproject(target)?;
        for _ in 0..MAX_ITERATIONS {
            let (latitude, longitude) = geodetic;
            let projected = self.project(latitude, longitude)?;
            let de = point.easting - projected.easting;
            let dn = point.northing - projected.northing;
            if de.hypot(dn) < GRID_TOLERANCE_M {
                let geographic =
                    GeographicPoint::new(longitude.to_degrees(), latitude.to_degrees());
                trace!(%point, %geographic, "grid -> wgs84");
                return Ok(geographic);
            }

            target = ProjectedPoint::new(target.easting + de, target.northing + dn);
            geodetic = self.unproject(target)?;
        }

        Err(BngError::out_of_datum_range(format!(
            "grid -> wgs84 did not converge for {}",
            point
        )))
    }

    /// GeographicToProjected: WGS84 degrees -> grid easting/northing
    pub fn to_projected(self, point: GeographicPoint) -> Result<ProjectedPoint> {
        if !point.is_finite() {
            return Err(BngError::out_of_datum_range(format!(
                "non-finite coordinate {}",
                point
            )));
        }
        if !self.extent.contains(&point) {
            return Err(BngError::out_of_datum_range(format!(
                "{} lies outside the OSGB36 window (lon {}..{}, lat {}..{})",
                point,
                self.extent.min_longitude,
                self.extent.max_longitude,
                self.extent.min_latitude,
                self.extent.max_latitude
            )));
        }

        let projected = self.project(point.latitude.to_radians(), point.longitude.to_radians())?;
        trace!(%point, %projected, "wgs84 -> grid");
        Ok(projected)
    }

    /// WGS84 (radians) -> grid, without the window check
    fn project(&self, latitude: f64, longitude: f64) -> Result<ProjectedPoint> {
        let wgs84_cartesian =
            self.geographic_ellipsoid.geodetic_to_cartesian(latitude, longitude, 0.0);
        let grid_cartesian = self.wgs84_to_grid.apply(wgs84_cartesian);
        let (latitude, longitude) =
            self.projection.ellipsoid.cartesian_to_geodetic(grid_cartesian)?;
        Ok(self.projection.forward(latitude, longitude))
    }

    /// Grid -> WGS84 (radians) through the inverse series
    fn unproject(&self, point: ProjectedPoint) -> Result<(f64, f64)> {
        let (latitude, longitude) = self.projection.inverse(point)?;
        let grid_cartesian =
            self.projection.ellipsoid.geodetic_to_cartesian(latitude, longitude, 0.0);
        let wgs84_cartesian = self.wgs84_to_grid.apply_inverse(grid_cartesian);
        self.geographic_ellipsoid.cartesian_to_geodetic(wgs84_cartesian)
    }
}

/// ProjectedToGeographic with the National Grid transform
pub fn projected_to_geographic(point: ProjectedPoint) -> Result<GeographicPoint> {
    DatumTransform::NATIONAL_GRID.to_geographic(point)
}

/// GeographicToProjected with the National Grid transform
pub fn geographic_to_projected(point: GeographicPoint) -> Result<ProjectedPoint> {
    DatumTransform::NATIONAL_GRID.to_projected(point)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    fn dms(degrees: f64, minutes: f64, seconds: f64) -> f64 {
        degrees + minutes / 60.0 + seconds / 3600.0
    }

    #[test]
    fn test_os_worked_example_forward() {
        // OS guide, annex C: Airy 1830 geodetic -> National Grid
        let lat = dms(52.0, 39.0, 27.2531).to_radians();
        let lon = dms(1.0, 43.0, 4.5177).to_radians();
        let p = TransverseMercator::NATIONAL_GRID.forward(lat, lon);

        assert!((p.easting - 651_409.903).abs() < 1e-3, "easting {}", p.easting);
        assert!((p.northing - 313_177.270).abs() < 1e-3, "northing {}", p.northing);
    }

    #[test]
    fn test_os_worked_example_inverse() {
        let (lat, lon) = TransverseMercator::NATIONAL_GRID
            .inverse(ProjectedPoint::new(651_409.903, 313_177.270))
            .unwrap();

        // 1e-7 degrees is about 1 cm
        assert!((lat.to_degrees() - dms(52.0, 39.0, 27.2531)).abs() < 1e-7);
        assert!((lon.to_degrees() - dms(1.0, 43.0, 4.5177)).abs() < 1e-7);
    }

    #[test]
    fn test_bletchley_park() {
        let projected =
            geographic_to_projected(GeographicPoint::new(-0.741_320_5, 51.997_064_8)).unwrap();
        assert!((projected.easting - 486_512.383).abs() < 0.01, "{}", projected);
        assert!((projected.northing - 233_927.682).abs() < 0.01, "{}", projected);
    }

    #[test]
    fn test_helmert_inverse_roundtrip() {
        let params = HelmertParams::WGS84_TO_OSGB36;
        for (lat, lon) in [(52.0_f64, -1.5_f64), (49.5, -6.0), (60.8, -0.8), (51.0, 1.7)] {
            let original =
                Ellipsoid::WGS84.geodetic_to_cartesian(lat.to_radians(), lon.to_radians(), 0.0);
            let shifted = params.apply(original);

            let back = params.apply_inverse(shifted);
            let drift = (back.x - original.x).hypot(back.y - original.y).hypot(back.z - original.z);
            assert!(drift < 1e-4, "drift {} at {}, {}", drift, lat, lon);

            let forward = params.apply(params.apply_inverse(original));
            let drift = (forward.x - original.x)
                .hypot(forward.y - original.y)
                .hypot(forward.z - original.z);
            assert!(drift < 1e-4, "drift {} at {}, {}", drift, lat, lon);
        }
    }

    #[test]
    fn test_cartesian_roundtrip() {
        let lat = 55.5_f64.to_radians();
        let lon = (-3.25_f64).to_radians();
        let c = Ellipsoid::AIRY_1830.geodetic_to_cartesian(lat, lon, 0.0);
        let (lat2, lon2) = Ellipsoid::AIRY_1830.cartesian_to_geodetic(c).unwrap();

        assert!((lat - lat2).abs() < 1e-11);
        assert!((lon - lon2).abs() < 1e-12);
    }

    #[test]
    fn test_projected_roundtrip_is_exact() {
        for (e, n) in [
            (0.0, 0.0),
            (325_000.0, 673_000.0),
            (486_512.0, 233_928.0),
            (699_999.0, 1_299_999.0),
            (100_000.0, 1_200_000.0),
        ] {
            let p = ProjectedPoint::new(e, n);
            let g = projected_to_geographic(p).unwrap();
            let back = geographic_to_projected(g).unwrap();
            assert!(p.distance_to(&back) < 1e-5, "{} -> {} -> {}", p, g, back);
        }
    }

    #[test]
    fn test_outside_datum_window() {
        // St Peter's Square, Rome
        let err = geographic_to_projected(GeographicPoint::new(12.457_289_59, 41.902_227_87))
            .unwrap_err();
        assert!(matches!(err, BngError::OutOfDatumRange(_)));

        let err = geographic_to_projected(GeographicPoint::new(f64::NAN, 52.0)).unwrap_err();
        assert!(matches!(err, BngError::OutOfDatumRange(_)));

        let err = projected_to_geographic(ProjectedPoint::new(f64::INFINITY, 0.0)).unwrap_err();
        assert!(matches!(err, BngError::OutOfDatumRange(_)));
    }

    #[test]
    fn test_extent_covers_grid_corners() {
        let extent = DatumTransform::NATIONAL_GRID.extent();
        for (e, n) in [
            (0.0, 0.0),
            (0.0, 1_300_000.0),
            (700_000.0, 0.0),
            (700_000.0, 1_300_000.0),
        ] {
            let corner = projected_to_geographic(ProjectedPoint::new(e, n)).unwrap();
            assert!(extent.contains(&corner), "corner {} outside window", corner);
        }
    }
}
