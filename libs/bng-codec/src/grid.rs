//! Grid Reference Codec
//!
//! Converts between grid reference strings such as `SP8651233927` and
//! absolute National Grid coordinates:
//! - Two letters select one of the 91 100 km squares
//! - The digits split evenly into easting and northing offsets inside it
//!
//! A reference names the south-west corner of a cell whose size is set by
//! the [`Resolution`]. Encoding snaps to the millimetre, then truncates
//! towards that corner.

use crate::error::{BngError, Result};
use crate::types::ProjectedPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Side length of one lettered grid square in metres
pub const SQUARE_SIZE_M: u32 = 100_000;

/// Number of 100 km columns (easting 0..700 km)
pub const GRID_COLUMNS: usize = 7;

/// Number of 100 km rows (northing 0..1300 km)
pub const GRID_ROWS: usize = 13;

/// Exclusive upper bound of the grid easting
pub const GRID_MAX_EASTING: f64 = (GRID_COLUMNS as u32 * SQUARE_SIZE_M) as f64;

/// Exclusive upper bound of the grid northing
pub const GRID_MAX_NORTHING: f64 = (GRID_ROWS as u32 * SQUARE_SIZE_M) as f64;

// ============================================================================
// Grid square table
// ============================================================================

/// Row index = northing / 100 km (south first), column index = easting / 100 km
static GRID_SQUARES: [[&str; GRID_COLUMNS]; GRID_ROWS] = [
    ["SV", "SW", "SX", "SY", "SZ", "TV", "TW"],
    ["SQ", "SR", "SS", "ST", "SU", "TQ", "TR"],
    ["SL", "SM", "SN", "SO", "SP", "TL", "TM"],
    ["SF", "SG", "SH", "SJ", "SK", "TF", "TG"],
    ["SA", "SB", "SC", "SD", "SE", "TA", "TB"],
    ["NV", "NW", "NX", "NY", "NZ", "OV", "OW"],
    ["NQ", "NR", "NS", "NT", "NU", "OQ", "OR"],
    ["NL", "NM", "NN", "NO", "NP", "OL", "OM"],
    ["NF", "NG", "NH", "NJ", "NK", "OF", "OG"],
    ["NA", "NB", "NC", "ND", "NE", "OA", "OB"],
    ["HV", "HW", "HX", "HY", "HZ", "JV", "JW"],
    ["HQ", "HR", "HS", "HT", "HU", "JQ", "JR"],
    ["HL", "HM", "HN", "HO", "HP", "JL", "JM"],
];

/// One 100 km square of the National Grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSquare {
    column: u8,
    row: u8,
}

impl GridSquare {
    /// Look up a square by its two upper-case letters
    pub fn from_letters(letters: &str) -> Option<Self> {
        GRID_SQUARES.iter().enumerate().find_map(|(row, columns)| {
            columns
                .iter()
                .position(|code| *code == letters)
                .map(|column| GridSquare {
                    column: column as u8,
                    row: row as u8,
                })
        })
    }

    /// Square containing a whole-metre grid position
    pub fn containing(easting: u32, northing: u32) -> Option<Self> {
        let column = (easting / SQUARE_SIZE_M) as usize;
        let row = (northing / SQUARE_SIZE_M) as usize;
        (column < GRID_COLUMNS && row < GRID_ROWS).then_some(GridSquare {
            column: column as u8,
            row: row as u8,
        })
    }

    pub fn letters(&self) -> &'static str {
        GRID_SQUARES[self.row as usize][self.column as usize]
    }

    /// False-origin-relative (easting, northing) of the south-west corner
    pub fn origin(&self) -> (u32, u32) {
        (
            u32::from(self.column) * SQUARE_SIZE_M,
            u32::from(self.row) * SQUARE_SIZE_M,
        )
    }

    /// All 91 squares, south-west first
    pub fn all() -> impl Iterator<Item = GridSquare> {
        (0..GRID_ROWS).flat_map(|row| {
            (0..GRID_COLUMNS).map(move |column| GridSquare {
                column: column as u8,
                row: row as u8,
            })
        })
    }
}

impl fmt::Display for GridSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letters())
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Precision of a reference, i.e. how many digits each axis carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "10km")]
    TenKilometres,
    #[serde(rename = "1km")]
    Kilometre,
    #[serde(rename = "100m")]
    HundredMetres,
    #[serde(rename = "10m")]
    TenMetres,
    #[default]
    #[serde(rename = "1m")]
    Metre,
}

impl Resolution {
    pub const fn digits_per_axis(self) -> usize {
        match self {
            Resolution::TenKilometres => 1,
            Resolution::Kilometre => 2,
            Resolution::HundredMetres => 3,
            Resolution::TenMetres => 4,
            Resolution::Metre => 5,
        }
    }

    /// Cell size in metres
    pub const fn metres(self) -> u32 {
        match self {
            Resolution::TenKilometres => 10_000,
            Resolution::Kilometre => 1_000,
            Resolution::HundredMetres => 100,
            Resolution::TenMetres => 10,
            Resolution::Metre => 1,
        }
    }

    /// Total characters of a reference: two letters plus both digit blocks
    pub const fn reference_len(self) -> usize {
        2 + 2 * self.digits_per_axis()
    }

    pub fn from_digits_per_axis(digits: usize) -> Option<Self> {
        match digits {
            1 => Some(Resolution::TenKilometres),
            2 => Some(Resolution::Kilometre),
            3 => Some(Resolution::HundredMetres),
            4 => Some(Resolution::TenMetres),
            5 => Some(Resolution::Metre),
            _ => None,
        }
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Grid reference encoder/decoder for a fixed resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridRefCodec {
    resolution: Resolution,
}

impl GridRefCodec {
    pub const fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Decode a reference into the south-west corner of its cell
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// grid square letters, then the numeric body, then the total length.
    /// Input shorter than a grid square identifier is a length failure.
    pub fn decode(&self, input: &str) -> Result<ProjectedPoint> {
        let expected = self.resolution.reference_len();
        let actual = input.chars().count();

        let (letters, digits) = match (input.get(..2), input.get(2..)) {
            (Some(letters), Some(digits)) => (letters, digits),
            _ if actual < 2 => return Err(BngError::Length { expected, actual }),
            _ => return Err(BngError::InvalidGridSquare(input.to_string())),
        };

        let square = GridSquare::from_letters(letters)
            .ok_or_else(|| BngError::InvalidGridSquare(letters.to_string()))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BngError::NumericFormat(digits.to_string()));
        }

        if actual != expected {
            return Err(BngError::Length { expected, actual });
        }

        let (easting_digits, northing_digits) = digits.split_at(self.resolution.digits_per_axis());
        let scale = self.resolution.metres();
        let easting_offset = parse_offset(easting_digits)? * scale;
        let northing_offset = parse_offset(northing_digits)? * scale;

        let (origin_easting, origin_northing) = square.origin();
        let point = ProjectedPoint::new(
            f64::from(origin_easting + easting_offset),
            f64::from(origin_northing + northing_offset),
        );

        debug!(
            reference = input,
            easting = point.easting,
            northing = point.northing,
            "decoded grid reference"
        );
        Ok(point)
    }

    /// Encode an absolute grid position, truncating to the resolution
    pub fn encode(&self, point: ProjectedPoint) -> Result<String> {
        if !in_grid(point) {
            return Err(BngError::OutOfGrid {
                easting: point.easting,
                northing: point.northing,
            });
        }

        let easting = whole_metres(point.easting);
        let northing = whole_metres(point.northing);
        let square = GridSquare::containing(easting, northing).ok_or(BngError::OutOfGrid {
            easting: point.easting,
            northing: point.northing,
        })?;

        let scale = self.resolution.metres();
        let width = self.resolution.digits_per_axis();
        let reference = format!(
            "{}{:0width$}{:0width$}",
            square,
            (easting % SQUARE_SIZE_M) / scale,
            (northing % SQUARE_SIZE_M) / scale,
            width = width
        );

        debug!(
            easting = point.easting,
            northing = point.northing,
            reference = reference.as_str(),
            "encoded grid reference"
        );
        Ok(reference)
    }
}

/// Floor to whole metres after snapping to the millimetre, so a position a
/// rounding error short of a metre line stays in the cell above it
fn whole_metres(value: f64) -> u32 {
    ((value * 1000.0).round() / 1000.0).floor() as u32
}

fn parse_offset(digits: &str) -> Result<u32> {
    digits
        .parse::<u32>()
        .map_err(|e| BngError::NumericFormat(format!("{}: {}", digits, e)))
}

/// Whether a projected point falls inside the lettered grid
pub fn in_grid(point: ProjectedPoint) -> bool {
    (0.0..GRID_MAX_EASTING).contains(&point.easting)
        && (0.0..GRID_MAX_NORTHING).contains(&point.northing)
}

/// Decode with the default 1 m codec
pub fn decode(input: &str) -> Result<ProjectedPoint> {
    GridRefCodec::default().decode(input)
}

/// Encode with the default 1 m codec
pub fn encode(point: ProjectedPoint) -> Result<String> {
    GridRefCodec::default().encode(point)
}

/// Upper-case and drop ASCII whitespace, e.g. `"sp 86512 33927"` -> `"SP8651233927"`
///
/// For interactive input only; stored values are validated as given.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_reference() {
        let point = decode("NT1234567890").unwrap();
        assert_eq!(point, ProjectedPoint::new(312_345.0, 667_890.0));

        let point = decode("SP8651233928").unwrap();
        assert_eq!(point, ProjectedPoint::new(486_512.0, 233_928.0));
    }

    #[test]
    fn test_decode_error_messages() {
        let err = decode("NT12345").unwrap_err();
        assert_eq!(err.to_string(), "Input data must be exactly 12 characters long.");
        assert_eq!(
            err,
            BngError::Length {
                expected: 12,
                actual: 7
            }
        );

        let err = decode("ZZ1234567890").unwrap_err();
        assert_eq!(err.to_string(), "Invalid grid square identifier in input data.");

        let err = decode("NT12345ABCD").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Numeric part of the input data is not a valid integer."
        );
    }

    #[test]
    fn test_decode_check_order() {
        // Bad letters win over a bad body and a bad length
        assert!(matches!(
            decode("ZZ12AB").unwrap_err(),
            BngError::InvalidGridSquare(_)
        ));
        // Bad body wins over a bad length
        assert!(matches!(
            decode("NT1A").unwrap_err(),
            BngError::NumericFormat(_)
        ));
        // Too short to hold a grid square at all
        assert!(matches!(
            decode("").unwrap_err(),
            BngError::Length {
                expected: 12,
                actual: 0
            }
        ));
        assert!(matches!(
            decode("N").unwrap_err(),
            BngError::Length { actual: 1, .. }
        ));
    }

    #[test]
    fn test_decode_rejects_loose_input() {
        // Lower-case letters are not grid square identifiers
        assert!(matches!(
            decode("nt1234567890").unwrap_err(),
            BngError::InvalidGridSquare(_)
        ));
        // Signs, spaces and empty bodies are not plain integers
        assert!(matches!(
            decode("NT-234567890").unwrap_err(),
            BngError::NumericFormat(_)
        ));
        assert!(matches!(
            decode("NT 2345 7890").unwrap_err(),
            BngError::NumericFormat(_)
        ));
        assert!(matches!(decode("NT").unwrap_err(), BngError::NumericFormat(_)));
        // Multi-byte characters never panic
        assert!(matches!(
            decode("Né1234567890").unwrap_err(),
            BngError::InvalidGridSquare(_)
        ));
        assert!(matches!(
            decode("NT12345678９0").unwrap_err(),
            BngError::NumericFormat(_)
        ));
    }

    #[test]
    fn test_grid_square_table() {
        assert_eq!(GridSquare::all().count(), GRID_COLUMNS * GRID_ROWS);

        let sv = GridSquare::from_letters("SV").unwrap();
        assert_eq!(sv.origin(), (0, 0));

        let tq = GridSquare::from_letters("TQ").unwrap();
        assert_eq!(tq.origin(), (500_000, 100_000));

        let hp = GridSquare::from_letters("HP").unwrap();
        assert_eq!(hp.origin(), (400_000, 1_200_000));

        assert!(GridSquare::from_letters("ZZ").is_none());
        assert!(GridSquare::from_letters("SI").is_none());
        assert!(GridSquare::from_letters("S").is_none());
    }

    #[test]
    fn test_grid_square_lookup_is_consistent() {
        for square in GridSquare::all() {
            let (easting, northing) = square.origin();
            assert_eq!(GridSquare::containing(easting, northing), Some(square));
            assert_eq!(GridSquare::from_letters(square.letters()), Some(square));
        }
        assert!(GridSquare::containing(700_000, 0).is_none());
        assert!(GridSquare::containing(0, 1_300_000).is_none());
    }

    #[test]
    fn test_encode_truncates_to_cell_corner() {
        let reference = encode(ProjectedPoint::new(486_512.382, 233_927.682)).unwrap();
        assert_eq!(reference, "SP8651233927");

        let reference = encode(ProjectedPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(reference, "SV0000000000");

        let reference = encode(ProjectedPoint::new(699_999.9, 1_299_999.9)).unwrap();
        assert_eq!(reference, "JM9999999999");
    }

    #[test]
    fn test_encode_snaps_to_millimetre_before_truncating() {
        let reference = encode(ProjectedPoint::new(486_511.999_7, 233_927.999_999)).unwrap();
        assert_eq!(reference, "SP8651233928");

        let reference = encode(ProjectedPoint::new(486_511.998, 233_927.4)).unwrap();
        assert_eq!(reference, "SP8651133927");

        let err = encode(ProjectedPoint::new(699_999.999_9, 0.0)).unwrap_err();
        assert!(matches!(err, BngError::OutOfGrid { .. }));
    }

    #[test]
    fn test_encode_out_of_grid() {
        for point in [
            ProjectedPoint::new(-0.5, 10.0),
            ProjectedPoint::new(10.0, -1.0),
            ProjectedPoint::new(700_000.0, 10.0),
            ProjectedPoint::new(10.0, 1_300_000.0),
            ProjectedPoint::new(f64::NAN, 10.0),
            ProjectedPoint::new(10.0, f64::INFINITY),
        ] {
            assert!(
                matches!(encode(point), Err(BngError::OutOfGrid { .. })),
                "{:?} should be out of grid",
                point
            );
        }
    }

    #[test]
    fn test_coarser_resolutions() {
        let codec = GridRefCodec::new(Resolution::HundredMetres);
        assert_eq!(
            codec.encode(ProjectedPoint::new(486_512.0, 233_928.0)).unwrap(),
            "SP865339"
        );
        assert_eq!(
            codec.decode("SP865339").unwrap(),
            ProjectedPoint::new(486_500.0, 233_900.0)
        );

        let codec = GridRefCodec::new(Resolution::TenKilometres);
        assert_eq!(codec.decode("TQ38").unwrap(), ProjectedPoint::new(530_000.0, 180_000.0));

        let err = codec.decode("TQ3812").unwrap_err();
        assert_eq!(err.to_string(), "Input data must be exactly 4 characters long.");
    }

    #[test]
    fn test_resolution_digits() {
        for digits in 1..=5 {
            let resolution = Resolution::from_digits_per_axis(digits).unwrap();
            assert_eq!(resolution.digits_per_axis(), digits);
            assert_eq!(resolution.reference_len(), 2 + 2 * digits);
            assert_eq!(resolution.metres(), 10u32.pow(5 - digits as u32));
        }
        assert!(Resolution::from_digits_per_axis(0).is_none());
        assert!(Resolution::from_digits_per_axis(6).is_none());
        assert_eq!(Resolution::default(), Resolution::Metre);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("sp 86512 33927"), "SP8651233927");
        assert_eq!(normalize("\tNT1234567890\n"), "NT1234567890");
    }
}
