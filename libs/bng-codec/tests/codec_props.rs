//! Property tests for the grid reference codec and the datum transform

#![allow(clippy::disallowed_methods)]

use bng_codec::{
    decode, encode, geographic_to_projected, point_to_reference, projected_to_geographic,
    reference_to_point, validate, GridRefCodec, GridSquare, ProjectedPoint, Resolution,
};
use proptest::prelude::*;
use serde_json::Value;

fn square_strategy() -> impl Strategy<Value = GridSquare> {
    let squares: Vec<GridSquare> = GridSquare::all().collect();
    proptest::sample::select(squares)
}

fn resolution_strategy() -> impl Strategy<Value = Resolution> {
    prop_oneof![
        Just(Resolution::TenKilometres),
        Just(Resolution::Kilometre),
        Just(Resolution::HundredMetres),
        Just(Resolution::TenMetres),
        Just(Resolution::Metre),
    ]
}

/// Valid 1 m reference strings
fn reference_strategy() -> impl Strategy<Value = String> {
    (square_strategy(), 0u32..100_000, 0u32..100_000)
        .prop_map(|(square, e, n)| format!("{}{:05}{:05}", square, e, n))
}

/// Position as encode sees it, snapped to the millimetre
fn snapped(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn grid_point_strategy() -> impl Strategy<Value = ProjectedPoint> {
    (0.0f64..700_000.0, 0.0f64..1_300_000.0).prop_map(|(e, n)| ProjectedPoint::new(e, n))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: decoding an encoded point yields the point floored to whole metres
    #[test]
    fn prop_encode_then_decode_floors(point in grid_point_strategy()) {
        prop_assume!(snapped(point.easting) < 700_000.0 && snapped(point.northing) < 1_300_000.0);
        let reference = encode(point).unwrap();
        let decoded = decode(&reference).unwrap();
        let expected =
            ProjectedPoint::new(snapped(point.easting).floor(), snapped(point.northing).floor());
        prop_assert_eq!(decoded, expected);
    }

    /// Property: a valid reference survives decode then encode unchanged
    #[test]
    fn prop_decode_then_encode_identity(reference in reference_strategy()) {
        let point = decode(&reference).unwrap();
        prop_assert_eq!(encode(point).unwrap(), reference);
    }

    /// Property: coarser codecs name the cell that contains the point
    #[test]
    fn prop_cell_contains_point(
        point in grid_point_strategy(),
        resolution in resolution_strategy(),
    ) {
        prop_assume!(snapped(point.easting) < 700_000.0 && snapped(point.northing) < 1_300_000.0);
        let codec = GridRefCodec::new(resolution);
        let reference = codec.encode(point).unwrap();
        prop_assert_eq!(reference.len(), resolution.reference_len());

        let corner = codec.decode(&reference).unwrap();
        let size = f64::from(resolution.metres());
        let (easting, northing) = (snapped(point.easting), snapped(point.northing));
        prop_assert!(corner.easting <= easting && easting < corner.easting + size);
        prop_assert!(corner.northing <= northing && northing < corner.northing + size);
    }

    /// Property: validation is total and fail-fast for arbitrary text
    #[test]
    fn prop_validate_never_panics(input in "\\PC{0,16}") {
        let errors = validate(&Value::String(input.clone()));
        prop_assert!(errors.len() <= 1);
        prop_assert_eq!(errors.is_empty(), decode(&input).is_ok());
    }

    /// Property: grid -> WGS84 -> grid returns to the start point
    #[test]
    fn prop_datum_roundtrip(point in grid_point_strategy()) {
        let geographic = projected_to_geographic(point).unwrap();
        let back = geographic_to_projected(geographic).unwrap();
        prop_assert!(point.distance_to(&back) < 1e-5, "{} -> {} -> {}", point, geographic, back);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: reference -> point -> reference is a fixed point
    #[test]
    fn prop_reference_roundtrip_through_wgs84(reference in reference_strategy()) {
        let codec = GridRefCodec::default();
        let point = reference_to_point(&codec, &reference).unwrap();
        prop_assert_eq!(point_to_reference(&codec, point).unwrap(), reference);
    }
}
