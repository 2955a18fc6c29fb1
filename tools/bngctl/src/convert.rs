//! validate / to-point / to-ref

use anyhow::{bail, Context, Result};
use bng_codec::{
    normalize, point_to_reference, reference_to_point, BngValidator, FeatureCollection,
    GeographicPoint, GridRefCodec,
};
use colored::Colorize;
use serde_json::Value;

pub fn handle_validate(codec: GridRefCodec, input: &str, as_json: bool) -> Result<()> {
    let value = if as_json {
        serde_json::from_str(input).with_context(|| format!("'{}' is not a JSON literal", input))?
    } else {
        Value::String(input.to_string())
    };

    let errors = BngValidator::new(codec).validate(&value);
    if errors.is_empty() {
        println!("{} {}", "✓".green(), input.bright_white());
        return Ok(());
    }

    for error in &errors {
        println!("{} {}: {}", "✗".red(), error.title.red(), error.message);
    }
    bail!("{} is not a valid grid reference", input)
}

pub fn handle_to_point(codec: GridRefCodec, reference: &str, geojson: bool) -> Result<()> {
    let reference = normalize(reference);
    let point = reference_to_point(&codec, &reference)?;

    if geojson {
        let collection = FeatureCollection::point(point).to_value()?;
        println!("{}", serde_json::to_string_pretty(&collection)?);
    } else {
        println!(
            "{} -> lon {:.7}, lat {:.7}",
            reference.bright_yellow(),
            point.longitude,
            point.latitude
        );
    }
    Ok(())
}

pub fn handle_to_ref(codec: GridRefCodec, longitude: f64, latitude: f64) -> Result<()> {
    let point = GeographicPoint::new(longitude, latitude);
    let reference = point_to_reference(&codec, point)?;
    println!("{} -> {}", point, reference.bright_yellow());
    Ok(())
}
