//! Single-point GeoJSON FeatureCollection used as the geometry interchange format

use crate::error::{BngError, Result};
use crate::types::GeographicPoint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const POINT: &str = "Point";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    Feature,
}

/// GeoJSON FeatureCollection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

/// Geometry object; coordinates are kept raw so non-point geometries still parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Value,
}

impl Geometry {
    pub fn point(point: GeographicPoint) -> Self {
        Self {
            kind: POINT.to_string(),
            coordinates: Value::from(vec![point.longitude, point.latitude]),
        }
    }

    /// Read `[lon, lat]` from a Point geometry; extra ordinates (altitude) are ignored
    pub fn as_point(&self) -> Result<GeographicPoint> {
        if self.kind != POINT {
            return Err(BngError::invalid_geometry(format!(
                "expected a Point geometry, found {}",
                self.kind
            )));
        }

        let ordinates = self
            .coordinates
            .as_array()
            .ok_or_else(|| BngError::invalid_geometry("point coordinates must be an array"))?;

        match (
            ordinates.first().and_then(Value::as_f64),
            ordinates.get(1).and_then(Value::as_f64),
        ) {
            (Some(longitude), Some(latitude)) => Ok(GeographicPoint::new(longitude, latitude)),
            _ => Err(BngError::invalid_geometry(format!(
                "point coordinates must hold two numbers, found {}",
                self.coordinates
            ))),
        }
    }
}

impl FeatureCollection {
    /// One-feature collection with a fresh feature id
    pub fn point(point: GeographicPoint) -> Self {
        Self {
            kind: FeatureCollectionType::FeatureCollection,
            features: vec![Feature {
                kind: FeatureType::Feature,
                id: Some(Uuid::new_v4().to_string()),
                properties: Map::new(),
                geometry: Geometry::point(point),
            }],
        }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Coordinates of the first feature's Point
    pub fn first_point(&self) -> Result<GeographicPoint> {
        self.features
            .first()
            .ok_or_else(|| BngError::invalid_geometry("feature collection has no features"))?
            .geometry
            .as_point()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_host_payload() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {"coordinates": [-0.7413205, 51.9970648], "type": "Point"}
            }]
        });

        let fc = FeatureCollection::from_value(&value).unwrap();
        assert_eq!(fc.features[0].id, None);
        assert_eq!(fc.first_point().unwrap(), GeographicPoint::new(-0.7413205, 51.9970648));
    }

    #[test]
    fn test_point_collection_shape() {
        let value = FeatureCollection::point(GeographicPoint::new(-3.5, 55.25))
            .to_value()
            .unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 1);

        let feature = &value["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["properties"], json!({}));
        assert_eq!(feature["geometry"], json!({"type": "Point", "coordinates": [-3.5, 55.25]}));
        assert!(Uuid::parse_str(feature["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_altitude_ignored() {
        let geometry = Geometry {
            kind: POINT.to_string(),
            coordinates: json!([1.0, 52.0, 120.0]),
        };
        assert_eq!(geometry.as_point().unwrap(), GeographicPoint::new(1.0, 52.0));
    }

    #[test]
    fn test_rejects_unusable_payloads() {
        let empty = json!({"type": "FeatureCollection", "features": []});
        let err = FeatureCollection::from_value(&empty).unwrap().first_point().unwrap_err();
        assert!(matches!(err, BngError::InvalidGeometry(_)));

        let line = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "LineString", "coordinates": [[0.0, 52.0], [1.0, 52.0]]}
            }]
        });
        let err = FeatureCollection::from_value(&line).unwrap().first_point().unwrap_err();
        assert!(err.to_string().contains("LineString"));

        let short = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [0.5]}
            }]
        });
        assert!(FeatureCollection::from_value(&short).unwrap().first_point().is_err());

        let err = FeatureCollection::from_value(&json!("SP8651233928")).unwrap_err();
        assert!(matches!(err, BngError::InvalidGeometry(_)));
    }
}
