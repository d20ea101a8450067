//! Lossy feature simplification.
//!
//! Coordinates are snapped to a tolerance grid and properties are projected
//! onto the fixed [`RiskProperties`] record. This is a payload-size
//! reduction, not a Douglas-Peucker-class simplification: every vertex
//! survives, only its precision drops.

use crate::models::{RiskProperties, SimplifiedFeature};
use geojson::{Geometry, Value};

/// Default rounding tolerance: four decimal digits of geographic degrees,
/// roughly 11 m at the equator.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Produce a new feature with rounded coordinates and projected properties.
///
/// The geometry's nesting shape is preserved exactly; only leaf numbers
/// change. An absent geometry passes through as `None`. Infallible.
pub fn simplify_feature(feature: &geojson::Feature, tolerance: f64) -> SimplifiedFeature {
    SimplifiedFeature {
        geometry: feature.geometry.as_ref().map(|g| round_geometry(g, tolerance)),
        properties: RiskProperties::project(feature.properties.as_ref()),
    }
}

fn round_geometry(geometry: &Geometry, tolerance: f64) -> Geometry {
    Geometry {
        bbox: geometry.bbox.clone(),
        value: round_value(&geometry.value, tolerance),
        foreign_members: None,
    }
}

fn round_value(value: &Value, tolerance: f64) -> Value {
    match value {
        Value::Point(pos) => Value::Point(round_position(pos, tolerance)),
        Value::MultiPoint(ring) => Value::MultiPoint(round_ring(ring, tolerance)),
        Value::LineString(ring) => Value::LineString(round_ring(ring, tolerance)),
        Value::MultiLineString(rings) => Value::MultiLineString(round_rings(rings, tolerance)),
        Value::Polygon(rings) => Value::Polygon(round_rings(rings, tolerance)),
        Value::MultiPolygon(polygons) => Value::MultiPolygon(
            polygons.iter().map(|rings| round_rings(rings, tolerance)).collect(),
        ),
        Value::GeometryCollection(geometries) => Value::GeometryCollection(
            geometries.iter().map(|g| round_geometry(g, tolerance)).collect(),
        ),
    }
}

fn round_rings(rings: &[Vec<Vec<f64>>], tolerance: f64) -> Vec<Vec<Vec<f64>>> {
    rings.iter().map(|ring| round_ring(ring, tolerance)).collect()
}

fn round_ring(ring: &[Vec<f64>], tolerance: f64) -> Vec<Vec<f64>> {
    ring.iter().map(|pos| round_position(pos, tolerance)).collect()
}

fn round_position(position: &[f64], tolerance: f64) -> Vec<f64> {
    position.iter().map(|&v| round_coord(v, tolerance)).collect()
}

/// Snap one coordinate to the nearest multiple of `tolerance`.
fn round_coord(value: f64, tolerance: f64) -> f64 {
    (value / tolerance).round() * tolerance
}
