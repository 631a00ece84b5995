//! Point-in-polygon filtering
//!
//! A message passes when it has no feature collection at all, or when any of
//! its Polygon features strictly contains the requested point. Points on a
//! polygon edge are outside. Malformed geometry never passes.

use fisb_docstore::Document;
use serde_json::Value;
use tracing::warn;

use crate::params::GeoPoint;

const EDGE_EPSILON: f64 = 1e-12;

/// Whether `doc` should be kept for a request filtered on `point`
pub fn contains_point(doc: &Document, point: GeoPoint) -> bool {
    let geojson = match doc.get("geojson") {
        None | Some(Value::Null) => return true,
        Some(geojson) => geojson,
    };

    let Some(features) = geojson.get("features").and_then(Value::as_array) else {
        warn!(
            doc_id = ?doc.id,
            msg_type = ?doc.message_type(),
            "Feature collection without a features array, excluding message"
        );
        return false;
    };

    features.iter().any(|feature| {
        let Some(geometry) = feature.get("geometry") else {
            return false;
        };
        if geometry.get("type").and_then(Value::as_str) != Some("Polygon") {
            return false;
        }

        let parsed = geometry
            .get("coordinates")
            .ok_or_else(|| "missing coordinates".to_string())
            .and_then(Polygon::from_coordinates);

        match parsed {
            Ok(polygon) => polygon.contains(point.lon, point.lat),
            Err(reason) => {
                warn!(
                    doc_id = ?doc.id,
                    msg_type = ?doc.message_type(),
                    %reason,
                    "Malformed polygon, treating as not containing the point"
                );
                false
            }
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Inside,
    Boundary,
    Outside,
}

/// Outer ring plus optional holes, vertices as `(lon, lat)`
#[derive(Debug, Clone)]
pub struct Polygon {
    exterior: Vec<(f64, f64)>,
    holes: Vec<Vec<(f64, f64)>>,
}

impl Polygon {
    /// Accepts either a flat ring `[[x, y], ...]` or GeoJSON rings
    /// `[[[x, y], ...], <holes>...]`.
    pub fn from_coordinates(coordinates: &Value) -> Result<Self, String> {
        let outer = coordinates
            .as_array()
            .ok_or_else(|| "coordinates are not an array".to_string())?;

        let nested = outer
            .first()
            .and_then(Value::as_array)
            .and_then(|first| first.first())
            .is_some_and(Value::is_array);

        if !nested {
            return Ok(Self {
                exterior: parse_ring(outer)?,
                holes: Vec::new(),
            });
        }

        let mut rings = outer.iter().map(|ring| {
            ring.as_array()
                .ok_or_else(|| "ring is not an array".to_string())
                .and_then(|r| parse_ring(r))
        });
        let exterior = rings
            .next()
            .ok_or_else(|| "polygon has no rings".to_string())??;
        let holes = rings.collect::<Result<Vec<_>, _>>()?;

        Ok(Self { exterior, holes })
    }

    /// Strict containment: boundary points are not contained
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if ring_position(&self.exterior, x, y) != Position::Inside {
            return false;
        }
        self.holes
            .iter()
            .all(|hole| ring_position(hole, x, y) == Position::Outside)
    }
}

fn parse_ring(vertices: &[Value]) -> Result<Vec<(f64, f64)>, String> {
    let ring = vertices
        .iter()
        .map(|vertex| {
            let pair = vertex
                .as_array()
                .filter(|v| v.len() >= 2)
                .ok_or_else(|| format!("vertex {} is not a coordinate pair", vertex))?;
            match (pair[0].as_f64(), pair[1].as_f64()) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok((x, y)),
                _ => Err(format!("vertex {} is not numeric", vertex)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut distinct = ring.clone();
    distinct.dedup();
    if distinct.len() > 1 && distinct.first() == distinct.last() {
        distinct.pop();
    }
    if distinct.len() < 3 {
        return Err(format!("ring has {} distinct vertices", distinct.len()));
    }

    Ok(ring)
}

fn ring_position(ring: &[(f64, f64)], x: f64, y: f64) -> Position {
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];

        if on_segment((xj, yj), (xi, yi), (x, y)) {
            return Position::Boundary;
        }

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    if inside {
        Position::Inside
    } else {
        Position::Outside
    }
}

fn on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
    if cross.abs() > EDGE_EPSILON {
        return false;
    }
    p.0 >= a.0.min(b.0) - EDGE_EPSILON
        && p.0 <= a.0.max(b.0) + EDGE_EPSILON
        && p.1 >= a.1.min(b.1) - EDGE_EPSILON
        && p.1 <= a.1.max(b.1) + EDGE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(geojson: Value) -> Document {
        Document::from_value(json!({"type": "SIGMET", "geojson": geojson})).unwrap()
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]
            },
            "properties": {}
        })
    }

    fn at(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    #[test]
    fn test_message_without_geometry_passes() {
        let doc = Document::from_value(json!({"type": "METAR"})).unwrap();
        assert!(contains_point(&doc, at(0.0, 0.0)));
        assert!(contains_point(&doc, at(89.0, 179.0)));
    }

    #[test]
    fn test_point_inside_and_outside() {
        let doc = message(json!({
            "type": "FeatureCollection",
            "features": [square(-80.0, 35.0, -75.0, 40.0)]
        }));
        assert!(contains_point(&doc, at(38.9, -77.4)));
        assert!(!contains_point(&doc, at(45.0, -77.4)));
    }

    #[test]
    fn test_any_polygon_suffices() {
        let doc = message(json!({
            "type": "FeatureCollection",
            "features": [
                square(-100.0, 30.0, -95.0, 35.0),
                square(-80.0, 35.0, -75.0, 40.0)
            ]
        }));
        assert!(contains_point(&doc, at(38.9, -77.4)));
        assert!(contains_point(&doc, at(32.0, -97.0)));
        assert!(!contains_point(&doc, at(50.0, -90.0)));
    }

    #[test]
    fn test_boundary_is_excluded() {
        let doc = message(json!({"features": [square(-80.0, 35.0, -75.0, 40.0)]}));
        assert!(!contains_point(&doc, at(35.0, -77.0)));
        assert!(!contains_point(&doc, at(40.0, -80.0)));
    }

    #[test]
    fn test_non_polygon_features_are_skipped() {
        let doc = message(json!({
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-77.4, 38.9]},
                "properties": {}
            }]
        }));
        assert!(!contains_point(&doc, at(38.9, -77.4)));
    }

    #[test]
    fn test_geojson_rings_with_hole() {
        let doc = message(json!({
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                        [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
                    ]
                },
                "properties": {}
            }]
        }));
        assert!(contains_point(&doc, at(2.0, 2.0)));
        assert!(!contains_point(&doc, at(5.0, 5.0)));
    }

    #[test]
    fn test_malformed_polygon_fails_closed() {
        let doc = message(json!({
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [["a", "b"], [1, 2]]},
                "properties": {}
            }]
        }));
        assert!(!contains_point(&doc, at(1.0, 1.0)));

        let degenerate = message(json!({
            "features": [{
                "geometry": {"type": "Polygon", "coordinates": [[0, 0], [1, 1], [0, 0]]}
            }]
        }));
        assert!(!contains_point(&degenerate, at(0.5, 0.5)));

        let no_features = message(json!({"type": "FeatureCollection"}));
        assert!(!contains_point(&no_features, at(0.0, 0.0)));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening to the north
        let doc = message(json!({
            "features": [{
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[0, 0], [6, 0], [6, 6], [4, 6], [4, 2], [2, 2], [2, 6], [0, 6]]
                }
            }]
        }));
        assert!(contains_point(&doc, at(4.0, 1.0)));
        assert!(!contains_point(&doc, at(4.0, 3.0)));
        assert!(contains_point(&doc, at(4.0, 5.0)));
    }
}
