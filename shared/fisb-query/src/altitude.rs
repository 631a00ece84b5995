//! Altitude-band filtering
//!
//! Features carry `properties.altitudes` as `[low_ft, <qualifier>, high_ft]`.
//! A feature without altitudes makes the whole message pass, as does the
//! unbounded `[0, _, 0]` band.

use fisb_docstore::Document;
use serde_json::Value;
use tracing::warn;

use crate::params::AltitudeBand;

/// Whether `doc` should be kept for a request filtered on `band`
pub fn within_band(doc: &Document, band: AltitudeBand) -> bool {
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

    for feature in features {
        let altitudes = match feature.get("properties").and_then(|p| p.get("altitudes")) {
            None | Some(Value::Null) => return true,
            Some(altitudes) => altitudes,
        };

        let Some((low_ft, high_ft)) = feature_band(altitudes) else {
            warn!(
                doc_id = ?doc.id,
                msg_type = ?doc.message_type(),
                %altitudes,
                "Malformed altitudes, feature does not match"
            );
            continue;
        };

        if low_ft == 0.0 && high_ft == 0.0 {
            return true;
        }

        if high_ft >= band.low as f64 && band.high as f64 >= low_ft {
            return true;
        }
    }

    false
}

fn feature_band(altitudes: &Value) -> Option<(f64, f64)> {
    let values = altitudes.as_array().filter(|v| v.len() >= 3)?;
    Some((values[0].as_f64()?, values[2].as_f64()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_altitudes(altitudes: &[Value]) -> Document {
        let features: Vec<Value> = altitudes
            .iter()
            .map(|a| {
                json!({
                    "type": "Feature",
                    "geometry": {"type": "Polygon", "coordinates": []},
                    "properties": {"altitudes": a}
                })
            })
            .collect();
        Document::from_value(json!({
            "type": "AIRMET",
            "geojson": {"type": "FeatureCollection", "features": features}
        }))
        .unwrap()
    }

    const REQUEST: AltitudeBand = AltitudeBand { high: 2000, low: 500 };

    #[test]
    fn test_no_geometry_passes() {
        let doc = Document::from_value(json!({"type": "TAF"})).unwrap();
        assert!(within_band(&doc, REQUEST));
    }

    #[test]
    fn test_unbounded_band_passes() {
        let doc = with_altitudes(&[json!([0, "MSL", 0])]);
        assert!(within_band(&doc, AltitudeBand { high: 10, low: 5 }));
    }

    #[test]
    fn test_intersecting_band_passes() {
        let doc = with_altitudes(&[json!([1000, 5000, 9000])]);
        assert!(within_band(&doc, REQUEST));
    }

    #[test]
    fn test_disjoint_band_fails() {
        let doc = with_altitudes(&[json!([1000, 5000, 9000])]);
        assert!(!within_band(&doc, AltitudeBand { high: 500, low: 100 }));
        assert!(!within_band(&doc, AltitudeBand { high: 12000, low: 9001 }));
    }

    #[test]
    fn test_touching_bands_intersect() {
        let doc = with_altitudes(&[json!([1000, 5000, 9000])]);
        assert!(within_band(&doc, AltitudeBand { high: 1000, low: 0 }));
        assert!(within_band(&doc, AltitudeBand { high: 20000, low: 9000 }));
    }

    #[test]
    fn test_any_feature_suffices() {
        let doc = with_altitudes(&[json!([10000, 0, 18000]), json!([0, 0, 3000])]);
        assert!(within_band(&doc, REQUEST));
    }

    #[test]
    fn test_feature_without_altitudes_passes_message() {
        let doc = Document::from_value(json!({
            "type": "NOTAM",
            "geojson": {"features": [
                {"properties": {"altitudes": [10000, 0, 18000]}},
                {"properties": {"start_time": "2021-01-01T00:00:00Z"}}
            ]}
        }))
        .unwrap();
        assert!(within_band(&doc, REQUEST));
    }

    #[test]
    fn test_malformed_altitudes_fail_closed() {
        let doc = with_altitudes(&[json!(["low", 0, "high"]), json!([1, 2])]);
        assert!(!within_band(&doc, REQUEST));
    }
}
