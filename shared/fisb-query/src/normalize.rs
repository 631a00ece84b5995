//! Presentation of stored messages
//!
//! Builds a fresh JSON object from a fetched document. The fetched record is
//! never modified.

use fisb_docstore::{parse_stored_time, Document};
use serde_json::{Map, Value};
use tracing::debug;

use crate::timestamp::format_timestamp;

const TIME_SUFFIX: &str = "_time";

/// Fields never shown to clients
const INTERNAL_FIELDS: [&str; 3] = ["_id", "digest", "insert_time"];

/// Types whose `station` is only used by ingestion to track CRL completeness
const CRL_TRACKED_TYPES: [&str; 6] = ["NOTAM", "G_AIRMET", "AIRMET", "WST", "CWA", "SIGMET"];

/// Present a cursored message.
///
/// `insert_time` is left out; callers report it through the envelope cursor.
pub fn normalize(doc: &Document) -> Map<String, Value> {
    let msg_type = doc.message_type().unwrap_or_default();
    let is_crl = msg_type.starts_with("CRL");
    let strip_station = CRL_TRACKED_TYPES.contains(&msg_type);

    let mut out = Map::new();
    for (key, value) in &doc.body {
        if INTERNAL_FIELDS.contains(&key.as_str())
            || (strip_station && key == "station")
            || (is_crl && key == "product_id")
        {
            continue;
        }

        let presented = if key.ends_with(TIME_SUFFIX) {
            present_time(key, value)
        } else if key == "geojson" {
            present_geojson(value)
        } else if msg_type == "RSR" && key == "stations" {
            percent_received(value)
        } else {
            value.clone()
        };
        out.insert(key.clone(), presented);
    }

    if is_crl {
        out.insert("complete".to_string(), Value::from(crl_complete(doc)));
    }

    out
}

/// Present a static document: only the store key is hidden.
pub fn present_static(doc: &Document) -> Map<String, Value> {
    let mut out = doc.body.clone();
    out.remove("_id");
    out
}

/// 1 when every expected report of the cycle arrived, else 0.
pub fn crl_complete(doc: &Document) -> u8 {
    let reports = doc
        .get("reports")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if reports.is_empty() {
        return 1;
    }

    if doc.get("overflow").is_some_and(is_set) {
        return 0;
    }

    let all_received = reports
        .iter()
        .all(|r| r.as_str().is_some_and(|slot| slot.contains('*')));
    u8::from(all_received)
}

fn is_set(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

fn present_time(key: &str, value: &Value) -> Value {
    match parse_stored_time(value) {
        Some(dt) => Value::String(format_timestamp(&dt)),
        None => {
            debug!(field = key, %value, "Time field is not a stored timestamp, passing through");
            value.clone()
        }
    }
}

fn present_geojson(geojson: &Value) -> Value {
    let mut geojson = geojson.clone();
    let features = geojson
        .get_mut("features")
        .and_then(Value::as_array_mut);

    for feature in features.into_iter().flatten() {
        let Some(properties) = feature
            .get_mut("properties")
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        for key in ["start_time", "stop_time"] {
            if let Some(value) = properties.get_mut(key) {
                *value = present_time(key, value);
            }
        }
    }

    geojson
}

/// `{station: [total, per_second, percent]}` becomes `{station: percent}`
fn percent_received(stations: &Value) -> Value {
    let Some(stations) = stations.as_object() else {
        return stations.clone();
    };

    let reduced = stations
        .iter()
        .map(|(station, stats)| {
            let percent = stats
                .as_array()
                .filter(|s| s.len() >= 3)
                .map(|s| s[2].clone())
                .unwrap_or_else(|| stats.clone());
            (station.clone(), percent)
        })
        .collect();
    Value::Object(reduced)
}
