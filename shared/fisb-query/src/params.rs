//! Standard query-string validation
//!
//! Every endpoint accepts the same optional parameters: `after`, `limit`,
//! `lat`/`lon` and `high`/`low`. Validation never stops at the first problem;
//! every violated rule contributes a fragment to the combined error text.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::num::IntErrorKind;

use crate::timestamp::{default_after, parse_timestamp};

pub const DEFAULT_LIMIT: usize = 10000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Requested altitude range in feet, `low <= high`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltitudeBand {
    pub high: i64,
    pub low: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// One fragment per violated rule, in evaluation order
    pub errors: Vec<String>,
    pub after: DateTime<Utc>,
    pub limit: usize,
    /// Set only when both coordinates are present and valid
    pub point: Option<GeoPoint>,
    /// Set only when both bounds are present, valid and ordered
    pub altitude: Option<AltitudeBand>,
}

impl QueryParams {
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_text(&self) -> String {
        self.errors.join(" ")
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            errors: Vec::new(),
            after: default_after(),
            limit: DEFAULT_LIMIT,
            point: None,
            altitude: None,
        }
    }
}

pub fn parse_query_params(query: &HashMap<String, String>) -> QueryParams {
    let mut params = QueryParams::default();
    let errors = &mut params.errors;

    if let Some(raw) = query.get("after") {
        match parse_timestamp(raw) {
            Some(after) => params.after = after,
            None => errors.push(r#"Illegal "after" parameter."#.to_string()),
        }
    }

    if let Some(raw) = query.get("limit") {
        match parse_limit(raw) {
            Some(limit) => params.limit = limit,
            None => errors.push(r#"Illegal "limit" parameter."#.to_string()),
        }
    }

    let lat = parse_bounded_float(query.get("lat"), 90.0, "Bad latitude parameter.", errors);
    let lon = parse_bounded_float(query.get("lon"), 180.0, "Bad longitude parameter.", errors);
    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            if let (Ok(lat), Ok(lon)) = (lat, lon) {
                params.point = Some(GeoPoint { lat, lon });
            }
        }
        (None, None) => {}
        _ => errors.push("Need both lat and long parameters.".to_string()),
    }

    let high = parse_altitude(query.get("high"), "Bad high parameter.", errors);
    let low = parse_altitude(query.get("low"), "Bad low parameter.", errors);
    match (high, low) {
        (Some(high), Some(low)) => {
            let (high_ft, low_ft) = (high.unwrap_or_else(|v| v), low.unwrap_or_else(|v| v));
            if low_ft > high_ft {
                errors.push("Low must be <= high parameter.".to_string());
            } else if let (Ok(high), Ok(low)) = (high, low) {
                params.altitude = Some(AltitudeBand { high, low });
            }
        }
        (None, None) => {}
        _ => errors.push("Need both high and low parameters.".to_string()),
    }

    params
}

/// Positive integer, clamped to `DEFAULT_LIMIT`. `None` when invalid.
fn parse_limit(raw: &str) -> Option<usize> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 1 => Some((value as u64).min(DEFAULT_LIMIT as u64) as usize),
        Ok(_) => None,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(DEFAULT_LIMIT),
        Err(_) => None,
    }
}

/// `None`: absent or unparseable. `Some(Err(v))`: parsed but out of range.
///
/// A value that parses but is out of range still counts as supplied for the
/// pairing check, an unparseable one does not.
fn parse_bounded_float(
    raw: Option<&String>,
    bound: f64,
    message: &str,
    errors: &mut Vec<String>,
) -> Option<Result<f64, f64>> {
    let raw = raw?;
    match raw.trim().parse::<f64>() {
        Ok(value) if (-bound..=bound).contains(&value) => Some(Ok(value)),
        Ok(value) => {
            errors.push(message.to_string());
            Some(Err(value))
        }
        Err(_) => {
            errors.push(message.to_string());
            None
        }
    }
}

/// Same contract as `parse_bounded_float` for non-negative feet.
fn parse_altitude(
    raw: Option<&String>,
    message: &str,
    errors: &mut Vec<String>,
) -> Option<Result<i64, i64>> {
    let raw = raw?;
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 0 => Some(Ok(value)),
        Ok(value) => {
            errors.push(message.to_string());
            Some(Err(value))
        }
        Err(_) => {
            errors.push(message.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::format_timestamp;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_parameters() {
        let params = parse_query_params(&HashMap::new());
        assert!(!params.has_error());
        assert_eq!(params.error_text(), "");
        assert_eq!(format_timestamp(&params.after), "2004-01-01T00:00:00Z");
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert!(params.point.is_none());
        assert!(params.altitude.is_none());
    }

    #[test]
    fn test_illegal_after_falls_back_and_flags() {
        let params = parse_query_params(&query(&[("after", "not-a-date")]));
        assert!(params.has_error());
        assert_eq!(params.error_text(), r#"Illegal "after" parameter."#);
        assert_eq!(format_timestamp(&params.after), "2004-01-01T00:00:00Z");
    }

    #[test]
    fn test_limit_clamps_above_maximum() {
        let params = parse_query_params(&query(&[("limit", "25000")]));
        assert!(!params.has_error());
        assert_eq!(params.limit, 10000);

        let params = parse_query_params(&query(&[("limit", "99999999999999999999999")]));
        assert!(!params.has_error());
        assert_eq!(params.limit, 10000);
    }

    #[test]
    fn test_limit_rejects_zero_negative_and_text() {
        for raw in ["0", "-3", "ten", "2.5", ""] {
            let params = parse_query_params(&query(&[("limit", raw)]));
            assert!(params.has_error(), "limit={:?} should be rejected", raw);
            assert_eq!(params.limit, DEFAULT_LIMIT);
        }
    }

    #[test]
    fn test_limit_accepts_in_range() {
        let params = parse_query_params(&query(&[("limit", " 25 ")]));
        assert!(!params.has_error());
        assert_eq!(params.limit, 25);
    }

    #[test]
    fn test_lat_lon_pair() {
        let params = parse_query_params(&query(&[("lat", "38.9"), ("lon", "-77.4")]));
        assert!(!params.has_error());
        assert_eq!(params.point, Some(GeoPoint { lat: 38.9, lon: -77.4 }));
    }

    #[test]
    fn test_unpaired_lat_or_lon_is_error() {
        let params = parse_query_params(&query(&[("lat", "38.9")]));
        assert_eq!(params.error_text(), "Need both lat and long parameters.");
        assert!(params.point.is_none());

        let params = parse_query_params(&query(&[("lon", "-77.4")]));
        assert_eq!(params.error_text(), "Need both lat and long parameters.");
        assert!(params.point.is_none());
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let params = parse_query_params(&query(&[("lat", "91"), ("lon", "-181")]));
        assert_eq!(
            params.error_text(),
            "Bad latitude parameter. Bad longitude parameter."
        );
        assert!(params.point.is_none());
    }

    #[test]
    fn test_unparseable_coordinate_also_reports_pairing() {
        let params = parse_query_params(&query(&[("lat", "north"), ("lon", "-77.4")]));
        assert_eq!(
            params.error_text(),
            "Bad latitude parameter. Need both lat and long parameters."
        );
    }

    #[test]
    fn test_altitude_pair() {
        let params = parse_query_params(&query(&[("high", "2000"), ("low", "500")]));
        assert!(!params.has_error());
        assert_eq!(params.altitude, Some(AltitudeBand { high: 2000, low: 500 }));
    }

    #[test]
    fn test_altitude_ordering_and_pairing() {
        let params = parse_query_params(&query(&[("high", "500"), ("low", "2000")]));
        assert_eq!(params.error_text(), "Low must be <= high parameter.");
        assert!(params.altitude.is_none());

        let params = parse_query_params(&query(&[("low", "100")]));
        assert_eq!(params.error_text(), "Need both high and low parameters.");

        // a negative bound still takes part in the ordering check
        let params = parse_query_params(&query(&[("high", "-1"), ("low", "0")]));
        assert_eq!(
            params.error_text(),
            "Bad high parameter. Low must be <= high parameter."
        );
        assert!(params.altitude.is_none());

        let params = parse_query_params(&query(&[("high", "100"), ("low", "-5")]));
        assert_eq!(params.error_text(), "Bad low parameter.");
        assert!(params.altitude.is_none());
    }

    #[test]
    fn test_all_errors_accumulate() {
        let params = parse_query_params(&query(&[
            ("after", "bogus"),
            ("limit", "0"),
            ("lat", "100"),
            ("high", "10"),
        ]));
        assert_eq!(
            params.error_text(),
            "Illegal \"after\" parameter. Illegal \"limit\" parameter. \
             Bad latitude parameter. Need both lat and long parameters. \
             Need both high and low parameters."
        );
    }
}
