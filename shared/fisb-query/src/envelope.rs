//! Uniform JSON response envelope

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_OK: i32 = 0;
pub const STATUS_ERROR: i32 = -1;

/// `{"status", "error"?, "num_results"?, "result"?, "results"?, "after"?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Map<String, Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl QueryResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            error: Some(message.into()),
            num_results: None,
            result: None,
            results: None,
            after: None,
        }
    }

    /// Zero-or-one result form
    pub fn single(result: Option<Map<String, Value>>, after: Option<String>) -> Self {
        Self {
            status: STATUS_OK,
            error: None,
            num_results: Some(usize::from(result.is_some())),
            result,
            results: None,
            after,
        }
    }

    /// Zero-to-many result form
    pub fn many(results: Vec<Map<String, Value>>, after: Option<String>) -> Self {
        Self {
            status: STATUS_OK,
            error: None,
            num_results: Some(results.len()),
            result: None,
            results: Some(results),
            after,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == STATUS_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_shape() {
        let body = serde_json::to_value(QueryResponse::error("Bad low parameter.")).unwrap();
        assert_eq!(body, json!({"status": -1, "error": "Bad low parameter."}));
    }

    #[test]
    fn test_empty_single_shape() {
        let body = serde_json::to_value(QueryResponse::single(
            None,
            Some("2004-01-01T00:00:00Z".to_string()),
        ))
        .unwrap();
        assert_eq!(
            body,
            json!({"status": 0, "num_results": 0, "after": "2004-01-01T00:00:00Z"})
        );
    }

    #[test]
    fn test_static_many_shape_has_no_cursor() {
        let legend = json!({"name": "legend"}).as_object().cloned().unwrap();
        let body = serde_json::to_value(QueryResponse::many(vec![legend], None)).unwrap();
        assert_eq!(
            body,
            json!({"status": 0, "num_results": 1, "results": [{"name": "legend"}]})
        );
    }

    #[test]
    fn test_many_keeps_empty_results_array() {
        let body = serde_json::to_value(QueryResponse::many(Vec::new(), None)).unwrap();
        assert_eq!(body, json!({"status": 0, "num_results": 0, "results": []}));
    }
}
