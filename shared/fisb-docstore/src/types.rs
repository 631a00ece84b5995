//! Stored document representation

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DocStoreError, Result};

/// Logical collections served by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Time-cursored messages keyed by `insert_time`
    Msg,
    /// Keyed configuration-like documents (legend, ...)
    Static,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Msg => "msg",
            Self::Static => "static_doc",
        }
    }

    /// Whether documents in this collection carry an `insert_time` cursor
    pub fn is_cursored(&self) -> bool {
        matches!(self, Self::Msg)
    }
}

/// Ordering and cap applied to a `find`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Oldest `insert_time` first; otherwise the store's natural order
    pub oldest_first: bool,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn oldest_first(mut self) -> Self {
        self.oldest_first = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A document as fetched from the store.
///
/// `id` is the store key (`_id`), `insert_time` the cursor column and `body`
/// every other field exactly as the ingestion side wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Option<String>,
    pub insert_time: Option<DateTime<Utc>>,
    pub body: Map<String, Value>,
}

impl Document {
    /// Split a full stored JSON object into key, cursor and body.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut body) = value else {
            return Err(DocStoreError::MalformedDocument(
                "document is not a JSON object".to_string(),
            ));
        };

        let id = match body.remove("_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        let insert_time = match body.remove("insert_time") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(parse_stored_time(&raw).ok_or_else(|| {
                DocStoreError::MalformedDocument(format!("unreadable insert_time: {}", raw))
            })?),
        };

        Ok(Self {
            id,
            insert_time,
            body,
        })
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    pub fn message_type(&self) -> Option<&str> {
        self.body.get("type").and_then(Value::as_str)
    }
}

/// Read a stored temporal value.
///
/// Accepts RFC 3339 strings with any offset and extended JSON
/// `{"$date": <RFC 3339 | epoch millis>}`.
pub fn parse_stored_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Object(map) if map.len() == 1 => match map.get("$date")? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
            _ => None,
        },
        _ => None,
    }
}
