//! Declarative document predicates
//!
//! A `Filter` is a conjunction of conditions on top-level document fields.
//! Backends either translate it (SQL) or evaluate it directly (`matches`).

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::Document;

/// Field name that addresses the document key rather than a body field
pub const KEY_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value exactly (JSON equality)
    Equals { field: String, value: Value },
    /// Field equals one of the values
    OneOf { field: String, values: Vec<Value> },
    /// Field is present, whatever its value
    Exists { field: String },
    /// Strictly newer than the cursor
    InsertedAfter(DateTime<Utc>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn one_of<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::OneOf {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn exists(mut self, field: impl Into<String>) -> Self {
        self.conditions.push(Condition::Exists {
            field: field.into(),
        });
        self
    }

    pub fn inserted_after(mut self, after: DateTime<Utc>) -> Self {
        self.conditions.push(Condition::InsertedAfter(after));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Evaluate against an in-memory document
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| condition_matches(c, doc))
    }
}

fn condition_matches(condition: &Condition, doc: &Document) -> bool {
    match condition {
        Condition::Equals { field, value } => field_value(doc, field).as_ref() == Some(value),
        Condition::OneOf { field, values } => field_value(doc, field)
            .map(|v| values.contains(&v))
            .unwrap_or(false),
        Condition::Exists { field } => field_value(doc, field).is_some(),
        Condition::InsertedAfter(after) => doc.insert_time.is_some_and(|t| t > *after),
    }
}

fn field_value(doc: &Document, field: &str) -> Option<Value> {
    if field == KEY_FIELD {
        return doc.id.clone().map(Value::String);
    }
    doc.body.get(field).cloned()
}
