//! PostgreSQL-wire backend
//!
//! Documents live in JSONB columns:
//!
//! ```sql
//! msg        (id TEXT PRIMARY KEY, insert_time TIMESTAMPTZ NOT NULL, doc JSONB NOT NULL)
//! static_doc (id TEXT PRIMARY KEY, doc JSONB NOT NULL)
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde_json::Value;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;
use tracing::{debug, instrument};

use crate::filter::{Condition, Filter, KEY_FIELD};
use crate::pool::DocStorePool;
use crate::store::{DocumentStore, DocumentStream};
use crate::types::{Collection, Document, FindOptions};
use crate::{DocStoreError, Result};

type SqlParam = Box<dyn ToSql + Sync + Send>;

/// Document store over a pooled PostgreSQL connection
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: DocStorePool,
}

impl PgDocumentStore {
    pub fn new(pool: DocStorePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self, filter), fields(table = collection.table_name()))]
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<DocumentStream> {
        let (sql, params) = build_select(collection, filter, options)?;
        debug!(%sql, params = params.len(), "Executing document query");

        let conn = self.pool.get().await?;
        let statement = conn.prepare_cached(&sql).await.map_err(DocStoreError::Query)?;
        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();
        let rows = conn
            .query_raw(&statement, slice_iter(&refs))
            .await
            .map_err(DocStoreError::Query)?;

        // The pooled connection travels with the stream so it is only
        // recycled once the cursor is drained or dropped.
        let stream = futures_util::stream::unfold(
            (conn, Box::pin(rows)),
            |(conn, mut rows)| async move {
                let next = rows.next().await?;
                let item = next
                    .map_err(DocStoreError::Query)
                    .and_then(|row| document_from_row(&row));
                Some((item, (conn, rows)))
            },
        );

        Ok(stream.boxed())
    }

    async fn ping(&self) -> bool {
        self.pool.is_healthy().await
    }
}

fn slice_iter<'a>(
    s: &'a [&'a (dyn ToSql + Sync)],
) -> impl ExactSizeIterator<Item = &'a dyn ToSql> + 'a {
    s.iter().map(|s| *s as _)
}

fn document_from_row(row: &Row) -> Result<Document> {
    let id: Option<String> = row.try_get("id").map_err(DocStoreError::Query)?;
    let insert_time: Option<DateTime<Utc>> =
        row.try_get("insert_time").map_err(DocStoreError::Query)?;
    let doc: Value = row.try_get("doc").map_err(DocStoreError::Query)?;

    let Value::Object(mut body) = doc else {
        return Err(DocStoreError::MalformedDocument(format!(
            "row {} does not hold a JSON object",
            id.as_deref().unwrap_or("<no id>")
        )));
    };
    // the columns are authoritative
    body.remove(KEY_FIELD);
    body.remove("insert_time");

    Ok(Document {
        id,
        insert_time,
        body,
    })
}

/// Render the full SELECT for a find, with its positional parameters.
pub(crate) fn build_select(
    collection: Collection,
    filter: &Filter,
    options: FindOptions,
) -> Result<(String, Vec<SqlParam>)> {
    let (clause, mut params) = render_where(collection, filter)?;

    let cursor_column = if collection.is_cursored() {
        "insert_time"
    } else {
        "NULL::timestamptz AS insert_time"
    };
    let mut sql = format!(
        "SELECT id, {}, doc FROM {} WHERE {}",
        cursor_column,
        collection.table_name(),
        clause
    );

    if options.oldest_first {
        if !collection.is_cursored() {
            return Err(DocStoreError::UnsupportedFilter(format!(
                "{} has no insert_time to sort by",
                collection.table_name()
            )));
        }
        sql.push_str(" ORDER BY insert_time ASC");
    }

    if let Some(limit) = options.limit {
        params.push(Box::new(limit as i64));
        sql.push_str(&format!(" LIMIT ${}::bigint", params.len()));
    }

    Ok((sql, params))
}

pub(crate) fn render_where(
    collection: Collection,
    filter: &Filter,
) -> Result<(String, Vec<SqlParam>)> {
    let mut params: Vec<SqlParam> = Vec::new();
    let mut parts = Vec::with_capacity(filter.conditions().len());

    for condition in filter.conditions() {
        let part = match condition {
            Condition::Equals { field, value } if field == KEY_FIELD => {
                let key = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                params.push(Box::new(key));
                format!("id = ${}::text", params.len())
            }
            Condition::Equals { field, value } => {
                params.push(Box::new(field.clone()));
                params.push(Box::new(value.clone()));
                format!("doc -> ${}::text = ${}::jsonb", params.len() - 1, params.len())
            }
            Condition::OneOf { field, values } => {
                params.push(Box::new(field.clone()));
                params.push(Box::new(values.clone()));
                format!(
                    "doc -> ${}::text = ANY(${}::jsonb[])",
                    params.len() - 1,
                    params.len()
                )
            }
            Condition::Exists { field } if field == KEY_FIELD => "id IS NOT NULL".to_string(),
            Condition::Exists { field } => {
                params.push(Box::new(field.clone()));
                format!("doc ? ${}::text", params.len())
            }
            Condition::InsertedAfter(after) => {
                if !collection.is_cursored() {
                    return Err(DocStoreError::UnsupportedFilter(format!(
                        "{} is not cursored by insert_time",
                        collection.table_name()
                    )));
                }
                params.push(Box::new(*after));
                format!("insert_time > ${}", params.len())
            }
        };
        parts.push(part);
    }

    let clause = if parts.is_empty() {
        "TRUE".to_string()
    } else {
        parts.join(" AND ")
    };
    Ok((clause, params))
}
