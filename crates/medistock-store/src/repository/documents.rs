//! # SQLite Document Store
//!
//! [`RemoteStore`] backed by a single `documents` table.
//!
//! ## Query Translation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DocumentQuery                      SQL                                 │
//! │  ─────────────────────────────      ──────────────────────────────────  │
//! │  Filter::Equal(f, v)                json_extract(data, '$.f') = ?       │
//! │  Filter::GreaterOrEqual(f, v)       json_extract(data, '$.f') >= ?      │
//! │  Filter::LessThan(f, v)             json_extract(data, '$.f') < ?       │
//! │  OrderBy(f, asc)                    ORDER BY json_extract(..) ASC, id   │
//! │  start_after (asc, value x, id i)   (f > x OR (f = x AND id > i))       │
//! │  limit n                            LIMIT n                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON paths are bound as parameters, never spliced into the SQL text.

use chrono::Utc;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::{Cursor, Direction, Document, DocumentData, DocumentQuery, Filter};
use crate::error::{StoreError, StoreResult};
use crate::remote::RemoteStore;

/// Raw row of the `documents` table.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: String,
}

impl DocumentRow {
    fn into_document(self) -> StoreResult<Document> {
        match serde_json::from_str::<Value>(&self.data)? {
            Value::Object(map) => Ok(Document::new(self.id, map)),
            _ => Err(StoreError::Serialization(format!(
                "document {} is not a JSON object",
                self.id
            ))),
        }
    }
}

/// Repository for schema-less documents.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.documents();
/// store.set_document("medicines", &id, data).await?;
/// let page = store.query("medicines", &DocumentQuery::new().limit(21)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Creates a new document store with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteDocumentStore { pool }
    }

    /// Counts documents in a collection (for diagnostics and seeding).
    pub async fn count(&self, collection: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

/// Binds a JSON scalar with the SQLite type `json_extract` yields for it.
fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Null => {
            builder.push_bind(Option::<String>::None);
        }
        Value::Bool(b) => {
            builder.push_bind(i64::from(*b));
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                builder.push_bind(i);
            }
            None => {
                builder.push_bind(n.as_f64().unwrap_or(0.0));
            }
        },
        Value::String(s) => {
            builder.push_bind(s.clone());
        }
        other => {
            builder.push_bind(other.to_string());
        }
    }
}

fn push_extract(builder: &mut QueryBuilder<'_, Sqlite>, field: &str) {
    builder.push("json_extract(data, ");
    builder.push_bind(json_path(field));
    builder.push(")");
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) {
    let op = match filter {
        Filter::Equal(..) => " = ",
        Filter::GreaterOrEqual(..) => " >= ",
        Filter::LessThan(..) => " < ",
    };
    builder.push(" AND ");
    push_extract(builder, filter.field());
    builder.push(op);
    push_value(builder, filter.value());
}

fn push_tie(builder: &mut QueryBuilder<'_, Sqlite>, id: &str) {
    builder.push(" AND id > ");
    builder.push_bind(id.to_string());
}

/// Keyset predicate selecting rows strictly after `cursor`.
///
/// SQLite sorts NULL first ascending and last descending; the predicate
/// follows the same order.
fn push_cursor(builder: &mut QueryBuilder<'_, Sqlite>, query: &DocumentQuery, cursor: &Cursor) {
    builder.push(" AND ");

    let Some(order) = &query.order_by else {
        builder.push("id > ");
        builder.push_bind(cursor.id.clone());
        return;
    };

    let field = order.field.as_str();

    match (order.direction, cursor.order_value.is_null()) {
        (Direction::Ascending, false) => {
            builder.push("(");
            push_extract(builder, field);
            builder.push(" > ");
            push_value(builder, &cursor.order_value);
            builder.push(" OR (");
            push_extract(builder, field);
            builder.push(" = ");
            push_value(builder, &cursor.order_value);
            push_tie(builder, &cursor.id);
            builder.push("))");
        }
        (Direction::Ascending, true) => {
            builder.push("(");
            push_extract(builder, field);
            builder.push(" IS NOT NULL OR (");
            push_extract(builder, field);
            builder.push(" IS NULL");
            push_tie(builder, &cursor.id);
            builder.push("))");
        }
        (Direction::Descending, false) => {
            builder.push("(");
            push_extract(builder, field);
            builder.push(" < ");
            push_value(builder, &cursor.order_value);
            builder.push(" OR ");
            push_extract(builder, field);
            builder.push(" IS NULL OR (");
            push_extract(builder, field);
            builder.push(" = ");
            push_value(builder, &cursor.order_value);
            push_tie(builder, &cursor.id);
            builder.push("))");
        }
        (Direction::Descending, true) => {
            builder.push("(");
            push_extract(builder, field);
            builder.push(" IS NULL");
            push_tie(builder, &cursor.id);
            builder.push(")");
        }
    }
}

#[async_trait::async_trait]
impl RemoteStore for SqliteDocumentStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        debug!(
            collection = %collection,
            filters = query.filters.len(),
            limit = ?query.limit,
            "Querying documents"
        );

        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(collection.to_string());

        for filter in &query.filters {
            push_filter(&mut builder, filter);
        }

        if let Some(cursor) = &query.start_after {
            push_cursor(&mut builder, query, cursor);
        }

        builder.push(" ORDER BY ");
        if let Some(order) = &query.order_by {
            push_extract(&mut builder, &order.field);
            builder.push(match order.direction {
                Direction::Ascending => " ASC, ",
                Direction::Descending => " DESC, ",
            });
        }
        builder.push("id ASC");

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows: Vec<DocumentRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Query returned documents");
        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT id, data FROM documents WHERE collection = ?1 AND id = ?2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    async fn set_document(&self, collection: &str, id: &str, data: DocumentData) -> StoreResult<()> {
        debug!(collection = %collection, id = %id, "Setting document");

        let now = Utc::now().to_rfc3339();
        let json = serde_json::to_string(&data)?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (collection, id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn add_document(&self, collection: &str, data: DocumentData) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        self.set_document(collection, &id, data).await?;
        Ok(id)
    }

    async fn update_fields(&self, collection: &str, id: &str, fields: DocumentData) -> StoreResult<()> {
        debug!(collection = %collection, id = %id, fields = fields.len(), "Updating document fields");

        let patch = serde_json::to_string(&fields)?;
        let now = Utc::now().to_rfc3339();

        // json_patch merges top-level keys of the patch into the stored object
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET
                data = json_patch(data, ?3),
                updated_at = ?4
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(patch)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(collection = %collection, id = %id, "Update on missing document");
            return Err(StoreError::not_found(collection, id));
        }

        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<()> {
        debug!(collection = %collection, id = %id, "Deleting document");

        sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
