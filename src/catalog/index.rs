//! Secondary indexes and their introspection
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::OnTable;

fn default_method() -> String {
    "btree".to_string()
}

/// An index that does not back a constraint. Columns may be plain names or
/// expressions such as `lower(email)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Index {
    pub fn on(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
            method: default_method(),
            predicate: None,
            name: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_predicate(mut self, predicate: &str) -> Self {
        self.predicate = Some(predicate.to_string());
        self
    }
}

#[derive(Debug, FromRow)]
struct IndexRow {
    schema: String,
    table_name: String,
    name: String,
    method: String,
    is_unique: bool,
    columns: Vec<String>,
    predicate: Option<String>,
}

/// Fetch indexes, skipping those owned by primary key, unique or
/// exclusion constraints (they are read as constraints).
pub async fn fetch(conn: &mut PgConnection, schemas: &[String]) -> Result<Vec<OnTable<Index>>> {
    info!("Fetching indexes...");
    let rows: Vec<IndexRow> = sqlx::query_as(
        r#"
        SELECT
            n.nspname::text AS schema,
            t.relname::text AS table_name,
            i.relname::text AS name,
            am.amname::text AS method,
            idx.indisunique AS is_unique,
            ARRAY(
                SELECT pg_catalog.pg_get_indexdef(idx.indexrelid, k, true)
                FROM generate_series(1, idx.indnkeyatts::int) AS k
                ORDER BY k
            ) AS columns,
            pg_catalog.pg_get_expr(idx.indpred, idx.indrelid) AS predicate
        FROM pg_index idx
        JOIN pg_class i ON idx.indexrelid = i.oid
        JOIN pg_class t ON idx.indrelid = t.oid
        JOIN pg_namespace n ON t.relnamespace = n.oid
        JOIN pg_am am ON i.relam = am.oid
        WHERE n.nspname::text = ANY($1)
          AND NOT idx.indisprimary
          AND NOT EXISTS (
              SELECT 1 FROM pg_constraint c
              WHERE c.conindid = idx.indexrelid
                AND c.contype IN ('p', 'u', 'x')
          )
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = i.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, t.relname, i.relname
        "#,
    )
    .bind(schemas)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| OnTable {
            schema: row.schema,
            table: row.table_name,
            item: Index {
                columns: row.columns,
                unique: row.is_unique,
                method: row.method,
                predicate: row.predicate,
                name: Some(row.name),
            },
        })
        .collect())
}
