//! Enum types
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::PgConnection;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    #[serde(default)]
    pub name: String,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, FromRow)]
struct EnumRow {
    schema: String,
    name: String,
    labels: Vec<String>,
}

pub async fn fetch(conn: &mut PgConnection, schemas: &[String]) -> Result<Vec<(String, EnumType)>> {
    info!("Fetching enum types...");
    let rows: Vec<EnumRow> = sqlx::query_as(
        r#"
        SELECT
            n.nspname::text AS schema,
            t.typname::text AS name,
            array_agg(e.enumlabel::text ORDER BY e.enumsortorder) AS labels
        FROM pg_type t
        JOIN pg_enum e ON e.enumtypid = t.oid
        JOIN pg_namespace n ON t.typnamespace = n.oid
        WHERE n.nspname::text = ANY($1)
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = t.oid AND dep.deptype = 'e'
          )
        GROUP BY n.nspname, t.typname
        ORDER BY n.nspname, t.typname
        "#,
    )
    .bind(schemas)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.schema,
                EnumType {
                    name: row.name,
                    values: row.labels,
                },
            )
        })
        .collect())
}
