//! Installed extensions
use anyhow::Result;
use sqlx::FromRow;
use sqlx::postgres::PgConnection;
use tracing::info;

#[derive(Debug, FromRow)]
struct ExtensionRow {
    schema: String,
    name: String,
}

/// Returns `(schema, extension)` pairs. `plpgsql` ships with every
/// database and is never reported.
pub async fn fetch(conn: &mut PgConnection, schemas: &[String]) -> Result<Vec<(String, String)>> {
    info!("Fetching extensions...");
    let rows: Vec<ExtensionRow> = sqlx::query_as(
        r#"
        SELECT n.nspname::text AS schema, e.extname::text AS name
        FROM pg_extension e
        JOIN pg_namespace n ON e.extnamespace = n.oid
        WHERE e.extname <> 'plpgsql'
          AND n.nspname::text = ANY($1)
        ORDER BY n.nspname, e.extname
        "#,
    )
    .bind(schemas)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(|row| (row.schema, row.name)).collect())
}
