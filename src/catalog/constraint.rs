//! Table constraints - fetch from PostgreSQL system catalogs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::PgConnection;
use tracing::{info, warn};

use super::OnTable;
use super::table::PrimaryKey;

/* ---------- Data structures ---------- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    fn from_code(code: &str) -> Self {
        match code {
            "r" => ReferentialAction::Restrict,
            "c" => ReferentialAction::Cascade,
            "n" => ReferentialAction::SetNull,
            "d" => ReferentialAction::SetDefault,
            _ => ReferentialAction::NoAction,
        }
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferentialAction::NoAction => write!(f, "NO ACTION"),
            ReferentialAction::Restrict => write!(f, "RESTRICT"),
            ReferentialAction::Cascade => write!(f, "CASCADE"),
            ReferentialAction::SetNull => write!(f, "SET NULL"),
            ReferentialAction::SetDefault => write!(f, "SET DEFAULT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConstraint {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    /// Defaults to the schema of the owning table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: ReferentialAction,
    #[serde(default)]
    pub on_update: ReferentialAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ForeignKey {
    pub fn referenced_schema<'a>(&'a self, owner_schema: &'a str) -> &'a str {
        self.referenced_schema.as_deref().unwrap_or(owner_schema)
    }
}

/// A constraint read from the database, before it is attached to its table.
#[derive(Debug, Clone)]
pub enum TableConstraint {
    PrimaryKey(PrimaryKey),
    Unique(UniqueConstraint),
    Check(CheckConstraint),
    ForeignKey(ForeignKey),
}

/* ---------- Fetch query (catalog-based) ---------- */

#[derive(Debug, FromRow)]
struct ConstraintRow {
    schema: String,
    table_name: String,
    name: String,
    kind: String,
    columns: Vec<String>,
    check_expression: Option<String>,
    referenced_schema: Option<String>,
    referenced_table: Option<String>,
    referenced_columns: Vec<String>,
    on_delete: String,
    on_update: String,
}

pub async fn fetch(
    conn: &mut PgConnection,
    schemas: &[String],
) -> Result<Vec<OnTable<TableConstraint>>> {
    info!("Fetching constraints...");
    let rows: Vec<ConstraintRow> = sqlx::query_as(
        r#"
        SELECT
            n.nspname::text AS schema,
            cl.relname::text AS table_name,
            con.conname::text AS name,
            con.contype::text AS kind,
            ARRAY(
                SELECT a.attname::text
                FROM unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord)
                JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
                ORDER BY k.ord
            ) AS columns,
            CASE WHEN con.contype = 'c'
                THEN pg_catalog.pg_get_expr(con.conbin, con.conrelid)
            END AS check_expression,
            rn.nspname::text AS referenced_schema,
            rcl.relname::text AS referenced_table,
            ARRAY(
                SELECT a.attname::text
                FROM unnest(con.confkey) WITH ORDINALITY AS k(attnum, ord)
                JOIN pg_attribute a ON a.attrelid = con.confrelid AND a.attnum = k.attnum
                ORDER BY k.ord
            ) AS referenced_columns,
            con.confdeltype::text AS on_delete,
            con.confupdtype::text AS on_update
        FROM pg_constraint con
        JOIN pg_class cl ON con.conrelid = cl.oid
        JOIN pg_namespace n ON cl.relnamespace = n.oid
        LEFT JOIN pg_class rcl ON con.confrelid = rcl.oid
        LEFT JOIN pg_namespace rn ON rcl.relnamespace = rn.oid
        WHERE con.contype IN ('p', 'u', 'c', 'f')
          AND n.nspname::text = ANY($1)
        ORDER BY n.nspname, cl.relname, con.conname
        "#,
    )
    .bind(schemas)
    .fetch_all(&mut *conn)
    .await?;

    let mut constraints = Vec::with_capacity(rows.len());
    for row in rows {
        let constraint = match row.kind.as_str() {
            "p" => TableConstraint::PrimaryKey(PrimaryKey {
                columns: row.columns,
                name: Some(row.name),
            }),
            "u" => TableConstraint::Unique(UniqueConstraint {
                columns: row.columns,
                name: Some(row.name),
            }),
            "c" => TableConstraint::Check(CheckConstraint {
                expression: row.check_expression.unwrap_or_default(),
                name: Some(row.name),
            }),
            "f" => {
                let Some(referenced_table) = row.referenced_table else {
                    warn!("Foreign key {} has no referenced table, skipping", row.name);
                    continue;
                };
                TableConstraint::ForeignKey(ForeignKey {
                    columns: row.columns,
                    referenced_schema: row.referenced_schema,
                    referenced_table,
                    referenced_columns: row.referenced_columns,
                    on_delete: ReferentialAction::from_code(&row.on_delete),
                    on_update: ReferentialAction::from_code(&row.on_update),
                    name: Some(row.name),
                })
            }
            _ => continue,
        };
        constraints.push(OnTable {
            schema: row.schema,
            table: row.table_name,
            item: constraint,
        });
    }

    Ok(constraints)
}
