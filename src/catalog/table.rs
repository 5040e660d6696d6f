//! Tables and columns, plus their introspection from pg_catalog
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::constraint::{CheckConstraint, ForeignKey, UniqueConstraint};
use super::hash::{canonicalize_expression, compute_hash, is_hash};
use super::index::Index;
use super::triggers::Trigger;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    #[default]
    None,
    Always,
    ByDefault,
}

impl IdentityMode {
    fn from_code(code: &str) -> Self {
        match code {
            "a" => IdentityMode::Always,
            "d" => IdentityMode::ByDefault,
            _ => IdentityMode::None,
        }
    }

    /// SQL keyword following `GENERATED`, if any.
    pub fn generated_clause(self) -> Option<&'static str> {
        match self {
            IdentityMode::None => None,
            IdentityMode::Always => Some("ALWAYS"),
            IdentityMode::ByDefault => Some("BY DEFAULT"),
        }
    }
}

/// A column default together with the hash that identifies it.
///
/// Declarations may give just the expression; the hash is then derived
/// from its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColumnDefaultInput")]
pub struct ColumnDefault {
    pub expression: String,
    pub hash: String,
}

impl ColumnDefault {
    pub fn new(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        let hash = compute_hash(&canonicalize_expression(&expression));
        Self { expression, hash }
    }

    /// Default read back from the database. A hash stored in the column
    /// comment wins over the one derived from the deparsed expression.
    pub fn introspected(expression: String, comment: Option<&str>) -> Self {
        match comment.map(str::trim).filter(|c| is_hash(c)) {
            Some(hash) => Self {
                expression,
                hash: hash.to_string(),
            },
            None => Self::new(expression),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnDefaultInput {
    Expression(String),
    Number(serde_json::Number),
    Bool(bool),
    Full {
        expression: String,
        hash: Option<String>,
    },
}

impl From<ColumnDefaultInput> for ColumnDefault {
    fn from(input: ColumnDefaultInput) -> Self {
        match input {
            ColumnDefaultInput::Expression(expression) => ColumnDefault::new(expression),
            ColumnDefaultInput::Number(n) => ColumnDefault::new(n.to_string()),
            ColumnDefaultInput::Bool(b) => ColumnDefault::new(b.to_string()),
            ColumnDefaultInput::Full { expression, hash } => match hash {
                Some(hash) => ColumnDefault { expression, hash },
                None => ColumnDefault::new(expression),
            },
        }
    }
}

fn nullable_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    #[serde(default = "nullable_by_default")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ColumnDefault>,
    #[serde(default)]
    pub identity: IdentityMode,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: &str) -> Self {
        Self {
            name: name.into(),
            data_type: normalize_data_type(data_type),
            nullable: true,
            default: None,
            identity: IdentityMode::None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, expression: &str) -> Self {
        self.default = Some(ColumnDefault::new(expression));
        self
    }

    pub fn with_identity(mut self, identity: IdentityMode) -> Self {
        self.identity = identity;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_constraints: Vec<UniqueConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub check_constraints: Vec<CheckConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<Trigger>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_primary_key_column(&self, name: &str) -> bool {
        self.primary_key
            .as_ref()
            .is_some_and(|pk| pk.columns.iter().any(|c| c == name))
    }

    /// Columns that Postgres forces to NOT NULL (primary key members and
    /// identity columns) are marked as such so both sides of a diff agree.
    pub fn normalize(&mut self) {
        let pk_columns: Vec<String> = self
            .primary_key
            .as_ref()
            .map(|pk| pk.columns.clone())
            .unwrap_or_default();

        for column in &mut self.columns {
            column.data_type = normalize_data_type(&column.data_type);
            if pk_columns.contains(&column.name) || column.identity != IdentityMode::None {
                column.nullable = false;
            }
        }
    }
}

/// Spell a type the way `format_type` does, so declared and introspected
/// types compare equal (`varchar(255)` becomes `character varying(255)`).
pub fn normalize_data_type(data_type: &str) -> String {
    let trimmed = data_type.trim();
    if trimmed.starts_with('"') {
        return trimmed.to_string();
    }

    let mut base = trimmed;
    let mut dimensions = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped.trim_end();
        dimensions += 1;
    }

    let lowered = base.to_lowercase();
    let (head, args, tail) = match lowered.find('(') {
        Some(open) => match lowered[open..].find(')') {
            Some(close) => (
                lowered[..open].trim(),
                Some(lowered[open..open + close + 1].replace(' ', "")),
                lowered[open + close + 1..].trim(),
            ),
            None => (lowered.trim(), None, ""),
        },
        None => (lowered.trim(), None, ""),
    };

    let name = format!("{head} {tail}")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let canonical = match name.as_str() {
        "int" | "int4" => "integer",
        "int8" => "bigint",
        "int2" => "smallint",
        "bool" => "boolean",
        "float8" => "double precision",
        "float4" => "real",
        "varchar" => "character varying",
        "char" => "character",
        "decimal" => "numeric",
        "timestamptz" => "timestamp with time zone",
        "timestamp" => "timestamp without time zone",
        "timetz" => "time with time zone",
        "time" => "time without time zone",
        other => other,
    };

    let mut out = match (args, canonical.split_once(' ')) {
        (Some(args), Some((first @ ("timestamp" | "time"), rest))) => {
            format!("{first}{args} {rest}")
        }
        (Some(args), _) => format!("{canonical}{args}"),
        (None, _) => canonical.to_string(),
    };
    for _ in 0..dimensions {
        out.push_str("[]");
    }
    out
}

#[derive(Debug, FromRow)]
struct TableRow {
    schema: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct ColumnRow {
    schema: String,
    table_name: String,
    name: String,
    data_type: String,
    nullable: bool,
    default_expression: Option<String>,
    identity: String,
    comment: Option<String>,
}

/// Fetch ordinary and partitioned tables with their columns.
pub async fn fetch(conn: &mut PgConnection, schemas: &[String]) -> Result<Vec<(String, Table)>> {
    info!("Fetching tables...");
    let table_rows: Vec<TableRow> = sqlx::query_as(
        r#"
        SELECT n.nspname::text AS schema, c.relname::text AS name
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        WHERE c.relkind IN ('r', 'p')
          AND n.nspname::text = ANY($1)
          AND NOT c.relispartition
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = c.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname
        "#,
    )
    .bind(schemas)
    .fetch_all(&mut *conn)
    .await?;

    let column_rows: Vec<ColumnRow> = sqlx::query_as(
        r#"
        SELECT
            n.nspname::text AS schema,
            c.relname::text AS table_name,
            a.attname::text AS name,
            pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
            NOT a.attnotnull AS nullable,
            pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) AS default_expression,
            a.attidentity::text AS identity,
            pg_catalog.col_description(c.oid, a.attnum) AS comment
        FROM pg_attribute a
        JOIN pg_class c ON a.attrelid = c.oid
        JOIN pg_namespace n ON c.relnamespace = n.oid
        LEFT JOIN pg_attrdef ad ON a.attrelid = ad.adrelid AND a.attnum = ad.adnum
        WHERE a.attnum > 0
          AND NOT a.attisdropped
          AND c.relkind IN ('r', 'p')
          AND n.nspname::text = ANY($1)
        ORDER BY n.nspname, c.relname, a.attnum
        "#,
    )
    .bind(schemas)
    .fetch_all(&mut *conn)
    .await?;

    let mut tables: Vec<(String, Table)> = table_rows
        .into_iter()
        .map(|row| (row.schema, Table::new(row.name)))
        .collect();

    for row in column_rows {
        let Some((_, table)) = tables
            .iter_mut()
            .find(|(schema, table)| *schema == row.schema && table.name == row.table_name)
        else {
            continue;
        };
        table.columns.push(Column {
            name: row.name,
            data_type: row.data_type,
            nullable: row.nullable,
            default: row
                .default_expression
                .map(|expr| ColumnDefault::introspected(expr, row.comment.as_deref())),
            identity: IdentityMode::from_code(&row.identity),
        });
    }

    Ok(tables)
}
