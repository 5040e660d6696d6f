use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnection;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use super::custom_type::EnumType;
use super::table::Table;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tables: BTreeMap<String, Table>,
    #[serde(default)]
    pub enum_types: BTreeMap<String, EnumType>,
    #[serde(default)]
    pub extensions: BTreeSet<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    pub fn with_enum(mut self, enum_type: EnumType) -> Self {
        self.enum_types.insert(enum_type.name.clone(), enum_type);
        self
    }

    pub fn with_extension(mut self, name: &str) -> Self {
        self.extensions.insert(name.to_string());
        self
    }
}

pub fn is_system_schema(schema: &str) -> bool {
    matches!(schema, "pg_catalog" | "information_schema" | "pg_toast")
        || schema.starts_with("pg_temp_")
        || schema.starts_with("pg_toast_temp_")
}

/// Names of all user schemas in the database.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<String>> {
    info!("Fetching schemas...");
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT n.nspname::text
        FROM pg_namespace n
        WHERE NOT EXISTS (
            SELECT 1 FROM pg_depend dep
            WHERE dep.objid = n.oid AND dep.deptype = 'e'
        )
        ORDER BY n.nspname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(names
        .into_iter()
        .filter(|name| !is_system_schema(name))
        .collect())
}
