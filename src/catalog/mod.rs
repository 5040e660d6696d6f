use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};

pub mod constraint;
pub mod custom_type;
pub mod extension;
pub mod hash;
pub mod index;
pub mod object;
pub mod schema;
pub mod table;
pub mod triggers;

use constraint::TableConstraint;
use schema::Schema;
use table::Table;

/// One side of a comparison: the declared schema or the introspected one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub schemas: Vec<Schema>,
}

/// An introspected item together with the table that owns it.
#[derive(Debug, Clone)]
pub struct OnTable<T> {
    pub schema: String,
    pub table: String,
    pub item: T,
}

impl SchemaSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn table(&self, schema: &str, table: &str) -> Option<&Table> {
        self.schema(schema).and_then(|s| s.tables.get(table))
    }

    fn schema_mut(&mut self, name: &str) -> Option<&mut Schema> {
        self.schemas.iter_mut().find(|s| s.name == name)
    }

    fn table_mut(&mut self, schema: &str, table: &str) -> Option<&mut Table> {
        self.schema_mut(schema).and_then(|s| s.tables.get_mut(table))
    }

    /// Introspect `schemas` (all user schemas when empty).
    #[allow(clippy::explicit_auto_deref)] // Required for PoolConnection -> PgConnection deref
    pub async fn load(pool: &PgPool, schemas: &[String]) -> Result<Self> {
        // One connection so format_type() sees a single search_path for every query.
        let mut conn = pool
            .acquire()
            .await
            .context("Failed to acquire a connection for introspection")?;

        sqlx::query("SET search_path = public, pg_catalog")
            .execute(&mut *conn)
            .await
            .context("Failed to set search_path for introspection")?;

        let mut names = schema::fetch(&mut *conn)
            .await
            .context("Failed to fetch schemas")?;
        if !schemas.is_empty() {
            names.retain(|name| schemas.contains(name));
        }
        info!("Introspecting schemas: {}", names.join(", "));

        let mut snapshot = SchemaSnapshot {
            schemas: names.iter().map(Schema::new).collect(),
        };

        for (schema, name) in extension::fetch(&mut *conn, &names)
            .await
            .context("Failed to fetch extensions")?
        {
            if let Some(s) = snapshot.schema_mut(&schema) {
                s.extensions.insert(name);
            }
        }

        for (schema, enum_type) in custom_type::fetch(&mut *conn, &names)
            .await
            .context("Failed to fetch enum types")?
        {
            if let Some(s) = snapshot.schema_mut(&schema) {
                s.enum_types.insert(enum_type.name.clone(), enum_type);
            }
        }

        for (schema, table) in table::fetch(&mut *conn, &names)
            .await
            .context("Failed to fetch tables")?
        {
            if let Some(s) = snapshot.schema_mut(&schema) {
                s.tables.insert(table.name.clone(), table);
            }
        }

        for owned in constraint::fetch(&mut *conn, &names)
            .await
            .context("Failed to fetch constraints")?
        {
            let Some(table) = snapshot.table_mut(&owned.schema, &owned.table) else {
                debug!("Skipping constraint on unknown table {}", owned.table);
                continue;
            };
            match owned.item {
                TableConstraint::PrimaryKey(pk) => table.primary_key = Some(pk),
                TableConstraint::Unique(unique) => table.unique_constraints.push(unique),
                TableConstraint::Check(check) => table.check_constraints.push(check),
                TableConstraint::ForeignKey(fk) => table.foreign_keys.push(fk),
            }
        }

        for owned in index::fetch(&mut *conn, &names)
            .await
            .context("Failed to fetch indexes")?
        {
            if let Some(table) = snapshot.table_mut(&owned.schema, &owned.table) {
                table.indexes.push(owned.item);
            }
        }

        for owned in triggers::fetch(&mut *conn, &names)
            .await
            .context("Failed to fetch triggers")?
        {
            if let Some(table) = snapshot.table_mut(&owned.schema, &owned.table) {
                table.triggers.push(owned.item);
            }
        }

        info!("Introspection complete");
        Ok(snapshot)
    }
}
