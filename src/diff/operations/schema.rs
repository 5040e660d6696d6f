//! Schema operations

use super::SqlRenderer;
use crate::render::{RenderedSql, quote_ident};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaOperation {
    Create { name: String },
    Drop { name: String },
}

impl SqlRenderer for SchemaOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            SchemaOperation::Create { name } => vec![RenderedSql::new(format!(
                "CREATE SCHEMA IF NOT EXISTS {};",
                quote_ident(name)
            ))],
            SchemaOperation::Drop { name } => vec![RenderedSql::destructive(format!(
                "DROP SCHEMA {};",
                quote_ident(name)
            ))],
        }
    }
}
