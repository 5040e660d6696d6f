use super::SqlRenderer;
use crate::render::{RenderedSql, quote_ident};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionOperation {
    Create { schema: String, name: String },
    Drop { name: String },
}

impl SqlRenderer for ExtensionOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            ExtensionOperation::Create { schema, name } => vec![RenderedSql::new(format!(
                "CREATE EXTENSION IF NOT EXISTS {} SCHEMA {};",
                quote_ident(name),
                quote_ident(schema)
            ))],
            ExtensionOperation::Drop { name } => vec![RenderedSql::destructive(format!(
                "DROP EXTENSION IF EXISTS {};",
                quote_ident(name)
            ))],
        }
    }
}
