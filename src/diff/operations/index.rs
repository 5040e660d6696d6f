use super::SqlRenderer;
use crate::catalog::index::Index;
use crate::render::sql::render_create_index;
use crate::render::{RenderedSql, qualified, quote_ident};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOperation {
    Create {
        schema: String,
        table: String,
        name: String,
        index: Index,
        concurrently: bool,
    },
    Drop {
        schema: String,
        name: String,
        concurrently: bool,
    },
    Rename {
        schema: String,
        from: String,
        to: String,
    },
}

impl SqlRenderer for IndexOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            IndexOperation::Create {
                schema,
                table,
                name,
                index,
                concurrently,
            } => vec![RenderedSql::new(render_create_index(
                schema,
                table,
                name,
                index,
                *concurrently,
            ))],
            IndexOperation::Drop {
                schema,
                name,
                concurrently,
            } => vec![RenderedSql::destructive(format!(
                "DROP INDEX {}{};",
                if *concurrently { "CONCURRENTLY " } else { "" },
                qualified(schema, name)
            ))],
            IndexOperation::Rename { schema, from, to } => vec![RenderedSql::new(format!(
                "ALTER INDEX {} RENAME TO {};",
                qualified(schema, from),
                quote_ident(to)
            ))],
        }
    }
}
