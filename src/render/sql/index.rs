//! Shared SQL rendering for CREATE INDEX statements

use crate::catalog::index::Index;
use crate::render::{qualified, quote_ident};

/// Render `CREATE [UNIQUE] INDEX [CONCURRENTLY] name ON table USING method (...)`.
///
/// Index columns are rendered as written, since they may be expressions.
pub fn render_create_index(
    schema: &str,
    table: &str,
    name: &str,
    index: &Index,
    concurrently: bool,
) -> String {
    let mut sql = String::from("CREATE ");
    if index.unique {
        sql.push_str("UNIQUE ");
    }
    sql.push_str("INDEX ");
    if concurrently {
        sql.push_str("CONCURRENTLY ");
    }
    sql.push_str(&quote_ident(name));

    sql.push_str(" ON ");
    sql.push_str(&qualified(schema, table));

    sql.push_str(" USING ");
    sql.push_str(&index.method.to_lowercase());

    sql.push_str(&format!(" ({})", index.columns.join(", ")));

    if let Some(predicate) = &index.predicate {
        sql.push_str(&format!(" WHERE {}", predicate));
    }

    sql.push(';');
    sql
}
