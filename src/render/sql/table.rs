//! Shared SQL rendering for CREATE TABLE statements and column definitions

use crate::catalog::table::Column;
use crate::render::{qualified, quote_ident};

/// `"name" type [GENERATED ... AS IDENTITY] [DEFAULT expr] [NOT NULL]`
pub fn render_column_definition(column: &Column) -> String {
    let mut def = format!("{} {}", quote_ident(&column.name), column.data_type);

    if let Some(mode) = column.identity.generated_clause() {
        def.push_str(&format!(" GENERATED {mode} AS IDENTITY"));
    }

    if let Some(default) = &column.default {
        def.push_str(&format!(" DEFAULT {}", default.expression));
    }

    if !column.nullable {
        def.push_str(" NOT NULL");
    }

    def
}

/// Render a CREATE TABLE statement with inline column definitions.
///
/// The primary key is not part of the statement; it is added as a named
/// constraint by its own changeset.
pub fn render_create_table(schema: &str, name: &str, columns: &[Column]) -> String {
    let column_definitions = columns
        .iter()
        .map(|column| format!("    {}", render_column_definition(column)))
        .collect::<Vec<_>>();

    if column_definitions.is_empty() {
        return format!("CREATE TABLE {} ();", qualified(schema, name));
    }

    format!(
        "CREATE TABLE {} (\n{}\n);",
        qualified(schema, name),
        column_definitions.join(",\n")
    )
}
