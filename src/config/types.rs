use clap::Args;
use serde::{Deserialize, Serialize};

use crate::diff::renames::RenameIntent;

/// Raw configuration input - all fields Optional for merging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigInput {
    pub database: Option<DatabaseInput>,
    pub schema: Option<SchemaInput>,
    pub renames: Option<RenamesInput>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub database: Database,
    pub schema: SchemaSettings,
    pub renames: Renames,
}

// Database configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseInput {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Database {
    /// Connection string of the database to introspect, if any.
    pub url: Option<String>,
}

// Declaration configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemaInput {
    /// Schema that unqualified declarations and renames belong to.
    pub name: Option<String>,
    /// Convert camelCase identifiers in the declaration to snake_case.
    pub camel_case_enabled: Option<bool>,
    /// Schemas to introspect; all user schemas when empty.
    pub introspect: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SchemaSettings {
    pub name: String,
    pub camel_case_enabled: bool,
    pub introspect: Vec<String>,
}

// Explicit renames
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RenamesInput {
    pub tables: Option<Vec<TableRenameInput>>,
    pub columns: Option<Vec<ColumnRenameInput>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TableRenameInput {
    pub schema: Option<String>,
    pub from: String,
    pub to: String,
}

/// `table` is the table's name after any table rename.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnRenameInput {
    pub schema: Option<String>,
    pub table: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default)]
pub struct Renames {
    pub tables_to_rename: Vec<RenameIntent>,
    pub columns_to_rename: Vec<RenameIntent>,
}

impl Renames {
    pub fn all(&self) -> Vec<RenameIntent> {
        self.tables_to_rename
            .iter()
            .chain(&self.columns_to_rename)
            .cloned()
            .collect()
    }
}

// CLI argument group shared by commands that plan
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    #[arg(long, help = "Database URL (defaults to DATABASE_URL)")]
    pub database_url: Option<String>,

    #[arg(long, help = "Schema for unqualified declarations and renames")]
    pub schema_name: Option<String>,

    #[arg(long, help = "Convert camelCase identifiers to snake_case")]
    pub camel_case: bool,

    #[arg(
        long = "rename-table",
        value_name = "FROM=TO",
        value_parser = parse_table_rename,
        help = "Rename a table instead of dropping and creating it"
    )]
    pub rename_tables: Vec<TableRenameInput>,

    #[arg(
        long = "rename-column",
        value_name = "TABLE.FROM=TO",
        value_parser = parse_column_rename,
        help = "Rename a column instead of dropping and adding it"
    )]
    pub rename_columns: Vec<ColumnRenameInput>,
}

fn split_rename(value: &str) -> Result<(&str, &str), String> {
    match value.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            Ok((from.trim(), to.trim()))
        }
        _ => Err(format!("expected FROM=TO, got '{value}'")),
    }
}

/// `from=to` or `schema.from=to`.
pub fn parse_table_rename(value: &str) -> Result<TableRenameInput, String> {
    let (from, to) = split_rename(value)?;
    let (schema, from) = match from.split_once('.') {
        Some((schema, from)) => (Some(schema.to_string()), from),
        None => (None, from),
    };
    Ok(TableRenameInput {
        schema,
        from: from.to_string(),
        to: to.to_string(),
    })
}

/// `table.from=to` or `schema.table.from=to`.
pub fn parse_column_rename(value: &str) -> Result<ColumnRenameInput, String> {
    let (qualified, to) = split_rename(value)?;
    let parts: Vec<&str> = qualified.split('.').collect();
    let (schema, table, from) = match parts.as_slice() {
        [table, from] => (None, *table, *from),
        [schema, table, from] => (Some(schema.to_string()), *table, *from),
        _ => return Err(format!("expected TABLE.FROM=TO, got '{value}'")),
    };
    Ok(ColumnRenameInput {
        schema,
        table: table.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    })
}

impl From<ConfigArgs> for ConfigInput {
    fn from(args: ConfigArgs) -> Self {
        let renames = if args.rename_tables.is_empty() && args.rename_columns.is_empty() {
            None
        } else {
            Some(RenamesInput {
                tables: Some(args.rename_tables),
                columns: Some(args.rename_columns),
            })
        };
        let schema = if args.schema_name.is_some() || args.camel_case {
            Some(SchemaInput {
                name: args.schema_name,
                camel_case_enabled: args.camel_case.then_some(true),
                introspect: None,
            })
        } else {
            None
        };

        Self {
            database: args.database_url.map(|url| DatabaseInput { url: Some(url) }),
            schema,
            renames,
        }
    }
}
