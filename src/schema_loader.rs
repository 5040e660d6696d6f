//! Reading a declared schema from YAML or JSON.
//!
//! A declaration is either a full snapshot (`schemas:` as a list or a map
//! keyed by schema name) or the body of a single schema, which then belongs
//! to the configured schema. Map keys supply table, enum and schema names
//! that the bodies leave out.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::SchemaSnapshot;
use crate::catalog::hash::NameMap;
use crate::catalog::schema::Schema;
use crate::catalog::table::Table;

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Schema a single-schema declaration belongs to.
    pub schema_name: String,
    pub camel_case_enabled: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            schema_name: "public".to_string(),
            camel_case_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Declaration {
    Snapshot { schemas: SchemaList },
    Single(Schema),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaList {
    List(Vec<Schema>),
    Map(BTreeMap<String, Schema>),
}

/// Load and normalize the declaration at `path`.
pub fn load_declaration(path: &Path, options: &LoadOptions) -> Result<SchemaSnapshot> {
    info!("Loading declaration from {}", path.display());
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read declaration {}", path.display()))?;
    parse_declaration(&contents, Format::from_path(path), options)
        .with_context(|| format!("Invalid declaration {}", path.display()))
}

pub fn parse_declaration(
    contents: &str,
    format: Format,
    options: &LoadOptions,
) -> Result<SchemaSnapshot> {
    let declaration: Declaration = match format {
        Format::Yaml => serde_yaml::from_str(contents).context("Failed to parse YAML")?,
        Format::Json => serde_json::from_str(contents).context("Failed to parse JSON")?,
    };

    let schemas = match declaration {
        Declaration::Snapshot {
            schemas: SchemaList::List(schemas),
        } => schemas,
        Declaration::Snapshot {
            schemas: SchemaList::Map(schemas),
        } => schemas
            .into_iter()
            .map(|(name, mut schema)| {
                schema.name = name;
                schema
            })
            .collect(),
        Declaration::Single(mut schema) => {
            if schema.name.is_empty() {
                schema.name = options.schema_name.clone();
            }
            vec![schema]
        }
    };

    let mut snapshot = SchemaSnapshot {
        schemas: schemas
            .into_iter()
            .map(|schema| prepare_schema(schema, options))
            .collect::<Result<_>>()?,
    };
    snapshot.schemas.sort_by(|a, b| a.name.cmp(&b.name));
    validate(&snapshot)?;

    debug!(
        "Declaration has {} tables",
        snapshot
            .schemas
            .iter()
            .map(|s| s.tables.len())
            .sum::<usize>()
    );
    Ok(snapshot)
}

fn prepare_schema(mut schema: Schema, options: &LoadOptions) -> Result<Schema> {
    if schema.name.is_empty() {
        bail!("Schema without a name");
    }

    let convert = |name: String| {
        if options.camel_case_enabled {
            to_snake_case(&name)
        } else {
            name
        }
    };

    let mut tables = BTreeMap::new();
    for (key, mut table) in std::mem::take(&mut schema.tables) {
        if table.name.is_empty() {
            table.name = key;
        }
        if options.camel_case_enabled {
            snake_case_table(&mut table);
        }
        table.normalize();
        if tables.insert(table.name.clone(), table).is_some() {
            bail!("Table declared twice in schema {}", schema.name);
        }
    }
    schema.tables = tables;

    schema.enum_types = std::mem::take(&mut schema.enum_types)
        .into_iter()
        .map(|(key, mut enum_type)| {
            if enum_type.name.is_empty() {
                enum_type.name = key;
            }
            enum_type.name = convert(enum_type.name);
            (enum_type.name.clone(), enum_type)
        })
        .collect();

    Ok(schema)
}

fn snake_case_table(table: &mut Table) {
    let convert_all = |names: &mut Vec<String>| {
        for name in names.iter_mut() {
            *name = to_snake_case(name);
        }
    };

    // Column references inside expressions follow the column renames.
    let declared = table.name.clone();
    let mut names = NameMap::identity();
    for column in &mut table.columns {
        let converted = to_snake_case(&column.name);
        names.insert_column("", &declared, &column.name, &converted);
        column.name = converted;
    }
    let rewrite = |expr: &mut String| *expr = names.rewrite_expression("", &declared, expr);

    for check in &mut table.check_constraints {
        rewrite(&mut check.expression);
    }
    for trigger in &mut table.triggers {
        if let Some(condition) = &mut trigger.condition {
            rewrite(condition);
        }
    }
    for index in &mut table.indexes {
        for column in &mut index.columns {
            if is_plain_identifier(column) {
                *column = to_snake_case(column);
            } else {
                rewrite(column);
            }
        }
        if let Some(predicate) = &mut index.predicate {
            rewrite(predicate);
        }
    }

    table.name = to_snake_case(&table.name);
    if let Some(pk) = &mut table.primary_key {
        convert_all(&mut pk.columns);
    }
    for unique in &mut table.unique_constraints {
        convert_all(&mut unique.columns);
    }
    for fk in &mut table.foreign_keys {
        convert_all(&mut fk.columns);
        convert_all(&mut fk.referenced_columns);
        fk.referenced_table = to_snake_case(&fk.referenced_table);
    }
}

fn is_plain_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// `emailAddress` becomes `email_address`, `userID` becomes `user_id`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Every column a key, constraint or plain-column index names must exist.
fn validate(snapshot: &SchemaSnapshot) -> Result<()> {
    let mut problems = Vec::new();

    for schema in &snapshot.schemas {
        for table in schema.tables.values() {
            let qualified = format!("{}.{}", schema.name, table.name);
            let mut seen = BTreeSet::new();
            for column in &table.columns {
                if !seen.insert(column.name.as_str()) {
                    problems.push(format!("{qualified}: column {} declared twice", column.name));
                }
            }

            let mut check = |what: &str, columns: &[String]| {
                for column in columns {
                    if table.column(column).is_none() {
                        problems.push(format!("{qualified}: {what} names unknown column {column}"));
                    }
                }
            };
            if let Some(pk) = &table.primary_key {
                check("primary key", &pk.columns);
            }
            for unique in &table.unique_constraints {
                check("unique constraint", &unique.columns);
            }
            for fk in &table.foreign_keys {
                check("foreign key", &fk.columns);
            }
            for index in &table.indexes {
                let plain: Vec<String> = index
                    .columns
                    .iter()
                    .filter(|c| is_plain_identifier(c))
                    .cloned()
                    .collect();
                check("index", &plain);
            }

            for fk in &table.foreign_keys {
                if fk.columns.len() != fk.referenced_columns.len() {
                    problems.push(format!(
                        "{qualified}: foreign key to {} has {} columns but references {}",
                        fk.referenced_table,
                        fk.columns.len(),
                        fk.referenced_columns.len()
                    ));
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        bail!("{}", problems.join("\n"))
    }
}
