use super::{ColumnAttribute, DiffEntry, DiffPath, DiffValue};
use crate::catalog::hash::NameMap;
use crate::catalog::table::{Column, Table};
use std::collections::BTreeSet;

/// Diff the columns of a table present on both sides.
///
/// Local columns are matched to remote ones through `names`, so a mapped
/// column yields a rename entry plus attribute changes instead of a
/// create/remove pair. Attribute entries only fire for matched columns.
pub fn diff(schema: &str, old: &Table, new: &Table, names: &NameMap) -> Vec<DiffEntry> {
    let table = new.name.as_str();
    let mut out = Vec::new();
    let mut matched = BTreeSet::new();

    for column in &new.columns {
        let previous = names.column(schema, table, &column.name);
        match old.column(&previous) {
            Some(existing) => {
                if previous != column.name {
                    out.push(DiffEntry::rename(
                        column_path(schema, table, &column.name),
                        &column.name,
                        &previous,
                    ));
                }
                out.extend(attributes(schema, table, existing, column));
                matched.insert(previous);
            }
            None => out.push(DiffEntry::create(
                column_path(schema, table, &column.name),
                DiffValue::Column(column.clone()),
            )),
        }
    }

    for column in &old.columns {
        if !matched.contains(&column.name) {
            out.push(DiffEntry::remove(
                column_path(schema, table, &column.name),
                DiffValue::Column(column.clone()),
            ));
        }
    }

    out
}

fn column_path(schema: &str, table: &str, column: &str) -> DiffPath {
    DiffPath::Column {
        schema: schema.to_string(),
        table: table.to_string(),
        column: column.to_string(),
    }
}

fn attributes(schema: &str, table: &str, old: &Column, new: &Column) -> Vec<DiffEntry> {
    let path = |attribute| DiffPath::ColumnAttribute {
        schema: schema.to_string(),
        table: table.to_string(),
        column: new.name.clone(),
        attribute,
    };
    let mut out = Vec::new();

    if old.data_type != new.data_type {
        out.push(DiffEntry::change(
            path(ColumnAttribute::DataType),
            DiffValue::DataType(new.data_type.clone()),
            DiffValue::DataType(old.data_type.clone()),
        ));
    }

    if old.nullable != new.nullable {
        out.push(DiffEntry::change(
            path(ColumnAttribute::Nullable),
            DiffValue::Nullable(new.nullable),
            DiffValue::Nullable(old.nullable),
        ));
    }

    match (&old.default, &new.default) {
        (None, Some(n)) => out.push(DiffEntry::create(
            path(ColumnAttribute::Default),
            DiffValue::Default(n.clone()),
        )),
        (Some(o), None) => out.push(DiffEntry::remove(
            path(ColumnAttribute::Default),
            DiffValue::Default(o.clone()),
        )),
        (Some(o), Some(n)) if o.hash != n.hash => out.push(DiffEntry::change(
            path(ColumnAttribute::Default),
            DiffValue::Default(n.clone()),
            DiffValue::Default(o.clone()),
        )),
        _ => {}
    }

    if old.identity != new.identity {
        out.push(DiffEntry::change(
            path(ColumnAttribute::Identity),
            DiffValue::Identity(new.identity),
            DiffValue::Identity(old.identity),
        ));
    }

    out
}
