//! Table and column renames. Object renames live with the objects.

use super::{Changeset, ChangesetKind, GeneratorContext, WarningKind};
use crate::diff::operations::{ColumnAction, Statement, TableOperation};
use crate::diff::{DiffEntry, DiffKind, DiffPath, DiffValue};

pub fn generate(entry: &DiffEntry, _ctx: &GeneratorContext) -> Option<Vec<Changeset>> {
    if entry.kind != DiffKind::Rename {
        return None;
    }
    let (Some(DiffValue::Name(to)), Some(DiffValue::Name(from))) = (&entry.value, &entry.old_value)
    else {
        return None;
    };

    match &entry.path {
        DiffPath::Table { schema, table } => {
            let rename = |from: &str, to: &str| {
                Statement::Table(TableOperation::Rename {
                    schema: schema.clone(),
                    from: from.to_string(),
                    to: to.to_string(),
                })
            };
            Some(vec![
                Changeset::new(ChangesetKind::RenameTable, schema, Some(table))
                    .up(rename(from, to))
                    .down(rename(to, from))
                    .warn(
                        WarningKind::BackwardIncompatible,
                        "rename_table",
                        format!("Renaming {schema}.{from} to {to} breaks clients using the old name"),
                    ),
            ])
        }
        DiffPath::Column { schema, table, .. } => {
            let rename = |from: &str, to: &str| {
                Statement::Table(TableOperation::alter(
                    schema,
                    table,
                    ColumnAction::Rename {
                        from: from.to_string(),
                        to: to.to_string(),
                    },
                ))
            };
            Some(vec![
                Changeset::new(ChangesetKind::RenameColumn, schema, Some(table))
                    .up(rename(from, to))
                    .down(rename(to, from))
                    .warn(
                        WarningKind::BackwardIncompatible,
                        "rename_column",
                        format!(
                            "Renaming {schema}.{table}.{from} to {to} breaks clients using the old name"
                        ),
                    ),
            ])
        }
        _ => None,
    }
}
