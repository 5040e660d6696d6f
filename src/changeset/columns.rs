//! Added and dropped columns

use super::{Changeset, ChangesetKind, GeneratorContext, WarningKind};
use crate::catalog::table::{Column, IdentityMode};
use crate::diff::operations::{ColumnAction, Statement, TableOperation};
use crate::diff::renames::RenameScope;
use crate::diff::{DiffEntry, DiffKind, DiffPath, DiffValue};

pub fn generate(entry: &DiffEntry, ctx: &GeneratorContext) -> Option<Vec<Changeset>> {
    let DiffPath::Column { schema, table, .. } = &entry.path else {
        return None;
    };
    match (entry.kind, &entry.value, &entry.old_value) {
        (DiffKind::Create, Some(DiffValue::Column(column)), _) => {
            Some(vec![added(schema, table, column, ctx)])
        }
        (DiffKind::Remove, _, Some(DiffValue::Column(column))) => {
            Some(vec![dropped(schema, table, column, ctx)])
        }
        _ => None,
    }
}

/// Runs in Expand, so against the table's name before any rename.
///
/// The column is added nullable and without a default, then the default and
/// its hash comment are set, then NOT NULL. Identity columns are added whole
/// since Postgres fills them on creation.
fn added(schema: &str, table: &str, column: &Column, ctx: &GeneratorContext) -> Changeset {
    let previous_table = ctx.previous_table_name(table);
    let alter = |action| Statement::Table(TableOperation::alter(schema, &previous_table, action));

    let mut changeset = Changeset::new(ChangesetKind::AddColumn, schema, Some(table));
    if column.identity != IdentityMode::None {
        changeset = changeset.up(alter(ColumnAction::Add {
            column: column.clone(),
        }));
    } else {
        changeset = changeset.up(alter(ColumnAction::Add {
            column: Column {
                nullable: true,
                default: None,
                ..column.clone()
            },
        }));
        if let Some(default) = &column.default {
            changeset = changeset
                .up(alter(ColumnAction::SetDefault {
                    name: column.name.clone(),
                    default: default.expression.clone(),
                }))
                .up(Statement::Table(TableOperation::column_comment(
                    schema,
                    &previous_table,
                    &column.name,
                    Some(&default.hash),
                )));
        }
        if !column.nullable {
            changeset = changeset.up(alter(ColumnAction::SetNotNull {
                name: column.name.clone(),
            }));
            let message = match &column.default {
                None => format!(
                    "{schema}.{table}.{} is NOT NULL without a default; existing rows make it fail",
                    column.name
                ),
                Some(_) => format!(
                    "{schema}.{table}.{} is added nullable before SET NOT NULL; rows inserted in between fail it",
                    column.name
                ),
            };
            changeset = changeset.warn(WarningKind::MightFail, "not_null_column", message);
        }
    }

    changeset.down(alter(ColumnAction::Drop {
        name: column.name.clone(),
    }))
}

/// Runs in Contract, against the current table name.
fn dropped(schema: &str, table: &str, column: &Column, ctx: &GeneratorContext) -> Changeset {
    let alter = |action| Statement::Table(TableOperation::alter(schema, table, action));

    let mut changeset = Changeset::new(ChangesetKind::DropColumn, schema, Some(table))
        .up(alter(ColumnAction::Drop {
            name: column.name.clone(),
        }))
        .down(alter(ColumnAction::Add {
            column: column.clone(),
        }))
        .warn(
            WarningKind::Destructive,
            "drop_column",
            format!("Dropping {schema}.{table}.{} deletes its data", column.name),
        );
    if let Some(default) = &column.default {
        changeset = changeset.down(Statement::Table(TableOperation::column_comment(
            schema,
            table,
            &column.name,
            Some(&default.hash),
        )));
    }

    let scope = RenameScope::Column {
        schema: schema.to_string(),
        table: table.to_string(),
    };
    if ctx.is_unresolved(&scope, &column.name) {
        changeset = changeset.warn(
            WarningKind::BackwardIncompatible,
            "unresolved_rename",
            format!(
                "{schema}.{table}.{} may have been renamed; it is dropped instead",
                column.name
            ),
        );
    }
    changeset
}
