//! Whole-table create and drop

use super::{Changeset, ChangesetKind, GeneratorContext, WarningKind};
use crate::catalog::table::Table;
use crate::diff::operations::{Statement, TableOperation};
use crate::diff::renames::RenameScope;
use crate::diff::{DiffEntry, DiffKind, DiffPath, DiffValue};

pub fn generate(entry: &DiffEntry, ctx: &GeneratorContext) -> Option<Vec<Changeset>> {
    let DiffPath::Table { schema, table } = &entry.path else {
        return None;
    };
    match (entry.kind, &entry.value, &entry.old_value) {
        (DiffKind::Create, Some(DiffValue::Table(new)), _) => Some(vec![
            Changeset::new(ChangesetKind::CreateTable, schema, Some(table))
                .ups(create(schema, new))
                .down(drop(schema, &new.name)),
        ]),
        (DiffKind::Remove, _, Some(DiffValue::Table(old))) => {
            let mut changeset = Changeset::new(ChangesetKind::DropTable, schema, Some(table))
                .up(drop(schema, &old.name))
                .downs(create(schema, old))
                .warn(
                    WarningKind::Destructive,
                    "drop_table",
                    format!("Dropping table {schema}.{table} deletes its data"),
                );
            let scope = RenameScope::Table {
                schema: schema.clone(),
            };
            if ctx.is_unresolved(&scope, table) {
                changeset = changeset.warn(
                    WarningKind::BackwardIncompatible,
                    "unresolved_rename",
                    format!("{schema}.{table} may have been renamed; it is dropped instead"),
                );
            }
            Some(vec![changeset])
        }
        _ => None,
    }
}

/// CREATE TABLE plus the comments recording each default's hash.
pub fn create(schema: &str, table: &Table) -> Vec<Statement> {
    let mut statements = vec![Statement::Table(TableOperation::Create {
        schema: schema.to_string(),
        name: table.name.clone(),
        columns: table.columns.clone(),
    })];
    for column in &table.columns {
        if let Some(default) = &column.default {
            statements.push(Statement::Table(TableOperation::column_comment(
                schema,
                &table.name,
                &column.name,
                Some(&default.hash),
            )));
        }
    }
    statements
}

fn drop(schema: &str, name: &str) -> Statement {
    Statement::Table(TableOperation::Drop {
        schema: schema.to_string(),
        name: name.to_string(),
    })
}
