//! In-place column changes: type, nullability, default and identity.
//! All run in Alter, after renames, so they use current names.

use super::{Changeset, ChangesetKind, GeneratorContext, WarningKind};
use crate::catalog::table::{ColumnDefault, IdentityMode};
use crate::diff::operations::{ColumnAction, Statement, TableOperation};
use crate::diff::{ColumnAttribute, DiffEntry, DiffKind, DiffPath, DiffValue};
use crate::render::quote_ident;

pub fn generate(entry: &DiffEntry, _ctx: &GeneratorContext) -> Option<Vec<Changeset>> {
    let DiffPath::ColumnAttribute {
        schema,
        table,
        column,
        attribute,
    } = &entry.path
    else {
        return None;
    };
    if entry.kind == DiffKind::Rename {
        return None;
    }
    let alter = |action| Statement::Table(TableOperation::alter(schema, table, action));

    let changeset = match (attribute, &entry.value, &entry.old_value) {
        (
            ColumnAttribute::DataType,
            Some(DiffValue::DataType(new)),
            Some(DiffValue::DataType(old)),
        ) => {
            let retype = |data_type: &str| {
                alter(ColumnAction::AlterType {
                    name: column.clone(),
                    data_type: data_type.to_string(),
                    using: Some(format!("{}::{}", quote_ident(column), data_type)),
                })
            };
            Changeset::new(ChangesetKind::AlterDataType, schema, Some(table))
                .up(retype(new))
                .down(retype(old))
                .warn(
                    WarningKind::Blocking,
                    "alter_data_type",
                    format!("Changing {schema}.{table}.{column} from {old} to {new} rewrites the table"),
                )
        }
        (ColumnAttribute::Nullable, Some(DiffValue::Nullable(nullable)), _) => {
            let set = alter(ColumnAction::SetNotNull {
                name: column.clone(),
            });
            let drop = alter(ColumnAction::DropNotNull {
                name: column.clone(),
            });
            let changeset = Changeset::new(ChangesetKind::AlterNullability, schema, Some(table));
            if *nullable {
                changeset.up(drop).down(set)
            } else {
                changeset.up(set).down(drop).warn(
                    WarningKind::MightFail,
                    "set_not_null",
                    format!("{schema}.{table}.{column} may already contain NULLs"),
                )
            }
        }
        (ColumnAttribute::Default, new, old) => {
            let new = default_of(new);
            let old = default_of(old);
            if let (Some(n), Some(o)) = (new, old)
                && n.hash == o.hash
            {
                return Some(Vec::new());
            }
            Changeset::new(ChangesetKind::AlterDefault, schema, Some(table))
                .ups(set_default(schema, table, column, new))
                .downs(set_default(schema, table, column, old))
        }
        (
            ColumnAttribute::Identity,
            Some(DiffValue::Identity(new)),
            Some(DiffValue::Identity(old)),
        ) => Changeset::new(ChangesetKind::AlterIdentity, schema, Some(table))
            .up(alter(identity_action(column, *old, *new)))
            .down(alter(identity_action(column, *new, *old))),
        _ => return None,
    };
    Some(vec![changeset])
}

fn default_of(value: &Option<DiffValue>) -> Option<&ColumnDefault> {
    match value {
        Some(DiffValue::Default(default)) => Some(default),
        _ => None,
    }
}

/// Bring the column's default and hash comment to `default`.
fn set_default(
    schema: &str,
    table: &str,
    column: &str,
    default: Option<&ColumnDefault>,
) -> Vec<Statement> {
    match default {
        Some(default) => vec![
            Statement::Table(TableOperation::alter(
                schema,
                table,
                ColumnAction::SetDefault {
                    name: column.to_string(),
                    default: default.expression.clone(),
                },
            )),
            Statement::Table(TableOperation::column_comment(
                schema,
                table,
                column,
                Some(&default.hash),
            )),
        ],
        None => vec![
            Statement::Table(TableOperation::alter(
                schema,
                table,
                ColumnAction::DropDefault {
                    name: column.to_string(),
                },
            )),
            Statement::Table(TableOperation::column_comment(schema, table, column, None)),
        ],
    }
}

fn identity_action(column: &str, from: IdentityMode, to: IdentityMode) -> ColumnAction {
    let name = column.to_string();
    match (from, to) {
        (IdentityMode::None, mode) => ColumnAction::AddIdentity { name, mode },
        (_, IdentityMode::None) => ColumnAction::DropIdentity { name },
        (_, mode) => ColumnAction::SetGenerated { name, mode },
    }
}
