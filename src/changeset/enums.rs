//! Enum types. Postgres can append or insert labels but not remove or
//! reorder them, so only additions are planned.

use super::{Changeset, ChangesetKind, GeneratorContext, WarningKind};
use crate::catalog::custom_type::EnumType;
use crate::diff::operations::{EnumValuePosition, Statement, TypeOperation};
use crate::diff::{DiffEntry, DiffKind, DiffPath, DiffValue};
use tracing::warn;

pub fn generate(entry: &DiffEntry, _ctx: &GeneratorContext) -> Option<Vec<Changeset>> {
    let DiffPath::EnumType { schema, name } = &entry.path else {
        return None;
    };
    match (entry.kind, &entry.value, &entry.old_value) {
        (DiffKind::Create, Some(DiffValue::EnumType(new)), _) => Some(vec![
            Changeset::new(ChangesetKind::CreateEnum, schema, None)
                .up(create(schema, new))
                .down(drop(schema, name)),
        ]),
        (DiffKind::Remove, _, Some(DiffValue::EnumType(old))) => Some(vec![
            Changeset::new(ChangesetKind::DropEnum, schema, None)
                .up(drop(schema, name))
                .down(create(schema, old))
                .warn(
                    WarningKind::Destructive,
                    "drop_enum",
                    format!("Dropping enum type {schema}.{name}"),
                ),
        ]),
        (DiffKind::Change, Some(DiffValue::EnumType(new)), Some(DiffValue::EnumType(old))) => {
            Some(added_values(schema, old, new))
        }
        _ => None,
    }
}

fn create(schema: &str, enum_type: &EnumType) -> Statement {
    Statement::Type(TypeOperation::CreateEnum {
        schema: schema.to_string(),
        name: enum_type.name.clone(),
        values: enum_type.values.clone(),
    })
}

fn drop(schema: &str, name: &str) -> Statement {
    Statement::Type(TypeOperation::DropEnum {
        schema: schema.to_string(),
        name: name.to_string(),
    })
}

/// One changeset per new label, in list order. Each label is placed after
/// the label before it, which exists by then. A leading run goes before the
/// first existing label.
fn added_values(schema: &str, old: &EnumType, new: &EnumType) -> Vec<Changeset> {
    let removed: Vec<&String> = old.values.iter().filter(|v| !new.values.contains(v)).collect();
    if !removed.is_empty() {
        warn!(
            "Enum {schema}.{}: removing values {:?} is not supported, skipping",
            new.name, removed
        );
    }

    let kept_old: Vec<&String> = old.values.iter().filter(|v| new.values.contains(v)).collect();
    let kept_new: Vec<&String> = new.values.iter().filter(|v| old.values.contains(v)).collect();
    if kept_old != kept_new {
        warn!(
            "Enum {schema}.{}: reordering existing values is not supported, skipping",
            new.name
        );
    }

    let mut previous: Option<&String> = None;
    let mut changesets = Vec::new();
    for (i, value) in new.values.iter().enumerate() {
        if old.values.contains(value) {
            previous = Some(value);
            continue;
        }
        let position = match previous {
            Some(previous) => Some(EnumValuePosition::After(previous.clone())),
            None => new.values[i + 1..]
                .iter()
                .find(|next| old.values.contains(next))
                .map(|next| EnumValuePosition::Before(next.clone())),
        };
        changesets.push(
            Changeset::new(ChangesetKind::AddEnumValue, schema, None).up(Statement::Type(
                TypeOperation::AddValue {
                    schema: schema.to_string(),
                    name: new.name.clone(),
                    value: value.clone(),
                    position,
                },
            )),
        );
        previous = Some(value);
    }
    changesets
}
