//! Indexes, unique/check/foreign key constraints and triggers.
//!
//! Creates run in Expand against the table's previous name with columns
//! translated back through pending renames; drops run in Contract against the
//! current name. When a create and a drop would collide on the same name both
//! move to Alter as a replacement.

use super::{Changeset, ChangesetKind, GeneratorContext, WarningKind};
use crate::catalog::constraint::ForeignKey;
use crate::catalog::hash::NameMap;
use crate::catalog::object::{ObjectKind, TableObject};
use crate::diff::operations::{
    ConstraintDefinition, ConstraintOperation, IndexOperation, Statement, TriggerOperation,
};
use crate::diff::{DiffEntry, DiffKind, DiffPath, DiffValue};
use std::collections::BTreeSet;

pub fn generate(entry: &DiffEntry, ctx: &GeneratorContext) -> Option<Vec<Changeset>> {
    let (schema, table, kind) = match &entry.path {
        DiffPath::Objects {
            schema,
            table,
            kind,
        }
        | DiffPath::Object {
            schema,
            table,
            kind,
            ..
        } => (schema.as_str(), table.as_str(), *kind),
        _ => return None,
    };

    match (entry.kind, &entry.value, &entry.old_value) {
        (DiffKind::Create, Some(DiffValue::Objects(objects)), _) => Some(
            objects
                .iter()
                .map(|o| created(schema, table, o, ctx))
                .collect(),
        ),
        (DiffKind::Create, Some(DiffValue::Object(object)), _) => {
            Some(vec![created(schema, table, object, ctx)])
        }
        (DiffKind::Remove, _, Some(DiffValue::Objects(objects))) => Some(
            objects
                .iter()
                .map(|o| removed(schema, table, o, ctx))
                .collect(),
        ),
        (DiffKind::Remove, _, Some(DiffValue::Object(object))) => {
            Some(vec![removed(schema, table, object, ctx)])
        }
        (DiffKind::Rename, Some(DiffValue::Name(to)), Some(DiffValue::Name(from))) => {
            Some(vec![renamed(schema, table, kind, from, to)])
        }
        _ => None,
    }
}

fn create_kind(kind: ObjectKind) -> ChangesetKind {
    match kind {
        ObjectKind::Index => ChangesetKind::CreateIndex,
        ObjectKind::Unique => ChangesetKind::CreateUnique,
        ObjectKind::Check => ChangesetKind::CreateCheck,
        ObjectKind::ForeignKey => ChangesetKind::CreateForeignKey,
        ObjectKind::Trigger => ChangesetKind::CreateTrigger,
    }
}

fn drop_kind(kind: ObjectKind) -> ChangesetKind {
    match kind {
        ObjectKind::Index => ChangesetKind::DropIndex,
        ObjectKind::Unique => ChangesetKind::DropUnique,
        ObjectKind::Check => ChangesetKind::DropCheck,
        ObjectKind::ForeignKey => ChangesetKind::DropForeignKey,
        ObjectKind::Trigger => ChangesetKind::DropTrigger,
    }
}

fn create_statement(
    schema: &str,
    table: &str,
    name: &str,
    object: &TableObject,
    concurrently: bool,
) -> Statement {
    let constraint = |definition| {
        Statement::Constraint(ConstraintOperation::Add {
            schema: schema.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            definition,
        })
    };
    match object {
        TableObject::Index(index) => Statement::Index(IndexOperation::Create {
            schema: schema.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            index: index.clone(),
            concurrently,
        }),
        TableObject::Unique(unique) => constraint(ConstraintDefinition::unique(unique)),
        TableObject::Check(check) => constraint(ConstraintDefinition::check(check)),
        TableObject::ForeignKey(fk) => constraint(ConstraintDefinition::foreign_key(schema, fk)),
        TableObject::Trigger(trigger) => Statement::Trigger(TriggerOperation::Create {
            schema: schema.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            trigger: trigger.clone(),
        }),
    }
}

fn drop_statement(
    schema: &str,
    table: &str,
    name: &str,
    kind: ObjectKind,
    concurrently: bool,
) -> Statement {
    match kind {
        ObjectKind::Index => Statement::Index(IndexOperation::Drop {
            schema: schema.to_string(),
            name: name.to_string(),
            concurrently,
        }),
        ObjectKind::Unique | ObjectKind::Check | ObjectKind::ForeignKey => {
            Statement::Constraint(ConstraintOperation::Drop {
                schema: schema.to_string(),
                table: table.to_string(),
                name: name.to_string(),
            })
        }
        ObjectKind::Trigger => Statement::Trigger(TriggerOperation::Drop {
            schema: schema.to_string(),
            table: table.to_string(),
            name: name.to_string(),
        }),
    }
}

fn rename_statement(schema: &str, table: &str, kind: ObjectKind, from: &str, to: &str) -> Statement {
    match kind {
        ObjectKind::Index => Statement::Index(IndexOperation::Rename {
            schema: schema.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }),
        ObjectKind::Unique | ObjectKind::Check | ObjectKind::ForeignKey => {
            Statement::Constraint(ConstraintOperation::Rename {
                schema: schema.to_string(),
                table: table.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            })
        }
        ObjectKind::Trigger => Statement::Trigger(TriggerOperation::Rename {
            schema: schema.to_string(),
            table: table.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

/// A remote object of the same kind already uses `name`.
fn taken_remotely(schema: &str, table: &str, kind: ObjectKind, name: &str, ctx: &GeneratorContext) -> bool {
    let previous_table = ctx.previous_table_name(table);
    ctx.remote_table(table).is_some_and(|remote| {
        remote
            .objects(kind)
            .iter()
            .any(|o| o.expected_name(schema, &previous_table) == name)
    })
}

/// A local object of the same kind will use `name`.
fn wanted_locally(schema: &str, table: &str, kind: ObjectKind, name: &str, ctx: &GeneratorContext) -> bool {
    ctx.local_table(table).is_some_and(|local| {
        local
            .objects(kind)
            .iter()
            .any(|o| o.expected_name(schema, table) == name)
    })
}

fn created(schema: &str, table: &str, object: &TableObject, ctx: &GeneratorContext) -> Changeset {
    let kind = object.kind();
    let name = object.expected_name(schema, table);
    let new_table = ctx.is_new_table(table);

    if !new_table && taken_remotely(schema, table, kind, &name, ctx) {
        return Changeset::new(ChangesetKind::ReplaceObjectCreate, schema, Some(table))
            .up(create_statement(schema, table, &name, object, false))
            .down(drop_statement(schema, table, &name, kind, false));
    }

    let previous_table = ctx.previous_table_name(table);
    let translated = object.translated(schema, table, ctx.renames.previous_names());
    let concurrently = kind == ObjectKind::Index && !new_table;

    let mut changeset = Changeset::new(create_kind(kind), schema, Some(table))
        .up(create_statement(
            schema,
            &previous_table,
            &name,
            &translated,
            concurrently,
        ))
        .down(drop_statement(
            schema,
            &previous_table,
            &name,
            kind,
            concurrently,
        ));

    if new_table {
        // Dropping the table removes everything but foreign keys, which may
        // point at another table dropped in the same rollback.
        if kind != ObjectKind::ForeignKey {
            changeset = changeset.without_down();
        }
        return changeset;
    }

    let might_fail = match object {
        TableObject::Index(index) => index.unique.then_some("unique_existing_rows"),
        TableObject::Unique(_) => Some("unique_existing_rows"),
        TableObject::Check(_) => Some("check_existing_rows"),
        TableObject::ForeignKey(_) => Some("foreign_key_existing_rows"),
        TableObject::Trigger(_) => None,
    };
    if let Some(code) = might_fail {
        changeset = changeset.warn(
            WarningKind::MightFail,
            code,
            format!("Existing rows of {schema}.{table} may violate {name}"),
        );
    }
    changeset
}

fn removed(schema: &str, table: &str, object: &TableObject, ctx: &GeneratorContext) -> Changeset {
    let kind = object.kind();
    let previous_table = ctx.previous_table_name(table);
    let name = object.expected_name(schema, &previous_table);
    let translated = object.translated(schema, &previous_table, ctx.renames.current_names());

    let replaced = wanted_locally(schema, table, kind, &name, ctx);
    let changeset_kind = match object {
        TableObject::ForeignKey(fk) if replaced || references_changed_key(schema, fk, ctx) => {
            ChangesetKind::DetachForeignKey
        }
        _ if replaced => ChangesetKind::ReplaceObjectDrop,
        _ => drop_kind(kind),
    };
    let changeset = Changeset::new(changeset_kind, schema, Some(table))
        .up(drop_statement(schema, table, &name, kind, false))
        .down(create_statement(schema, table, &name, &translated, false));

    if ctx.is_dropped_table(table) && kind != ObjectKind::ForeignKey {
        changeset.without_up()
    } else {
        changeset
    }
}

/// The remote primary key, unique constraint or unique index a foreign key
/// relies on is dropped or replaced while its table is kept. `fk` is the
/// remote definition, so it names the referenced table by its previous name.
fn references_changed_key(schema: &str, fk: &ForeignKey, ctx: &GeneratorContext) -> bool {
    let referenced_schema = fk.referenced_schema(schema);
    let Some(remote) = ctx.remote.table(referenced_schema, &fk.referenced_table) else {
        return false;
    };
    let current = ctx
        .renames
        .resolve_current_table_name(referenced_schema, &fk.referenced_table);
    let Some(local) = ctx.local.table(referenced_schema, &current) else {
        return false;
    };

    let referenced: BTreeSet<&String> = fk.referenced_columns.iter().collect();
    let backs = |columns: &[String]| columns.iter().collect::<BTreeSet<_>>() == referenced;
    let previous_names = ctx.renames.previous_names();

    let primary_key_changes = remote.primary_key.as_ref().is_some_and(|pk| {
        backs(&pk.columns)
            && local.primary_key.as_ref().is_none_or(|new| {
                previous_names.columns(referenced_schema, &current, &new.columns) != pk.columns
            })
    });
    if primary_key_changes {
        return true;
    }

    [ObjectKind::Unique, ObjectKind::Index].into_iter().any(|kind| {
        let kept: BTreeSet<String> = local
            .objects(kind)
            .iter()
            .map(|o| o.hash(referenced_schema, &current, previous_names))
            .collect();
        remote
            .objects(kind)
            .iter()
            .filter(|o| match o {
                TableObject::Unique(unique) => backs(&unique.columns),
                TableObject::Index(index) => {
                    index.unique && index.predicate.is_none() && backs(&index.columns)
                }
                _ => false,
            })
            .any(|o| !kept.contains(&o.hash(referenced_schema, &remote.name, &NameMap::identity())))
    })
}

fn renamed(schema: &str, table: &str, kind: ObjectKind, from: &str, to: &str) -> Changeset {
    Changeset::new(ChangesetKind::RenameObject, schema, Some(table))
        .up(rename_statement(schema, table, kind, from, to))
        .down(rename_statement(schema, table, kind, to, from))
}
