use super::{Changeset, ChangesetKind, GeneratorContext, WarningKind};
use crate::catalog::object::primary_key_name;
use crate::catalog::table::PrimaryKey;
use crate::diff::operations::{ConstraintDefinition, ConstraintOperation, Statement};
use crate::diff::{DiffEntry, DiffKind, DiffPath, DiffValue};

pub fn generate(entry: &DiffEntry, ctx: &GeneratorContext) -> Option<Vec<Changeset>> {
    let DiffPath::PrimaryKey { schema, table } = &entry.path else {
        return None;
    };
    match (entry.kind, &entry.value, &entry.old_value) {
        (DiffKind::Create, Some(DiffValue::PrimaryKey(pk)), _) => {
            Some(vec![created(schema, table, pk, ctx)])
        }
        (DiffKind::Remove, _, Some(DiffValue::PrimaryKey(pk))) => {
            Some(vec![removed(schema, table, pk, ctx)])
        }
        (DiffKind::Change, Some(DiffValue::PrimaryKey(new)), Some(DiffValue::PrimaryKey(old))) => {
            Some(replaced(schema, table, new, old, ctx))
        }
        _ => None,
    }
}

fn add(schema: &str, table: &str, name: &str, pk: &PrimaryKey) -> Statement {
    Statement::Constraint(ConstraintOperation::Add {
        schema: schema.to_string(),
        table: table.to_string(),
        name: name.to_string(),
        definition: ConstraintDefinition::primary_key(pk),
    })
}

fn drop(schema: &str, table: &str, name: &str) -> Statement {
    Statement::Constraint(ConstraintOperation::Drop {
        schema: schema.to_string(),
        table: table.to_string(),
        name: name.to_string(),
    })
}

/// The remote key with its columns under their current names.
fn current_columns(schema: &str, table: &str, pk: &PrimaryKey, ctx: &GeneratorContext) -> PrimaryKey {
    let previous_table = ctx.previous_table_name(table);
    PrimaryKey {
        columns: ctx
            .renames
            .current_names()
            .columns(schema, &previous_table, &pk.columns),
        name: pk.name.clone(),
    }
}

/// Existing name of a remote key.
fn remote_name(table: &str, pk: &PrimaryKey, ctx: &GeneratorContext) -> String {
    primary_key_name(&ctx.previous_table_name(table), pk)
}

fn created(schema: &str, table: &str, pk: &PrimaryKey, ctx: &GeneratorContext) -> Changeset {
    let name = primary_key_name(table, pk);
    let changeset = Changeset::new(ChangesetKind::CreatePrimaryKey, schema, Some(table));

    // The table's own changeset drops the key with the table.
    if ctx.is_new_table(table) {
        return changeset.up(add(schema, table, &name, pk));
    }

    let previous_table = ctx.previous_table_name(table);
    let previous = PrimaryKey {
        columns: ctx
            .renames
            .previous_names()
            .columns(schema, table, &pk.columns),
        name: pk.name.clone(),
    };
    changeset
        .up(add(schema, &previous_table, &name, &previous))
        .down(drop(schema, &previous_table, &name))
        .warn(
            WarningKind::MightFail,
            "add_primary_key",
            format!("Existing rows of {schema}.{table} may violate the new primary key"),
        )
}

fn removed(schema: &str, table: &str, pk: &PrimaryKey, ctx: &GeneratorContext) -> Changeset {
    let name = remote_name(table, pk, ctx);
    let changeset = Changeset::new(ChangesetKind::DropPrimaryKey, schema, Some(table))
        .up(drop(schema, table, &name))
        .down(add(schema, table, &name, &current_columns(schema, table, pk, ctx)));
    if ctx.is_dropped_table(table) {
        changeset.without_up()
    } else {
        changeset
    }
}

fn replaced(
    schema: &str,
    table: &str,
    new: &PrimaryKey,
    old: &PrimaryKey,
    ctx: &GeneratorContext,
) -> Vec<Changeset> {
    let old_name = remote_name(table, old, ctx);
    let new_name = primary_key_name(table, new);
    vec![
        Changeset::new(ChangesetKind::ReplacePrimaryKeyDrop, schema, Some(table))
            .up(drop(schema, table, &old_name))
            .down(add(
                schema,
                table,
                &old_name,
                &current_columns(schema, table, old, ctx),
            )),
        Changeset::new(ChangesetKind::ReplacePrimaryKeyCreate, schema, Some(table))
            .up(add(schema, table, &new_name, new))
            .down(drop(schema, table, &new_name))
            .warn(
                WarningKind::MightFail,
                "add_primary_key",
                format!("Existing rows of {schema}.{table} may violate the new primary key"),
            ),
    ]
}
