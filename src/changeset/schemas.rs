//! Schemas and extensions

use super::{Changeset, ChangesetKind, GeneratorContext, WarningKind};
use crate::diff::operations::{ExtensionOperation, SchemaOperation, Statement};
use crate::diff::{DiffEntry, DiffKind, DiffPath};

pub fn generate(entry: &DiffEntry, _ctx: &GeneratorContext) -> Option<Vec<Changeset>> {
    match &entry.path {
        DiffPath::Schema { schema } => schema_changeset(entry.kind, schema),
        DiffPath::Extension { schema, name } => extension_changeset(entry.kind, schema, name),
        _ => None,
    }
}

fn schema_changeset(kind: DiffKind, schema: &str) -> Option<Vec<Changeset>> {
    let create = Statement::Schema(SchemaOperation::Create {
        name: schema.to_string(),
    });
    let drop = Statement::Schema(SchemaOperation::Drop {
        name: schema.to_string(),
    });
    let changeset = match kind {
        DiffKind::Create => Changeset::new(ChangesetKind::CreateSchema, schema, None)
            .up(create)
            .down(drop),
        DiffKind::Remove => Changeset::new(ChangesetKind::DropSchema, schema, None)
            .up(drop)
            .down(create)
            .warn(
                WarningKind::Destructive,
                "drop_schema",
                format!("Dropping schema {schema}"),
            ),
        DiffKind::Change | DiffKind::Rename => return None,
    };
    Some(vec![changeset])
}

fn extension_changeset(kind: DiffKind, schema: &str, name: &str) -> Option<Vec<Changeset>> {
    let create = Statement::Extension(ExtensionOperation::Create {
        schema: schema.to_string(),
        name: name.to_string(),
    });
    let drop = Statement::Extension(ExtensionOperation::Drop {
        name: name.to_string(),
    });
    let changeset = match kind {
        DiffKind::Create => Changeset::new(ChangesetKind::CreateExtension, schema, None)
            .up(create)
            .down(drop),
        DiffKind::Remove => Changeset::new(ChangesetKind::DropExtension, schema, None)
            .up(drop)
            .down(create)
            .warn(
                WarningKind::Destructive,
                "drop_extension",
                format!("Dropping extension {name} drops the objects it provides"),
            ),
        DiffKind::Change | DiffKind::Rename => return None,
    };
    Some(vec![changeset])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SchemaSnapshot;
    use crate::catalog::schema::Schema;
    use crate::changeset::Phase;
    use crate::changeset::test_support::changesets;

    #[test]
    fn test_new_schema_and_extension() {
        let local = SchemaSnapshot {
            schemas: vec![Schema::new("app").with_extension("pgcrypto")],
        };
        let out = changesets(&SchemaSnapshot::empty(), &local);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, ChangesetKind::CreateSchema);
        assert_eq!(out[0].up_sql(), vec!["CREATE SCHEMA IF NOT EXISTS \"app\";"]);
        assert_eq!(out[0].down_sql(), vec!["DROP SCHEMA \"app\";"]);
        assert_eq!(out[1].kind, ChangesetKind::CreateExtension);
    }

    #[test]
    fn test_dropped_extension_is_destructive_contract() {
        let remote = SchemaSnapshot {
            schemas: vec![Schema::new("public").with_extension("citext")],
        };
        let local = SchemaSnapshot {
            schemas: vec![Schema::new("public")],
        };
        let out = changesets(&remote, &local);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].phase, Phase::Contract);
        assert_eq!(out[0].warnings[0].kind, WarningKind::Destructive);
        assert_eq!(
            out[0].down_sql(),
            vec!["CREATE EXTENSION IF NOT EXISTS \"citext\" SCHEMA \"public\";"]
        );
    }
}
