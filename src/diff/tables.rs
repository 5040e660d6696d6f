//! Diff tables: whole-table create/drop, or columns, primary key and
//! hash-keyed objects for tables present on both sides

use super::{DiffEntry, DiffPath, DiffValue, columns, diff_keyed};
use crate::catalog::hash::NameMap;
use crate::catalog::object::{ObjectKind, TableObject};
use crate::catalog::table::Table;
use std::collections::BTreeMap;

/// `names` maps the local table's current identifiers to the names they
/// have in `old`; it is the identity unless renames are being resolved.
pub fn diff(schema: &str, old: Option<&Table>, new: Option<&Table>, names: &NameMap) -> Vec<DiffEntry> {
    match (old, new) {
        (None, Some(n)) => created(schema, n),
        (Some(o), None) => removed(schema, o),
        (Some(o), Some(n)) if o.name != n.name => {
            let mut out = vec![DiffEntry::rename(
                table_path(schema, &n.name),
                &n.name,
                &o.name,
            )];
            out.extend(pair(schema, o, n, names));
            out
        }
        (Some(o), Some(n)) => pair(schema, o, n, names),
        (None, None) => Vec::new(),
    }
}

fn table_path(schema: &str, table: &str) -> DiffPath {
    DiffPath::Table {
        schema: schema.to_string(),
        table: table.to_string(),
    }
}

fn primary_key_path(schema: &str, table: &str) -> DiffPath {
    DiffPath::PrimaryKey {
        schema: schema.to_string(),
        table: table.to_string(),
    }
}

fn objects_path(schema: &str, table: &str, kind: ObjectKind) -> DiffPath {
    DiffPath::Objects {
        schema: schema.to_string(),
        table: table.to_string(),
        kind,
    }
}

fn created(schema: &str, table: &Table) -> Vec<DiffEntry> {
    let mut out = vec![DiffEntry::create(
        table_path(schema, &table.name),
        DiffValue::Table(table.clone()),
    )];
    if let Some(pk) = &table.primary_key {
        out.push(DiffEntry::create(
            primary_key_path(schema, &table.name),
            DiffValue::PrimaryKey(pk.clone()),
        ));
    }
    for kind in ObjectKind::ALL {
        let objects = table.objects(kind);
        if !objects.is_empty() {
            out.push(DiffEntry::create(
                objects_path(schema, &table.name, kind),
                DiffValue::Objects(objects),
            ));
        }
    }
    out
}

fn removed(schema: &str, table: &Table) -> Vec<DiffEntry> {
    let mut out = vec![DiffEntry::remove(
        table_path(schema, &table.name),
        DiffValue::Table(table.clone()),
    )];
    if let Some(pk) = &table.primary_key {
        out.push(DiffEntry::remove(
            primary_key_path(schema, &table.name),
            DiffValue::PrimaryKey(pk.clone()),
        ));
    }
    for kind in ObjectKind::ALL {
        let objects = table.objects(kind);
        if !objects.is_empty() {
            out.push(DiffEntry::remove(
                objects_path(schema, &table.name, kind),
                DiffValue::Objects(objects),
            ));
        }
    }
    out
}

/// Diff a table that exists on both sides. Paths use the local name.
pub fn pair(schema: &str, old: &Table, new: &Table, names: &NameMap) -> Vec<DiffEntry> {
    let mut out = columns::diff(schema, old, new, names);
    out.extend(primary_key(schema, old, new, names));
    for kind in ObjectKind::ALL {
        out.extend(objects(schema, old, new, kind, names));
    }
    out
}

fn primary_key(schema: &str, old: &Table, new: &Table, names: &NameMap) -> Vec<DiffEntry> {
    let path = primary_key_path(schema, &new.name);
    match (&old.primary_key, &new.primary_key) {
        (None, Some(n)) => vec![DiffEntry::create(path, DiffValue::PrimaryKey(n.clone()))],
        (Some(o), None) => vec![DiffEntry::remove(path, DiffValue::PrimaryKey(o.clone()))],
        (Some(o), Some(n)) if names.columns(schema, &new.name, &n.columns) != o.columns => {
            vec![DiffEntry::change(
                path,
                DiffValue::PrimaryKey(n.clone()),
                DiffValue::PrimaryKey(o.clone()),
            )]
        }
        _ => Vec::new(),
    }
}

fn objects(
    schema: &str,
    old: &Table,
    new: &Table,
    kind: ObjectKind,
    names: &NameMap,
) -> Vec<DiffEntry> {
    let identity = NameMap::identity();
    let old_objects: BTreeMap<String, TableObject> = old
        .objects(kind)
        .into_iter()
        .map(|o| (o.hash(schema, &old.name, &identity), o))
        .collect();
    let new_objects: BTreeMap<String, TableObject> = new
        .objects(kind)
        .into_iter()
        .map(|o| (o.hash(schema, &new.name, names), o))
        .collect();

    if old_objects.is_empty() && !new_objects.is_empty() {
        return vec![DiffEntry::create(
            objects_path(schema, &new.name, kind),
            DiffValue::Objects(new_objects.into_values().collect()),
        )];
    }
    if new_objects.is_empty() && !old_objects.is_empty() {
        return vec![DiffEntry::remove(
            objects_path(schema, &new.name, kind),
            DiffValue::Objects(old_objects.into_values().collect()),
        )];
    }

    diff_keyed(&old_objects, &new_objects, |hash, o, n| {
        let path = DiffPath::Object {
            schema: schema.to_string(),
            table: new.name.clone(),
            kind,
            hash: hash.clone(),
        };
        match (o, n) {
            (None, Some(n)) => vec![DiffEntry::create(path, DiffValue::Object(n.clone()))],
            (Some(o), None) => vec![DiffEntry::remove(path, DiffValue::Object(o.clone()))],
            (Some(o), Some(n)) => {
                let from = o.expected_name(schema, &old.name);
                let to = n.expected_name(schema, &new.name);
                if from == to {
                    Vec::new()
                } else {
                    vec![DiffEntry::rename(path, &to, &from)]
                }
            }
            (None, None) => Vec::new(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::constraint::UniqueConstraint;
    use crate::catalog::index::Index;
    use crate::catalog::table::{Column, PrimaryKey};
    use crate::diff::DiffKind;

    fn users() -> Table {
        let mut table = Table::new("users");
        table.columns = vec![
            Column::new("id", "bigint").not_null(),
            Column::new("email", "text").not_null(),
        ];
        table.primary_key = Some(PrimaryKey {
            columns: vec!["id".to_string()],
            name: None,
        });
        table
    }

    #[test]
    fn test_created_table_uses_first_object_shape() {
        let mut table = users();
        table.indexes = vec![Index::on(&["email"])];
        let entries = diff("public", None, Some(&table), &NameMap::identity());
        let paths: Vec<String> = entries.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(
            paths,
            vec!["table.users", "table.users.primary_key", "table.users.indexes"]
        );
        assert!(entries.iter().all(|e| e.kind == DiffKind::Create));
    }

    #[test]
    fn test_first_unique_on_existing_table_is_collection_entry() {
        let old = users();
        let mut new = users();
        new.unique_constraints = vec![UniqueConstraint {
            columns: vec!["email".to_string()],
            name: None,
        }];
        let entries = pair("public", &old, &new, &NameMap::identity());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path.to_string(), "table.users.unique_constraints");
    }

    #[test]
    fn test_changed_index_is_remove_plus_create_by_hash() {
        let mut old = users();
        old.indexes = vec![Index::on(&["id"]), Index::on(&["email"])];
        let mut new = users();
        new.indexes = vec![Index::on(&["id"]), Index::on(&["email"]).unique()];

        let entries = pair("public", &old, &new, &NameMap::identity());
        let kinds: Vec<DiffKind> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(entries.len(), 2);
        assert!(kinds.contains(&DiffKind::Create));
        assert!(kinds.contains(&DiffKind::Remove));
        assert!(
            entries
                .iter()
                .all(|e| matches!(e.path, DiffPath::Object { .. }))
        );
    }

    #[test]
    fn test_hand_named_object_gets_rename_entry() {
        let mut old = users();
        old.unique_constraints = vec![UniqueConstraint {
            columns: vec!["email".to_string()],
            name: Some("users_email_key".to_string()),
        }];
        let mut new = users();
        new.unique_constraints = vec![UniqueConstraint {
            columns: vec!["email".to_string()],
            name: None,
        }];

        let entries = pair("public", &old, &new, &NameMap::identity());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiffKind::Rename);
        assert_eq!(
            entries[0].old_value,
            Some(DiffValue::Name("users_email_key".to_string()))
        );
    }

    #[test]
    fn test_primary_key_column_change() {
        let old = users();
        let mut new = users();
        new.primary_key = Some(PrimaryKey {
            columns: vec!["id".to_string(), "email".to_string()],
            name: None,
        });
        let entries = pair("public", &old, &new, &NameMap::identity());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiffKind::Change);
        assert_eq!(entries[0].path.to_string(), "table.users.primary_key");
    }
}
