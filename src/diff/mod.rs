pub mod columns;
pub mod custom_types;
pub mod extensions;
pub mod operations;
pub mod renames;
pub mod schemas;
pub mod tables;

use crate::catalog::SchemaSnapshot;
use crate::catalog::custom_type::EnumType;
use crate::catalog::hash::NameMap;
use crate::catalog::object::{ObjectKind, TableObject};
use crate::catalog::table::{Column, ColumnDefault, IdentityMode, PrimaryKey, Table};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Create,
    Remove,
    Change,
    Rename,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAttribute {
    DataType,
    Nullable,
    Default,
    Identity,
}

impl std::fmt::Display for ColumnAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnAttribute::DataType => write!(f, "data_type"),
            ColumnAttribute::Nullable => write!(f, "nullable"),
            ColumnAttribute::Default => write!(f, "default"),
            ColumnAttribute::Identity => write!(f, "identity"),
        }
    }
}

/// Location of a difference. Table-level paths name the table by its
/// current (local) name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiffPath {
    Schema {
        schema: String,
    },
    Extension {
        schema: String,
        name: String,
    },
    EnumType {
        schema: String,
        name: String,
    },
    Table {
        schema: String,
        table: String,
    },
    Column {
        schema: String,
        table: String,
        column: String,
    },
    ColumnAttribute {
        schema: String,
        table: String,
        column: String,
        attribute: ColumnAttribute,
    },
    PrimaryKey {
        schema: String,
        table: String,
    },
    /// A whole collection, used when one side has no objects of the kind.
    Objects {
        schema: String,
        table: String,
        kind: ObjectKind,
    },
    Object {
        schema: String,
        table: String,
        kind: ObjectKind,
        hash: String,
    },
}

impl DiffPath {
    pub fn schema(&self) -> &str {
        match self {
            DiffPath::Schema { schema }
            | DiffPath::Extension { schema, .. }
            | DiffPath::EnumType { schema, .. }
            | DiffPath::Table { schema, .. }
            | DiffPath::Column { schema, .. }
            | DiffPath::ColumnAttribute { schema, .. }
            | DiffPath::PrimaryKey { schema, .. }
            | DiffPath::Objects { schema, .. }
            | DiffPath::Object { schema, .. } => schema,
        }
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            DiffPath::Table { table, .. }
            | DiffPath::Column { table, .. }
            | DiffPath::ColumnAttribute { table, .. }
            | DiffPath::PrimaryKey { table, .. }
            | DiffPath::Objects { table, .. }
            | DiffPath::Object { table, .. } => Some(table),
            DiffPath::Schema { .. } | DiffPath::Extension { .. } | DiffPath::EnumType { .. } => {
                None
            }
        }
    }
}

impl std::fmt::Display for DiffPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffPath::Schema { schema } => write!(f, "schema.{schema}"),
            DiffPath::Extension { schema, name } => {
                write!(f, "schema.{schema}.extensions.{name}")
            }
            DiffPath::EnumType { schema, name } => write!(f, "schema.{schema}.enum_types.{name}"),
            DiffPath::Table { table, .. } => write!(f, "table.{table}"),
            DiffPath::Column { table, column, .. } => write!(f, "table.{table}.columns.{column}"),
            DiffPath::ColumnAttribute {
                table,
                column,
                attribute,
                ..
            } => write!(f, "table.{table}.columns.{column}.{attribute}"),
            DiffPath::PrimaryKey { table, .. } => write!(f, "table.{table}.primary_key"),
            DiffPath::Objects { table, kind, .. } => write!(f, "table.{table}.{kind}"),
            DiffPath::Object {
                table, kind, hash, ..
            } => write!(f, "table.{table}.{kind}.{hash}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiffValue {
    Name(String),
    EnumType(EnumType),
    Table(Table),
    Column(Column),
    DataType(String),
    Nullable(bool),
    Default(ColumnDefault),
    Identity(IdentityMode),
    PrimaryKey(PrimaryKey),
    Objects(Vec<TableObject>),
    Object(TableObject),
}

/// One difference between the remote and the local snapshot. `value` is the
/// local side, `old_value` the remote side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub kind: DiffKind,
    pub path: DiffPath,
    pub value: Option<DiffValue>,
    pub old_value: Option<DiffValue>,
}

impl DiffEntry {
    pub fn create(path: DiffPath, value: DiffValue) -> Self {
        Self {
            kind: DiffKind::Create,
            path,
            value: Some(value),
            old_value: None,
        }
    }

    pub fn remove(path: DiffPath, old_value: DiffValue) -> Self {
        Self {
            kind: DiffKind::Remove,
            path,
            value: None,
            old_value: Some(old_value),
        }
    }

    pub fn change(path: DiffPath, value: DiffValue, old_value: DiffValue) -> Self {
        Self {
            kind: DiffKind::Change,
            path,
            value: Some(value),
            old_value: Some(old_value),
        }
    }

    pub fn rename(path: DiffPath, to: &str, from: &str) -> Self {
        Self {
            kind: DiffKind::Rename,
            path,
            value: Some(DiffValue::Name(to.to_string())),
            old_value: Some(DiffValue::Name(from.to_string())),
        }
    }
}

impl std::fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            DiffKind::Create => "create",
            DiffKind::Remove => "remove",
            DiffKind::Change => "change",
            DiffKind::Rename => "rename",
        };
        write!(f, "{kind} {}", self.path)
    }
}

/// Structural diff from `remote` (current database) to `local` (declared).
pub fn diff(remote: &SchemaSnapshot, local: &SchemaSnapshot) -> Vec<DiffEntry> {
    info!("Diffing schema snapshots...");
    let out = diff_with_names(remote, local, &NameMap::identity());
    info!("Diff complete: {} entries", out.len());
    out
}

/// Diff with local identifiers mapped to their previous names through `names`.
pub fn diff_with_names(
    remote: &SchemaSnapshot,
    local: &SchemaSnapshot,
    names: &NameMap,
) -> Vec<DiffEntry> {
    diff_list(
        &remote.schemas,
        &local.schemas,
        |s| s.name.clone(),
        |r, l| schemas::diff(r, l, names),
    )
}

pub fn diff_list<T, I: Eq + Ord + Clone, R>(
    old: &[T],
    new: &[T],
    id_of: impl Fn(&T) -> I,
    diff_fn: impl Fn(Option<&T>, Option<&T>) -> Vec<R>,
) -> Vec<R> {
    let mut old_map = BTreeMap::new();
    let mut new_map = BTreeMap::new();
    for o in old {
        old_map.insert(id_of(o), o);
    }
    for n in new {
        new_map.insert(id_of(n), n);
    }

    let all_ids: BTreeSet<_> = old_map.keys().chain(new_map.keys()).cloned().collect();

    all_ids
        .into_iter()
        .flat_map(|id| diff_fn(old_map.get(&id).copied(), new_map.get(&id).copied()))
        .collect()
}

/// Like [`diff_list`] for collections already keyed by identity.
pub fn diff_keyed<K: Ord, T, R>(
    old: &BTreeMap<K, T>,
    new: &BTreeMap<K, T>,
    mut diff_fn: impl FnMut(&K, Option<&T>, Option<&T>) -> Vec<R>,
) -> Vec<R> {
    let all_keys: BTreeSet<&K> = old.keys().chain(new.keys()).collect();

    all_keys
        .into_iter()
        .flat_map(|key| diff_fn(key, old.get(key), new.get(key)))
        .collect()
}
