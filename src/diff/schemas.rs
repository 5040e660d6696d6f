//! Diff schemas: contents first match by name, then extensions, enums and tables

use super::{DiffEntry, DiffPath, DiffValue, custom_types, diff_keyed, extensions, tables};
use crate::catalog::hash::NameMap;
use crate::catalog::schema::Schema;
use crate::catalog::table::Table;
use crate::constants::DEFAULT_SCHEMA;
use std::collections::BTreeMap;

/// Local tables are keyed by the name they had before any pending rename,
/// so a renamed table pairs with its remote counterpart.
pub fn diff(old: Option<&Schema>, new: Option<&Schema>, names: &NameMap) -> Vec<DiffEntry> {
    let empty = Schema::default();
    let (remote, local) = (old.unwrap_or(&empty), new.unwrap_or(&empty));
    let name = match (old, new) {
        (_, Some(n)) => n.name.as_str(),
        (Some(o), None) => o.name.as_str(),
        (None, None) => return Vec::new(),
    };

    let mut out = Vec::new();
    let path = || DiffPath::Schema {
        schema: name.to_string(),
    };
    match (old, new) {
        (None, Some(_)) if name != DEFAULT_SCHEMA => {
            out.push(DiffEntry::create(path(), DiffValue::Name(name.to_string())));
        }
        (Some(_), None) if name != DEFAULT_SCHEMA => {
            out.push(DiffEntry::remove(path(), DiffValue::Name(name.to_string())));
        }
        _ => {}
    }

    out.extend(extensions::diff(name, &remote.extensions, &local.extensions));
    out.extend(custom_types::diff(name, &remote.enum_types, &local.enum_types));

    let remote_tables: BTreeMap<String, &Table> =
        remote.tables.values().map(|t| (t.name.clone(), t)).collect();
    let local_tables: BTreeMap<String, &Table> = local
        .tables
        .values()
        .map(|t| (names.table(name, &t.name), t))
        .collect();
    out.extend(diff_keyed(&remote_tables, &local_tables, |_, r, l| {
        tables::diff(name, r.copied(), l.copied(), names)
    }));
    out
}
