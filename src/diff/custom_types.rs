//! Diff enum types by name; value lists are compared as a whole

use super::{DiffEntry, DiffPath, DiffValue, diff_keyed};
use crate::catalog::custom_type::EnumType;
use std::collections::BTreeMap;

pub fn diff(
    schema: &str,
    old: &BTreeMap<String, EnumType>,
    new: &BTreeMap<String, EnumType>,
) -> Vec<DiffEntry> {
    diff_keyed(old, new, |name, o, n| {
        let path = DiffPath::EnumType {
            schema: schema.to_string(),
            name: name.clone(),
        };
        match (o, n) {
            (None, Some(n)) => vec![DiffEntry::create(path, DiffValue::EnumType(n.clone()))],
            (Some(o), None) => vec![DiffEntry::remove(path, DiffValue::EnumType(o.clone()))],
            (Some(o), Some(n)) if o.values != n.values => vec![DiffEntry::change(
                path,
                DiffValue::EnumType(n.clone()),
                DiffValue::EnumType(o.clone()),
            )],
            _ => Vec::new(),
        }
    })
}
