//! Diff extensions: CREATE any new, DROP any missing

use super::{DiffEntry, DiffPath, DiffValue};
use std::collections::BTreeSet;

pub fn diff(schema: &str, old: &BTreeSet<String>, new: &BTreeSet<String>) -> Vec<DiffEntry> {
    let path = |name: &str| DiffPath::Extension {
        schema: schema.to_string(),
        name: name.to_string(),
    };

    let created = new
        .difference(old)
        .map(|name| DiffEntry::create(path(name), DiffValue::Name(name.clone())));
    let removed = old
        .difference(new)
        .map(|name| DiffEntry::remove(path(name), DiffValue::Name(name.clone())));

    created.chain(removed).collect()
}
