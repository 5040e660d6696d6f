//! Rename resolution.
//!
//! A structural diff cannot tell a rename from a drop followed by a create.
//! Explicit [`RenameIntent`]s turn such pairs into rename entries: the intents
//! build a previous-name [`NameMap`] and the snapshots are diffed again with
//! it, so the renamed table or column pairs with its remote counterpart and
//! objects that did not change only get rename entries.

use super::{DiffEntry, DiffKind, DiffPath, diff_with_names};
use crate::catalog::SchemaSnapshot;
use crate::catalog::hash::NameMap;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenameIntent {
    Table {
        schema: String,
        from: String,
        to: String,
    },
    /// `table` is the table's current name.
    Column {
        schema: String,
        table: String,
        from: String,
        to: String,
    },
}

impl std::fmt::Display for RenameIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenameIntent::Table { schema, from, to } => {
                write!(f, "table {schema}.{from} -> {schema}.{to}")
            }
            RenameIntent::Column {
                schema,
                table,
                from,
                to,
            } => write!(f, "column {schema}.{table}.{from} -> {to}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenameScope {
    Table { schema: String },
    Column { schema: String, table: String },
}

/// A removed name that could have been renamed to one of `created`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RenameCandidate {
    pub scope: RenameScope,
    pub removed: String,
    pub created: Vec<String>,
}

impl RenameCandidate {
    pub fn intent_for(&self, to: &str) -> RenameIntent {
        match &self.scope {
            RenameScope::Table { schema } => RenameIntent::Table {
                schema: schema.clone(),
                from: self.removed.clone(),
                to: to.to_string(),
            },
            RenameScope::Column { schema, table } => RenameIntent::Column {
                schema: schema.clone(),
                table: table.clone(),
                from: self.removed.clone(),
                to: to.to_string(),
            },
        }
    }

    pub fn matches(&self, intent: &RenameIntent) -> bool {
        match (&self.scope, intent) {
            (RenameScope::Table { schema }, RenameIntent::Table { schema: s, from, to }) => {
                schema == s && &self.removed == from && self.created.contains(to)
            }
            (
                RenameScope::Column { schema, table },
                RenameIntent::Column {
                    schema: s,
                    table: t,
                    from,
                    to,
                },
            ) => schema == s && table == t && &self.removed == from && self.created.contains(to),
            _ => false,
        }
    }

    pub fn subject(&self) -> String {
        match &self.scope {
            RenameScope::Table { schema } => format!("table {schema}.{}", self.removed),
            RenameScope::Column { schema, table } => {
                format!("column {schema}.{table}.{}", self.removed)
            }
        }
    }
}

/// Remove/create pairs of the same shape that could be renames. These are
/// only ever offered to a [`RenameOracle`].
pub fn rename_candidates(entries: &[DiffEntry]) -> Vec<RenameCandidate> {
    let mut removed: BTreeMap<RenameScope, Vec<String>> = BTreeMap::new();
    let mut created: BTreeMap<RenameScope, Vec<String>> = BTreeMap::new();

    for entry in entries {
        let (scope, name) = match &entry.path {
            DiffPath::Table { schema, table } => (
                RenameScope::Table {
                    schema: schema.clone(),
                },
                table.clone(),
            ),
            DiffPath::Column {
                schema,
                table,
                column,
            } => (
                RenameScope::Column {
                    schema: schema.clone(),
                    table: table.clone(),
                },
                column.clone(),
            ),
            _ => continue,
        };
        match entry.kind {
            DiffKind::Remove => removed.entry(scope).or_default().push(name),
            DiffKind::Create => created.entry(scope).or_default().push(name),
            DiffKind::Change | DiffKind::Rename => {}
        }
    }

    let mut out = Vec::new();
    for (scope, names) in removed {
        let Some(targets) = created.get(&scope) else {
            continue;
        };
        for name in names {
            out.push(RenameCandidate {
                scope: scope.clone(),
                removed: name,
                created: targets.clone(),
            });
        }
    }
    out
}

/// Answers rename questions the diff cannot decide on its own.
pub trait RenameOracle {
    fn resolve(&self, candidates: &[RenameCandidate]) -> Result<Vec<RenameIntent>>;
}

/// Treats every candidate as a drop plus a create.
pub struct NoRenames;

impl RenameOracle for NoRenames {
    fn resolve(&self, _candidates: &[RenameCandidate]) -> Result<Vec<RenameIntent>> {
        Ok(Vec::new())
    }
}

/// Fixed answers, returned for the candidates they match.
pub struct CannedRenames(pub Vec<RenameIntent>);

impl RenameOracle for CannedRenames {
    fn resolve(&self, candidates: &[RenameCandidate]) -> Result<Vec<RenameIntent>> {
        Ok(self
            .0
            .iter()
            .filter(|intent| candidates.iter().any(|c| c.matches(intent)))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub entries: Vec<DiffEntry>,
    /// Intents that matched a remove/create pair, table renames first.
    pub applied: Vec<RenameIntent>,
    pub unresolved: Vec<RenameCandidate>,
}

/// Rewrite remove/create pairs named by `intents` into rename entries.
///
/// `entries` must be the plain diff of `remote` and `local`. Table intents are
/// applied first so that column intents can name a renamed table by its
/// current name.
pub fn resolve_renames(
    entries: Vec<DiffEntry>,
    intents: &[RenameIntent],
    remote: &SchemaSnapshot,
    local: &SchemaSnapshot,
) -> Resolution {
    let has = |entries: &[DiffEntry], kind: DiffKind, path: &DiffPath| {
        entries.iter().any(|e| e.kind == kind && &e.path == path)
    };

    let mut names = NameMap::identity();
    let mut applied = Vec::new();
    for intent in intents {
        let RenameIntent::Table { schema, from, to } = intent else {
            continue;
        };
        let removed = DiffPath::Table {
            schema: schema.clone(),
            table: from.clone(),
        };
        let created = DiffPath::Table {
            schema: schema.clone(),
            table: to.clone(),
        };
        if applied.contains(intent) {
            continue;
        }
        if !has(&entries, DiffKind::Remove, &removed) || !has(&entries, DiffKind::Create, &created)
        {
            warn!("Ignoring rename {intent}: no matching drop and create");
            continue;
        }
        if names.table(schema, to) != *to {
            warn!("Ignoring rename {intent}: {schema}.{to} is already a rename target");
            continue;
        }
        debug!("Applying rename {intent}");
        names.insert_table(schema, to, from);
        applied.push(intent.clone());
    }

    let interim = if applied.is_empty() {
        entries
    } else {
        diff_with_names(remote, local, &names)
    };

    let table_renames = applied.len();
    for intent in intents {
        let RenameIntent::Column {
            schema,
            table,
            from,
            to,
        } = intent
        else {
            continue;
        };
        let column_path = |column: &str| DiffPath::Column {
            schema: schema.clone(),
            table: table.clone(),
            column: column.to_string(),
        };
        if applied.contains(intent) {
            continue;
        }
        if !has(&interim, DiffKind::Remove, &column_path(from))
            || !has(&interim, DiffKind::Create, &column_path(to))
        {
            warn!("Ignoring rename {intent}: no matching drop and create");
            continue;
        }
        if names.column(schema, table, to) != *to {
            warn!("Ignoring rename {intent}: {to} is already a rename target");
            continue;
        }
        debug!("Applying rename {intent}");
        names.insert_column(schema, table, to, from);
        applied.push(intent.clone());
    }

    let entries = if applied.len() == table_renames {
        interim
    } else {
        diff_with_names(remote, local, &names)
    };

    if !applied.is_empty() {
        info!("Applied {} rename(s)", applied.len());
    }
    let unresolved = rename_candidates(&entries);
    Resolution {
        entries,
        applied,
        unresolved,
    }
}
