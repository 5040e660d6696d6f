//! Changesets: reversible units of schema change produced from diff entries.
//!
//! Each generator claims one shape of [`DiffEntry`] and turns it into zero or
//! more [`Changeset`]s. Generators are pure; everything they need about the
//! surrounding plan (pending renames, both snapshots, unresolved rename
//! candidates) comes through [`GeneratorContext`].

pub mod attributes;
pub mod columns;
pub mod enums;
pub mod objects;
pub mod primary_keys;
pub mod renames;
pub mod schemas;
pub mod tables;

use crate::catalog::SchemaSnapshot;
use crate::catalog::hash::NameMap;
use crate::catalog::table::Table;
use crate::diff::DiffEntry;
use crate::diff::operations::{Statement, render_statements};
use crate::diff::renames::{RenameCandidate, RenameIntent, RenameScope};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Deployment stage. Expand runs before application code is switched over,
/// Contract after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Expand,
    Alter,
    Contract,
    Data,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Expand => write!(f, "expand"),
            Phase::Alter => write!(f, "alter"),
            Phase::Contract => write!(f, "contract"),
            Phase::Data => write!(f, "data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangesetKind {
    // Expand
    CreateSchema,
    CreateExtension,
    CreateEnum,
    AddEnumValue,
    CreateTable,
    AddColumn,
    CreatePrimaryKey,
    CreateIndex,
    CreateUnique,
    CreateCheck,
    CreateForeignKey,
    CreateTrigger,
    // Alter
    RenameTable,
    RenameColumn,
    RenameObject,
    /// A foreign key that would block dropping the key it references.
    DetachForeignKey,
    ReplaceObjectDrop,
    ReplacePrimaryKeyDrop,
    AlterDataType,
    AlterDefault,
    AlterNullability,
    AlterIdentity,
    ReplacePrimaryKeyCreate,
    ReplaceObjectCreate,
    // Contract
    DropTrigger,
    DropForeignKey,
    DropCheck,
    DropUnique,
    DropIndex,
    DropPrimaryKey,
    DropColumn,
    DropTable,
    DropEnum,
    DropExtension,
    DropSchema,
}

impl ChangesetKind {
    pub fn phase(self) -> Phase {
        use ChangesetKind::*;
        match self {
            CreateSchema | CreateExtension | CreateEnum | AddEnumValue | CreateTable
            | AddColumn | CreatePrimaryKey | CreateIndex | CreateUnique | CreateCheck
            | CreateForeignKey | CreateTrigger => Phase::Expand,
            RenameTable | RenameColumn | RenameObject | DetachForeignKey | ReplaceObjectDrop
            | ReplacePrimaryKeyDrop | AlterDataType | AlterDefault | AlterNullability
            | AlterIdentity | ReplacePrimaryKeyCreate | ReplaceObjectCreate => Phase::Alter,
            DropTrigger | DropForeignKey | DropCheck | DropUnique | DropIndex | DropPrimaryKey
            | DropColumn | DropTable | DropEnum | DropExtension | DropSchema => Phase::Contract,
        }
    }

    /// Dense ordering key within the kind's phase. Declaration order above
    /// is the priority order.
    pub fn priority(self) -> u32 {
        let first = match self.phase() {
            Phase::Expand => ChangesetKind::CreateSchema,
            Phase::Alter => ChangesetKind::RenameTable,
            Phase::Contract | Phase::Data => ChangesetKind::DropTrigger,
        };
        self as u32 - first as u32
    }

    pub fn is_table_lifecycle(self) -> bool {
        matches!(self, ChangesetKind::CreateTable | ChangesetKind::DropTable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Takes a lock that blocks reads or writes for the statement's duration.
    Blocking,
    /// Loses data.
    Destructive,
    /// Breaks clients still using the old shape.
    BackwardIncompatible,
    /// Can fail on existing data.
    MightFail,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::Blocking => write!(f, "blocking"),
            WarningKind::Destructive => write!(f, "destructive"),
            WarningKind::BackwardIncompatible => write!(f, "backward incompatible"),
            WarningKind::MightFail => write!(f, "might fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Changeset {
    pub priority: u32,
    pub phase: Phase,
    pub kind: ChangesetKind,
    pub schema_name: String,
    pub table_name: Option<String>,
    pub up: Vec<Statement>,
    pub down: Vec<Statement>,
    pub warnings: Vec<Warning>,
    pub transactional: bool,
}

impl Changeset {
    pub fn new(kind: ChangesetKind, schema: &str, table: Option<&str>) -> Self {
        Self {
            priority: kind.priority(),
            phase: kind.phase(),
            kind,
            schema_name: schema.to_string(),
            table_name: table.map(str::to_string),
            up: Vec::new(),
            down: Vec::new(),
            warnings: Vec::new(),
            transactional: true,
        }
    }

    pub fn up(mut self, statement: Statement) -> Self {
        self.transactional &= statement.is_transactional();
        self.up.push(statement);
        self
    }

    pub fn down(mut self, statement: Statement) -> Self {
        self.transactional &= statement.is_transactional();
        self.down.push(statement);
        self
    }

    pub fn ups(self, statements: impl IntoIterator<Item = Statement>) -> Self {
        statements.into_iter().fold(self, Changeset::up)
    }

    pub fn downs(self, statements: impl IntoIterator<Item = Statement>) -> Self {
        statements.into_iter().fold(self, Changeset::down)
    }

    pub fn warn(mut self, kind: WarningKind, code: &str, message: impl Into<String>) -> Self {
        self.warnings.push(Warning {
            kind,
            code: code.to_string(),
            message: message.into(),
        });
        self
    }

    /// Keep `up` only; the owning table's changeset undoes it.
    pub fn without_down(mut self) -> Self {
        self.down.clear();
        self.transactional = self.up.iter().all(Statement::is_transactional);
        self
    }

    /// Keep `down` only; the owning table's changeset does the work.
    pub fn without_up(mut self) -> Self {
        self.up.clear();
        self.transactional = self.down.iter().all(Statement::is_transactional);
        self
    }

    pub fn up_sql(&self) -> Vec<String> {
        render_statements(&self.up)
    }

    pub fn down_sql(&self) -> Vec<String> {
        render_statements(&self.down)
    }
}

/// Name translation for pending table and column renames.
///
/// The previous-name map turns current names into the names objects have
/// before the Alter phase renames them; the current-name map goes the other
/// way. Both key columns by the table name the definition uses.
#[derive(Debug, Clone, Default)]
pub struct RenameContext {
    pub tables_to_rename: Vec<RenameIntent>,
    pub columns_to_rename: Vec<RenameIntent>,
    previous: NameMap,
    current: NameMap,
}

impl RenameContext {
    pub fn new(applied: &[RenameIntent]) -> Self {
        let mut context = RenameContext::default();
        for intent in applied {
            if let RenameIntent::Table { schema, from, to } = intent {
                context.previous.insert_table(schema, to, from);
                context.current.insert_table(schema, from, to);
                context.tables_to_rename.push(intent.clone());
            }
        }
        for intent in applied {
            if let RenameIntent::Column {
                schema,
                table,
                from,
                to,
            } = intent
            {
                let previous_table = context.previous.table(schema, table);
                context.previous.insert_column(schema, table, to, from);
                context
                    .current
                    .insert_column(schema, &previous_table, from, to);
                context.columns_to_rename.push(intent.clone());
            }
        }
        context
    }

    pub fn resolve_previous_table_name(&self, schema: &str, current: &str) -> String {
        self.previous.table(schema, current)
    }

    pub fn resolve_current_table_name(&self, schema: &str, previous: &str) -> String {
        self.current.table(schema, previous)
    }

    pub fn resolve_previous_column_name(&self, schema: &str, table: &str, column: &str) -> String {
        self.previous.column(schema, table, column)
    }

    /// `table` is the table's current name, `column` the column's previous name.
    pub fn resolve_current_column_name(&self, schema: &str, table: &str, column: &str) -> String {
        let previous_table = self.resolve_previous_table_name(schema, table);
        self.current.column(schema, &previous_table, column)
    }

    pub fn previous_names(&self) -> &NameMap {
        &self.previous
    }

    pub fn current_names(&self) -> &NameMap {
        &self.current
    }
}

pub struct GeneratorContext<'a> {
    pub schema_name: String,
    pub renames: &'a RenameContext,
    pub local: &'a SchemaSnapshot,
    pub remote: &'a SchemaSnapshot,
    pub unresolved: &'a [RenameCandidate],
}

impl GeneratorContext<'_> {
    pub fn previous_table_name(&self, table: &str) -> String {
        self.renames
            .resolve_previous_table_name(&self.schema_name, table)
    }

    pub fn previous_column_name(&self, table: &str, column: &str) -> String {
        self.renames
            .resolve_previous_column_name(&self.schema_name, table, column)
    }

    /// The local table, by current name.
    pub fn local_table(&self, table: &str) -> Option<&Table> {
        self.local.table(&self.schema_name, table)
    }

    /// The remote counterpart of the table currently named `table`.
    pub fn remote_table(&self, table: &str) -> Option<&Table> {
        self.remote
            .table(&self.schema_name, &self.previous_table_name(table))
    }

    /// True when the table is created by this plan.
    pub fn is_new_table(&self, table: &str) -> bool {
        self.remote_table(table).is_none()
    }

    /// True when the table is dropped by this plan.
    pub fn is_dropped_table(&self, table: &str) -> bool {
        self.local_table(table).is_none()
    }

    /// Whether a removed table or column was offered as a rename and declined.
    pub fn is_unresolved(&self, scope: &RenameScope, removed: &str) -> bool {
        self.unresolved
            .iter()
            .any(|c| &c.scope == scope && c.removed == removed)
    }
}

type Generator = fn(&DiffEntry, &GeneratorContext) -> Option<Vec<Changeset>>;

/// Tried in order; shapes are disjoint, so at most one claims an entry.
const GENERATORS: &[Generator] = &[
    schemas::generate,
    enums::generate,
    tables::generate,
    renames::generate,
    columns::generate,
    attributes::generate,
    primary_keys::generate,
    objects::generate,
];

/// Turn resolved diff entries into changesets, in entry order.
pub fn generate(
    entries: &[DiffEntry],
    renames: &RenameContext,
    local: &SchemaSnapshot,
    remote: &SchemaSnapshot,
    unresolved: &[RenameCandidate],
) -> Vec<Changeset> {
    let mut out = Vec::new();
    for entry in entries {
        let ctx = GeneratorContext {
            schema_name: entry.path.schema().to_string(),
            renames,
            local,
            remote,
            unresolved,
        };
        match GENERATORS.iter().find_map(|generator| generator(entry, &ctx)) {
            Some(changesets) => {
                debug!("{entry}: {} changeset(s)", changesets.len());
                out.extend(changesets);
            }
            None => warn!("No generator for {entry}, skipping"),
        }
    }
    info!("Generated {} changesets", out.len());
    out
}
