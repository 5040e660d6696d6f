//! Typed DDL operations
//!
//! Changesets carry their `up` and `down` bodies as [`Statement`]s. Rendering
//! to SQL goes through [`SqlRenderer`], which every operation family
//! implements next to its definition.

use crate::render::RenderedSql;
use serde::Serialize;

pub use comments::*;
pub use constraint::*;
pub use extension::*;
pub use index::*;
pub use schema::*;
pub use table::*;
pub use trigger::*;
pub use types::*;

pub mod comments;
pub mod constraint;
pub mod extension;
pub mod index;
pub mod schema;
pub mod table;
pub mod trigger;
pub mod types;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Schema(SchemaOperation),
    Extension(ExtensionOperation),
    Type(TypeOperation),
    Table(TableOperation),
    Index(IndexOperation),
    Constraint(ConstraintOperation),
    Trigger(TriggerOperation),
}

/// Trait for rendering SQL from operations
pub trait SqlRenderer {
    fn to_sql(&self) -> Vec<RenderedSql>;
}

impl SqlRenderer for Statement {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            Statement::Schema(op) => op.to_sql(),
            Statement::Extension(op) => op.to_sql(),
            Statement::Type(op) => op.to_sql(),
            Statement::Table(op) => op.to_sql(),
            Statement::Index(op) => op.to_sql(),
            Statement::Constraint(op) => op.to_sql(),
            Statement::Trigger(op) => op.to_sql(),
        }
    }
}

impl Statement {
    /// False for statements Postgres refuses to run inside a transaction
    /// block, or whose effect cannot be used within the same transaction.
    pub fn is_transactional(&self) -> bool {
        !matches!(
            self,
            Statement::Index(IndexOperation::Create {
                concurrently: true,
                ..
            }) | Statement::Index(IndexOperation::Drop {
                concurrently: true,
                ..
            }) | Statement::Type(TypeOperation::AddValue { .. })
        )
    }
}

/// Render a statement list to SQL text.
pub fn render_statements(statements: &[Statement]) -> Vec<String> {
    statements
        .iter()
        .flat_map(|s| s.to_sql())
        .map(|r| r.sql)
        .collect()
}
