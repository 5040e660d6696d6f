//! Shared SQL rendering functions
//!
//! Statement bodies that are rendered from more than one operation (a column
//! definition inside CREATE TABLE and ADD COLUMN, a constraint definition in
//! ADD CONSTRAINT for both `up` and `down`) live here so they stay identical.

pub mod constraint;
pub mod index;
pub mod table;

pub use constraint::{render_add_constraint, render_constraint_definition, render_drop_constraint};
pub use index::render_create_index;
pub use table::{render_column_definition, render_create_table};
