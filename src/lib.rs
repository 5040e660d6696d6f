//! Plans reversible PostgreSQL schema changes from a declared schema.
//!
//! The pipeline is pure: two [`catalog::SchemaSnapshot`]s are diffed, renames
//! are resolved, and each difference becomes a [`changeset::Changeset`] with
//! `up` and `down` statements. [`plan`] orders them into expand, alter,
//! contract and data phases. Reading snapshots from files or a live database
//! and asking about renames happen at the edges.

pub mod catalog;
pub mod changeset;
pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod diff;
pub mod migrate;
pub mod plan;
pub mod prompts;
pub mod render;
pub mod schema_loader;
