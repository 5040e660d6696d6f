// Integration tests for pgdelta

pub mod catalog;
pub mod cli;
pub mod helpers;
pub mod planning;
