pub mod columns;
pub mod constraints;
pub mod renames;
pub mod rollback;
