pub mod cli;
pub mod declarations;
pub mod database;
