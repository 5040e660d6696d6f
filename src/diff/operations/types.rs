//! Enum type operations

use super::SqlRenderer;
use crate::render::{RenderedSql, escape_string, qualified};
use serde::Serialize;

/// Where a new enum label goes relative to an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumValuePosition {
    Before(String),
    After(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeOperation {
    CreateEnum {
        schema: String,
        name: String,
        values: Vec<String>,
    },
    DropEnum {
        schema: String,
        name: String,
    },
    AddValue {
        schema: String,
        name: String,
        value: String,
        position: Option<EnumValuePosition>,
    },
}

impl SqlRenderer for TypeOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            TypeOperation::CreateEnum {
                schema,
                name,
                values,
            } => {
                let labels = values
                    .iter()
                    .map(|v| escape_string(v))
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![RenderedSql::new(format!(
                    "CREATE TYPE {} AS ENUM ({});",
                    qualified(schema, name),
                    labels
                ))]
            }
            TypeOperation::DropEnum { schema, name } => vec![RenderedSql::destructive(format!(
                "DROP TYPE {};",
                qualified(schema, name)
            ))],
            TypeOperation::AddValue {
                schema,
                name,
                value,
                position,
            } => {
                let placement = match position {
                    Some(EnumValuePosition::Before(other)) => {
                        format!(" BEFORE {}", escape_string(other))
                    }
                    Some(EnumValuePosition::After(other)) => {
                        format!(" AFTER {}", escape_string(other))
                    }
                    None => String::new(),
                };
                vec![RenderedSql::new(format!(
                    "ALTER TYPE {} ADD VALUE IF NOT EXISTS {}{};",
                    qualified(schema, name),
                    escape_string(value),
                    placement
                ))]
            }
        }
    }
}
