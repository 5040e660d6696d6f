//! Constraint operations, primary keys included

use super::SqlRenderer;
use crate::catalog::constraint::{CheckConstraint, ForeignKey, ReferentialAction, UniqueConstraint};
use crate::catalog::table::PrimaryKey;
use crate::render::sql::{render_add_constraint, render_drop_constraint};
use crate::render::{RenderedSql, qualified, quote_ident};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintDefinition {
    PrimaryKey {
        columns: Vec<String>,
    },
    Unique {
        columns: Vec<String>,
    },
    Check {
        expression: String,
    },
    ForeignKey {
        columns: Vec<String>,
        referenced_schema: String,
        referenced_table: String,
        referenced_columns: Vec<String>,
        on_delete: ReferentialAction,
        on_update: ReferentialAction,
    },
}

impl ConstraintDefinition {
    pub fn primary_key(pk: &PrimaryKey) -> Self {
        ConstraintDefinition::PrimaryKey {
            columns: pk.columns.clone(),
        }
    }

    pub fn unique(unique: &UniqueConstraint) -> Self {
        ConstraintDefinition::Unique {
            columns: unique.columns.clone(),
        }
    }

    pub fn check(check: &CheckConstraint) -> Self {
        ConstraintDefinition::Check {
            expression: check.expression.clone(),
        }
    }

    /// `schema` is the owning table's schema, used when the key does not
    /// name one for its referenced table.
    pub fn foreign_key(schema: &str, fk: &ForeignKey) -> Self {
        ConstraintDefinition::ForeignKey {
            columns: fk.columns.clone(),
            referenced_schema: fk.referenced_schema(schema).to_string(),
            referenced_table: fk.referenced_table.clone(),
            referenced_columns: fk.referenced_columns.clone(),
            on_delete: fk.on_delete,
            on_update: fk.on_update,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintOperation {
    Add {
        schema: String,
        table: String,
        name: String,
        definition: ConstraintDefinition,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
    Rename {
        schema: String,
        table: String,
        from: String,
        to: String,
    },
}

impl SqlRenderer for ConstraintOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            ConstraintOperation::Add {
                schema,
                table,
                name,
                definition,
            } => vec![RenderedSql::new(render_add_constraint(
                schema, table, name, definition,
            ))],
            ConstraintOperation::Drop {
                schema,
                table,
                name,
            } => vec![RenderedSql::destructive(render_drop_constraint(
                schema, table, name,
            ))],
            ConstraintOperation::Rename {
                schema,
                table,
                from,
                to,
            } => vec![RenderedSql::new(format!(
                "ALTER TABLE {} RENAME CONSTRAINT {} TO {};",
                qualified(schema, table),
                quote_ident(from),
                quote_ident(to)
            ))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_primary_key() {
        let op = ConstraintOperation::Add {
            schema: "public".to_string(),
            table: "users".to_string(),
            name: "users_5b1e2f3a_pkey".to_string(),
            definition: ConstraintDefinition::primary_key(&PrimaryKey {
                columns: vec!["id".to_string()],
                name: None,
            }),
        };
        assert_eq!(
            op.to_sql()[0].sql,
            "ALTER TABLE \"public\".\"users\" ADD CONSTRAINT \"users_5b1e2f3a_pkey\" PRIMARY KEY (\"id\");"
        );
    }

    #[test]
    fn test_foreign_key_defaults_to_owner_schema() {
        let fk = ForeignKey {
            columns: vec!["author_id".to_string()],
            referenced_schema: None,
            referenced_table: "users".to_string(),
            referenced_columns: vec!["id".to_string()],
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::NoAction,
            name: None,
        };
        let ConstraintDefinition::ForeignKey {
            referenced_schema, ..
        } = ConstraintDefinition::foreign_key("app", &fk)
        else {
            panic!("expected a foreign key definition");
        };
        assert_eq!(referenced_schema, "app");
    }

    #[test]
    fn test_rename_constraint() {
        let op = ConstraintOperation::Rename {
            schema: "public".to_string(),
            table: "users".to_string(),
            from: "users_email_key".to_string(),
            to: "users_0badc0de_key".to_string(),
        };
        assert_eq!(
            op.to_sql()[0].sql,
            "ALTER TABLE \"public\".\"users\" RENAME CONSTRAINT \"users_email_key\" TO \"users_0badc0de_key\";"
        );
    }
}
