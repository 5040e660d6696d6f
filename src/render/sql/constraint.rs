//! Shared SQL rendering for constraint statements

use crate::diff::operations::ConstraintDefinition;
use crate::render::{qualified, quote_ident, quote_idents};

/// The part of ADD CONSTRAINT after the constraint name.
pub fn render_constraint_definition(definition: &ConstraintDefinition) -> String {
    match definition {
        ConstraintDefinition::PrimaryKey { columns } => {
            format!("PRIMARY KEY ({})", quote_idents(columns))
        }
        ConstraintDefinition::Unique { columns } => format!("UNIQUE ({})", quote_idents(columns)),
        ConstraintDefinition::Check { expression } => {
            // Introspected definitions may already carry the keyword.
            let upper = expression.trim_start().to_uppercase();
            if upper.starts_with("CHECK ") || upper.starts_with("CHECK(") {
                expression.clone()
            } else {
                format!("CHECK ({})", expression)
            }
        }
        ConstraintDefinition::ForeignKey {
            columns,
            referenced_schema,
            referenced_table,
            referenced_columns,
            on_delete,
            on_update,
        } => format!(
            "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
            quote_idents(columns),
            qualified(referenced_schema, referenced_table),
            quote_idents(referenced_columns),
            on_delete,
            on_update
        ),
    }
}

pub fn render_add_constraint(
    schema: &str,
    table: &str,
    name: &str,
    definition: &ConstraintDefinition,
) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} {};",
        qualified(schema, table),
        quote_ident(name),
        render_constraint_definition(definition)
    )
}

pub fn render_drop_constraint(schema: &str, table: &str, name: &str) -> String {
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {};",
        qualified(schema, table),
        quote_ident(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::constraint::ReferentialAction;

    #[test]
    fn test_render_unique_constraint() {
        let sql = render_add_constraint(
            "public",
            "users",
            "users_email_key",
            &ConstraintDefinition::Unique {
                columns: vec!["email".to_string()],
            },
        );
        assert_eq!(
            sql,
            "ALTER TABLE \"public\".\"users\" ADD CONSTRAINT \"users_email_key\" UNIQUE (\"email\");"
        );
    }

    #[test]
    fn test_render_foreign_key() {
        let definition = ConstraintDefinition::ForeignKey {
            columns: vec!["author_id".to_string()],
            referenced_schema: "public".to_string(),
            referenced_table: "users".to_string(),
            referenced_columns: vec!["id".to_string()],
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::NoAction,
        };
        assert_eq!(
            render_constraint_definition(&definition),
            "FOREIGN KEY (\"author_id\") REFERENCES \"public\".\"users\" (\"id\") ON DELETE CASCADE ON UPDATE NO ACTION"
        );
    }

    #[test]
    fn test_render_check_does_not_double_keyword() {
        let wrapped = ConstraintDefinition::Check {
            expression: "CHECK ((price > 0))".to_string(),
        };
        assert_eq!(render_constraint_definition(&wrapped), "CHECK ((price > 0))");

        let bare = ConstraintDefinition::Check {
            expression: "price > 0".to_string(),
        };
        assert_eq!(render_constraint_definition(&bare), "CHECK (price > 0)");
    }

    #[test]
    fn test_render_drop_constraint() {
        assert_eq!(
            render_drop_constraint("public", "users", "users_email_key"),
            "ALTER TABLE \"public\".\"users\" DROP CONSTRAINT \"users_email_key\";"
        );
    }
}
