//! Table operations

use super::{CommentOperation, CommentTarget, SqlRenderer};
use crate::catalog::table::{Column, IdentityMode};
use crate::render::sql::{render_column_definition, render_create_table};
use crate::render::{RenderedSql, Safety, qualified, quote_ident};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOperation {
    Create {
        schema: String,
        name: String,
        columns: Vec<Column>,
    },
    Drop {
        schema: String,
        name: String,
    },
    Rename {
        schema: String,
        from: String,
        to: String,
    },
    Alter {
        schema: String,
        name: String,
        actions: Vec<ColumnAction>,
    },
    Comment(CommentOperation<ColumnIdentifier>),
}

/// Column-level actions within ALTER TABLE
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAction {
    Add {
        column: Column,
    },
    Drop {
        name: String,
    },
    Rename {
        from: String,
        to: String,
    },
    SetNotNull {
        name: String,
    },
    DropNotNull {
        name: String,
    },
    SetDefault {
        name: String,
        default: String,
    },
    DropDefault {
        name: String,
    },
    AlterType {
        name: String,
        data_type: String,
        using: Option<String>,
    },
    AddIdentity {
        name: String,
        mode: IdentityMode,
    },
    DropIdentity {
        name: String,
    },
    SetGenerated {
        name: String,
        mode: IdentityMode,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnIdentifier {
    pub schema: String,
    pub table: String,
    pub name: String,
}

impl CommentTarget for ColumnIdentifier {
    const OBJECT_TYPE: &'static str = "COLUMN";

    fn identifier(&self) -> String {
        format!(
            "{}.{}",
            qualified(&self.schema, &self.table),
            quote_ident(&self.name)
        )
    }
}

impl TableOperation {
    /// Single-action ALTER TABLE.
    pub fn alter(schema: &str, table: &str, action: ColumnAction) -> Self {
        TableOperation::Alter {
            schema: schema.to_string(),
            name: table.to_string(),
            actions: vec![action],
        }
    }

    /// `COMMENT ON COLUMN`, cleared when `comment` is `None`.
    pub fn column_comment(schema: &str, table: &str, column: &str, comment: Option<&str>) -> Self {
        let target = ColumnIdentifier {
            schema: schema.to_string(),
            table: table.to_string(),
            name: column.to_string(),
        };
        TableOperation::Comment(match comment {
            Some(comment) => CommentOperation::Set {
                target,
                comment: comment.to_string(),
            },
            None => CommentOperation::Drop { target },
        })
    }
}

impl SqlRenderer for TableOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            TableOperation::Create {
                schema,
                name,
                columns,
            } => vec![RenderedSql::new(render_create_table(schema, name, columns))],
            TableOperation::Drop { schema, name } => vec![RenderedSql::destructive(format!(
                "DROP TABLE {};",
                qualified(schema, name)
            ))],
            TableOperation::Rename { schema, from, to } => vec![RenderedSql::new(format!(
                "ALTER TABLE {} RENAME TO {};",
                qualified(schema, from),
                quote_ident(to)
            ))],
            TableOperation::Alter {
                schema,
                name,
                actions,
            } => actions
                .iter()
                .map(|action| action.to_sql(schema, name))
                .collect(),
            TableOperation::Comment(op) => op.to_sql(),
        }
    }
}

impl ColumnAction {
    pub fn to_sql(&self, schema: &str, table: &str) -> RenderedSql {
        let alter = |body: String, safety: Safety| RenderedSql {
            sql: format!("ALTER TABLE {} {};", qualified(schema, table), body),
            safety,
        };
        match self {
            ColumnAction::Add { column } => alter(
                format!("ADD COLUMN {}", render_column_definition(column)),
                Safety::Safe,
            ),
            ColumnAction::Drop { name } => {
                alter(format!("DROP COLUMN {}", quote_ident(name)), Safety::Destructive)
            }
            ColumnAction::Rename { from, to } => alter(
                format!("RENAME COLUMN {} TO {}", quote_ident(from), quote_ident(to)),
                Safety::Safe,
            ),
            ColumnAction::SetNotNull { name } => alter(
                format!("ALTER COLUMN {} SET NOT NULL", quote_ident(name)),
                Safety::Safe,
            ),
            ColumnAction::DropNotNull { name } => alter(
                format!("ALTER COLUMN {} DROP NOT NULL", quote_ident(name)),
                Safety::Safe,
            ),
            ColumnAction::SetDefault { name, default } => alter(
                format!("ALTER COLUMN {} SET DEFAULT {}", quote_ident(name), default),
                Safety::Safe,
            ),
            ColumnAction::DropDefault { name } => alter(
                format!("ALTER COLUMN {} DROP DEFAULT", quote_ident(name)),
                Safety::Safe,
            ),
            ColumnAction::AlterType {
                name,
                data_type,
                using,
            } => {
                let mut body = format!("ALTER COLUMN {} TYPE {}", quote_ident(name), data_type);
                if let Some(using) = using {
                    body.push_str(&format!(" USING {}", using));
                }
                alter(body, Safety::Destructive)
            }
            ColumnAction::AddIdentity { name, mode } => alter(
                format!(
                    "ALTER COLUMN {} ADD GENERATED {} AS IDENTITY",
                    quote_ident(name),
                    mode.generated_clause().unwrap_or("BY DEFAULT")
                ),
                Safety::Safe,
            ),
            ColumnAction::DropIdentity { name } => alter(
                format!("ALTER COLUMN {} DROP IDENTITY IF EXISTS", quote_ident(name)),
                Safety::Safe,
            ),
            ColumnAction::SetGenerated { name, mode } => alter(
                format!(
                    "ALTER COLUMN {} SET GENERATED {}",
                    quote_ident(name),
                    mode.generated_clause().unwrap_or("BY DEFAULT")
                ),
                Safety::Safe,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(action: ColumnAction) -> String {
        action.to_sql("public", "users").sql
    }

    #[test]
    fn test_add_column_renders_full_definition() {
        let column = Column::new("email", "text").not_null();
        assert_eq!(
            render(ColumnAction::Add { column }),
            "ALTER TABLE \"public\".\"users\" ADD COLUMN \"email\" text NOT NULL;"
        );
    }

    #[test]
    fn test_alter_type_with_using() {
        let sql = render(ColumnAction::AlterType {
            name: "count".to_string(),
            data_type: "bigint".to_string(),
            using: Some("\"count\"::bigint".to_string()),
        });
        assert_eq!(
            sql,
            "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"count\" TYPE bigint USING \"count\"::bigint;"
        );
    }

    #[test]
    fn test_identity_actions() {
        assert_eq!(
            render(ColumnAction::AddIdentity {
                name: "id".to_string(),
                mode: IdentityMode::Always,
            }),
            "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"id\" ADD GENERATED ALWAYS AS IDENTITY;"
        );
        assert_eq!(
            render(ColumnAction::SetGenerated {
                name: "id".to_string(),
                mode: IdentityMode::ByDefault,
            }),
            "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"id\" SET GENERATED BY DEFAULT;"
        );
    }

    #[test]
    fn test_rename_table_and_column() {
        let rename = TableOperation::Rename {
            schema: "public".to_string(),
            from: "members".to_string(),
            to: "users".to_string(),
        };
        assert_eq!(
            rename.to_sql()[0].sql,
            "ALTER TABLE \"public\".\"members\" RENAME TO \"users\";"
        );
        assert_eq!(
            render(ColumnAction::Rename {
                from: "email_address".to_string(),
                to: "email".to_string(),
            }),
            "ALTER TABLE \"public\".\"users\" RENAME COLUMN \"email_address\" TO \"email\";"
        );
    }

    #[test]
    fn test_column_comment() {
        let set = TableOperation::column_comment("public", "users", "count", Some("cfcd2084"));
        assert_eq!(
            set.to_sql()[0].sql,
            "COMMENT ON COLUMN \"public\".\"users\".\"count\" IS 'cfcd2084';"
        );
        let cleared = TableOperation::column_comment("public", "users", "count", None);
        assert_eq!(cleared.to_sql()[0].safety, Safety::Safe);
        assert!(cleared.to_sql()[0].sql.ends_with("IS NULL;"));
    }
}
