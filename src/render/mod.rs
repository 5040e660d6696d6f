pub mod sql;

use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSql {
    pub safety: Safety,
    pub sql: String,
}

impl RenderedSql {
    pub fn new(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Destructive,
        }
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `"schema"."name"`
pub fn qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

pub fn quote_idents(idents: &[String]) -> String {
    idents.iter().map(|i| quote_ident(i)).join(", ")
}

pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Generic helper for rendering comment SQL
pub fn render_comment_sql(
    object_type: &str,
    identifier: &str,
    comment: Option<&str>,
) -> RenderedSql {
    let sql = match comment {
        Some(comment_text) => format!(
            "COMMENT ON {} {} IS {};",
            object_type,
            identifier,
            escape_string(comment_text)
        ),
        None => format!("COMMENT ON {} {} IS NULL;", object_type, identifier),
    };

    RenderedSql::new(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualified("public", "users"), "\"public\".\"users\"");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("it's"), "'it''s'");
    }

    #[test]
    fn test_render_comment_sql() {
        let set = render_comment_sql("COLUMN", "\"public\".\"users\".\"count\"", Some("cfcd2084"));
        assert_eq!(
            set.sql,
            "COMMENT ON COLUMN \"public\".\"users\".\"count\" IS 'cfcd2084';"
        );
        let cleared = render_comment_sql("COLUMN", "\"public\".\"users\".\"count\"", None);
        assert!(cleared.sql.ends_with("IS NULL;"));
    }
}
