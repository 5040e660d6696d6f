use super::SqlRenderer;
use crate::catalog::triggers::Trigger;
use crate::render::{RenderedSql, escape_string, qualified, quote_ident};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOperation {
    Create {
        schema: String,
        table: String,
        name: String,
        trigger: Trigger,
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

fn render_create_trigger(schema: &str, table: &str, name: &str, trigger: &Trigger) -> String {
    let events = trigger
        .sorted_events()
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" OR ");

    let mut sql = format!(
        "CREATE TRIGGER {} {} {} ON {} FOR EACH {}",
        quote_ident(name),
        trigger.timing,
        events,
        qualified(schema, table),
        if trigger.for_each_row { "ROW" } else { "STATEMENT" }
    );
    if let Some(condition) = &trigger.condition {
        sql.push_str(&format!(" WHEN ({})", condition));
    }
    sql.push_str(&format!(
        " EXECUTE FUNCTION {}({});",
        trigger.function,
        trigger
            .arguments
            .iter()
            .map(|a| escape_string(a))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    sql
}

impl SqlRenderer for TriggerOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            TriggerOperation::Create {
                schema,
                table,
                name,
                trigger,
            } => vec![RenderedSql::new(render_create_trigger(
                schema, table, name, trigger,
            ))],
            TriggerOperation::Drop {
                schema,
                table,
                name,
            } => vec![RenderedSql::destructive(format!(
                "DROP TRIGGER {} ON {};",
                quote_ident(name),
                qualified(schema, table)
            ))],
            TriggerOperation::Rename {
                schema,
                table,
                from,
                to,
            } => vec![RenderedSql::new(format!(
                "ALTER TRIGGER {} ON {} RENAME TO {};",
                quote_ident(from),
                qualified(schema, table),
                quote_ident(to)
            ))],
        }
    }
}
