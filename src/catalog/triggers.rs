//! Fetch triggers via pg_catalog
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::OnTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

impl std::fmt::Display for TriggerTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerTiming::Before => write!(f, "BEFORE"),
            TriggerTiming::After => write!(f, "AFTER"),
            TriggerTiming::InsteadOf => write!(f, "INSTEAD OF"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
    Truncate,
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerEvent::Insert => write!(f, "INSERT"),
            TriggerEvent::Update => write!(f, "UPDATE"),
            TriggerEvent::Delete => write!(f, "DELETE"),
            TriggerEvent::Truncate => write!(f, "TRUNCATE"),
        }
    }
}

fn for_each_row_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    #[serde(default = "for_each_row_by_default")]
    pub for_each_row: bool,
    /// Trigger function, schema-qualified when it lives outside the table's schema.
    pub function: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Trigger {
    /// Events in a stable order, independent of declaration order.
    pub fn sorted_events(&self) -> Vec<TriggerEvent> {
        let mut events = self.events.clone();
        events.sort();
        events.dedup();
        events
    }

    /// Function name with a redundant `<schema>.` prefix removed.
    pub fn function_in(&self, schema: &str) -> &str {
        self.function
            .strip_prefix(schema)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.function)
    }
}

// pg_trigger.tgtype bits
const TRIGGER_TYPE_ROW: i32 = 1 << 0;
const TRIGGER_TYPE_BEFORE: i32 = 1 << 1;
const TRIGGER_TYPE_INSERT: i32 = 1 << 2;
const TRIGGER_TYPE_DELETE: i32 = 1 << 3;
const TRIGGER_TYPE_UPDATE: i32 = 1 << 4;
const TRIGGER_TYPE_TRUNCATE: i32 = 1 << 5;
const TRIGGER_TYPE_INSTEAD: i32 = 1 << 6;

fn decode_type(tgtype: i32) -> (TriggerTiming, Vec<TriggerEvent>, bool) {
    let timing = if tgtype & TRIGGER_TYPE_BEFORE != 0 {
        TriggerTiming::Before
    } else if tgtype & TRIGGER_TYPE_INSTEAD != 0 {
        TriggerTiming::InsteadOf
    } else {
        TriggerTiming::After
    };

    let events = [
        (TRIGGER_TYPE_INSERT, TriggerEvent::Insert),
        (TRIGGER_TYPE_UPDATE, TriggerEvent::Update),
        (TRIGGER_TYPE_DELETE, TriggerEvent::Delete),
        (TRIGGER_TYPE_TRUNCATE, TriggerEvent::Truncate),
    ]
    .into_iter()
    .filter(|(bit, _)| tgtype & bit != 0)
    .map(|(_, event)| event)
    .collect();

    (timing, events, tgtype & TRIGGER_TYPE_ROW != 0)
}

/// `tgargs` holds each argument followed by a NUL byte.
fn decode_arguments(raw: &[u8], count: i32) -> Vec<String> {
    raw.split(|b| *b == 0)
        .take(count.max(0) as usize)
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect()
}

/// Pull the WHEN clause out of `pg_get_triggerdef` output.
fn extract_condition(definition: &str) -> Option<String> {
    let start = definition.find(" WHEN (")? + " WHEN ".len();
    let end = definition.rfind(" EXECUTE ")?;
    (end > start).then(|| definition[start..end].trim().to_string())
}

#[derive(Debug, FromRow)]
struct TriggerRow {
    schema: String,
    table_name: String,
    name: String,
    tgtype: i32,
    function_schema: String,
    function_name: String,
    nargs: i32,
    args: Vec<u8>,
    definition: String,
}

pub async fn fetch(conn: &mut PgConnection, schemas: &[String]) -> Result<Vec<OnTable<Trigger>>> {
    info!("Fetching triggers...");
    let rows: Vec<TriggerRow> = sqlx::query_as(
        r#"
        SELECT
            n.nspname::text AS schema,
            c.relname::text AS table_name,
            t.tgname::text AS name,
            t.tgtype::int AS tgtype,
            pn.nspname::text AS function_schema,
            p.proname::text AS function_name,
            t.tgnargs::int AS nargs,
            t.tgargs AS args,
            pg_catalog.pg_get_triggerdef(t.oid, true) AS definition
        FROM pg_trigger t
        JOIN pg_class c ON t.tgrelid = c.oid
        JOIN pg_namespace n ON c.relnamespace = n.oid
        JOIN pg_proc p ON t.tgfoid = p.oid
        JOIN pg_namespace pn ON p.pronamespace = pn.oid
        WHERE NOT t.tgisinternal
          AND n.nspname::text = ANY($1)
        ORDER BY n.nspname, c.relname, t.tgname
        "#,
    )
    .bind(schemas)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let (timing, events, for_each_row) = decode_type(row.tgtype);
            let function = if row.function_schema == row.schema {
                row.function_name
            } else {
                format!("{}.{}", row.function_schema, row.function_name)
            };
            OnTable {
                item: Trigger {
                    timing,
                    events,
                    for_each_row,
                    function,
                    arguments: decode_arguments(&row.args, row.nargs),
                    condition: extract_condition(&row.definition),
                    name: Some(row.name),
                },
                schema: row.schema,
                table: row.table_name,
            }
        })
        .collect())
}
