//! Database-backed tests; they skip unless DATABASE_URL is set.

use crate::helpers::database::{ScratchSchema, test_pool};
use anyhow::Result;
use pgdelta::catalog::SchemaSnapshot;
use pgdelta::diff::diff;
use pgdelta::diff::operations::render_statements;
use pgdelta::diff::renames::{NoRenames, RenameIntent};
use pgdelta::migrate::{PlanInput, generate_plan};
use pgdelta::plan::PlanPhase;
use pgdelta::schema_loader::{Format, LoadOptions, parse_declaration};

const DECLARATION: &str = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: varchar(320)
        nullable: false
      - name: status
        data_type: text
        default: "'active'"
    primary_key:
      columns: [id]
    unique_constraints:
      - columns: [email]
    indexes:
      - columns: [status]
"#;

#[tokio::test]
async fn test_introspects_columns_and_keys() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let scratch = ScratchSchema::create(pool, "pgdelta_introspect").await;
    scratch
        .execute(&format!(
            "CREATE TABLE \"{}\".accounts (id bigint PRIMARY KEY, name text NOT NULL DEFAULT 'x')",
            scratch.name
        ))
        .await;

    let snapshot = SchemaSnapshot::load(&scratch.pool, std::slice::from_ref(&scratch.name)).await?;
    let table = snapshot
        .table(&scratch.name, "accounts")
        .expect("accounts is introspected");
    let name = table.column("name").expect("name column");
    assert!(!name.nullable);
    assert_eq!(name.data_type, "text");
    assert!(name.default.is_some());
    assert_eq!(
        table.primary_key.as_ref().map(|pk| pk.columns.clone()),
        Some(vec!["id".to_string()])
    );

    scratch.drop().await;
    Ok(())
}

#[tokio::test]
async fn test_applied_plan_leaves_nothing_to_do() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let scratch = ScratchSchema::create(pool, "pgdelta_roundtrip").await;
    let options = LoadOptions {
        schema_name: scratch.name.clone(),
        camel_case_enabled: false,
    };
    let local = parse_declaration(DECLARATION, Format::Yaml, &options)?;
    let schemas = vec![scratch.name.clone()];

    let remote = SchemaSnapshot::load(&scratch.pool, &schemas).await?;
    let first = generate_plan(
        PlanInput {
            remote,
            local: local.clone(),
            intents: Vec::new(),
        },
        &NoRenames,
    )?;
    assert!(first.has_changes);
    for changeset in &first.changesets {
        for sql in changeset.up_sql() {
            scratch.execute(&sql).await;
        }
    }

    let remote = SchemaSnapshot::load(&scratch.pool, &schemas).await?;
    let second = generate_plan(
        PlanInput {
            remote,
            local,
            intents: Vec::new(),
        },
        &NoRenames,
    )?;
    assert!(
        !second.has_changes,
        "unexpected changesets: {:?}",
        second.changesets
    );

    scratch.drop().await;
    Ok(())
}

const REWORKED: &str = r#"
tables:
  accounts:
    columns:
      - name: id
        data_type: bigint
      - name: tenant_id
        data_type: bigint
        nullable: false
      - name: email
        data_type: text
        nullable: false
      - name: nickname
        data_type: text
    primary_key:
      columns: [tenant_id, id]
    unique_constraints:
      - columns: [tenant_id, email]
    indexes:
      - columns: [email]
  people:
    columns:
      - name: id
        data_type: bigint
      - name: name
        data_type: text
    primary_key:
      columns: [id]
"#;

async fn run_phases(scratch: &ScratchSchema, phases: &[PlanPhase]) {
    for phase in phases {
        for sql in render_statements(&phase.steps) {
            scratch.execute(&sql).await;
        }
    }
}

#[tokio::test]
async fn test_rollback_restores_the_original_schema() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let scratch = ScratchSchema::create(pool, "pgdelta_rollback").await;
    let schema = scratch.name.clone();
    scratch
        .execute(&format!(
            "CREATE TABLE \"{schema}\".accounts (
                id bigint NOT NULL,
                tenant_id bigint NOT NULL,
                email text NOT NULL,
                legacy text,
                PRIMARY KEY (id),
                CONSTRAINT accounts_email_key UNIQUE (email)
            )"
        ))
        .await;
    scratch
        .execute(&format!(
            "CREATE TABLE \"{schema}\".members (id bigint PRIMARY KEY, name text)"
        ))
        .await;

    let options = LoadOptions {
        schema_name: schema.clone(),
        camel_case_enabled: false,
    };
    let local = parse_declaration(REWORKED, Format::Yaml, &options)?;
    let schemas = vec![schema.clone()];
    let original = SchemaSnapshot::load(&scratch.pool, &schemas).await?;

    let result = generate_plan(
        PlanInput {
            remote: original.clone(),
            local: local.clone(),
            intents: vec![RenameIntent::Table {
                schema: schema.clone(),
                from: "members".to_string(),
                to: "people".to_string(),
            }],
        },
        &NoRenames,
    )?;
    assert!(result.has_changes);

    run_phases(&scratch, &result.phases).await;
    let applied = SchemaSnapshot::load(&scratch.pool, &schemas).await?;
    let again = generate_plan(
        PlanInput {
            remote: applied,
            local,
            intents: Vec::new(),
        },
        &NoRenames,
    )?;
    assert!(!again.has_changes, "left after apply: {:?}", again.changesets);

    run_phases(&scratch, &result.rollback).await;
    let restored = SchemaSnapshot::load(&scratch.pool, &schemas).await?;
    let drift = diff(&original, &restored);
    assert!(drift.is_empty(), "left after rollback: {drift:?}");

    scratch.drop().await;
    Ok(())
}
