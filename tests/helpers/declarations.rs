use pgdelta::catalog::SchemaSnapshot;
use pgdelta::diff::renames::{NoRenames, RenameIntent, RenameOracle};
use pgdelta::migrate::{PlanInput, PlanResult, generate_plan};
use pgdelta::schema_loader::{Format, LoadOptions, parse_declaration};

/// Parse a single-schema YAML declaration into the `public` schema.
pub fn yaml(contents: &str) -> SchemaSnapshot {
    parse_declaration(contents, Format::Yaml, &LoadOptions::default())
        .expect("Failed to parse test declaration")
}

pub fn plan(remote: &str, local: &str) -> PlanResult {
    plan_with(remote, local, Vec::new(), &NoRenames)
}

pub fn plan_with(
    remote: &str,
    local: &str,
    intents: Vec<RenameIntent>,
    oracle: &dyn RenameOracle,
) -> PlanResult {
    generate_plan(
        PlanInput {
            remote: yaml(remote),
            local: yaml(local),
            intents,
        },
        oracle,
    )
    .expect("Failed to generate plan")
}

/// Every up statement of the plan, in execution order.
pub fn up_sql(result: &PlanResult) -> Vec<String> {
    result.changesets.iter().flat_map(|c| c.up_sql()).collect()
}

pub const USERS: &str = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
    primary_key:
      columns: [id]
"#;
