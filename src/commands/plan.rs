//! pgdelta plan - changesets that bring the remote schema to the declaration
//!
//! The remote side is either a snapshot file or a live database. Nothing is
//! ever applied; the plan is printed as SQL or JSON.

use crate::catalog::SchemaSnapshot;
use crate::changeset::{Changeset, Warning, WarningKind};
use crate::config::{Config, ConfigArgs};
use crate::db::connect_to_database;
use crate::diff::renames::{NoRenames, RenameOracle};
use crate::migrate::{PlanInput, PlanResult, generate_plan, render_plan_json, render_plan_sql};
use crate::prompts::PromptRenameOracle;
use crate::schema_loader::load_declaration;
use anyhow::{Result, bail};
use console::style;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

use super::{load_options, write_output};

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanFormat {
    /// SQL script, one block per phase
    Sql,
    /// Changesets, phases and warnings as JSON
    Json,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PlanArgs {
    /// Declared schema (YAML or JSON)
    #[arg(long)]
    pub local: PathBuf,

    /// Snapshot file to compare against instead of a live database
    #[arg(long)]
    pub remote: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "sql")]
    pub format: PlanFormat,

    /// Print the rollback script instead of the forward one
    #[arg(long)]
    pub rollback: bool,

    /// Ask on the terminal about possible renames
    #[arg(long)]
    pub interactive: bool,

    /// Write the plan to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config_args: ConfigArgs,
}

pub async fn cmd_plan(config: &Config, args: &PlanArgs) -> Result<()> {
    let options = load_options(config);
    eprintln!("Loading declaration {}...", args.local.display());
    let local = load_declaration(&args.local, &options)?;
    let remote = load_remote(config, args, &local).await?;

    let oracle: Box<dyn RenameOracle> = if args.interactive && std::io::stdin().is_terminal() {
        Box::new(PromptRenameOracle)
    } else {
        Box::new(NoRenames)
    };

    let result = generate_plan(
        PlanInput {
            remote,
            local,
            intents: config.renames.all(),
        },
        oracle.as_ref(),
    )?;

    print_summary(&result);
    write_output(&render(&result, args)?, args.output.as_deref())
}

async fn load_remote(
    config: &Config,
    args: &PlanArgs,
    local: &SchemaSnapshot,
) -> Result<SchemaSnapshot> {
    if let Some(path) = &args.remote {
        eprintln!("Loading remote snapshot {}...", path.display());
        return load_declaration(path, &load_options(config));
    }

    let Some(url) = &config.database.url else {
        bail!("No remote schema: pass --remote, --database-url or set DATABASE_URL");
    };
    let schemas = introspected_schemas(config, local);
    eprintln!("Introspecting database...");
    let pool = connect_to_database(url, "remote database").await?;
    let snapshot = SchemaSnapshot::load(&pool, &schemas).await?;
    pool.close().await;
    Ok(snapshot)
}

/// Configured schemas, or else the ones the declaration names, so that
/// undeclared schemas are never planned away.
pub fn introspected_schemas(config: &Config, local: &SchemaSnapshot) -> Vec<String> {
    if !config.schema.introspect.is_empty() {
        return config.schema.introspect.clone();
    }
    local.schemas.iter().map(|s| s.name.clone()).collect()
}

fn render(result: &PlanResult, args: &PlanArgs) -> Result<String> {
    match args.format {
        PlanFormat::Json => render_plan_json(result),
        PlanFormat::Sql if args.rollback => Ok(render_plan_sql(&result.rollback)),
        PlanFormat::Sql => Ok(render_plan_sql(&result.phases)),
    }
}

fn print_summary(result: &PlanResult) {
    if !result.has_changes {
        eprintln!("{} Schema is up to date", style("✓").green());
        return;
    }

    info!(
        "{} changesets in {} phases",
        result.changesets.len(),
        result.phases.len()
    );
    for intent in &result.applied_renames {
        eprintln!("{} {}", style("rename").cyan(), intent);
    }
    for (changeset, warning) in result.warnings() {
        let label = match warning.kind {
            WarningKind::Destructive => style(warning.kind.to_string()).red().bold(),
            WarningKind::MightFail | WarningKind::Blocking => {
                style(warning.kind.to_string()).yellow().bold()
            }
            WarningKind::BackwardIncompatible => style(warning.kind.to_string()).magenta(),
        };
        eprintln!("{label} {}", describe_warning(changeset, warning));
    }
}

/// `public.users: drop_column: ...`
pub fn describe_warning(changeset: &Changeset, warning: &Warning) -> String {
    let subject = match &changeset.table_name {
        Some(table) => format!("{}.{}", changeset.schema_name, table),
        None => changeset.schema_name.clone(),
    };
    format!("{subject}: {}: {}", warning.code, warning.message)
}
