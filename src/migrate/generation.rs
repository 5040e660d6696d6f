use crate::catalog::SchemaSnapshot;
use crate::changeset::{self, Changeset, RenameContext, Warning};
use crate::constants::MAX_ORACLE_ROUNDS;
use crate::diff::diff;
use crate::diff::operations::SqlRenderer;
use crate::diff::renames::{
    RenameCandidate, RenameIntent, RenameOracle, Resolution, resolve_renames,
};
use crate::plan::{self, PlanPhase};
use crate::render::Safety;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Input for plan generation - all pure data, no side effects
#[derive(Debug, Clone)]
pub struct PlanInput {
    pub remote: SchemaSnapshot,
    pub local: SchemaSnapshot,
    /// Renames known up front, from config or flags.
    pub intents: Vec<RenameIntent>,
}

/// Result of plan generation - all pure data
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    /// Changesets in execution order.
    pub changesets: Vec<Changeset>,
    pub phases: Vec<PlanPhase>,
    pub rollback: Vec<PlanPhase>,
    pub applied_renames: Vec<RenameIntent>,
    pub unresolved_renames: Vec<RenameCandidate>,
    pub has_changes: bool,
}

impl PlanResult {
    pub fn warnings(&self) -> impl Iterator<Item = (&Changeset, &Warning)> {
        self.changesets
            .iter()
            .flat_map(|c| c.warnings.iter().map(move |w| (c, w)))
    }
}

/// Diff, resolve renames, generate and order changesets.
///
/// The oracle is consulted only when remove/create pairs remain that no
/// known intent covers.
pub fn generate_plan(input: PlanInput, oracle: &dyn RenameOracle) -> Result<PlanResult> {
    let PlanInput {
        remote,
        local,
        mut intents,
    } = input;

    let entries = diff(&remote, &local);
    let mut resolution = resolve_renames(entries.clone(), &intents, &remote, &local);

    for round in 1..=MAX_ORACLE_ROUNDS {
        if resolution.unresolved.is_empty() {
            break;
        }
        let answered = oracle
            .resolve(&resolution.unresolved)
            .context("Failed to resolve rename candidates")?;
        let new: Vec<RenameIntent> = answered
            .into_iter()
            .filter(|intent| !intents.contains(intent))
            .collect();
        debug!("Rename round {round}: {} new intents", new.len());
        if new.is_empty() {
            break;
        }
        intents.extend(new);
        resolution = resolve_renames(entries.clone(), &intents, &remote, &local);
    }

    let Resolution {
        entries,
        applied,
        unresolved,
    } = resolution;
    let renames = RenameContext::new(&applied);
    let generated = changeset::generate(&entries, &renames, &local, &remote, &unresolved);

    let changesets = plan::order(generated);
    let phases = plan::plan(changesets.clone());
    let rollback = plan::rollback_plan(changesets.clone());
    let has_changes = !changesets.is_empty();

    info!(
        "Plan: {} changesets, {} renames applied, {} unresolved",
        changesets.len(),
        applied.len(),
        unresolved.len()
    );

    Ok(PlanResult {
        changesets,
        phases,
        rollback,
        applied_renames: applied,
        unresolved_renames: unresolved,
        has_changes,
    })
}

/// Render phases as a SQL script. Transactional phases are wrapped in
/// `BEGIN`/`COMMIT`; statements that lose data are flagged with a comment.
pub fn render_plan_sql(phases: &[PlanPhase]) -> String {
    if phases.is_empty() {
        return "-- No changes detected\n".to_string();
    }

    let mut parts = Vec::new();
    for phase in phases {
        let mut block = vec![format!(
            "-- {} ({})",
            phase.phase,
            if phase.transactional {
                "transactional"
            } else {
                "non-transactional"
            }
        )];
        if phase.transactional {
            block.push("BEGIN;".to_string());
        }
        for rendered in phase.steps.iter().flat_map(|s| s.to_sql()) {
            if rendered.safety == Safety::Destructive {
                block.push("-- destructive".to_string());
            }
            block.push(rendered.sql);
        }
        if phase.transactional {
            block.push("COMMIT;".to_string());
        }
        parts.push(block.join("\n"));
    }

    let mut sql = parts.join("\n\n");
    sql.push('\n');
    sql
}

pub fn render_plan_json(result: &PlanResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize plan")
}
