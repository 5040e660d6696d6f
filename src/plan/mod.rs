//! Ordering changesets into deployable phases.
//!
//! A plan is a list of [`PlanPhase`]s. Each phase is one run of statements
//! executed together: inside a single transaction when every statement in it
//! allows that, on its own otherwise.

use crate::changeset::{Changeset, Phase};
use crate::diff::operations::Statement;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanPhase {
    pub phase: Phase,
    pub transactional: bool,
    pub steps: Vec<Statement>,
    pub changesets: Vec<Changeset>,
}

/// Drop changesets with nothing to run in either direction, then stable
/// sort by `(phase, priority)`.
pub fn order(changesets: Vec<Changeset>) -> Vec<Changeset> {
    let mut ordered: Vec<Changeset> = changesets
        .into_iter()
        .filter(|c| !(c.up.is_empty() && c.down.is_empty()))
        .collect();
    ordered.sort_by_key(|c| (c.phase, c.priority));
    ordered
}

/// Order `changesets` and group their `up` bodies into phases.
pub fn plan(changesets: Vec<Changeset>) -> Vec<PlanPhase> {
    let ordered = order(changesets);
    let phases = partition(&ordered, |c| &c.up);
    info!(
        "Planned {} changesets in {} phases",
        ordered.len(),
        phases.len()
    );
    phases
}

/// Reverse of `ordered`, except that table create/drop changesets keep their
/// forward relative order in the slots they occupy.
pub fn rollback_order(ordered: &[Changeset]) -> Vec<Changeset> {
    let mut reversed: Vec<Changeset> = ordered.iter().rev().cloned().collect();
    let mut lifecycle = ordered
        .iter()
        .filter(|c| c.kind.is_table_lifecycle())
        .cloned();
    for slot in reversed
        .iter_mut()
        .filter(|c| c.kind.is_table_lifecycle())
    {
        if let Some(changeset) = lifecycle.next() {
            *slot = changeset;
        }
    }
    reversed
}

/// Group the `down` bodies of the rollback order into phases.
pub fn rollback_plan(changesets: Vec<Changeset>) -> Vec<PlanPhase> {
    let rollback = rollback_order(&order(changesets));
    partition(&rollback, |c| &c.down)
}

/// Split into runs. A new run starts on a phase change, at a
/// non-transactional changeset, and after one.
fn partition(changesets: &[Changeset], body: fn(&Changeset) -> &Vec<Statement>) -> Vec<PlanPhase> {
    let mut phases: Vec<PlanPhase> = Vec::new();

    for changeset in changesets {
        let statements = body(changeset);
        if statements.is_empty() {
            continue;
        }
        let transactional = statements.iter().all(Statement::is_transactional);

        let extend = phases
            .last()
            .is_some_and(|last| last.phase == changeset.phase && last.transactional && transactional);
        if extend && let Some(last) = phases.last_mut() {
            last.steps.extend(statements.iter().cloned());
            last.changesets.push(changeset.clone());
            continue;
        }

        debug!(
            "Starting {} run ({})",
            changeset.phase,
            if transactional {
                "transactional"
            } else {
                "non-transactional"
            }
        );
        phases.push(PlanPhase {
            phase: changeset.phase,
            transactional,
            steps: statements.clone(),
            changesets: vec![changeset.clone()],
        });
    }

    phases
}
