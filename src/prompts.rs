use anyhow::Result;
use console::style;
use dialoguer::Select;
use std::collections::BTreeSet;

use crate::diff::renames::{RenameCandidate, RenameIntent, RenameOracle, RenameScope};

/// Asks on the terminal whether each removed table or column was renamed.
pub struct PromptRenameOracle;

/// One answer offered for a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameChoice {
    Drop,
    RenameTo(String),
}

impl RenameChoice {
    fn label(&self, candidate: &RenameCandidate) -> String {
        match self {
            RenameChoice::Drop => format!("drop {}", candidate.subject()),
            RenameChoice::RenameTo(to) => format!("rename {} to {}", candidate.subject(), to),
        }
    }
}

/// Targets already claimed in the same scope are not offered again.
pub fn rename_choices(
    candidate: &RenameCandidate,
    claimed: &BTreeSet<(RenameScope, String)>,
) -> Vec<RenameChoice> {
    std::iter::once(RenameChoice::Drop)
        .chain(
            candidate
                .created
                .iter()
                .filter(|to| !claimed.contains(&(candidate.scope.clone(), (*to).clone())))
                .map(|to| RenameChoice::RenameTo(to.clone())),
        )
        .collect()
}

impl RenameOracle for PromptRenameOracle {
    fn resolve(&self, candidates: &[RenameCandidate]) -> Result<Vec<RenameIntent>> {
        let mut intents = Vec::new();
        let mut claimed = BTreeSet::new();

        for candidate in candidates {
            let choices = rename_choices(candidate, &claimed);
            if choices.len() == 1 {
                continue;
            }
            let labels: Vec<String> = choices.iter().map(|c| c.label(candidate)).collect();

            println!(
                "{} {} is missing from the declaration",
                style("?").yellow().bold(),
                style(candidate.subject()).bold()
            );
            let selection = Select::new()
                .with_prompt("Was it renamed?")
                .items(&labels)
                .default(0)
                .interact()?;

            if let Some(RenameChoice::RenameTo(to)) = choices.get(selection) {
                claimed.insert((candidate.scope.clone(), to.clone()));
                intents.push(candidate.intent_for(to));
            }
        }

        Ok(intents)
    }
}
