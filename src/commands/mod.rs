pub mod introspect;
pub mod plan;

pub use introspect::{IntrospectArgs, cmd_introspect};
pub use plan::{PlanArgs, cmd_plan};

use crate::config::Config;
use crate::schema_loader::LoadOptions;
use anyhow::{Context, Result};
use std::path::Path;

pub(crate) fn load_options(config: &Config) -> LoadOptions {
    LoadOptions {
        schema_name: config.schema.name.clone(),
        camel_case_enabled: config.schema.camel_case_enabled,
    }
}

/// Write to `output` when given, otherwise to stdout.
pub(crate) fn write_output(contents: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{contents}"),
    }
    Ok(())
}
