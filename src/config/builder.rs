use crate::config::{merge::Merge, types::*};
use crate::diff::renames::RenameIntent;
use anyhow::{Result, bail};
use std::collections::BTreeSet;

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    pub fn resolve(self) -> Result<Config> {
        let defaults = Config::default();
        let schema = self.resolve_schema(&defaults.schema);
        let renames = self.resolve_renames(&schema.name)?;

        Ok(Config {
            database: self.resolve_database(),
            schema,
            renames,
        })
    }

    fn resolve_database(&self) -> Database {
        let url = self
            .config_input
            .database
            .as_ref()
            .and_then(|d| d.url.as_ref())
            .cloned()
            .or_else(|| std::env::var("DATABASE_URL").ok());
        Database { url }
    }

    fn resolve_schema(&self, defaults: &SchemaSettings) -> SchemaSettings {
        let schema_input = self.config_input.schema.as_ref();

        SchemaSettings {
            name: schema_input
                .and_then(|s| s.name.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.name.clone()),
            camel_case_enabled: schema_input
                .and_then(|s| s.camel_case_enabled)
                .unwrap_or(defaults.camel_case_enabled),
            introspect: schema_input
                .and_then(|s| s.introspect.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.introspect.clone()),
        }
    }

    fn resolve_renames(&self, default_schema: &str) -> Result<Renames> {
        let renames_input = self.config_input.renames.as_ref();
        let schema_of = |schema: &Option<String>| {
            schema
                .clone()
                .unwrap_or_else(|| default_schema.to_string())
        };

        let mut tables_to_rename = Vec::new();
        let mut seen = BTreeSet::new();
        for rename in renames_input
            .and_then(|r| r.tables.as_ref())
            .into_iter()
            .flatten()
        {
            if rename.from == rename.to {
                bail!("Table rename '{}' maps to itself", rename.from);
            }
            let intent = RenameIntent::Table {
                schema: schema_of(&rename.schema),
                from: rename.from.clone(),
                to: rename.to.clone(),
            };
            if seen.insert(intent.clone()) {
                tables_to_rename.push(intent);
            }
        }

        let mut columns_to_rename = Vec::new();
        for rename in renames_input
            .and_then(|r| r.columns.as_ref())
            .into_iter()
            .flatten()
        {
            if rename.from == rename.to {
                bail!(
                    "Column rename '{}.{}' maps to itself",
                    rename.table,
                    rename.from
                );
            }
            let intent = RenameIntent::Column {
                schema: schema_of(&rename.schema),
                table: rename.table.clone(),
                from: rename.from.clone(),
                to: rename.to.clone(),
            };
            if seen.insert(intent.clone()) {
                columns_to_rename.push(intent);
            }
        }

        Ok(Renames {
            tables_to_rename,
            columns_to_rename,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
