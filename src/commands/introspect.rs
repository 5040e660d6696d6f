//! pgdelta introspect - dump a live schema as a snapshot file
//!
//! The output loads back as a declaration, so it can serve as `--remote`
//! for offline planning or as the starting point of a new declaration.

use crate::catalog::SchemaSnapshot;
use crate::config::{Config, ConfigArgs};
use crate::db::connect_to_database;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

use super::write_output;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Yaml,
    Json,
}

#[derive(clap::Args, Debug, Clone)]
pub struct IntrospectArgs {
    /// Schema to include; repeat for several (default: all user schemas)
    #[arg(long = "schema")]
    pub schemas: Vec<String>,

    #[arg(long, value_enum, default_value = "yaml")]
    pub format: SnapshotFormat,

    /// Write the snapshot to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config_args: ConfigArgs,
}

pub async fn cmd_introspect(config: &Config, args: &IntrospectArgs) -> Result<()> {
    let Some(url) = &config.database.url else {
        bail!("No database to introspect: pass --database-url or set DATABASE_URL");
    };
    let schemas = if args.schemas.is_empty() {
        config.schema.introspect.clone()
    } else {
        args.schemas.clone()
    };

    let pool = connect_to_database(url, "database").await?;
    let snapshot = SchemaSnapshot::load(&pool, &schemas).await?;
    pool.close().await;

    eprintln!(
        "Introspected {} schemas, {} tables",
        snapshot.schemas.len(),
        snapshot
            .schemas
            .iter()
            .map(|s| s.tables.len())
            .sum::<usize>()
    );
    write_output(&serialize(&snapshot, args.format)?, args.output.as_deref())
}

pub fn serialize(snapshot: &SchemaSnapshot, format: SnapshotFormat) -> Result<String> {
    match format {
        SnapshotFormat::Yaml => serde_yaml::to_string(snapshot).context("Failed to write YAML"),
        SnapshotFormat::Json => serde_json::to_string_pretty(snapshot)
            .map(|json| json + "\n")
            .context("Failed to write JSON"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::Schema;
    use crate::catalog::table::{Column, ColumnDefault, Table};
    use crate::schema_loader::{Format, LoadOptions, parse_declaration};
    use rstest::rstest;

    #[rstest]
    #[case(SnapshotFormat::Yaml, Format::Yaml)]
    #[case(SnapshotFormat::Json, Format::Json)]
    fn test_snapshot_loads_back_as_declaration(
        #[case] written: SnapshotFormat,
        #[case] read: Format,
    ) {
        let mut column = Column::new("status", "text");
        column.default = Some(ColumnDefault {
            expression: "'active'::text".to_string(),
            hash: "0a1b2c3d".to_string(),
        });
        let mut table = Table::new("users");
        table.columns = vec![Column::new("id", "bigint"), column];
        let snapshot = SchemaSnapshot {
            schemas: vec![Schema::new("public").with_table(table)],
        };

        let text = serialize(&snapshot, written).unwrap();
        let loaded = parse_declaration(&text, read, &LoadOptions::default()).unwrap();
        let users = loaded.table("public", "users").unwrap();
        assert_eq!(
            users.column("status").unwrap().default.as_ref().unwrap().hash,
            "0a1b2c3d"
        );
    }
}
