use super::*;
use crate::config::merge::Merge;
use crate::diff::renames::RenameIntent;
use rstest::rstest;

fn table_rename(from: &str, to: &str) -> TableRenameInput {
    TableRenameInput {
        schema: None,
        from: from.to_string(),
        to: to.to_string(),
    }
}

#[test]
fn test_cli_overrides_file_settings() {
    let file_config = ConfigInput {
        database: Some(DatabaseInput {
            url: Some("postgres://localhost/from_file".to_string()),
        }),
        schema: Some(SchemaInput {
            name: Some("app".to_string()),
            camel_case_enabled: Some(true),
            introspect: Some(vec!["app".to_string()]),
        }),
        renames: None,
    };
    let cli_config = ConfigInput {
        database: Some(DatabaseInput {
            url: Some("postgres://localhost/from_cli".to_string()),
        }),
        schema: Some(SchemaInput {
            name: None,
            camel_case_enabled: Some(false),
            introspect: None,
        }),
        renames: None,
    };

    let merged = file_config.merge(cli_config);
    let schema = merged.schema.as_ref().unwrap();
    assert_eq!(
        merged.database.unwrap().url,
        Some("postgres://localhost/from_cli".to_string())
    );
    assert_eq!(schema.name, Some("app".to_string()));
    assert_eq!(schema.camel_case_enabled, Some(false));
    assert_eq!(schema.introspect, Some(vec!["app".to_string()]));
}

#[test]
fn test_renames_accumulate_across_layers() {
    let file_config = ConfigInput {
        renames: Some(RenamesInput {
            tables: Some(vec![table_rename("members", "users")]),
            columns: None,
        }),
        ..Default::default()
    };
    let cli_config = ConfigInput {
        renames: Some(RenamesInput {
            tables: Some(vec![table_rename("posts_old", "posts")]),
            columns: None,
        }),
        ..Default::default()
    };

    let config = ConfigBuilder::new()
        .with_file(file_config)
        .with_cli_args(cli_config)
        .resolve()
        .unwrap();
    assert_eq!(config.renames.tables_to_rename.len(), 2);
}

#[test]
fn test_defaults() {
    let config = ConfigBuilder::new().resolve().unwrap();
    assert_eq!(config.schema.name, "public");
    assert!(!config.schema.camel_case_enabled);
    assert!(config.schema.introspect.is_empty());
    assert!(config.renames.all().is_empty());
}

#[test]
fn test_renames_default_to_configured_schema() {
    let input = ConfigInput {
        schema: Some(SchemaInput {
            name: Some("app".to_string()),
            ..Default::default()
        }),
        renames: Some(RenamesInput {
            tables: Some(vec![table_rename("members", "users")]),
            columns: Some(vec![ColumnRenameInput {
                schema: None,
                table: "users".to_string(),
                from: "email_address".to_string(),
                to: "email".to_string(),
            }]),
        }),
        ..Default::default()
    };
    let config = ConfigBuilder::new().with_file(input).resolve().unwrap();
    assert_eq!(
        config.renames.all(),
        vec![
            RenameIntent::Table {
                schema: "app".to_string(),
                from: "members".to_string(),
                to: "users".to_string(),
            },
            RenameIntent::Column {
                schema: "app".to_string(),
                table: "users".to_string(),
                from: "email_address".to_string(),
                to: "email".to_string(),
            },
        ]
    );
}

#[test]
fn test_self_rename_is_rejected() {
    let input = ConfigInput {
        renames: Some(RenamesInput {
            tables: Some(vec![table_rename("users", "users")]),
            columns: None,
        }),
        ..Default::default()
    };
    let err = ConfigBuilder::new().with_file(input).resolve().unwrap_err();
    assert!(err.to_string().contains("maps to itself"));
}

#[test]
fn test_config_file_yaml() {
    let yaml = r#"
schema:
  name: public
  camel_case_enabled: true
renames:
  tables:
    - from: members
      to: users
  columns:
    - table: users
      from: emailAddress
      to: email
"#;
    let input: ConfigInput = serde_yaml::from_str(yaml).unwrap();
    let config = ConfigBuilder::new().with_file(input).resolve().unwrap();
    assert!(config.schema.camel_case_enabled);
    assert_eq!(config.renames.columns_to_rename.len(), 1);
}

#[rstest]
#[case("members=users", None, "members", "users")]
#[case("app.members=users", Some("app"), "members", "users")]
#[case(" members = users ", None, "members", "users")]
fn test_parse_table_rename(
    #[case] value: &str,
    #[case] schema: Option<&str>,
    #[case] from: &str,
    #[case] to: &str,
) {
    let parsed = parse_table_rename(value).unwrap();
    assert_eq!(parsed.schema.as_deref(), schema);
    assert_eq!(parsed.from, from);
    assert_eq!(parsed.to, to);
}

#[rstest]
#[case("users.email_address=email", None, "users")]
#[case("app.users.email_address=email", Some("app"), "users")]
fn test_parse_column_rename(
    #[case] value: &str,
    #[case] schema: Option<&str>,
    #[case] table: &str,
) {
    let parsed = parse_column_rename(value).unwrap();
    assert_eq!(parsed.schema.as_deref(), schema);
    assert_eq!(parsed.table, table);
    assert_eq!(parsed.from, "email_address");
    assert_eq!(parsed.to, "email");
}

#[rstest]
#[case("users")]
#[case("users=")]
#[case("=users")]
fn test_parse_rename_rejects_malformed(#[case] value: &str) {
    assert!(parse_table_rename(value).is_err());
}

#[test]
fn test_column_rename_needs_table() {
    assert!(parse_column_rename("email_address=email").is_err());
}
