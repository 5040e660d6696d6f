/// Tests for pgdelta plan
/// Offline planning against snapshot files, so no database is needed.
use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use predicates::prelude::*;

const REMOTE: &str = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email_address
        data_type: text
"#;

const LOCAL: &str = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
"#;

#[test]
fn test_plan_no_changes() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("local.yaml", REMOTE)?;
    helper.write_file("remote.yaml", REMOTE)?;

    helper
        .command()
        .args(["plan", "--local", "local.yaml", "--remote", "remote.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-- No changes detected"));
    Ok(())
}

#[test]
fn test_plan_warns_about_dropped_column() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("local.yaml", LOCAL)?;
    helper.write_file("remote.yaml", REMOTE)?;

    helper
        .command()
        .args(["plan", "--local", "local.yaml", "--remote", "remote.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ALTER TABLE \"public\".\"users\" ADD COLUMN \"email\" text;",
        ))
        .stdout(predicate::str::contains("DROP COLUMN \"email_address\""))
        .stderr(predicate::str::contains("drop_column"));
    Ok(())
}

#[test]
fn test_rename_flag_renames_column() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("local.yaml", LOCAL)?;
    helper.write_file("remote.yaml", REMOTE)?;

    helper
        .command()
        .args([
            "plan",
            "--local",
            "local.yaml",
            "--remote",
            "remote.yaml",
            "--rename-column",
            "users.email_address=email",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "RENAME COLUMN \"email_address\" TO \"email\"",
        ))
        .stdout(predicate::str::contains("DROP COLUMN").not());
    Ok(())
}

#[test]
fn test_renames_from_config_file() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("local.yaml", LOCAL)?;
    helper.write_file("remote.yaml", REMOTE)?;
    helper.write_file(
        "pgdelta.yaml",
        r#"
renames:
  columns:
    - table: users
      from: email_address
      to: email
"#,
    )?;

    helper
        .command()
        .args(["plan", "--local", "local.yaml", "--remote", "remote.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RENAME COLUMN"));
    Ok(())
}

#[test]
fn test_rollback_and_json_output() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("local.yaml", LOCAL)?;
    helper.write_file("remote.yaml", REMOTE)?;

    helper
        .command()
        .args([
            "plan",
            "--local",
            "local.yaml",
            "--remote",
            "remote.yaml",
            "--rollback",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ADD COLUMN \"email_address\" text"));

    let output = helper
        .command()
        .args([
            "plan",
            "--local",
            "local.yaml",
            "--remote",
            "remote.yaml",
            "--format",
            "json",
        ])
        .output()?;
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["has_changes"], true);
    assert_eq!(json["unresolved_renames"][0]["removed"], "email_address");
    Ok(())
}

#[test]
fn test_plan_written_to_file() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("local.yaml", LOCAL)?;
    helper.write_file("remote.yaml", REMOTE)?;

    helper
        .command()
        .args([
            "plan",
            "--local",
            "local.yaml",
            "--remote",
            "remote.yaml",
            "--output",
            "plan.sql",
        ])
        .assert()
        .success();
    let sql = std::fs::read_to_string(helper.path("plan.sql"))?;
    assert!(sql.contains("-- expand (transactional)"));
    Ok(())
}

#[test]
fn test_plan_without_remote_fails() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("local.yaml", LOCAL)?;

    helper
        .command()
        .args(["plan", "--local", "local.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No remote schema"));
    Ok(())
}

#[test]
fn test_invalid_declaration_is_reported() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file(
        "local.yaml",
        r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
    primary_key:
      columns: [uuid]
"#,
    )?;
    helper.write_file("remote.yaml", REMOTE)?;

    helper
        .command()
        .args(["plan", "--local", "local.yaml", "--remote", "remote.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("primary key names unknown column uuid"));
    Ok(())
}

#[test]
fn test_malformed_rename_flag_is_rejected() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper
        .command()
        .args(["plan", "--local", "x.yaml", "--rename-table", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected FROM=TO"));
    Ok(())
}
