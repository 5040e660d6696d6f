use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_introspect_requires_database() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper
        .command()
        .arg("introspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No database to introspect"));
    Ok(())
}

#[test]
fn test_introspect_snapshot_plans_cleanly() -> Result<()> {
    dotenv::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return Ok(());
    };
    let helper = CliTestHelper::new()?;

    helper
        .command()
        .args([
            "introspect",
            "--schema",
            "public",
            "--database-url",
            &url,
            "--output",
            "snapshot.yaml",
        ])
        .assert()
        .success();

    // The snapshot declares exactly what the database holds.
    helper
        .command()
        .args([
            "plan",
            "--local",
            "snapshot.yaml",
            "--remote",
            "snapshot.yaml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("-- No changes detected"));
    Ok(())
}
