use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch project directory with the binary pointed at it.
pub struct CliTestHelper {
    pub temp_dir: TempDir,
}

impl CliTestHelper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// The binary, run inside the project with no ambient database.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("pgdelta").expect("Failed to find pgdelta binary");
        cmd.current_dir(self.temp_dir.path())
            .env_remove("DATABASE_URL")
            .env_remove("RUST_LOG");
        cmd
    }
}
