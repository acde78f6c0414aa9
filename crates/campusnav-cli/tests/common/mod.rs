//! Shared helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use tempfile::TempDir;

/// Temporary directory holding a database path the CLI is pointed at.
pub struct TestEnv {
    _temp_dir: TempDir,
    pub db_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Environment without a database file.
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("campus").join("campusnav.db");
        Self {
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// Environment with an initialised database.
    pub fn initialised() -> Self {
        let env = Self::empty();
        env.cmd().arg("init").assert().success();
        env
    }

    /// Initialised database with a Gate - Hop 1 - Library line on main-campus
    /// (hop ids 1, 2, 3) plus a disconnected Gym (id 4).
    pub fn with_line() -> Self {
        let env = Self::initialised();
        env.run(&["hop", "add", "--kind", "marker", "--name", "Gate", "--lat", "51.5050", "--lng", "-0.0900"]);
        env.run(&["hop", "add", "--lat", "51.5055", "--lng", "-0.0895"]);
        env.run(&[
            "hop", "add", "--kind", "marker", "--name", "Library", "--description", "Quiet floor upstairs",
            "--lat", "51.5060", "--lng", "-0.0890",
        ]);
        env.run(&["hop", "add", "--kind", "marker", "--name", "Gym", "--lat", "51.5100", "--lng", "-0.0800"]);
        env.run(&["connect", "1", "2"]);
        env.run(&["connect", "2", "3"]);
        env
    }

    /// Command pointed at this environment's database, with quiet logs and no colors.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("campusnav");
        cmd.env("RUST_LOG", "error")
            .env("NO_COLOR", "1")
            .env_remove("CAMPUSNAV_DB")
            .arg("--db")
            .arg(&self.db_path);
        cmd
    }

    /// Run a command that must succeed.
    pub fn run(&self, args: &[&str]) {
        self.cmd().args(args).assert().success();
    }
}
