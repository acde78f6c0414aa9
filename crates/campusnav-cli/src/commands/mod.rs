//! Handlers for the CLI subcommands.
//!
//! `main.rs` parses arguments and dispatches here; each handler opens the
//! store, calls into `campusnav-lib`, and renders the result.

use std::path::Path;

use anyhow::{Context, Result};

use campusnav_lib::CampusStore;

pub mod campus;
pub mod connection;
pub mod hop;
pub mod route;

/// Campus used when `--campus` is not given.
pub const DEFAULT_CAMPUS: &str = "main-campus";

/// Open an existing database, failing with a hint-friendly error if missing.
pub fn open_store(db: &Path) -> Result<CampusStore> {
    CampusStore::open(db)
        .with_context(|| format!("failed to open campus database at {}", db.display()))
}

/// Create (or upgrade) the database at `db` and seed the default campuses.
pub fn handle_init(db: &Path) -> Result<()> {
    let store = CampusStore::create(db)
        .with_context(|| format!("failed to initialise campus database at {}", db.display()))?;
    let campuses = store.list_campuses(false)?;
    println!(
        "Campus database ready at {} ({} campuses)",
        db.display(),
        campuses.len()
    );
    Ok(())
}
