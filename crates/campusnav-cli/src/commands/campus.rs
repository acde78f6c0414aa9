//! `campusnav campus ...`: list and manage campuses.

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use crate::commands::open_store;
use crate::output::{print_json, render_campuses_text, OutputFormat};

#[derive(Subcommand, Debug, Clone)]
pub enum CampusCommand {
    /// List campuses (active only unless --all is given).
    List {
        /// Include deactivated campuses.
        #[arg(long)]
        all: bool,
    },
    /// Create a new campus.
    Add {
        /// Lowercase slug, e.g. `east-annex`.
        code: String,
        /// Display name.
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Make a campus visible to routing clients again.
    Activate { code: String },
    /// Hide a campus from routing clients.
    Deactivate { code: String },
}

pub fn handle_campus_command(db: &Path, format: OutputFormat, command: &CampusCommand) -> Result<()> {
    let store = open_store(db)?;

    let campus = match command {
        CampusCommand::List { all } => {
            let campuses = store.list_campuses(!all)?;
            match format {
                OutputFormat::Json => print_json(&campuses)?,
                OutputFormat::Text => print!("{}", render_campuses_text(&campuses)),
            }
            return Ok(());
        }
        CampusCommand::Add {
            code,
            name,
            description,
        } => store.create_campus(code, name, description.as_deref())?,
        CampusCommand::Activate { code } => store.set_campus_active(code, true)?,
        CampusCommand::Deactivate { code } => store.set_campus_active(code, false)?,
    };

    info!(campus = %campus.code, active = campus.active, "campus updated");
    match format {
        OutputFormat::Json => print_json(&campus)?,
        OutputFormat::Text => print!("{}", render_campuses_text(std::slice::from_ref(&campus))),
    }
    Ok(())
}
