//! `campusnav connect`, `disconnect` and `recompute-weights`.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use campusnav_lib::NewConnection;

use crate::commands::{open_store, DEFAULT_CAMPUS};
use crate::output::{print_json, render_connection_text, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    #[arg(long, default_value = DEFAULT_CAMPUS)]
    pub campus: String,
    /// First hop id.
    pub from: i64,
    /// Second hop id.
    pub to: i64,
    /// Defaults to "<from name> - <to name>".
    #[arg(long)]
    pub name: Option<String>,
    /// Drawn line width, 1-20.
    #[arg(long)]
    pub width: Option<u32>,
    /// Drawn line color as #RRGGBB.
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DisconnectArgs {
    #[arg(long, default_value = DEFAULT_CAMPUS)]
    pub campus: String,
    /// Connection id.
    pub id: i64,
}

#[derive(Args, Debug, Clone)]
pub struct RecomputeArgs {
    #[arg(long, default_value = DEFAULT_CAMPUS)]
    pub campus: String,
}

pub fn handle_connect(db: &Path, format: OutputFormat, args: &ConnectArgs) -> Result<()> {
    let store = open_store(db)?;
    let connection = store.connect_hops(
        &args.campus,
        NewConnection {
            from: args.from,
            to: args.to,
            name: args.name.clone(),
            width: args.width,
            color: args.color.clone(),
        },
    )?;
    match format {
        OutputFormat::Json => print_json(&connection)?,
        OutputFormat::Text => print!("{}", render_connection_text(&connection)),
    }
    Ok(())
}

pub fn handle_disconnect(db: &Path, format: OutputFormat, args: &DisconnectArgs) -> Result<()> {
    let store = open_store(db)?;
    store.delete_connection(&args.campus, args.id)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "campus": args.campus,
            "deleted_connection": args.id,
        }))?,
        OutputFormat::Text => println!("Deleted connection {} from {}", args.id, args.campus),
    }
    Ok(())
}

pub fn handle_recompute_weights(
    db: &Path,
    format: OutputFormat,
    args: &RecomputeArgs,
) -> Result<()> {
    let mut store = open_store(db)?;
    let updated = store.recompute_weights(&args.campus)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "campus": args.campus,
            "updated_connections": updated,
        }))?,
        OutputFormat::Text => println!(
            "Recomputed {} connection weight(s) in {}",
            updated, args.campus
        ),
    }
    Ok(())
}
