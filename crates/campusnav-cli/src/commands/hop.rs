//! `campusnav hop ...`: place, move, list and delete hops.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use campusnav_lib::{Coordinate, GraphSource, NewHop, NodeKind};

use crate::commands::{open_store, DEFAULT_CAMPUS};
use crate::output::{print_json, render_nodes_text, OutputFormat};

#[derive(Subcommand, Debug, Clone)]
pub enum HopCommand {
    /// Add a waypoint or marker.
    Add {
        #[arg(long, default_value = DEFAULT_CAMPUS)]
        campus: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// `waypoint` (routing only) or `marker` (point of interest).
        #[arg(long, default_value = "waypoint")]
        kind: NodeKind,
        /// Required for markers; waypoints default to `Hop N`.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Move a hop. Connection weights are kept until `recompute-weights`.
    Move {
        #[arg(long, default_value = DEFAULT_CAMPUS)]
        campus: String,
        id: i64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Delete a hop and every connection touching it.
    Delete {
        #[arg(long, default_value = DEFAULT_CAMPUS)]
        campus: String,
        id: i64,
    },
    /// List the hops of a campus.
    List {
        #[arg(long, default_value = DEFAULT_CAMPUS)]
        campus: String,
    },
}

pub fn handle_hop_command(db: &Path, format: OutputFormat, command: &HopCommand) -> Result<()> {
    match command {
        HopCommand::Add {
            campus,
            lat,
            lng,
            kind,
            name,
            description,
            icon,
            image,
        } => {
            let store = open_store(db)?;
            let node = store.add_hop(
                campus,
                NewHop {
                    kind: *kind,
                    name: name.clone(),
                    description: description.clone(),
                    coordinate: Coordinate::new(*lat, *lng)?,
                    icon: icon.clone(),
                    image_path: image.as_ref().map(|p| p.display().to_string()),
                },
            )?;
            match format {
                OutputFormat::Json => print_json(&node)?,
                OutputFormat::Text => println!(
                    "Added {} #{} '{}' to {}",
                    node.kind,
                    node.id,
                    node.name.as_deref().unwrap_or(""),
                    node.campus
                ),
            }
        }
        HopCommand::Move {
            campus,
            id,
            lat,
            lng,
        } => {
            let store = open_store(db)?;
            let node = store.move_hop(campus, *id, Coordinate::new(*lat, *lng)?)?;
            match format {
                OutputFormat::Json => print_json(&node)?,
                OutputFormat::Text => println!(
                    "Moved hop #{} to ({:.6}, {:.6}); run `campusnav recompute-weights` to refresh connection distances",
                    node.id, node.coordinate.latitude, node.coordinate.longitude
                ),
            }
        }
        HopCommand::Delete { campus, id } => {
            let mut store = open_store(db)?;
            let removed = store.delete_hop(campus, *id)?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "campus": campus,
                    "deleted_hop": id,
                    "deleted_connections": removed,
                }))?,
                OutputFormat::Text => {
                    println!("Deleted hop #{id} and {removed} connection(s) from {campus}")
                }
            }
        }
        HopCommand::List { campus } => {
            let store = open_store(db)?;
            store.campus(campus)?;
            let nodes = store.list_nodes(campus)?;
            match format {
                OutputFormat::Json => print_json(&nodes)?,
                OutputFormat::Text => print!("{}", render_nodes_text(campus, &nodes)),
            }
        }
    }
    Ok(())
}
