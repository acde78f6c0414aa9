//! `campusnav route` and `campusnav nearest`.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use tracing::debug;

use campusnav_lib::{find_route, load_graph, nearest_node, Coordinate, RouteRequest};

use crate::commands::{open_store, DEFAULT_CAMPUS};
use crate::output::{
    print_json, render_nearest_text, render_route_text, NearestOutput, OutputFormat,
};
use crate::terminal::ColorPalette;

/// Arguments for the route command.
///
/// Exactly one start form is accepted: `--from <id>` or `--lat`/`--lng`.
#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    #[arg(long, default_value = DEFAULT_CAMPUS)]
    pub campus: String,
    /// Start hop id.
    #[arg(long, conflicts_with_all = ["lat", "lng"], required_unless_present = "lat")]
    pub from: Option<i64>,
    /// Destination hop id.
    #[arg(long)]
    pub to: i64,
    /// Current latitude; routing starts at the nearest hop.
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Current longitude.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,
}

impl RouteArgs {
    /// Convert CLI args to a library request.
    pub fn to_request(&self) -> Result<RouteRequest> {
        match (self.from, self.lat, self.lng) {
            (Some(from), None, None) => Ok(RouteRequest::between(&self.campus, from, self.to)),
            (None, Some(lat), Some(lng)) => Ok(RouteRequest::from_position(
                &self.campus,
                Coordinate::new(lat, lng)?,
                self.to,
            )),
            _ => bail!("pass either --from <id> or both --lat and --lng"),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct NearestArgs {
    #[arg(long, default_value = DEFAULT_CAMPUS)]
    pub campus: String,
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
}

/// Handle the route subcommand.
pub fn handle_route_command(db: &Path, format: OutputFormat, args: &RouteArgs) -> Result<()> {
    let request = args.to_request()?;
    let store = open_store(db)?;
    store.campus(&request.campus)?;

    let route = find_route(&store, &request)?;
    debug!(
        waypoints = route.waypoint_count,
        distance_m = route.total_distance_m,
        "route computed"
    );

    match format {
        OutputFormat::Json => print_json(&route)?,
        OutputFormat::Text => print!("{}", render_route_text(&route, &ColorPalette::detect())),
    }
    Ok(())
}

pub fn handle_nearest_command(db: &Path, format: OutputFormat, args: &NearestArgs) -> Result<()> {
    let position = Coordinate::new(args.lat, args.lng)?;
    let store = open_store(db)?;
    store.campus(&args.campus)?;

    let graph = load_graph(&store, &args.campus)?;
    let (id, distance_m) = nearest_node(&graph, &position)?;
    let Some(node) = graph.node(id) else {
        bail!("nearest node {id} vanished from the snapshot");
    };

    let output = NearestOutput {
        campus: &args.campus,
        node,
        distance_m,
    };
    match format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Text => print!("{}", render_nearest_text(&output)),
    }
    Ok(())
}
