//! Output formatting for command results.
//!
//! Every command either prints a human-readable text view or pretty JSON.
//! Text renderers build a `String` so they can be tested without capturing
//! stdout.

use std::fmt::Write as _;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use campusnav_lib::{Campus, Error as LibError, Node, NodeKind, RoadConnection, RouteResult};

use crate::terminal::{format_meters, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Print `value` as pretty JSON followed by a newline.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Nearest-node lookup result as printed by `campusnav nearest`.
#[derive(Debug, Clone, Serialize)]
pub struct NearestOutput<'a> {
    pub campus: &'a str,
    pub node: &'a Node,
    pub distance_m: f64,
}

fn node_label(node: &Node) -> String {
    node.name
        .clone()
        .unwrap_or_else(|| format!("Hop {}", node.id))
}

fn kind_tag(kind: NodeKind, palette: &ColorPalette) -> String {
    match kind {
        NodeKind::Marker => format!("{}POI {}", palette.tag_marker, palette.reset),
        NodeKind::Waypoint => format!("{}HOP {}", palette.tag_hop, palette.reset),
    }
}

/// Render a planned route.
pub fn render_route_text(route: &RouteResult, palette: &ColorPalette) -> String {
    let mut out = String::new();
    let start = route
        .waypoints
        .first()
        .map(node_label)
        .unwrap_or_else(|| "<unknown>".to_string());
    let goal = route
        .waypoints
        .last()
        .map(node_label)
        .unwrap_or_else(|| "<unknown>".to_string());

    let _ = writeln!(
        out,
        "Route from {} to {} in {} ({} waypoints):",
        start, goal, route.campus, route.waypoint_count
    );

    if let (Some(origin), Some(distance)) = (route.origin, route.nearest_distance_m) {
        let _ = writeln!(
            out,
            "{}Starting at the nearest node, {} from ({:.6}, {:.6}){}",
            palette.gray,
            format_meters(distance),
            origin.latitude,
            origin.longitude,
            palette.reset
        );
    }

    let last = route.waypoints.len().saturating_sub(1);
    for (index, node) in route.waypoints.iter().enumerate() {
        let tag = if index == 0 {
            format!("{}STRT{}", palette.tag_start, palette.reset)
        } else if index == last {
            format!("{}GOAL{}", palette.tag_goal, palette.reset)
        } else {
            kind_tag(node.kind, palette)
        };
        let _ = writeln!(
            out,
            " {} {}{}{} {}#{}{}",
            tag,
            palette.white_bold,
            node_label(node),
            palette.reset,
            palette.gray,
            node.id,
            palette.reset
        );
        if node.kind == NodeKind::Marker {
            if let Some(description) = node.description.as_deref() {
                let _ = writeln!(out, "      {}{}{}", palette.gray, description, palette.reset);
            }
        }
    }

    let segments = route.segment_count();
    let _ = writeln!(
        out,
        "\nTotal distance: {}{}{} over {} {}",
        palette.green,
        format_meters(route.total_distance_m),
        palette.reset,
        segments,
        if segments == 1 { "segment" } else { "segments" }
    );
    let _ = writeln!(
        out,
        "Estimated walking time: {}{:.1} min{}",
        palette.cyan, route.estimated_minutes, palette.reset
    );
    out
}

pub fn render_campuses_text(campuses: &[Campus]) -> String {
    let mut out = String::new();
    if campuses.is_empty() {
        out.push_str("No campuses found.\n");
        return out;
    }
    for campus in campuses {
        let status = if campus.active { "" } else { " (inactive)" };
        let _ = writeln!(out, "{:<20} {}{}", campus.code, campus.name, status);
    }
    out
}

pub fn render_nodes_text(campus: &str, nodes: &[Node]) -> String {
    let mut out = String::new();
    if nodes.is_empty() {
        let _ = writeln!(out, "No hops in {campus}.");
        return out;
    }
    let _ = writeln!(out, "{} hops in {}:", nodes.len(), campus);
    for node in nodes {
        let _ = writeln!(
            out,
            "{:>6}  {:<8} {:<24} ({:.6}, {:.6})",
            node.id,
            node.kind,
            node_label(node),
            node.coordinate.latitude,
            node.coordinate.longitude
        );
    }
    out
}

pub fn render_connection_text(connection: &RoadConnection) -> String {
    format!(
        "Connection {} '{}' between hops {} and {} ({})\n",
        connection.id,
        connection.name.as_deref().unwrap_or(""),
        connection.from,
        connection.to,
        connection
            .distance
            .map(format_meters)
            .unwrap_or_else(|| "no stored distance".to_string())
    )
}

pub fn render_nearest_text(nearest: &NearestOutput<'_>) -> String {
    format!(
        "Nearest node: {} (#{}, {}) {} away\n",
        node_label(nearest.node),
        nearest.node.id,
        nearest.node.kind,
        format_meters(nearest.distance_m)
    )
}

/// Turn a command failure into a message with a hint where one helps.
pub fn describe_error(err: &anyhow::Error) -> String {
    let Some(lib_err) = err.downcast_ref::<LibError>() else {
        return format!("Error: {err:#}");
    };

    match lib_err {
        LibError::UnknownCampus { code, suggestions } => {
            let mut message = format!("Error: Unknown campus '{code}'.");
            if !suggestions.is_empty() {
                let _ = write!(message, " Did you mean {}?", suggestions.join(", "));
            }
            message.push_str("\nHint: run `campusnav campus list` to see available campuses.");
            message
        }
        LibError::NoRoute { start, goal, .. } => format!(
            "Error: No walkable route between {start} and {goal}.\n\
             Hint: the hops are in disconnected parts of the map; add a connection with `campusnav connect`."
        ),
        LibError::DatabaseNotFound { path } => format!(
            "Error: No campus database at {}.\nHint: run `campusnav init` or pass --db.",
            path.display()
        ),
        LibError::EmptyGraph { campus } => format!(
            "Error: Campus '{campus}' has no hops yet.\nHint: add some with `campusnav hop add`."
        ),
        other => format!("Error: {other}"),
    }
}
