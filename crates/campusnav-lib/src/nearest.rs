//! Nearest-node lookup used to start a route from a raw GPS position.
//!
//! Campus graphs hold tens to low hundreds of nodes, so a linear scan is
//! used instead of a spatial index.

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::{Graph, NodeId};

/// Find the node closest to `coordinate`, returning its id and distance in meters.
///
/// Ties go to the node encountered first in [`Graph::nodes`] order.
pub fn nearest_node(graph: &Graph, coordinate: &Coordinate) -> Result<(NodeId, f64)> {
    coordinate.validate()?;

    let mut best: Option<(NodeId, f64)> = None;
    for node in graph.nodes() {
        let distance = coordinate.distance_to(&node.coordinate);
        match best {
            Some((_, current)) if distance >= current => {}
            _ => best = Some((node.id, distance)),
        }
    }

    best.ok_or_else(|| Error::EmptyGraph {
        campus: graph.campus().to_string(),
    })
}
