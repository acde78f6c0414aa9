use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::db::{ConnectionId, RoadConnection};
use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Numeric identifier for a hop or marker.
pub type NodeId = i64;

/// Weight used for stored connections whose distance was never computed.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Whether a node is a plain routing waypoint or a point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Routing-only hop, not shown as a point of interest.
    Waypoint,
    /// Point of interest displayed to end users.
    Marker,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Waypoint => "waypoint",
            NodeKind::Marker => "marker",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "waypoint" | "hop" => Ok(NodeKind::Waypoint),
            "marker" => Ok(NodeKind::Marker),
            other => Err(Error::InvalidNode {
                message: format!("unknown hop kind '{other}'"),
            }),
        }
    }
}

/// A hop or marker placed on the campus map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Display name; always present for markers.
    pub name: Option<String>,
    /// Free-text description shown for markers.
    pub description: Option<String>,
    /// Relative path of an uploaded image, if any.
    pub image_path: Option<String>,
    pub coordinate: Coordinate,
    pub campus: String,
}

/// Adjacency entry within the routing graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub distance: f64,
    pub connection: ConnectionId,
}

/// Read-only access to the nodes and connections of a campus.
///
/// The SQLite store implements this; tests and other callers may provide
/// their own data sources.
pub trait GraphSource {
    /// All nodes belonging to `campus`.
    fn list_nodes(&self, campus: &str) -> Result<Vec<Node>>;

    /// All connections belonging to `campus`.
    fn list_edges(&self, campus: &str) -> Result<Vec<RoadConnection>>;
}

impl<T: GraphSource + ?Sized> GraphSource for &T {
    fn list_nodes(&self, campus: &str) -> Result<Vec<Node>> {
        (**self).list_nodes(campus)
    }

    fn list_edges(&self, campus: &str) -> Result<Vec<RoadConnection>> {
        (**self).list_edges(campus)
    }
}

/// In-memory snapshot of a single campus used by the pathfinding algorithms.
#[derive(Debug, Clone)]
pub struct Graph {
    campus: String,
    nodes: Arc<Vec<Node>>,
    index: Arc<HashMap<NodeId, usize>>,
    adjacency: Arc<HashMap<NodeId, Vec<Edge>>>,
    edge_count: usize,
}

impl Graph {
    /// Campus this snapshot was built for.
    pub fn campus(&self) -> &str {
        &self.campus
    }

    /// Nodes in source order. The nearest-node tie-break follows this order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&position| &self.nodes[position])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected connections that made it into the snapshot.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return the neighbours for a given node identifier.
    pub fn neighbours(&self, node: NodeId) -> &[Edge] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Load a snapshot of `campus` from `source`.
///
/// Any data-source failure is reported as [`Error::GraphLoad`] so callers can
/// tell a transient outage apart from a missing route.
pub fn load_graph<S: GraphSource + ?Sized>(source: &S, campus: &str) -> Result<Graph> {
    let nodes = source
        .list_nodes(campus)
        .map_err(|err| graph_load_error(campus, err))?;
    let edges = source
        .list_edges(campus)
        .map_err(|err| graph_load_error(campus, err))?;

    Ok(build_graph(campus, nodes, edges))
}

fn graph_load_error(campus: &str, err: Error) -> Error {
    match err {
        Error::GraphLoad { .. } => err,
        other => Error::GraphLoad {
            campus: campus.to_string(),
            message: other.to_string(),
        },
    }
}

/// Build a snapshot from already-fetched records.
///
/// Every connection contributes one adjacency entry in each direction.
/// Records from other campuses, connections whose endpoints are missing, and
/// connections with a negative or non-finite weight are skipped.
pub fn build_graph(campus: &str, nodes: Vec<Node>, edges: Vec<RoadConnection>) -> Graph {
    let mut kept = Vec::with_capacity(nodes.len());
    let mut index = HashMap::with_capacity(nodes.len());
    let mut foreign_nodes = 0usize;
    let mut duplicate_nodes = 0usize;

    for node in nodes {
        if node.campus != campus {
            foreign_nodes += 1;
            continue;
        }
        if index.contains_key(&node.id) {
            duplicate_nodes += 1;
            continue;
        }
        index.insert(node.id, kept.len());
        kept.push(node);
    }

    let mut adjacency: HashMap<NodeId, Vec<Edge>> = HashMap::with_capacity(kept.len());
    let mut edge_count = 0usize;
    let mut skipped_edges = 0usize;

    for connection in edges {
        if connection.campus != campus
            || connection.from == connection.to
            || !index.contains_key(&connection.from)
            || !index.contains_key(&connection.to)
        {
            skipped_edges += 1;
            continue;
        }

        let distance = connection.distance.unwrap_or(DEFAULT_EDGE_WEIGHT);
        if !distance.is_finite() || distance < 0.0 {
            warn!(
                connection = connection.id,
                distance, "ignored connection with invalid weight"
            );
            skipped_edges += 1;
            continue;
        }

        adjacency.entry(connection.from).or_default().push(Edge {
            target: connection.to,
            distance,
            connection: connection.id,
        });
        adjacency.entry(connection.to).or_default().push(Edge {
            target: connection.from,
            distance,
            connection: connection.id,
        });
        edge_count += 1;
    }

    if foreign_nodes > 0 || duplicate_nodes > 0 {
        warn!(
            campus,
            foreign_nodes, duplicate_nodes, "ignored nodes outside the campus snapshot"
        );
    }
    if skipped_edges > 0 {
        warn!(
            campus,
            skipped_edges, "ignored connections that cannot be routed over"
        );
    }

    debug!(
        campus,
        nodes = kept.len(),
        edges = edge_count,
        "built campus graph snapshot"
    );

    Graph {
        campus: campus.to_string(),
        nodes: Arc::new(kept),
        index: Arc::new(index),
        adjacency: Arc::new(adjacency),
        edge_count,
    }
}
