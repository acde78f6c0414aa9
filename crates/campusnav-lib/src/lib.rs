//! Campus navigation library entry points.
//!
//! This crate owns the campus data store, builds per-request graph snapshots
//! for a single campus, and runs the walking-route search over them.
//! Higher-level consumers (CLI, HTTP service) should only depend on the
//! functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod db;
pub mod error;
pub mod geo;
pub mod graph;
pub mod nearest;
pub mod path;
pub mod routing;

pub use db::{
    Campus, CampusStore, ConnectionId, MapData, NewConnection, NewHop, RoadConnection,
    DEFAULT_CAMPUSES, DEFAULT_CONNECTION_COLOR, DEFAULT_CONNECTION_WIDTH,
};
pub use error::{Error, Result};
pub use geo::{haversine_distance, Coordinate, EARTH_RADIUS_M};
pub use graph::{build_graph, load_graph, Edge, Graph, GraphSource, Node, NodeId, NodeKind};
pub use nearest::nearest_node;
pub use path::{find_route_dijkstra, DijkstraSearch, ShortestPath};
pub use routing::{
    assemble_route, estimate_walking_minutes, find_route, plan_route, shortest_path, RouteRequest,
    RouteResult, RouteStart, MIN_ESTIMATED_MINUTES, WALKING_SPEED_M_PER_MIN,
};
