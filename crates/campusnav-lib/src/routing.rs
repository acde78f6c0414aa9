//! Route planning for walking directions within a campus.
//!
//! This module provides:
//! - [`RouteRequest`] - start (node or raw position), goal, and campus scope
//! - [`RouteResult`] - ordered waypoints with distance and time estimates
//! - [`find_route`] - load a snapshot from a [`GraphSource`] and plan on it
//! - [`plan_route`] - plan on an already loaded [`Graph`]
//!
//! # Example
//!
//! ```ignore
//! use campusnav_lib::{find_route, CampusStore, RouteRequest};
//!
//! let store = CampusStore::open("campusnav.db")?;
//! let request = RouteRequest::between("main-campus", 1, 7);
//! let route = find_route(&store, &request)?;
//! println!("{:.0} m, about {} min", route.total_distance_m, route.estimated_minutes);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::{load_graph, Graph, GraphSource, Node, NodeId};
use crate::nearest::nearest_node;
use crate::path::{find_route_dijkstra, ShortestPath};

/// Average walking speed in meters per minute (about 5 km/h).
pub const WALKING_SPEED_M_PER_MIN: f64 = 83.33;

/// Lower bound for the time estimate, however short the route.
pub const MIN_ESTIMATED_MINUTES: f64 = 1.0;

/// Where a route starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStart {
    /// A known hop or marker.
    Node(NodeId),
    /// The traveller's current position; routing starts at the nearest node.
    Coordinate(Coordinate),
}

/// Routing request scoped to a single campus.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub campus: String,
    pub start: RouteStart,
    pub goal: NodeId,
}

impl RouteRequest {
    /// Route between two known nodes.
    pub fn between(campus: impl Into<String>, start: NodeId, goal: NodeId) -> Self {
        Self {
            campus: campus.into(),
            start: RouteStart::Node(start),
            goal,
        }
    }

    /// Route from a raw position to a known node.
    pub fn from_position(campus: impl Into<String>, position: Coordinate, goal: NodeId) -> Self {
        Self {
            campus: campus.into(),
            start: RouteStart::Coordinate(position),
            goal,
        }
    }
}

/// Planned walking route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub campus: String,
    /// First node of the route (the nearest node in current-location mode).
    pub start: NodeId,
    pub goal: NodeId,
    /// Raw position supplied by the caller, if any. It is not part of
    /// `waypoints` and does not contribute to `total_distance_m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Coordinate>,
    /// Distance from `origin` to the chosen start node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_distance_m: Option<f64>,
    pub waypoints: Vec<Node>,
    pub total_distance_m: f64,
    pub estimated_minutes: f64,
    pub waypoint_count: usize,
}

impl RouteResult {
    /// Number of segments walked.
    pub fn segment_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }
}

/// Walking time in minutes, rounded to one decimal and floored at one minute.
pub fn estimate_walking_minutes(distance_m: f64) -> f64 {
    let minutes = (distance_m / WALKING_SPEED_M_PER_MIN * 10.0).round() / 10.0;
    minutes.max(MIN_ESTIMATED_MINUTES)
}

/// Run the shortest-path search, distinguishing unknown endpoints from
/// unreachable ones.
pub fn shortest_path(graph: &Graph, start: NodeId, goal: NodeId) -> Result<ShortestPath> {
    for node in [start, goal] {
        if !graph.contains(node) {
            return Err(Error::NodeNotFound {
                campus: graph.campus().to_string(),
                node,
            });
        }
    }

    find_route_dijkstra(graph, start, goal).ok_or_else(|| Error::NoRoute {
        campus: graph.campus().to_string(),
        start,
        goal,
    })
}

/// Turn a list of node ids into a [`RouteResult`].
///
/// The total distance is the sum of geodesic distances between consecutive
/// node coordinates, so it reflects where nodes are now even if stored edge
/// weights are stale.
pub fn assemble_route(
    graph: &Graph,
    path: &[NodeId],
    origin: Option<Coordinate>,
) -> Result<RouteResult> {
    let (Some(&start), Some(&goal)) = (path.first(), path.last()) else {
        return Err(Error::EmptyRoutePlan);
    };

    let waypoints = path
        .iter()
        .map(|&id| {
            graph.node(id).cloned().ok_or_else(|| Error::NodeNotFound {
                campus: graph.campus().to_string(),
                node: id,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let total_distance_m: f64 = waypoints
        .windows(2)
        .map(|pair| pair[0].coordinate.distance_to(&pair[1].coordinate))
        .sum();

    Ok(RouteResult {
        campus: graph.campus().to_string(),
        start,
        goal,
        origin,
        nearest_distance_m: None,
        waypoint_count: waypoints.len(),
        waypoints,
        total_distance_m,
        estimated_minutes: estimate_walking_minutes(total_distance_m),
    })
}

/// Plan a route on an already loaded snapshot.
pub fn plan_route(graph: &Graph, request: &RouteRequest) -> Result<RouteResult> {
    if graph.campus() != request.campus {
        return Err(Error::SnapshotMismatch {
            snapshot: graph.campus().to_string(),
            requested: request.campus.clone(),
        });
    }

    // Resolve the goal first so a bad destination is reported even when the
    // start position is also unusable.
    if !graph.contains(request.goal) {
        return Err(Error::NodeNotFound {
            campus: request.campus.clone(),
            node: request.goal,
        });
    }

    let (start_id, origin, nearest_distance) = match request.start {
        RouteStart::Node(id) => (id, None, None),
        RouteStart::Coordinate(position) => {
            let (id, distance) = nearest_node(graph, &position)?;
            debug!(
                campus = %request.campus,
                nearest = id,
                distance_m = distance,
                "resolved start position to nearest node"
            );
            (id, Some(position), Some(distance))
        }
    };

    let path = shortest_path(graph, start_id, request.goal)?;
    let mut route = assemble_route(graph, &path.nodes, origin)?;
    route.nearest_distance_m = nearest_distance;

    debug!(
        campus = %request.campus,
        start = route.start,
        goal = route.goal,
        waypoints = route.waypoint_count,
        total_distance_m = route.total_distance_m,
        "route planned"
    );

    Ok(route)
}

/// Load a fresh snapshot of the request's campus and plan the route on it.
pub fn find_route<S: GraphSource + ?Sized>(source: &S, request: &RouteRequest) -> Result<RouteResult> {
    let graph = load_graph(source, &request.campus)?;
    plan_route(&graph, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RoadConnection;
    use crate::geo::haversine_distance;
    use crate::graph::{build_graph, NodeKind};

    fn node(id: NodeId, lat: f64, lng: f64) -> Node {
        Node {
            id,
            kind: NodeKind::Waypoint,
            name: None,
            description: None,
            image_path: None,
            coordinate: Coordinate {
                latitude: lat,
                longitude: lng,
            },
            campus: "main".to_string(),
        }
    }

    fn road(id: i64, from: &Node, to: &Node) -> RoadConnection {
        RoadConnection {
            id,
            from: from.id,
            to: to.id,
            name: None,
            width: 5,
            color: "#0066cc".to_string(),
            distance: Some(from.coordinate.distance_to(&to.coordinate)),
            campus: "main".to_string(),
        }
    }

    #[test]
    fn estimate_is_floored_at_one_minute() {
        assert_eq!(estimate_walking_minutes(0.0), 1.0);
        assert_eq!(estimate_walking_minutes(10.0), 1.0);
        assert_eq!(estimate_walking_minutes(83.33), 1.0);
    }

    #[test]
    fn estimate_rounds_to_one_decimal() {
        assert_eq!(estimate_walking_minutes(1000.0), 12.0);
        assert_eq!(estimate_walking_minutes(250.0), 3.0);
        assert_eq!(estimate_walking_minutes(300.0), 3.6);
    }

    #[test]
    fn assemble_sums_geodesic_segments() {
        let a = node(1, 51.5050, -0.0900);
        let b = node(2, 51.5055, -0.0895);
        let c = node(3, 51.5060, -0.0890);
        let graph = build_graph("main", vec![a.clone(), b.clone(), c.clone()], Vec::new());

        let route = assemble_route(&graph, &[1, 2, 3], None).unwrap();
        let expected = haversine_distance(51.5050, -0.0900, 51.5055, -0.0895)
            + haversine_distance(51.5055, -0.0895, 51.5060, -0.0890);

        assert!((route.total_distance_m - expected).abs() < 1e-9);
        assert_eq!(route.waypoint_count, 3);
        assert_eq!(route.segment_count(), 2);
        assert_eq!(route.start, 1);
        assert_eq!(route.goal, 3);
    }

    #[test]
    fn assemble_rejects_empty_and_unknown_paths() {
        let graph = build_graph("main", vec![node(1, 0.0, 0.0)], Vec::new());
        assert!(matches!(
            assemble_route(&graph, &[], None),
            Err(Error::EmptyRoutePlan)
        ));
        assert!(matches!(
            assemble_route(&graph, &[1, 2], None),
            Err(Error::NodeNotFound { node: 2, .. })
        ));
    }

    #[test]
    fn shortest_path_distinguishes_missing_nodes_from_no_route() {
        let graph = build_graph(
            "main",
            vec![node(1, 0.0, 0.0), node(2, 0.0, 0.001)],
            Vec::new(),
        );
        assert!(matches!(
            shortest_path(&graph, 1, 3),
            Err(Error::NodeNotFound { node: 3, .. })
        ));
        assert!(matches!(
            shortest_path(&graph, 1, 2),
            Err(Error::NoRoute {
                start: 1,
                goal: 2,
                ..
            })
        ));
    }

    #[test]
    fn coordinate_start_keeps_origin_out_of_the_waypoints() {
        let p = node(1, 0.0, 0.0);
        let q = node(2, 0.0, 0.001);
        let graph = build_graph("main", vec![p.clone(), q.clone()], vec![road(1, &p, &q)]);

        let origin = Coordinate::new(0.0, -0.0005).unwrap();
        let route = plan_route(&graph, &RouteRequest::from_position("main", origin, 2)).unwrap();

        assert_eq!(route.start, 1);
        assert_eq!(route.origin, Some(origin));
        assert_eq!(route.waypoint_count, 2);
        assert!((route.total_distance_m - p.coordinate.distance_to(&q.coordinate)).abs() < 1e-9);
        let nearest = route.nearest_distance_m.unwrap();
        assert!((nearest - origin.distance_to(&p.coordinate)).abs() < 1e-9);
    }

    #[test]
    fn unknown_goal_is_reported_before_start_resolution() {
        let graph = build_graph("main", Vec::new(), Vec::new());
        let origin = Coordinate::new(0.0, 0.0).unwrap();
        let err = plan_route(&graph, &RouteRequest::from_position("main", origin, 9)).unwrap_err();
        assert!(matches!(err, Error::NodeNotFound { node: 9, .. }));
    }

    #[test]
    fn snapshot_for_another_campus_is_rejected() {
        let graph = build_graph("north", Vec::new(), Vec::new());
        let err = plan_route(&graph, &RouteRequest::between("main", 1, 2)).unwrap_err();
        assert!(!err.is_retryable());
        match err {
            Error::SnapshotMismatch { snapshot, requested } => {
                assert_eq!(snapshot, "north");
                assert_eq!(requested, "main");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn route_result_serializes_without_empty_origin() {
        let graph = build_graph("main", vec![node(1, 0.0, 0.0)], Vec::new());
        let route = plan_route(&graph, &RouteRequest::between("main", 1, 1)).unwrap();
        let json = serde_json::to_value(&route).unwrap();
        assert!(json.get("origin").is_none());
        assert_eq!(json["waypoint_count"], 1);
        assert_eq!(json["estimated_minutes"], 1.0);
    }
}
