//! Shared fixtures for the library integration tests.
//!
//! Fixtures are built on the fly: either a temporary SQLite store seeded
//! through the public API, or an in-memory [`GraphSource`] for cases the store
//! cannot express (overlapping ids, failing reads).

use std::path::PathBuf;

use campusnav_lib::{
    CampusStore, Coordinate, Error, GraphSource, NewConnection, NewHop, Node, NodeId, NodeKind,
    RoadConnection, Result,
};
use tempfile::TempDir;

pub const MAIN: &str = "main-campus";

/// File-backed store living in a temporary directory.
#[allow(dead_code)]
pub struct TempStore {
    _dir: TempDir,
    pub path: PathBuf,
    pub store: CampusStore,
}

#[allow(dead_code)]
impl TempStore {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("campusnav.db");
        let store = CampusStore::create(&path).expect("create store");
        Self {
            _dir: dir,
            path,
            store,
        }
    }

    pub fn waypoint(&self, campus: &str, lat: f64, lng: f64) -> Node {
        self.store
            .add_hop(campus, NewHop::waypoint(coord(lat, lng)))
            .expect("add waypoint")
    }

    pub fn marker(&self, campus: &str, name: &str, lat: f64, lng: f64) -> Node {
        self.store
            .add_hop(campus, NewHop::marker(name, coord(lat, lng)))
            .expect("add marker")
    }

    pub fn connect(&self, campus: &str, from: &Node, to: &Node) -> RoadConnection {
        self.store
            .connect_hops(campus, NewConnection::between(from.id, to.id))
            .expect("connect hops")
    }
}

/// P(0,0) - Q(0,1) - R(0,2) with no direct P-R connection.
#[allow(dead_code)]
pub fn line_campus(fixture: &TempStore) -> (Node, Node, Node) {
    let p = fixture.marker(MAIN, "P", 0.0, 0.0);
    let q = fixture.marker(MAIN, "Q", 0.0, 1.0);
    let r = fixture.marker(MAIN, "R", 0.0, 2.0);
    fixture.connect(MAIN, &p, &q);
    fixture.connect(MAIN, &q, &r);
    (p, q, r)
}

#[allow(dead_code)]
pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).expect("valid coordinate")
}

#[allow(dead_code)]
pub fn node(id: NodeId, campus: &str, lat: f64, lng: f64) -> Node {
    Node {
        id,
        kind: NodeKind::Waypoint,
        name: Some(format!("Hop {id}")),
        description: None,
        image_path: None,
        coordinate: coord(lat, lng),
        campus: campus.to_string(),
    }
}

#[allow(dead_code)]
pub fn road(id: i64, campus: &str, from: &Node, to: &Node) -> RoadConnection {
    RoadConnection {
        id,
        from: from.id,
        to: to.id,
        name: None,
        width: 5,
        color: "#0066cc".to_string(),
        distance: Some(from.coordinate.distance_to(&to.coordinate)),
        campus: campus.to_string(),
    }
}

/// In-memory data source holding records for any number of campuses.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemorySource {
    pub nodes: Vec<Node>,
    pub edges: Vec<RoadConnection>,
    /// Return every record regardless of the campus asked for.
    pub unscoped: bool,
}

impl GraphSource for MemorySource {
    fn list_nodes(&self, campus: &str) -> Result<Vec<Node>> {
        Ok(self
            .nodes
            .iter()
            .filter(|n| self.unscoped || n.campus == campus)
            .cloned()
            .collect())
    }

    fn list_edges(&self, campus: &str) -> Result<Vec<RoadConnection>> {
        Ok(self
            .edges
            .iter()
            .filter(|e| self.unscoped || e.campus == campus)
            .cloned()
            .collect())
    }
}

/// Data source whose reads always fail.
#[allow(dead_code)]
pub struct UnavailableSource;

impl GraphSource for UnavailableSource {
    fn list_nodes(&self, _campus: &str) -> Result<Vec<Node>> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "database is locked",
        )))
    }

    fn list_edges(&self, _campus: &str) -> Result<Vec<RoadConnection>> {
        Ok(Vec::new())
    }
}
