//! SQLite-backed campus store.
//!
//! Holds campuses, hops (waypoints and markers) and the walkable connections
//! between them, and serves them to the graph snapshot builder through
//! [`GraphSource`].

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::{GraphSource, Node, NodeId, NodeKind};

/// Numeric identifier for a stored connection.
pub type ConnectionId = i64;

/// Campuses created by [`CampusStore::init_schema`] as `(code, name)`.
pub const DEFAULT_CAMPUSES: &[(&str, &str)] = &[
    ("main-campus", "Main Campus"),
    ("northern-dorms", "Northern Dorms"),
    ("southern-dorms", "Southern Dorms"),
    ("western-dorms", "Western Dorms"),
];

pub const DEFAULT_CONNECTION_WIDTH: u32 = 5;
pub const DEFAULT_CONNECTION_COLOR: &str = "#0066cc";
pub const DEFAULT_ICON: &str = "default";

/// Allowed range for the drawn width of a connection.
pub const CONNECTION_WIDTH_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// Stored connection weights never drop below one meter.
pub const MIN_CONNECTION_DISTANCE_M: f64 = 1.0;

const SUGGESTION_LIMIT: usize = 3;
const SUGGESTION_THRESHOLD: f64 = 0.8;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS campuses (
    code        TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hops (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    kind        TEXT NOT NULL CHECK (kind IN ('waypoint', 'marker')),
    name        TEXT,
    description TEXT,
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    icon        TEXT NOT NULL DEFAULT 'default',
    image_path  TEXT,
    campus_code TEXT NOT NULL REFERENCES campuses(code) ON DELETE CASCADE,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS hops_campus ON hops(campus_code);

CREATE TABLE IF NOT EXISTS connections (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    hop_from_id INTEGER NOT NULL REFERENCES hops(id) ON DELETE CASCADE,
    hop_to_id   INTEGER NOT NULL REFERENCES hops(id) ON DELETE CASCADE,
    name        TEXT,
    width       INTEGER NOT NULL DEFAULT 5,
    color       TEXT NOT NULL DEFAULT '#0066cc',
    distance    REAL,
    campus_code TEXT NOT NULL REFERENCES campuses(code) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    UNIQUE (hop_from_id, hop_to_id)
);

CREATE INDEX IF NOT EXISTS connections_campus ON connections(campus_code);
";

const HOP_COLUMNS: &str =
    "id, kind, name, description, latitude, longitude, image_path, campus_code";
const CONNECTION_COLUMNS: &str =
    "id, hop_from_id, hop_to_id, name, width, color, distance, campus_code";

/// A campus whose map can be edited and routed over independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Campus {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

/// Stored walkable connection between two hops of the same campus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadConnection {
    pub id: ConnectionId,
    pub from: NodeId,
    pub to: NodeId,
    pub name: Option<String>,
    pub width: u32,
    pub color: String,
    /// Weight in meters captured when the connection was made. `None` for
    /// legacy rows, which route with a weight of one meter.
    pub distance: Option<f64>,
    pub campus: String,
}

/// Input for [`CampusStore::add_hop`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewHop {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub description: Option<String>,
    pub coordinate: Coordinate,
    pub icon: Option<String>,
    pub image_path: Option<String>,
}

impl NewHop {
    pub fn waypoint(coordinate: Coordinate) -> Self {
        Self {
            kind: NodeKind::Waypoint,
            name: None,
            description: None,
            coordinate,
            icon: None,
            image_path: None,
        }
    }

    pub fn marker(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            kind: NodeKind::Marker,
            name: Some(name.into()),
            ..Self::waypoint(coordinate)
        }
    }
}

/// Input for [`CampusStore::connect_hops`]. Unset fields take the defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewConnection {
    pub from: NodeId,
    pub to: NodeId,
    pub name: Option<String>,
    pub width: Option<u32>,
    pub color: Option<String>,
}

impl NewConnection {
    pub fn between(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            ..Self::default()
        }
    }
}

/// Everything a map client needs to draw one campus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapData {
    pub campus: Campus,
    pub nodes: Vec<Node>,
    pub connections: Vec<RoadConnection>,
}

impl ToSql for NodeKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for NodeKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: Error| FromSqlError::Other(Box::new(err)))
    }
}

/// Campus data store on top of a single SQLite database.
#[derive(Debug)]
pub struct CampusStore {
    connection: Connection,
    path: Option<PathBuf>,
}

impl CampusStore {
    /// Open an existing database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }
        let connection = Connection::open(path)?;
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        debug!(path = %path.display(), "opened campus store");
        Ok(Self {
            connection,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open `path`, creating the file and its parent directories if needed,
    /// and make sure the schema exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let connection = Connection::open(path)?;
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self {
            connection,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store with the schema and default campuses in place.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self {
            connection,
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Backing file, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the tables if missing and seed the default campuses.
    ///
    /// Safe to run repeatedly; existing rows are left alone.
    pub fn init_schema(&self) -> Result<()> {
        self.connection.execute_batch(SCHEMA)?;
        let now = timestamp();
        let mut seeded = 0usize;
        for (code, name) in DEFAULT_CAMPUSES {
            seeded += self.connection.execute(
                "INSERT OR IGNORE INTO campuses (code, name, active, created_at) VALUES (?1, ?2, 1, ?3)",
                params![code, name, now],
            )?;
        }
        if seeded > 0 {
            info!(seeded, "seeded default campuses");
        }
        Ok(())
    }

    pub fn create_campus(
        &self,
        code: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Campus> {
        let code = code.trim();
        if code.is_empty()
            || !code
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(Error::InvalidCampusCode {
                code: code.to_string(),
            });
        }
        if self.find_campus(code)?.is_some() {
            return Err(Error::DuplicateCampus {
                code: code.to_string(),
            });
        }

        self.connection.execute(
            "INSERT INTO campuses (code, name, description, active, created_at) VALUES (?1, ?2, ?3, 1, ?4)",
            params![code, name.trim(), description, timestamp()],
        )?;
        info!(campus = code, "created campus");
        self.campus(code)
    }

    /// Look up a campus, suggesting close matches when the code is unknown.
    pub fn campus(&self, code: &str) -> Result<Campus> {
        match self.find_campus(code)? {
            Some(campus) => Ok(campus),
            None => Err(Error::UnknownCampus {
                code: code.to_string(),
                suggestions: self.campus_suggestions(code)?,
            }),
        }
    }

    pub fn list_campuses(&self, active_only: bool) -> Result<Vec<Campus>> {
        let sql = if active_only {
            "SELECT code, name, description, active, created_at FROM campuses WHERE active = 1 ORDER BY code"
        } else {
            "SELECT code, name, description, active, created_at FROM campuses ORDER BY code"
        };
        let mut stmt = self.connection.prepare(sql)?;
        let rows = stmt.query_map([], row_to_campus)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::from)
    }

    pub fn set_campus_active(&self, code: &str, active: bool) -> Result<Campus> {
        let updated = self.connection.execute(
            "UPDATE campuses SET active = ?1 WHERE code = ?2",
            params![active, code],
        )?;
        if updated == 0 {
            return self.campus(code);
        }
        info!(campus = code, active, "updated campus status");
        self.campus(code)
    }

    /// Insert a hop into `campus`.
    ///
    /// Markers must be named. Unnamed waypoints are called `Hop N`, where N is
    /// one more than the number of waypoints already in the campus.
    pub fn add_hop(&self, campus: &str, hop: NewHop) -> Result<Node> {
        self.campus(campus)?;
        hop.coordinate.validate()?;

        let name = hop
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let name = match (hop.kind, name) {
            (_, Some(name)) => name,
            (NodeKind::Marker, None) => {
                return Err(Error::InvalidNode {
                    message: "a marker needs a name".to_string(),
                })
            }
            (NodeKind::Waypoint, None) => {
                let existing: i64 = self.connection.query_row(
                    "SELECT COUNT(*) FROM hops WHERE campus_code = ?1 AND kind = 'waypoint'",
                    [campus],
                    |row| row.get(0),
                )?;
                format!("Hop {}", existing + 1)
            }
        };

        self.connection.execute(
            "INSERT INTO hops (kind, name, description, latitude, longitude, icon, image_path, campus_code, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                hop.kind,
                name,
                hop.description,
                hop.coordinate.latitude,
                hop.coordinate.longitude,
                hop.icon.as_deref().unwrap_or(DEFAULT_ICON),
                hop.image_path,
                campus,
                timestamp(),
            ],
        )?;
        let id = self.connection.last_insert_rowid();
        debug!(campus, id, kind = %hop.kind, "added hop");
        self.hop(campus, id)
    }

    /// Fetch a single hop of `campus`.
    pub fn hop(&self, campus: &str, id: NodeId) -> Result<Node> {
        let sql = format!("SELECT {HOP_COLUMNS} FROM hops WHERE id = ?1 AND campus_code = ?2");
        self.connection
            .query_row(&sql, params![id, campus], row_to_node)
            .optional()?
            .ok_or_else(|| Error::NodeNotFound {
                campus: campus.to_string(),
                node: id,
            })
    }

    /// Connect two hops of `campus`.
    ///
    /// The weight is the geodesic distance between the hops at this moment,
    /// floored at [`MIN_CONNECTION_DISTANCE_M`]. Moving a hop later does not
    /// change it; see [`CampusStore::recompute_weights`].
    pub fn connect_hops(&self, campus: &str, connection: NewConnection) -> Result<RoadConnection> {
        self.campus(campus)?;
        if connection.from == connection.to {
            return Err(Error::SelfConnection {
                node: connection.from,
            });
        }
        let from = self.hop(campus, connection.from)?;
        let to = self.hop(campus, connection.to)?;

        let width = connection.width.unwrap_or(DEFAULT_CONNECTION_WIDTH);
        if !CONNECTION_WIDTH_RANGE.contains(&width) {
            return Err(Error::InvalidConnection {
                message: format!(
                    "width {width} outside {}..={}",
                    CONNECTION_WIDTH_RANGE.start(),
                    CONNECTION_WIDTH_RANGE.end()
                ),
            });
        }
        let color = connection
            .color
            .unwrap_or_else(|| DEFAULT_CONNECTION_COLOR.to_string());
        if !is_hex_color(&color) {
            return Err(Error::InvalidConnection {
                message: format!("color '{color}' is not of the form #RRGGBB"),
            });
        }

        let exists = self
            .connection
            .query_row(
                "SELECT 1 FROM connections
                 WHERE (hop_from_id = ?1 AND hop_to_id = ?2) OR (hop_from_id = ?2 AND hop_to_id = ?1)",
                params![from.id, to.id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(Error::DuplicateConnection {
                from: from.id,
                to: to.id,
            });
        }

        let name = connection
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("{} - {}", display_name(&from), display_name(&to)));
        let distance = connection_weight(&from, &to);

        self.connection.execute(
            "INSERT INTO connections (hop_from_id, hop_to_id, name, width, color, distance, campus_code, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![from.id, to.id, name, width, color, distance, campus, timestamp()],
        )?;
        let id = self.connection.last_insert_rowid();
        debug!(campus, id, from = from.id, to = to.id, distance, "connected hops");
        self.road_connection(campus, id)
    }

    fn road_connection(&self, campus: &str, id: ConnectionId) -> Result<RoadConnection> {
        let sql = format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = ?1 AND campus_code = ?2"
        );
        self.connection
            .query_row(&sql, params![id, campus], row_to_connection)
            .optional()?
            .ok_or_else(|| Error::ConnectionNotFound {
                campus: campus.to_string(),
                id,
            })
    }

    /// Move a hop. Stored connection weights are left as they were.
    pub fn move_hop(&self, campus: &str, id: NodeId, coordinate: Coordinate) -> Result<Node> {
        coordinate.validate()?;
        self.hop(campus, id)?;
        self.connection.execute(
            "UPDATE hops SET latitude = ?1, longitude = ?2 WHERE id = ?3 AND campus_code = ?4",
            params![coordinate.latitude, coordinate.longitude, id, campus],
        )?;
        debug!(campus, id, "moved hop");
        self.hop(campus, id)
    }

    /// Rewrite every connection weight in `campus` from the current hop
    /// positions. Returns the number of connections whose weight changed.
    pub fn recompute_weights(&mut self, campus: &str) -> Result<usize> {
        self.campus(campus)?;
        let nodes = self.list_nodes(campus)?;
        let connections = self.list_edges(campus)?;

        let tx = self.connection.transaction()?;
        let mut updated = 0usize;
        {
            let mut stmt = tx.prepare("UPDATE connections SET distance = ?1 WHERE id = ?2")?;
            for connection in &connections {
                let endpoints = (
                    nodes.iter().find(|n| n.id == connection.from),
                    nodes.iter().find(|n| n.id == connection.to),
                );
                let (Some(from), Some(to)) = endpoints else {
                    continue;
                };
                let distance = connection_weight(from, to);
                if connection.distance != Some(distance) {
                    updated += stmt.execute(params![distance, connection.id])?;
                }
            }
        }
        tx.commit()?;

        info!(campus, updated, total = connections.len(), "recomputed connection weights");
        Ok(updated)
    }

    /// Delete a hop together with every connection touching it.
    ///
    /// Returns the number of connections removed.
    pub fn delete_hop(&mut self, campus: &str, id: NodeId) -> Result<usize> {
        self.hop(campus, id)?;

        let tx = self.connection.transaction()?;
        let removed = tx.execute(
            "DELETE FROM connections WHERE hop_from_id = ?1 OR hop_to_id = ?1",
            [id],
        )?;
        tx.execute(
            "DELETE FROM hops WHERE id = ?1 AND campus_code = ?2",
            params![id, campus],
        )?;
        tx.commit()?;

        info!(campus, id, connections = removed, "deleted hop");
        Ok(removed)
    }

    pub fn delete_connection(&self, campus: &str, id: ConnectionId) -> Result<()> {
        let removed = self.connection.execute(
            "DELETE FROM connections WHERE id = ?1 AND campus_code = ?2",
            params![id, campus],
        )?;
        if removed == 0 {
            return Err(Error::ConnectionNotFound {
                campus: campus.to_string(),
                id,
            });
        }
        debug!(campus, id, "deleted connection");
        Ok(())
    }

    pub fn map_data(&self, campus: &str) -> Result<MapData> {
        let campus = self.campus(campus)?;
        let nodes = self.list_nodes(&campus.code)?;
        let connections = self.list_edges(&campus.code)?;
        Ok(MapData {
            campus,
            nodes,
            connections,
        })
    }

    fn find_campus(&self, code: &str) -> Result<Option<Campus>> {
        self.connection
            .query_row(
                "SELECT code, name, description, active, created_at FROM campuses WHERE code = ?1",
                [code],
                row_to_campus,
            )
            .optional()
            .map_err(Error::from)
    }

    fn campus_suggestions(&self, code: &str) -> Result<Vec<String>> {
        let mut stmt = self.connection.prepare("SELECT code FROM campuses")?;
        let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(fuzzy_matches(code, codes, SUGGESTION_LIMIT))
    }
}

impl GraphSource for CampusStore {
    fn list_nodes(&self, campus: &str) -> Result<Vec<Node>> {
        let sql = format!("SELECT {HOP_COLUMNS} FROM hops WHERE campus_code = ?1 ORDER BY id");
        let mut stmt = self.connection.prepare(&sql)?;
        let rows = stmt.query_map([campus], row_to_node)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::from)
    }

    fn list_edges(&self, campus: &str) -> Result<Vec<RoadConnection>> {
        let sql = format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections WHERE campus_code = ?1 ORDER BY id"
        );
        let mut stmt = self.connection.prepare(&sql)?;
        let rows = stmt.query_map([campus], row_to_connection)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::from)
    }
}

/// Rank `candidates` by Jaro-Winkler similarity to `query`, keeping the
/// closest `limit` above the similarity threshold.
pub fn fuzzy_matches<I>(query: &str, candidates: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let query = query.to_ascii_lowercase();
    let mut scored: Vec<(f64, String)> = candidates
        .into_iter()
        .map(|candidate| {
            let score = strsim::jaro_winkler(&query, &candidate.to_ascii_lowercase());
            (score, candidate)
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate)
        .collect()
}

fn connection_weight(from: &Node, to: &Node) -> f64 {
    from.coordinate
        .distance_to(&to.coordinate)
        .max(MIN_CONNECTION_DISTANCE_M)
}

fn display_name(node: &Node) -> String {
    node.name
        .clone()
        .unwrap_or_else(|| format!("Hop {}", node.id))
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

fn row_to_campus(row: &Row<'_>) -> rusqlite::Result<Campus> {
    Ok(Campus {
        code: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        active: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_node(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: row.get(0)?,
        kind: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        coordinate: Coordinate {
            latitude: row.get(4)?,
            longitude: row.get(5)?,
        },
        image_path: row.get(6)?,
        campus: row.get(7)?,
    })
}

fn row_to_connection(row: &Row<'_>) -> rusqlite::Result<RoadConnection> {
    Ok(RoadConnection {
        id: row.get(0)?,
        from: row.get(1)?,
        to: row.get(2)?,
        name: row.get(3)?,
        width: row.get(4)?,
        color: row.get(5)?,
        distance: row.get(6)?,
        campus: row.get(7)?,
    })
}
