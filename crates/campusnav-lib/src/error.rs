use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the campus navigation library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Database file could not be located at the resolved path.
    #[error("database not found at {path}")]
    DatabaseNotFound { path: PathBuf },

    /// The node/edge data source could not be read while building a snapshot.
    #[error("failed to load graph for campus {campus}: {message}")]
    GraphLoad { campus: String, message: String },

    /// Raised when a campus code is not known to the store.
    #[error("unknown campus: {code}{}", format_suggestions(.suggestions))]
    UnknownCampus {
        code: String,
        suggestions: Vec<String>,
    },

    /// Raised when a campus code is empty or not a lowercase slug.
    #[error("invalid campus code '{code}': use lowercase letters, digits and '-'")]
    InvalidCampusCode { code: String },

    /// Raised when creating a campus whose code is already taken.
    #[error("campus {code} already exists")]
    DuplicateCampus { code: String },

    /// Raised when a node id is not part of the campus graph.
    #[error("node {node} not found in campus {campus}")]
    NodeNotFound { campus: String, node: NodeId },

    /// Raised when both endpoints exist but no connecting path does.
    #[error("no route found between {start} and {goal} in campus {campus}")]
    NoRoute {
        campus: String,
        start: NodeId,
        goal: NodeId,
    },

    /// Raised when a route request is planned on a snapshot of another campus.
    #[error("snapshot of campus {snapshot} cannot plan a route in campus {requested}")]
    SnapshotMismatch { snapshot: String, requested: String },

    /// Raised when a route is assembled from an empty list of nodes.
    #[error("route plan was empty")]
    EmptyRoutePlan,

    /// Raised when a nearest-node lookup runs against a campus without nodes.
    #[error("campus {campus} has no nodes")]
    EmptyGraph { campus: String },

    /// Raised when a latitude/longitude pair is outside the valid range.
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Raised when a hop fails validation before insertion.
    #[error("invalid hop: {message}")]
    InvalidNode { message: String },

    /// Raised when a connection fails validation before insertion.
    #[error("invalid connection: {message}")]
    InvalidConnection { message: String },

    /// Raised when connecting a hop to itself.
    #[error("cannot connect hop {node} to itself")]
    SelfConnection { node: NodeId },

    /// Raised when a connection between the pair already exists in either direction.
    #[error("connection already exists between hops {from} and {to}")]
    DuplicateConnection { from: NodeId, to: NodeId },

    /// Raised when deleting a connection that is not part of the campus.
    #[error("connection {id} not found in campus {campus}")]
    ConnectionNotFound { campus: String, id: i64 },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller may retry the same request later.
    ///
    /// Only data-source failures are transient; every other variant describes
    /// the request itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::GraphLoad { .. })
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
