//! Successful response bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use campusnav_lib::{Campus, Coordinate, Node, NodeId, NodeKind, RouteResult};

use crate::ProblemDetails;

/// Wrapper for successful responses with content type metadata.
///
/// Mirrors the `content_type` field of [`ProblemDetails`] so clients can
/// branch on one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,

    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Handler result: either a payload or an RFC 9457 problem.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            ApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

/// `GET /api/v1/campuses`.
#[derive(Debug, Clone, Serialize)]
pub struct CampusesResponse {
    pub count: usize,
    pub campuses: Vec<Campus>,
}

/// One waypoint of a returned path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Node> for PathNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            kind: node.kind,
            name: node.name.clone(),
            description: node.description.clone(),
            image_path: node.image_path.clone(),
            latitude: node.coordinate.latitude,
            longitude: node.coordinate.longitude,
        }
    }
}

/// `POST /api/v1/campuses/{code}/route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub campus: String,
    /// First node walked; the nearest node when routing from a position.
    pub start_id: NodeId,
    pub end_id: NodeId,
    pub path: Vec<PathNode>,
    /// Meters, rounded to two decimals.
    pub total_distance: f64,
    /// Minutes, one decimal, at least 1.
    pub estimated_time: f64,
    pub waypoint_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Coordinate>,
    /// Meters from `origin` to the start node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_distance: Option<f64>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<RouteResult> for RouteResponse {
    fn from(route: RouteResult) -> Self {
        Self {
            path: route.waypoints.iter().map(PathNode::from).collect(),
            campus: route.campus,
            start_id: route.start,
            end_id: route.goal,
            total_distance: round2(route.total_distance_m),
            estimated_time: route.estimated_minutes,
            waypoint_count: route.waypoint_count,
            origin: route.origin,
            nearest_distance: route.nearest_distance_m.map(round2),
        }
    }
}
