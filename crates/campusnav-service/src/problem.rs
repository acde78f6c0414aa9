//! RFC 9457 Problem Details for the campus API.
//!
//! Every failed request is answered with an `application/problem+json` body.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use campusnav_lib::{Error as LibError, NodeId};

/// Problem type URI for node ids that are not part of the campus.
pub const PROBLEM_NODE_NOT_FOUND: &str = "/problems/node-not-found";

/// Problem type URI for endpoints with no connecting path.
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";

/// Problem type URI for campus codes the store does not know.
pub const PROBLEM_UNKNOWN_CAMPUS: &str = "/problems/unknown-campus";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for transient failures; clients may retry.
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// ```
/// use campusnav_service::{ProblemDetails, PROBLEM_UNKNOWN_CAMPUS};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_UNKNOWN_CAMPUS,
///     "Unknown Campus",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("Campus 'main-campas' not found. Did you mean: main-campus?")
/// .with_request_id("req-12345");
/// assert_eq!(problem.status, 404);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request id of the failed call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Whether repeating the same request later may succeed.
    #[serde(default)]
    pub retryable: bool,

    /// Always "application/problem+json".
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            retryable: false,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 for malformed or inconsistent input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 for an unknown campus code, listing close matches.
    pub fn unknown_campus(
        code: &str,
        suggestions: &[String],
        request_id: impl Into<String>,
    ) -> Self {
        let detail = if suggestions.is_empty() {
            format!("Campus '{}' not found", code)
        } else {
            format!(
                "Campus '{}' not found. Did you mean: {}?",
                code,
                suggestions.join(", ")
            )
        };

        Self::new(
            PROBLEM_UNKNOWN_CAMPUS,
            "Unknown Campus",
            StatusCode::NOT_FOUND,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 for a node id that is not on the campus map.
    pub fn node_not_found(campus: &str, node: NodeId, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_NODE_NOT_FOUND,
            "Node Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("Node {} does not exist in campus '{}'", node, campus))
        .with_request_id(request_id)
    }

    /// 404 for a route that cannot be walked.
    pub fn route_not_found(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 503 for data-source outages. Marked retryable.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        let mut problem = Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id);
        problem.retryable = true;
        problem
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownCampus { code, suggestions } => {
            ProblemDetails::unknown_campus(code, suggestions, request_id)
        }
        LibError::NodeNotFound { campus, node } => {
            ProblemDetails::node_not_found(campus, *node, request_id)
        }
        LibError::NoRoute {
            campus,
            start,
            goal,
        } => ProblemDetails::route_not_found(
            format!(
                "No walkable route exists from node {} to node {} in campus '{}'",
                start, goal, campus
            ),
            request_id,
        ),
        LibError::EmptyGraph { campus } => ProblemDetails::route_not_found(
            format!("Campus '{}' has no nodes to start from", campus),
            request_id,
        ),
        LibError::InvalidCoordinate { .. } | LibError::InvalidCampusCode { .. } => {
            ProblemDetails::bad_request(error.to_string(), request_id)
        }
        LibError::GraphLoad { .. } => {
            ProblemDetails::service_unavailable(error.to_string(), request_id)
        }
        LibError::DatabaseNotFound { path } => ProblemDetails::service_unavailable(
            format!("Campus database not available at {}", path.display()),
            request_id,
        ),
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(
            PROBLEM_UNKNOWN_CAMPUS,
            "Unknown Campus",
            StatusCode::NOT_FOUND,
        );
        assert_eq!(problem.type_uri, PROBLEM_UNKNOWN_CAMPUS);
        assert_eq!(problem.status, 404);
        assert!(!problem.retryable);
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("end_id is required", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"detail\":\"end_id is required\""));
        assert!(json.contains("\"instance\":\"req-test\""));
        assert!(json.contains("\"retryable\":false"));
    }

    #[test]
    fn test_unknown_campus_without_suggestions() {
        let problem = ProblemDetails::unknown_campus("xyz", &[], "req-1");
        assert_eq!(problem.detail.as_deref(), Some("Campus 'xyz' not found"));
    }

    #[test]
    fn test_from_lib_error_unknown_campus() {
        let error = LibError::UnknownCampus {
            code: "main-campas".to_string(),
            suggestions: vec!["main-campus".to_string()],
        };
        let problem = from_lib_error(&error, "req-lib");

        assert_eq!(problem.type_uri, PROBLEM_UNKNOWN_CAMPUS);
        assert_eq!(problem.status, 404);
        assert!(problem.detail.as_deref().unwrap().contains("main-campus"));
    }

    #[test]
    fn test_from_lib_error_node_and_route() {
        let missing = LibError::NodeNotFound {
            campus: "main-campus".to_string(),
            node: 42,
        };
        let problem = from_lib_error(&missing, "req");
        assert_eq!(problem.type_uri, PROBLEM_NODE_NOT_FOUND);
        assert!(problem.detail.as_deref().unwrap().contains("42"));

        let no_route = LibError::NoRoute {
            campus: "main-campus".to_string(),
            start: 1,
            goal: 4,
        };
        let problem = from_lib_error(&no_route, "req");
        assert_eq!(problem.type_uri, PROBLEM_ROUTE_NOT_FOUND);
        assert_eq!(problem.status, 404);
        assert!(!problem.retryable);
    }

    #[test]
    fn test_from_lib_error_graph_load_is_retryable() {
        let error = LibError::GraphLoad {
            campus: "main-campus".to_string(),
            message: "database is locked".to_string(),
        };
        let problem = from_lib_error(&error, "req");
        assert_eq!(problem.type_uri, PROBLEM_SERVICE_UNAVAILABLE);
        assert_eq!(problem.status, 503);
        assert!(problem.retryable);
    }

    #[test]
    fn test_from_lib_error_invalid_coordinate() {
        let error = LibError::InvalidCoordinate {
            latitude: 91.0,
            longitude: 0.0,
        };
        assert_eq!(from_lib_error(&error, "req").status, 400);
    }

    #[test]
    fn test_from_lib_error_snapshot_mismatch_is_internal() {
        let error = LibError::SnapshotMismatch {
            snapshot: "northern-dorms".to_string(),
            requested: "main-campus".to_string(),
        };
        let problem = from_lib_error(&error, "req");
        assert_eq!(problem.type_uri, PROBLEM_INTERNAL_ERROR);
        assert_eq!(problem.status, 500);
        assert!(!problem.retryable);
    }
}
