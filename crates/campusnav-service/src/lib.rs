//! HTTP surface for campus maps and walking routes.
//!
//! This crate provides:
//! - RFC 9457 Problem Details error responses
//! - Request validation and response bodies
//! - Per-request store access on the blocking pool with a timeout
//! - Health check handlers (`/health/live`, `/health/ready`)
//! - Structured JSON logging with request ids
//! - Prometheus metrics (`/metrics`)
//!
//! # Endpoints
//!
//! - `GET /api/v1/campuses`
//! - `GET /api/v1/campuses/{code}/map`
//! - `POST /api/v1/campuses/{code}/route`

#![deny(warnings)]

pub mod handlers;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod problem;
pub mod request;
pub mod response;
pub mod state;

pub use handlers::router;
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_route_calculated, record_route_failed,
    record_route_waypoints, record_snapshot_load, MetricsConfig, MetricsError,
};
pub use middleware::{
    extract_or_generate_request_id, RequestId, RequestTrackingLayer, REQUEST_ID_HEADER,
};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_NODE_NOT_FOUND, PROBLEM_ROUTE_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE,
    PROBLEM_UNKNOWN_CAMPUS,
};
pub use request::{RouteBody, Validate};
pub use response::{ApiResponse, CampusesResponse, PathNode, RouteResponse, ServiceResponse};
pub use state::{AppState, AppStateError, ServiceConfig};
