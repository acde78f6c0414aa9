//! API handlers and the router that wires them up.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use campusnav_lib::{plan_route, Error as LibError, MapData, RouteStart};

use crate::{
    from_lib_error, health_live, health_ready, metrics_handler, record_route_calculated,
    record_route_failed, record_route_waypoints, ApiResponse, AppState, CampusesResponse,
    ProblemDetails, RequestId, RequestTrackingLayer, RouteBody, RouteResponse, ServiceResponse,
    Validate,
};

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/campuses", get(list_campuses))
        .route("/api/v1/campuses/{code}/map", get(campus_map))
        .route("/api/v1/campuses/{code}/route", post(find_route))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestTrackingLayer)
        .with_state(state)
}

fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::NodeNotFound { .. } => "node_not_found",
        LibError::NoRoute { .. } => "no_path",
        LibError::UnknownCampus { .. } => "unknown_campus",
        LibError::EmptyGraph { .. } => "empty_campus",
        LibError::InvalidCoordinate { .. } => "validation_error",
        LibError::GraphLoad { .. } | LibError::DatabaseNotFound { .. } => "unavailable",
        _ => "internal_error",
    }
}

/// `GET /api/v1/campuses`: active campuses only.
pub async fn list_campuses(
    State(state): State<AppState>,
    request_id: RequestId,
) -> ApiResponse<CampusesResponse> {
    match state
        .with_store("*", |store| store.list_campuses(true))
        .await
    {
        Ok(campuses) => ApiResponse::Success(ServiceResponse::new(CampusesResponse {
            count: campuses.len(),
            campuses,
        })),
        Err(err) => {
            error!(request_id = %request_id, error = %err, "listing campuses failed");
            ApiResponse::Error(from_lib_error(&err, request_id.as_str()))
        }
    }
}

/// `GET /api/v1/campuses/{code}/map`: every node and connection of a campus.
pub async fn campus_map(
    State(state): State<AppState>,
    Path(code): Path<String>,
    request_id: RequestId,
) -> ApiResponse<MapData> {
    let campus = code.clone();
    match state
        .with_store(&code, move |store| store.map_data(&campus))
        .await
    {
        Ok(map) => {
            info!(
                request_id = %request_id,
                campus = %code,
                nodes = map.nodes.len(),
                connections = map.connections.len(),
                "map served"
            );
            ApiResponse::Success(ServiceResponse::new(map))
        }
        Err(err) => {
            warn!(request_id = %request_id, campus = %code, error = %err, "map request failed");
            ApiResponse::Error(from_lib_error(&err, request_id.as_str()))
        }
    }
}

/// `POST /api/v1/campuses/{code}/route`.
pub async fn find_route(
    State(state): State<AppState>,
    Path(code): Path<String>,
    request_id: RequestId,
    body: Result<Json<RouteBody>, JsonRejection>,
) -> ApiResponse<RouteResponse> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            record_route_failed("validation_error");
            return ApiResponse::Error(ProblemDetails::bad_request(
                rejection.body_text(),
                request_id.as_str(),
            ));
        }
    };

    if let Err(problem) = body.validate(request_id.as_str()) {
        record_route_failed("validation_error");
        warn!(request_id = %request_id, campus = %code, "invalid route request");
        return ApiResponse::Error(*problem);
    }

    let request = match body.to_route_request(&code, request_id.as_str()) {
        Ok(request) => request,
        Err(problem) => {
            record_route_failed("validation_error");
            return ApiResponse::Error(*problem);
        }
    };

    info!(
        request_id = %request_id,
        campus = %code,
        start = ?request.start,
        goal = request.goal,
        "handling route request"
    );

    let route = match state.load_snapshot(&code).await {
        Ok(graph) => plan_route(&graph, &request),
        Err(err) => Err(err),
    };

    match route {
        Ok(route) => {
            let start_mode = match request.start {
                RouteStart::Node(_) => "node",
                RouteStart::Coordinate(_) => "position",
            };
            record_route_calculated(start_mode);
            record_route_waypoints(route.waypoint_count);

            info!(
                request_id = %request_id,
                campus = %code,
                waypoints = route.waypoint_count,
                total_distance_m = route.total_distance_m,
                "route computed"
            );
            ApiResponse::Success(ServiceResponse::new(RouteResponse::from(route)))
        }
        Err(err) => {
            record_route_failed(failure_reason(&err));
            if err.is_retryable() {
                error!(request_id = %request_id, campus = %code, error = %err, "route planning failed");
            } else {
                info!(request_id = %request_id, campus = %code, error = %err, "route not available");
            }
            ApiResponse::Error(from_lib_error(&err, request_id.as_str()))
        }
    }
}
