//! Shared fixtures for the HTTP API tests.

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use campusnav_lib::{CampusStore, Coordinate, NewConnection, NewHop};
use campusnav_service::{router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const MAIN: &str = "main-campus";

/// Temporary campus database holding a Gate - Hop 1 - Library line on
/// main-campus (ids 1, 2, 3) plus a disconnected Gym (id 4).
pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("campusnav.db");
        let store = CampusStore::create(&path).expect("create store");

        let gate = store
            .add_hop(MAIN, NewHop::marker("Gate", coord(51.5050, -0.0900)))
            .expect("add gate");
        let hop = store
            .add_hop(MAIN, NewHop::waypoint(coord(51.5055, -0.0895)))
            .expect("add hop");
        let library = store
            .add_hop(
                MAIN,
                NewHop {
                    description: Some("Quiet floor upstairs".to_string()),
                    ..NewHop::marker("Library", coord(51.5060, -0.0890))
                },
            )
            .expect("add library");
        store
            .add_hop(MAIN, NewHop::marker("Gym", coord(51.5100, -0.0800)))
            .expect("add gym");
        store
            .connect_hops(MAIN, NewConnection::between(gate.id, hop.id))
            .expect("connect gate");
        store
            .connect_hops(MAIN, NewConnection::between(hop.id, library.id))
            .expect("connect library");

        Self { _dir: dir, path }
    }

    pub fn app(&self) -> Router {
        router(AppState::new(&self.path, Duration::from_secs(5)))
    }
}

/// Router pointed at a database path that does not exist.
#[allow(dead_code)]
pub fn app_without_database() -> Router {
    router(AppState::new(
        "/nonexistent/campusnav.db",
        Duration::from_secs(5),
    ))
}

pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).expect("valid coordinate")
}

/// Response status, headers of interest and parsed JSON body.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub request_id: Option<String>,
    pub body: Value,
}

#[allow(dead_code)]
pub async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).expect("request")).await
}

#[allow(dead_code)]
pub async fn post_json(app: Router, uri: &str, body: &str) -> TestResponse {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.expect("infallible router");
    let status = response.status();
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header("content-type").unwrap_or_default();
    let request_id = header("x-request-id");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        content_type,
        request_id,
        body,
    }
}
