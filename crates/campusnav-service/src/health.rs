//! Liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,
    pub service: String,
    pub version: String,
    /// RFC 3339 time of the check.
    pub checked_at: String,
    /// Campuses in the database (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campuses: Option<usize>,
}

impl HealthStatus {
    fn base(status: String, campuses: Option<usize>) -> Self {
        Self {
            status,
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checked_at: chrono::Utc::now().to_rfc3339(),
            campuses,
        }
    }

    pub fn alive() -> Self {
        Self::base("ok".to_string(), None)
    }

    pub fn ready(campuses: usize) -> Self {
        Self::base("ok".to_string(), Some(campuses))
    }

    pub fn not_ready(reason: &str) -> Self {
        Self::base(format!("not_ready: {}", reason), None)
    }
}

/// `GET /health/live`: the process is up.
pub async fn health_live() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus::alive()))
}

/// `GET /health/ready`: the campus database opens and can be queried.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    match state
        .with_store("*", |store| store.list_campuses(false))
        .await
    {
        Ok(campuses) => (StatusCode::OK, Json(HealthStatus::ready(campuses.len()))).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus::not_ready(&err.to_string())),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive();
        assert_eq!(status.status, "ok");
        assert_eq!(status.service, "campusnav-service");
        assert!(status.campuses.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&status.checked_at).is_ok());
    }

    #[test]
    fn test_health_status_not_ready() {
        let status = HealthStatus::not_ready("database not found");
        assert!(status.status.starts_with("not_ready:"));
        assert!(status.status.contains("database not found"));
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::ready(4)).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"campuses\":4"));
        assert!(!serde_json::to_string(&HealthStatus::alive())
            .unwrap()
            .contains("campuses"));
    }
}
