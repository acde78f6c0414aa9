//! Request bodies and their validation.

use serde::{Deserialize, Serialize};

use campusnav_lib::{Coordinate, NodeId, RouteRequest, RouteStart};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
pub trait Validate {
    /// `request_id` fills the `instance` field of the returned problem.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/v1/campuses/{code}/route`.
///
/// The start is either a node id or the walker's current position, never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_id: Option<NodeId>,

    pub end_id: NodeId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_lat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_lng: Option<f64>,
}

impl RouteBody {
    /// Resolve the start form, or describe why the body is inconsistent.
    fn start(&self) -> Result<RouteStart, String> {
        match (self.start_id, self.current_lat, self.current_lng) {
            (Some(id), None, None) => Ok(RouteStart::Node(id)),
            (None, Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude)
                .map(RouteStart::Coordinate)
                .map_err(|_| {
                    "The 'current_lat' field must be within [-90, 90] and 'current_lng' within [-180, 180]"
                        .to_string()
                }),
            (Some(_), _, _) => Err(
                "Provide either 'start_id' or 'current_lat'/'current_lng', not both".to_string(),
            ),
            (None, None, None) => Err(
                "Either 'start_id' or both 'current_lat' and 'current_lng' are required"
                    .to_string(),
            ),
            (None, _, _) => Err(
                "The 'current_lat' and 'current_lng' fields must be supplied together".to_string(),
            ),
        }
    }

    /// Convert into a library request for `campus`, rejecting bodies that
    /// fail [`Validate::validate`].
    pub fn to_route_request(
        &self,
        campus: &str,
        request_id: &str,
    ) -> Result<RouteRequest, Box<ProblemDetails>> {
        let start = self
            .start()
            .map_err(|detail| Box::new(ProblemDetails::bad_request(detail, request_id)))?;

        Ok(RouteRequest {
            campus: campus.to_string(),
            start,
            goal: self.end_id,
        })
    }
}

impl Validate for RouteBody {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        self.start()
            .map(|_| ())
            .map_err(|detail| Box::new(ProblemDetails::bad_request(detail, request_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(start_id: Option<NodeId>, lat: Option<f64>, lng: Option<f64>) -> RouteBody {
        RouteBody {
            start_id,
            end_id: 3,
            current_lat: lat,
            current_lng: lng,
        }
    }

    #[test]
    fn test_start_node_body_is_valid() {
        let request = body(Some(1), None, None)
            .to_route_request("main-campus", "req")
            .unwrap();
        assert_eq!(request.start, RouteStart::Node(1));
        assert_eq!(request.goal, 3);
        assert_eq!(request.campus, "main-campus");
    }

    #[test]
    fn test_position_body_is_valid() {
        let request = body(None, Some(51.5), Some(-0.09))
            .to_route_request("main-campus", "req")
            .unwrap();
        assert!(matches!(request.start, RouteStart::Coordinate(c) if c.latitude == 51.5));
    }

    #[test]
    fn test_missing_start_is_rejected() {
        let err = body(None, None, None).validate("req-1").unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.detail.as_deref().unwrap().contains("'start_id'"));
        assert_eq!(err.instance.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_both_start_forms_are_rejected() {
        let err = body(Some(1), Some(51.5), Some(-0.09))
            .validate("req")
            .unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("not both"));
    }

    #[test]
    fn test_half_a_position_is_rejected() {
        let err = body(None, Some(51.5), None).validate("req").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("together"));
    }

    #[test]
    fn test_out_of_range_position_is_rejected() {
        let err = body(None, Some(95.0), Some(0.0)).validate("req").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("[-90, 90]"));
    }

    #[test]
    fn test_deserialization_defaults() {
        let body: RouteBody = serde_json::from_str(r#"{"start_id":2,"end_id":5}"#).unwrap();
        assert_eq!(body.start_id, Some(2));
        assert!(body.current_lat.is_none());
        assert!(serde_json::from_str::<RouteBody>(r#"{"start_id":2}"#).is_err());
    }
}
