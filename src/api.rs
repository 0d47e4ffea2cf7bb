//! HTTP API
//!
//! Endpoints (mounted under `/api` by [`crate::web`]):
//! - GET  /health  - liveness and version
//! - POST /plan    - full pipeline for a [`TripRequest`]
//! - POST /cluster - day grouping for caller-supplied coordinates

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::clustering::{GroupingOptions, group_points};
use crate::geocoding::Geocoder;
use crate::llm::ItineraryGenerator;
use crate::models::trip::MAX_DAYS;
use crate::models::{DayPoint, Location, PointRole, TripRequest, Waypoint};
use crate::planner::{TripPlan, TripPlanner};
use crate::{TripPlannerError, VERSION};

/// A place with known coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointInput {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub role: Option<PointRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRequest {
    pub points: Vec<PointInput>,
    pub days: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Group caller-supplied points into days, without geocoding
pub fn cluster_points(
    points: Vec<PointInput>,
    days: u32,
    options: &GroupingOptions,
) -> crate::Result<Vec<DayPoint>> {
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(TripPlannerError::validation(format!(
            "Days must be between 1 and {MAX_DAYS}, got: {days}"
        )));
    }

    let mut resolved = Vec::with_capacity(points.len());
    for point in points {
        let location = Location::new(point.latitude, point.longitude, point.name.clone());
        if !location.is_valid() {
            return Err(TripPlannerError::validation(format!(
                "Invalid coordinates for '{}': {}",
                point.name,
                location.format_coordinates()
            )));
        }
        let role = point.role.unwrap_or(PointRole::Stop);
        resolved.push((Waypoint::new(point.name, role), location));
    }

    group_points(&resolved, days, options)
}

/// Error body: `{"error": "...", "status": "error"}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<TripPlannerError> for ApiError {
    fn from(err: TripPlannerError) -> Self {
        let status = match &err {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            TripPlannerError::Api { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", err);
        } else {
            warn!("Rejected request: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({
                "error": self.message,
                "status": "error",
            })),
        )
            .into_response()
    }
}

pub fn router<L, G>(planner: Arc<TripPlanner<L, G>>) -> Router
where
    L: ItineraryGenerator + 'static,
    G: Geocoder + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/plan", post(plan_handler::<L, G>))
        .route("/cluster", post(cluster_handler::<L, G>))
        .with_state(planner)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": VERSION,
    }))
}

async fn plan_handler<L, G>(
    State(planner): State<Arc<TripPlanner<L, G>>>,
    Json(request): Json<TripRequest>,
) -> Result<Json<TripPlan>, ApiError>
where
    L: ItineraryGenerator + 'static,
    G: Geocoder + 'static,
{
    Ok(Json(planner.plan(request).await?))
}

async fn cluster_handler<L, G>(
    State(planner): State<Arc<TripPlanner<L, G>>>,
    Json(request): Json<ClusterRequest>,
) -> Result<Json<Vec<DayPoint>>, ApiError>
where
    L: ItineraryGenerator + 'static,
    G: Geocoder + 'static,
{
    let mut options = planner.grouping().clone();
    if let Some(seed) = request.seed {
        options.seed = seed;
    }
    Ok(Json(cluster_points(request.points, request.days, &options)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::tests::StubGeocoder;
    use crate::llm::tests::StaticItinerary;
    use crate::models::Itinerary;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let itinerary = Itinerary {
            total_budget: Some(2000.0),
            map_coords: vec!["Lake Zurich".to_string()],
            ..Itinerary::default()
        };
        let geocoder = StubGeocoder::with_places(&[
            ("Mumbai, India", 19.076, 72.8777),
            ("Lake Zurich", 47.366, 8.545),
            ("Zurich, Switzerland", 47.3769, 8.5417),
        ]);
        router(Arc::new(TripPlanner::new(
            StaticItinerary(itinerary),
            geocoder,
            GroupingOptions::default(),
        )))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
    }

    #[tokio::test]
    async fn test_plan() {
        let (status, body) = send(post_json(
            "/plan",
            serde_json::json!({
                "origin": "Mumbai, India",
                "destination": "Zurich, Switzerland",
                "days": 2,
                "travelers": 2,
                "style": "adventure"
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points"].as_array().unwrap().len(), 3);
        assert_eq!(body["analytics"]["per_day_budget"], 1000.0);
        assert_eq!(body["itinerary"]["totalbudget"], 2000.0);
    }

    #[tokio::test]
    async fn test_plan_validation_is_bad_request() {
        let (status, body) = send(post_json(
            "/plan",
            serde_json::json!({
                "origin": "Mumbai",
                "destination": "Zurich",
                "days": 0,
                "travelers": 2
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("Days"));
    }

    #[tokio::test]
    async fn test_cluster() {
        let (status, body) = send(post_json(
            "/cluster",
            serde_json::json!({
                "days": 2,
                "seed": 7,
                "points": [
                    {"name": "Zurich", "latitude": 47.3769, "longitude": 8.5417},
                    {"name": "Uetliberg", "latitude": 47.3497, "longitude": 8.4910},
                    {"name": "Geneva", "latitude": 46.2044, "longitude": 6.1432},
                    {"name": "Carouge", "latitude": 46.184, "longitude": 6.139}
                ]
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r["day"].as_u64().unwrap() < 2));
    }

    #[tokio::test]
    async fn test_cluster_rejects_bad_coordinates() {
        let (status, body) = send(post_json(
            "/cluster",
            serde_json::json!({
                "days": 2,
                "points": [{"name": "Nowhere", "latitude": 120.0, "longitude": 8.0}]
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Nowhere"));
    }

    #[test]
    fn test_upstream_failure_maps_to_bad_gateway() {
        let err = ApiError::from(TripPlannerError::api("model unavailable"));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err = ApiError::from(TripPlannerError::config("API key missing"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = ApiError::from(TripPlannerError::from(io));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(TripPlannerError::validation("Days must be at least 1"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
