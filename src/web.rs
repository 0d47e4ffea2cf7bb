use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::geocoding::Geocoder;
use crate::llm::ItineraryGenerator;
use crate::planner::TripPlanner;

/// Generation plus sequential geocoding can take minutes for long trips
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub fn app<L, G>(planner: Arc<TripPlanner<L, G>>) -> Router
where
    L: ItineraryGenerator + 'static,
    G: Geocoder + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(planner))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run<L, G>(planner: Arc<TripPlanner<L, G>>, port: u16) -> anyhow::Result<()>
where
    L: ItineraryGenerator + 'static,
    G: Geocoder + 'static,
{
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app(planner))
        .await
        .context("Web server stopped")?;
    Ok(())
}
