//! End-to-end pipeline against mocked chat-completion and Nominatim servers

use std::time::Duration;

use serde_json::json;
use tripplanner::clustering::GroupingOptions;
use tripplanner::geocoding::{NominatimGeocoder, UnresolvedReason};
use tripplanner::http::{Throttle, build_client};
use tripplanner::llm::ChatCompletionClient;
use tripplanner::models::{PointRole, TripRequest};
use tripplanner::planner::TripPlanner;
use tripplanner::TripPlannerError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn itinerary_completion() -> serde_json::Value {
    let itinerary = json!({
        "totalbudget": "$6,000",
        "travelmode": "Flight",
        "weather": "Crisp autumn days.",
        "itinerary": {"Day 2": "Lake cruise", "Day 1": "Old Town"},
        "places": [{"name": "Grossmünster", "info": "Romanesque church", "time": "1h"}],
        "mapcoords": ["Grossmünster", "Atlantis"]
    });
    json!({
        "choices": [{"message": {"role": "assistant", "content": itinerary.to_string()}}]
    })
}

async fn mount_place(server: &MockServer, query: &str, lat: &str, lon: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "lat": lat,
            "lon": lon,
            "display_name": query
        }])))
        .with_priority(1)
        .mount(server)
        .await;
}

fn planner(llm: &MockServer, geo: &MockServer) -> TripPlanner<ChatCompletionClient, NominatimGeocoder> {
    let client = build_client("tripplanner-test", Duration::from_secs(5), 0).unwrap();
    let generator = ChatCompletionClient::new(client.clone(), llm.uri(), "test-model", "gsk_test");
    let geocoder = NominatimGeocoder::new(geo.uri(), client, Throttle::disabled());
    TripPlanner::new(generator, geocoder, GroupingOptions::default())
}

#[tokio::test]
async fn test_full_pipeline() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(itinerary_completion()))
        .expect(1)
        .mount(&llm)
        .await;

    let geo = MockServer::start().await;
    mount_place(&geo, "Mumbai, India", "19.0760", "72.8777").await;
    mount_place(&geo, "Grossmünster", "47.3700", "8.5440").await;
    mount_place(&geo, "Zurich, Switzerland", "47.3769", "8.5417").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(10)
        .mount(&geo)
        .await;

    let request = TripRequest {
        days: 3,
        ..TripRequest::default()
    };
    let plan = planner(&llm, &geo).plan(request).await.unwrap();

    assert_eq!(plan.itinerary.days[0].label, "Day 1");
    assert_eq!(plan.analytics.total_budget, Some(6000.0));
    assert_eq!(plan.analytics.per_day_budget, Some(2000.0));
    assert_eq!(plan.analytics.resolved, 3);
    assert_eq!(plan.points.len(), 3);
    assert!(plan.points.iter().all(|p| p.day < 3));
    assert!(plan.points.windows(2).all(|w| w[0].day <= w[1].day));
    assert!(plan.points.iter().any(|p| p.role == PointRole::Origin));

    assert_eq!(plan.unresolved.len(), 1);
    assert_eq!(plan.unresolved[0].name, "Atlantis");
    assert_eq!(plan.unresolved[0].reason, UnresolvedReason::NotFound);

    // Mumbai to Zurich is thousands of kilometres whichever rows end up first and last
    assert!(plan.analytics.distance_km.is_some());
}

#[tokio::test]
async fn test_geocoding_outage_does_not_abort() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(itinerary_completion()))
        .mount(&llm)
        .await;

    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&geo)
        .await;

    let plan = planner(&llm, &geo).plan(TripRequest::default()).await.unwrap();
    assert!(plan.points.is_empty());
    assert_eq!(plan.unresolved.len(), 4);
    assert!(
        plan.unresolved
            .iter()
            .all(|u| matches!(u.reason, UnresolvedReason::Network(_)))
    );
    assert_eq!(plan.analytics.distance_km, None);
}

#[tokio::test]
async fn test_generation_failure_aborts() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&llm)
        .await;
    let geo = MockServer::start().await;

    let err = planner(&llm, &geo)
        .plan(TripRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TripPlannerError::Api { .. }));
    assert!(geo.received_requests().await.unwrap().is_empty());
}
