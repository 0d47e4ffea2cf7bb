//! Itinerary generation
//!
//! The itinerary comes from a hosted chat-completion model ([`ChatCompletionClient`])
//! or, for offline and replay runs, from a previously exported JSON file
//! ([`FileItinerary`]).

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::TripPlannerError;
use crate::models::{Itinerary, TripRequest};

pub mod chat;
pub mod prompt;

pub use chat::ChatCompletionClient;
pub use prompt::build_prompt;

/// Produces an itinerary for a trip request
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    async fn generate(&self, request: &TripRequest) -> crate::Result<Itinerary>;
}

#[async_trait]
impl<T: ItineraryGenerator + ?Sized> ItineraryGenerator for Box<T> {
    async fn generate(&self, request: &TripRequest) -> crate::Result<Itinerary> {
        (**self).generate(request).await
    }
}

/// Itinerary read from a JSON file instead of a model
pub struct FileItinerary {
    path: PathBuf,
}

impl FileItinerary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ItineraryGenerator for FileItinerary {
    async fn generate(&self, request: &TripRequest) -> crate::Result<Itinerary> {
        info!(
            "Loading itinerary for {} from {}",
            request.destination,
            self.path.display()
        );
        let raw = tokio::fs::read_to_string(&self.path).await?;
        parse_itinerary(&raw)
    }
}

/// Parse model output into an itinerary.
///
/// Tolerates markdown code fences and chatter around the JSON object.
pub fn parse_itinerary(text: &str) -> crate::Result<Itinerary> {
    let json = extract_json_object(text)
        .ok_or_else(|| TripPlannerError::api("Invalid itinerary: no JSON object in model output"))?;
    debug!("Parsing itinerary JSON ({} bytes)", json.len());
    serde_json::from_str(json)
        .map_err(|e| TripPlannerError::api(format!("Invalid itinerary: {e}")))
}

/// Slice from the first `{` to the last `}`
fn extract_json_object(text: &str) -> Option<&str> {
    let first_brace = text.find('{')?;
    let last_brace = text.rfind('}')?;
    (last_brace > first_brace).then(|| &text[first_brace..=last_brace])
}
