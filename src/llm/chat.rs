//! OpenAI-compatible chat-completion client (Groq by default)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use super::{ItineraryGenerator, parse_itinerary, prompt::build_prompt};
use crate::TripPlannerError;
use crate::config::LlmConfig;
use crate::http::build_client;
use crate::models::{Itinerary, TripRequest};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

pub struct ChatCompletionClient {
    client: ClientWithMiddleware,
    base_url: String,
    model: String,
    api_key: String,
}

impl ChatCompletionClient {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from config; fails before any request when no API key is available
    pub fn from_config(config: &LlmConfig) -> crate::Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            TripPlannerError::config(format!(
                "API key missing. Set the {} environment variable or llm.api_key",
                config.api_key_env
            ))
        })?;

        let client = build_client(
            &format!("tripplanner/{}", crate::VERSION),
            Duration::from_secs(config.timeout_seconds.into()),
            config.max_retries,
        )
        .map_err(|e| TripPlannerError::config(format!("{e:#}")))?;

        Ok(Self::new(client, &config.base_url, &config.model, api_key))
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ItineraryGenerator for ChatCompletionClient {
    #[instrument(skip(self, request), fields(model = %self.model, destination = %request.destination))]
    async fn generate(&self, request: &TripRequest) -> crate::Result<Itinerary> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(request),
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let payload = serde_json::to_vec(&body)?;

        info!("Requesting itinerary from {}", self.model);
        let start_time = Instant::now();

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| TripPlannerError::api(format!("Chat completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Chat completion failed with HTTP {}: {}", status, body);
            return Err(TripPlannerError::api(format!(
                "Chat completion failed with status {status}: {body}"
            )));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            TripPlannerError::api(format!("Failed to parse chat completion response: {e}"))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TripPlannerError::api("Chat completion returned no content"))?;

        let elapsed = start_time.elapsed();
        info!("Itinerary generated in {:.3}s", elapsed.as_secs_f64());
        if elapsed.as_secs() > 30 {
            warn!("Slow itinerary generation: {:.3}s", elapsed.as_secs_f64());
        }

        parse_itinerary(&content)
    }
}
