//! Open-Meteo geocoding API (no API key required)

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{GeocodeError, Geocoder};
use crate::http::Throttle;
use crate::models::Location;

pub struct OpenMeteoGeocoder {
    client: ClientWithMiddleware,
    base_url: String,
    throttle: Throttle,
}

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        let name = match result.admin1 {
            Some(admin) if admin != result.name => format!("{}, {}", result.name, admin),
            _ => result.name,
        };
        Location {
            latitude: result.latitude,
            longitude: result.longitude,
            name,
            country: result.country,
        }
    }
}

impl OpenMeteoGeocoder {
    #[must_use]
    pub fn new(base_url: impl Into<String>, client: ClientWithMiddleware, throttle: Throttle) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            throttle,
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    #[instrument(skip(self), fields(geocoder = "open-meteo"))]
    async fn lookup(&self, query: &str) -> Result<Option<Location>, GeocodeError> {
        // the API matches on a bare name; "Zurich, Switzerland" finds nothing
        let name = query.split(',').next().unwrap_or(query).trim();
        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.base_url,
            urlencoding::encode(name)
        );

        self.throttle.wait().await;
        let start_time = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
        debug!(
            "Open-Meteo geocoding for '{}' took {:.3}s",
            name,
            start_time.elapsed().as_secs_f64()
        );

        Ok(body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(Location::from))
    }

    fn name(&self) -> &str {
        "open-meteo"
    }
}
