//! OpenStreetMap Nominatim geocoder
//!
//! Nominatim's usage policy asks for an identifying `User-Agent` and at most
//! one request per second; both come from the geocoding config.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{GeocodeError, Geocoder};
use crate::http::Throttle;
use crate::models::Location;

pub struct NominatimGeocoder {
    client: ClientWithMiddleware,
    base_url: String,
    throttle: Throttle,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    name: Option<String>,
    display_name: String,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    country: Option<String>,
}

impl NominatimGeocoder {
    #[must_use]
    pub fn new(base_url: impl Into<String>, client: ClientWithMiddleware, throttle: Throttle) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            throttle,
        }
    }
}

impl TryFrom<NominatimPlace> for Location {
    type Error = GeocodeError;

    fn try_from(place: NominatimPlace) -> Result<Self, Self::Error> {
        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad latitude '{}'", place.lat)))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad longitude '{}'", place.lon)))?;

        let name = place
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or(place.display_name);
        Ok(Location {
            latitude,
            longitude,
            name,
            country: place.address.and_then(|a| a.country),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self), fields(geocoder = "nominatim"))]
    async fn lookup(&self, query: &str) -> Result<Option<Location>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=jsonv2&limit=1&addressdetails=1",
            self.base_url,
            urlencoding::encode(query)
        );

        self.throttle.wait().await;
        let start_time = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Nominatim rate limit hit (HTTP 429)");
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
        debug!(
            "Nominatim answered '{}' with {} result(s) in {:.3}s",
            query,
            places.len(),
            start_time.elapsed().as_secs_f64()
        );

        places.into_iter().next().map(Location::try_from).transpose()
    }

    fn name(&self) -> &str {
        "nominatim"
    }
}
