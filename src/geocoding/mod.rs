//! Geocoding: resolving place names to coordinates
//!
//! Every lookup ends in an explicit [`GeocodeOutcome`], so callers can tell
//! "place not found" apart from "the service could not be reached". A failed
//! lookup never aborts a batch; the place is reported as unresolved and left
//! out of the point table.

use std::fmt::Display;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::cache::PersistentCache;
use crate::config::{GeocodingProvider, TripPlannerConfig};
use crate::http::{Throttle, build_client};
use crate::models::{Location, Waypoint};

pub mod cached;
pub mod nominatim;
pub mod open_meteo;

pub use cached::CachedGeocoder;
pub use nominatim::NominatimGeocoder;
pub use open_meteo::OpenMeteoGeocoder;

/// Errors raised by a single geocoding lookup
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest_middleware::Error),

    #[error("Rate limited by the geocoding service")]
    RateLimited,

    #[error("Geocoding service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}

/// A service that turns one place name into coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `query`, or `None` when the service knows no such place
    async fn lookup(&self, query: &str) -> Result<Option<Location>, GeocodeError>;

    /// Provider name for logging and cache keys
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Box<T> {
    async fn lookup(&self, query: &str) -> Result<Option<Location>, GeocodeError> {
        (**self).lookup(query).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Why a place has no coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnresolvedReason {
    EmptyQuery,
    NotFound,
    RateLimited,
    Network(String),
    InvalidResponse(String),
}

impl Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedReason::EmptyQuery => write!(f, "empty place name"),
            UnresolvedReason::NotFound => write!(f, "place not found"),
            UnresolvedReason::RateLimited => write!(f, "rate limited"),
            UnresolvedReason::Network(msg) => write!(f, "network error: {msg}"),
            UnresolvedReason::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl From<GeocodeError> for UnresolvedReason {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::Http(e) => UnresolvedReason::Network(e.to_string()),
            GeocodeError::RateLimited => UnresolvedReason::RateLimited,
            GeocodeError::Status { status } => UnresolvedReason::Network(format!("HTTP {status}")),
            GeocodeError::InvalidResponse(msg) => UnresolvedReason::InvalidResponse(msg),
        }
    }
}

/// Result of geocoding one waypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeocodeOutcome {
    Resolved {
        waypoint: Waypoint,
        location: Location,
    },
    Unresolved {
        waypoint: Waypoint,
        reason: UnresolvedReason,
    },
}

impl GeocodeOutcome {
    #[must_use]
    pub fn waypoint(&self) -> &Waypoint {
        match self {
            GeocodeOutcome::Resolved { waypoint, .. } | GeocodeOutcome::Unresolved { waypoint, .. } => {
                waypoint
            }
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, GeocodeOutcome::Resolved { .. })
    }
}

/// Geocode waypoints one at a time, in order.
///
/// Spacing between outbound requests is the geocoder's job (see [`Throttle`]),
/// so cached lookups are not slowed down.
#[instrument(skip_all, fields(geocoder = geocoder.name(), count = waypoints.len()))]
pub async fn resolve_all<G: Geocoder + ?Sized>(
    geocoder: &G,
    waypoints: Vec<Waypoint>,
) -> Vec<GeocodeOutcome> {
    let mut outcomes = Vec::with_capacity(waypoints.len());

    for waypoint in waypoints {
        let query = waypoint.name.trim().to_string();
        if query.is_empty() {
            warn!("Skipping waypoint with empty name");
            outcomes.push(GeocodeOutcome::Unresolved {
                waypoint,
                reason: UnresolvedReason::EmptyQuery,
            });
            continue;
        }

        let outcome = match geocoder.lookup(&query).await {
            Ok(Some(location)) if location.is_valid() => {
                debug!("Resolved '{}' to {}", query, location.format_coordinates());
                GeocodeOutcome::Resolved { waypoint, location }
            }
            Ok(Some(location)) => {
                warn!(
                    "Discarding out-of-range coordinates for '{}': {}",
                    query,
                    location.format_coordinates()
                );
                GeocodeOutcome::Unresolved {
                    waypoint,
                    reason: UnresolvedReason::InvalidResponse(format!(
                        "coordinates out of range: {}",
                        location.format_coordinates()
                    )),
                }
            }
            Ok(None) => {
                warn!("No geocoding match for '{}'", query);
                GeocodeOutcome::Unresolved {
                    waypoint,
                    reason: UnresolvedReason::NotFound,
                }
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", query, e);
                GeocodeOutcome::Unresolved {
                    waypoint,
                    reason: e.into(),
                }
            }
        };
        outcomes.push(outcome);
    }

    let resolved = outcomes.iter().filter(|o| o.is_resolved()).count();
    info!("Geocoded {}/{} places", resolved, outcomes.len());
    outcomes
}

/// Build the configured geocoder, behind the persistent cache when enabled
pub fn build_geocoder(config: &TripPlannerConfig) -> Result<Box<dyn Geocoder>> {
    let settings = &config.geocoding;
    let client = build_client(
        &settings.user_agent,
        Duration::from_secs(settings.timeout_seconds.into()),
        settings.max_retries,
    )?;
    let throttle = Throttle::new(Duration::from_millis(settings.request_interval_ms));

    let geocoder: Box<dyn Geocoder> = match settings.provider {
        GeocodingProvider::Nominatim => Box::new(NominatimGeocoder::new(
            settings.endpoint(),
            client,
            throttle,
        )),
        GeocodingProvider::OpenMeteo => Box::new(OpenMeteoGeocoder::new(
            settings.endpoint(),
            client,
            throttle,
        )),
    };

    if !config.cache.enabled {
        return Ok(geocoder);
    }

    let location = config.cache.resolved_location();
    match PersistentCache::open(&location) {
        Ok(cache) => {
            let ttl = Duration::from_secs(u64::from(config.cache.ttl_hours) * 3600);
            Ok(Box::new(CachedGeocoder::new(geocoder, cache, ttl)))
        }
        Err(e) => {
            warn!(
                "Failed to open geocoding cache at {}: {e:#}; continuing without cache",
                location.display()
            );
            Ok(geocoder)
        }
    }
}
