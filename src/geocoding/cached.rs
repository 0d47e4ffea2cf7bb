use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{GeocodeError, Geocoder};
use crate::cache::PersistentCache;
use crate::models::Location;

/// Persistent cache in front of another geocoder.
///
/// Only successful matches are stored; misses and errors are retried on the
/// next run. Cache failures fall through to the wrapped geocoder.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: PersistentCache,
    ttl: Duration,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, cache: PersistentCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn cache_key(&self, query: &str) -> String {
        let normalized = query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        format!("geocode:{}:{}", self.inner.name(), normalized)
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn lookup(&self, query: &str) -> Result<Option<Location>, GeocodeError> {
        let key = self.cache_key(query);

        match self.cache.get::<Location>(&key).await {
            Ok(Some(location)) => {
                debug!("Geocoding cache hit for '{}'", query);
                return Ok(Some(location));
            }
            Ok(None) => {}
            Err(e) => warn!("Geocoding cache read failed: {e:#}"),
        }

        let result = self.inner.lookup(query).await?;
        if let Some(location) = &result {
            if let Err(e) = self.cache.put(&key, location.clone(), self.ttl).await {
                warn!("Geocoding cache write failed: {e:#}");
            }
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
