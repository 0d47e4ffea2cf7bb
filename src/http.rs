//! Shared HTTP plumbing: client construction with retry middleware and
//! request spacing for rate-limited public services.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Build an HTTP client; `max_retries == 0` leaves out the retry middleware
pub fn build_client(
    user_agent: &str,
    timeout: Duration,
    max_retries: u32,
) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .with_context(|| "Failed to create HTTP client")?;

    let mut builder = ClientBuilder::new(client);
    if max_retries > 0 {
        let policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
    }
    Ok(builder.build())
}

/// Enforces a minimum interval between consecutive outbound requests.
///
/// Clones share the same clock, so every caller of one client is spaced.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Throttle {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// A throttle that never waits
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the interval since the previous request has passed, then claim the slot
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let wait_time = self.interval - elapsed;
                debug!("Throttling request for {:.3}s", wait_time.as_secs_f64());
                tokio::time::sleep(wait_time).await;
            }
        }
        *last = Some(Instant::now());
    }
}
