//! Keep-alive self-ping
//!
//! Free-tier hosts idle out the service between registrations; when
//! `KEEPALIVE_URL` is set, a background task pings it on a fixed interval.

use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_INTERVAL_SECS: u64 = 840;

/// Spawn the keep-alive task when `KEEPALIVE_URL` is configured
pub fn spawn_from_env() {
    let Ok(url) = std::env::var("KEEPALIVE_URL") else {
        return;
    };

    let interval_secs = std::env::var("KEEPALIVE_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_INTERVAL_SECS);

    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;
            match client.get(&url).send().await {
                Ok(response) => debug!("Keep-alive ping to {}: {}", url, response.status()),
                Err(e) => warn!("Keep-alive ping to {} failed: {}", url, e),
            }
        }
    });
}
