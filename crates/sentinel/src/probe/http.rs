//! HTTP probe implementation.

use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::validation::validate_url;
use super::{ProbeOutcome, Prober};

/// HTTP/HTTPS prober backed by a shared `reqwest` client
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sentinel-validator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        if let Err(e) = validate_url(url) {
            warn!("Refusing to probe {}: {}", url, e);
            return ProbeOutcome::unreachable();
        }

        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                let latency = start.elapsed().as_millis() as u64;
                let status_code = response.status().as_u16();
                debug!("{} responded with {} in {}ms", url, status_code, latency);
                ProbeOutcome::from_response(status_code, latency)
            }
            Err(e) => {
                warn!("Probe of {} failed: {}", url, e);
                ProbeOutcome::unreachable()
            }
        }
    }
}
