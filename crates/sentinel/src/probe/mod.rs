//! Probe execution for validator nodes.
//!
//! A probe is one HTTP GET against a monitored URL. Exactly `200 OK` is
//! `Good`; any other status is `Bad`. Transport failures (timeout, DNS,
//! refused connection) are `Bad` with [`FALLBACK_LATENCY_MS`] instead of the
//! real elapsed time, which is what hubs already in the field expect.

pub mod http;
pub mod validation;

pub use http::HttpProber;
pub use validation::validate_url;

use async_trait::async_trait;

use crate::protocol::ProbeStatus;

/// Latency reported when the request never produced a response.
pub const FALLBACK_LATENCY_MS: u64 = 1000;

/// Default bound on a single probe.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 10_000;

/// Classified result of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: ProbeStatus,
    pub latency_ms: u64,
}

impl ProbeOutcome {
    /// Classify a received HTTP status.
    pub fn from_response(status_code: u16, latency_ms: u64) -> Self {
        let status = if status_code == 200 { ProbeStatus::Good } else { ProbeStatus::Bad };
        Self { status, latency_ms }
    }

    /// Outcome for a request that never got a response.
    pub fn unreachable() -> Self {
        Self { status: ProbeStatus::Bad, latency_ms: FALLBACK_LATENCY_MS }
    }
}

/// Prober trait for whatever performs the check against a target
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `url`; never fails, failures are reported as `Bad`.
    async fn probe(&self, url: &str) -> ProbeOutcome;
}
