//! Protocol type definitions for Sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a single probe as reported by a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeStatus {
    Good,
    Bad,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Good => "Good",
            ProbeStatus::Bad => "Bad",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Good" => Ok(ProbeStatus::Good),
            "Bad" => Ok(ProbeStatus::Bad),
            other => Err(format!("unknown probe status: {other}")),
        }
    }
}

/// Validator → hub: self-signed registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Address the validator reports for itself
    pub ip: String,

    /// Hex-encoded Ed25519 verifying key
    pub public_key: String,

    /// Signature over [`super::signup_message`]
    pub signed_message: String,

    /// Correlates the hub's acknowledgement with this request
    pub callback_id: String,
}

/// Hub → validator: identity assigned after a verified signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupAck {
    pub validator_id: String,
    pub callback_id: String,
}

/// Hub → validator: probe `url` and answer under `callback_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub url: String,
    pub callback_id: String,
    pub target_id: String,
}

/// Validator → hub: signed probe result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateReply {
    pub callback_id: String,

    pub status: ProbeStatus,

    /// Round-trip time in milliseconds
    pub latency: u64,

    pub target_id: String,

    /// Identity assigned at signup; the hub discards replies without one
    #[serde(default)]
    pub validator_id: Option<String>,

    /// Signature over [`super::reply_message`]
    pub signed_message: String,
}
