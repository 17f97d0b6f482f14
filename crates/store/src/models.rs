use chrono::{DateTime, Utc};
use sentinel::ProbeStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Location recorded for validators that signed up without reporting one
pub const UNKNOWN_LOCATION: &str = "unknown";

/// Validator model - a worker node identified by its public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub id: String,
    pub public_key: String,
    pub ip: String,
    pub location: String,
    /// Credit owed for verified ticks; only ever increases
    pub pending_payouts: i64,
}

/// Fields needed to register a validator on first signup
#[derive(Debug, Clone)]
pub struct NewValidator {
    pub public_key: String,
    pub ip: String,
    pub location: String,
}

impl NewValidator {
    pub fn from_signup(public_key: impl Into<String>, ip: impl Into<String>) -> Self {
        Self { public_key: public_key.into(), ip: ip.into(), location: UNKNOWN_LOCATION.to_string() }
    }
}

/// MonitoredTarget model - a URL a user asked to be watched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredTarget {
    pub id: String,
    pub url: String,
    pub user_id: String,
    /// Soft delete; disabled targets are never probed or reported
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

/// ObservationTick model - one verified probe result, never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationTick {
    pub id: String,
    pub target_id: String,
    pub validator_id: String,
    pub status: ProbeStatus,
    pub latency: u64,
    pub created_at: DateTime<Utc>,
}

/// A tick about to be written
#[derive(Debug, Clone)]
pub struct NewTick {
    pub target_id: String,
    pub validator_id: String,
    pub status: ProbeStatus,
    pub latency: u64,
    pub created_at: DateTime<Utc>,
}

impl NewTick {
    /// Tick observed right now, at the millisecond precision it is stored with
    pub fn now(
        target_id: impl Into<String>,
        validator_id: impl Into<String>,
        status: ProbeStatus,
        latency: u64,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            validator_id: validator_id.into(),
            status,
            latency,
            created_at: truncate_to_millis(Utc::now()),
        }
    }

    pub(crate) fn into_tick(self) -> ObservationTick {
        ObservationTick {
            id: Uuid::new_v4().to_string(),
            target_id: self.target_id,
            validator_id: self.validator_id,
            status: self.status,
            latency: self.latency,
            created_at: truncate_to_millis(self.created_at),
        }
    }
}

/// Target together with its recorded ticks, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetWithTicks {
    #[serde(flatten)]
    pub target: MonitoredTarget,
    pub ticks: Vec<ObservationTick>,
}

/// Owner of monitored targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// Drop sub-millisecond precision so values match what a read returns
pub(crate) fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    millis_to_datetime(at.timestamp_millis()).unwrap_or(at)
}

/// Convert a stored millisecond timestamp back into a `DateTime`
pub(crate) fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
