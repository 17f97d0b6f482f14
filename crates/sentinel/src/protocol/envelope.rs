//! Tagged `{type, data}` envelopes and their text codec.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{SignupAck, SignupRequest, ValidateReply, ValidateRequest};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("malformed message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Text framing shared by both message directions.
pub trait Envelope: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

/// Frames sent by a validator node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ValidatorMessage {
    Signup(SignupRequest),
    Validate(ValidateReply),
}

/// Frames sent by the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum HubMessage {
    Signup(SignupAck),
    Validate(ValidateRequest),
}

impl Envelope for ValidatorMessage {}
impl Envelope for HubMessage {}
