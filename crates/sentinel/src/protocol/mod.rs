//! Protocol module for Sentinel.
//!
//! Every frame on a hub connection is a JSON envelope `{"type": ..., "data": ...}`.
//! Validators send [`ValidatorMessage`]s, the hub sends [`HubMessage`]s.

pub mod envelope;
pub mod templates;
pub mod types;

pub use envelope::{Envelope, HubMessage, ProtocolError, ValidatorMessage};
pub use templates::{reply_message, signup_message};
pub use types::{ProbeStatus, SignupAck, SignupRequest, ValidateReply, ValidateRequest};
