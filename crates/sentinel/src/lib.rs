//! Sentinel - shared building blocks for the hub and its validator nodes
//!
//! This library provides the pieces both ends of a hub connection must agree
//! on byte-for-byte: the tagged message envelopes, the signed-message
//! templates, Ed25519 key handling and the HTTP probe a validator runs.

pub mod crypto;
pub mod probe;
pub mod protocol;

// Re-export main types
pub use crypto::{KeyPair, verify_message};
pub use probe::{HttpProber, ProbeOutcome, Prober};
pub use protocol::{
    Envelope, HubMessage, ProbeStatus, ProtocolError, SignupAck, SignupRequest, ValidateReply,
    ValidateRequest, ValidatorMessage,
};

