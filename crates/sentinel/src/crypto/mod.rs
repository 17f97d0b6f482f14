//! Cryptographic operations for Sentinel.
//!
//! Validator identity is an Ed25519 key pair. Public keys and signatures
//! travel as lowercase hex; the message being signed is always one of the
//! templates in [`crate::protocol::templates`].

pub mod keys;
pub mod signing;
pub mod verification;

pub use keys::{KeyError, KeyPair, generate_keypair, load_keypair, save_keypair};
pub use signing::{sign_bytes, sign_message};
pub use verification::{verify_message, verify_signature};
