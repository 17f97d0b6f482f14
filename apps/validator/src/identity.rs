use std::path::Path;

use sentinel::KeyPair;
use sentinel::crypto::{KeyError, load_keypair};
use tracing::info;

/// Environment variable holding the hex-encoded secret key
pub const PRIVATE_KEY_ENV: &str = "SENTINEL_PRIVATE_KEY";

/// Resolve the node's key pair. The environment wins over the key file;
/// with neither, the node has no identity and must not start.
pub fn load_identity(env_value: Option<&str>, key_file: Option<&Path>) -> Result<KeyPair, KeyError> {
    if let Some(encoded) = env_value.map(str::trim).filter(|value| !value.is_empty()) {
        let keypair = KeyPair::from_secret_hex(encoded)?;
        info!("Loaded key from {}", PRIVATE_KEY_ENV);
        return Ok(keypair);
    }

    if let Some(path) = key_file {
        let keypair = load_keypair(path)?;
        info!("Loaded key from {}", path.display());
        return Ok(keypair);
    }

    Err(KeyError::Missing)
}
