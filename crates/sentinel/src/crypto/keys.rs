//! Ed25519 key generation and management.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Length in bytes of an Ed25519 secret key.
pub const SECRET_KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no private key configured")]
    Missing,
    #[error("invalid private key: expected 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid private key encoding: {0}")]
    InvalidEncoding(#[from] hex::FromHexError),
    #[error("failed to access key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// KeyPair for Ed25519 signing and verification.
#[derive(Clone)]
pub struct KeyPair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Create a new keypair from a signing key.
    pub fn new(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self { signing_key, verifying_key }
    }

    /// Build a keypair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let secret: [u8; SECRET_KEY_LEN] =
            bytes.try_into().map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Ok(Self::new(SigningKey::from_bytes(&secret)))
    }

    /// Build a keypair from a hex-encoded secret key (as supplied through the
    /// environment).
    pub fn from_secret_hex(encoded: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(encoded.trim())?;
        Self::from_secret_bytes(&bytes)
    }

    /// Get the Ed25519 public key as bytes.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Get the Ed25519 public key as hex string. This is the validator's
    /// identity on the wire.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Get the secret key as hex string.
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair").field("public_key", &self.public_key_hex()).finish()
    }
}

/// Generate a new random Ed25519 keypair.
pub fn generate_keypair() -> KeyPair {
    let mut csprng = OsRng;
    let mut secret_bytes = [0u8; SECRET_KEY_LEN];
    rand::RngCore::fill_bytes(&mut csprng, &mut secret_bytes);
    KeyPair::new(SigningKey::from_bytes(&secret_bytes))
}

/// Save a keypair's secret key to a file (32 bytes).
pub fn save_keypair(keypair: &KeyPair, path: &Path) -> Result<(), KeyError> {
    let io_err = |source| KeyError::Io { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    fs::write(path, keypair.signing_key.to_bytes()).map_err(io_err)?;

    tracing::info!("Saved keypair to: {}", path.display());
    Ok(())
}

/// Load a keypair from a 32-byte secret key file.
pub fn load_keypair(path: &Path) -> Result<KeyPair, KeyError> {
    let secret_bytes =
        fs::read(path).map_err(|source| KeyError::Io { path: path.to_path_buf(), source })?;
    KeyPair::from_secret_bytes(&secret_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keypair() {
        let keypair = generate_keypair();
        assert_eq!(keypair.public_key_bytes().len(), 32);
        assert_eq!(keypair.public_key_hex().len(), 64);
    }

    #[test]
    fn test_hex_secret_reproduces_public_key() {
        let keypair = generate_keypair();
        let restored = KeyPair::from_secret_hex(&keypair.secret_key_hex()).unwrap();
        assert_eq!(keypair.public_key_hex(), restored.public_key_hex());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = KeyPair::from_secret_hex("abcd").unwrap_err();
        assert!(matches!(err, KeyError::InvalidLength(2)));
    }

    #[test]
    fn test_non_hex_secret_rejected() {
        let err = KeyPair::from_secret_hex("not-a-key").unwrap_err();
        assert!(matches!(err, KeyError::InvalidEncoding(_)));
    }

    #[test]
    fn test_save_and_load_keypair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys/validator.key");

        let original = generate_keypair();
        save_keypair(&original, &path).unwrap();

        let loaded = load_keypair(&path).unwrap();
        assert_eq!(original.public_key_bytes(), loaded.public_key_bytes());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_keypair(&dir.path().join("absent.key")).unwrap_err();
        assert!(matches!(err, KeyError::Io { .. }));
    }

    #[test]
    fn test_debug_hides_secret() {
        let keypair = generate_keypair();
        let rendered = format!("{:?}", keypair);
        assert!(rendered.contains(&keypair.public_key_hex()));
        assert!(!rendered.contains(&keypair.secret_key_hex()));
    }
}
