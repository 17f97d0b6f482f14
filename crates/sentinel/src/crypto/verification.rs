//! Ed25519 signature verification.

use anyhow::{Result, anyhow};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Verify an Ed25519 signature over raw bytes.
///
/// Returns `Ok(true)` if valid, `Ok(false)` if the signature doesn't match,
/// or `Err` if the public key is malformed.
pub fn verify_signature(
    data: &[u8],
    signature_bytes: &[u8],
    public_key_bytes: &[u8; 32],
) -> Result<bool> {
    let verifying_key = VerifyingKey::from_bytes(public_key_bytes)
        .map_err(|e| anyhow!("Invalid public key: {}", e))?;

    let Ok(sig_arr) = <[u8; 64]>::try_from(signature_bytes) else {
        return Ok(false);
    };
    let signature = Signature::from_bytes(&sig_arr);

    Ok(verifying_key.verify(data, &signature).is_ok())
}

/// Check a detached signature produced by [`super::sign_message`].
///
/// `public_key` and `signature` are in their wire encodings (hex). Any
/// decoding problem counts as a failed verification; this never errors.
pub fn verify_message(message: &str, public_key: &str, signature: &str) -> bool {
    let Ok(key_bytes) = hex::decode(public_key) else {
        return false;
    };
    let Ok(key_bytes) = <[u8; 32]>::try_from(key_bytes.as_slice()) else {
        return false;
    };
    let Ok(signature_bytes) = hex::decode(signature) else {
        return false;
    };

    verify_signature(message.as_bytes(), &signature_bytes, &key_bytes).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::generate_keypair;
    use crate::crypto::signing::{sign_bytes, sign_message};

    #[test]
    fn test_valid_signature() {
        let keypair = generate_keypair();
        let data = b"test data";
        let sig = sign_bytes(data, &keypair);

        assert!(verify_signature(data, &sig, &keypair.public_key_bytes()).unwrap());
    }

    #[test]
    fn test_wrong_length_signature() {
        let keypair = generate_keypair();
        let short_sig = vec![0u8; 32];

        assert!(!verify_signature(b"data", &short_sig, &keypair.public_key_bytes()).unwrap());
    }

    #[test]
    fn test_verify_message_accepts_valid() {
        let keypair = generate_keypair();
        let sig = sign_message("Replying to cb-1", &keypair);

        assert!(verify_message("Replying to cb-1", &keypair.public_key_hex(), &sig));
    }

    #[test]
    fn test_verify_message_rejects_other_message() {
        let keypair = generate_keypair();
        let sig = sign_message("Replying to cb-1", &keypair);

        assert!(!verify_message("Replying to cb-2", &keypair.public_key_hex(), &sig));
    }

    #[test]
    fn test_verify_message_rejects_flipped_bit() {
        let keypair = generate_keypair();
        let mut raw = sign_bytes(b"Replying to cb-1", &keypair);
        raw[10] ^= 0x01;

        assert!(!verify_message("Replying to cb-1", &keypair.public_key_hex(), &hex::encode(raw)));
    }

    #[test]
    fn test_verify_message_rejects_wrong_key() {
        let signer = generate_keypair();
        let other = generate_keypair();
        let sig = sign_message("hello", &signer);

        assert!(!verify_message("hello", &other.public_key_hex(), &sig));
    }

    #[test]
    fn test_verify_message_never_errors_on_garbage() {
        let keypair = generate_keypair();
        let sig = sign_message("hello", &keypair);

        assert!(!verify_message("hello", "zz-not-hex", &sig));
        assert!(!verify_message("hello", "abcd", &sig));
        assert!(!verify_message("hello", &keypair.public_key_hex(), "[1,2,3]"));
        assert!(!verify_message("hello", &keypair.public_key_hex(), ""));
        assert!(!verify_message("hello", "", ""));
    }
}
