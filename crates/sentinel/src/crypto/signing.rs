//! Ed25519 signing operations.

use super::keys::KeyPair;
use ed25519_dalek::Signer;

/// Sign raw bytes with a keypair. Returns 64-byte Ed25519 signature.
pub fn sign_bytes(data: &[u8], keypair: &KeyPair) -> Vec<u8> {
    let signature = keypair.signing_key.sign(data);
    signature.to_bytes().to_vec()
}

/// Sign the UTF-8 bytes of `message` and return the detached signature as hex,
/// ready to be placed in a `signedMessage` field.
pub fn sign_message(message: &str, keypair: &KeyPair) -> String {
    hex::encode(sign_bytes(message.as_bytes(), keypair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::generate_keypair;
    use crate::crypto::verification::verify_signature;

    #[test]
    fn test_sign_bytes_produces_64_byte_signature() {
        let keypair = generate_keypair();
        let sig = sign_bytes(b"hello world", &keypair);
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn test_sign_message_is_hex_of_signature() {
        let keypair = generate_keypair();
        let encoded = sign_message("Replying to abc", &keypair);
        assert_eq!(encoded.len(), 128);

        let raw = hex::decode(&encoded).unwrap();
        assert!(verify_signature(b"Replying to abc", &raw, &keypair.public_key_bytes()).unwrap());
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let keypair = generate_keypair();
        assert_eq!(sign_message("same", &keypair), sign_message("same", &keypair));
    }
}
