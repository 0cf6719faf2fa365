//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Generate a random 32-byte secret key
pub fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Compute HMAC-SHA256 with a 32-byte key
pub fn hmac_sha256(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    // HMAC accepts keys of any length, so construction cannot fail here.
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts 32-byte keys"),
    };
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Constant-time comparison to prevent timing attacks
///
/// Lengths are not secret: slices of different length compare unequal immediately.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_values() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_hmac_depends_on_key_and_message() {
        let key = [0x0bu8; 32];
        let mac1 = hmac_sha256(&key, b"Hi There");
        let mac2 = hmac_sha256(&key, b"Hi There");
        assert_eq!(mac1, mac2);
        assert_ne!(mac1, hmac_sha256(&[0x0cu8; 32], b"Hi There"));
        assert_ne!(mac1, hmac_sha256(&key, b"Hi there"));
    }

    #[test]
    fn test_random_secret_not_zero() {
        let secret = random_secret();
        assert!(secret.iter().any(|&b| b != 0));
        assert_ne!(secret, random_secret());
    }

    #[test]
    fn test_base64_roundtrip() {
        let encoded = to_base64(b"lockflow");
        assert_eq!(from_base64(&encoded).unwrap(), b"lockflow");
        assert!(from_base64("***").is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"REACT2024", b"REACT2024"));
        assert!(!constant_time_eq(b"REACT2024", b"REACT2025"));
        assert!(!constant_time_eq(b"REACT", b"REACT2024"));
        assert!(constant_time_eq(b"", b""));
    }
}
