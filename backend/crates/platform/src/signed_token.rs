//! Signed ID Tokens
//!
//! Opaque bearer tokens of the form `base64(uuid || HMAC-SHA256(secret, uuid))`.
//! Whoever holds the secret can mint them; everyone else can only present them.

use uuid::Uuid;

use crate::crypto::{constant_time_eq, from_base64, hmac_sha256, to_base64};

const ID_LEN: usize = 16;
const MAC_LEN: usize = 32;

/// Create a signed token for an ID
pub fn sign(id: &Uuid, secret: &[u8; 32]) -> String {
    let id_bytes = id.as_bytes();
    let signature = hmac_sha256(secret, id_bytes);
    let mut token = Vec::with_capacity(ID_LEN + MAC_LEN);
    token.extend_from_slice(id_bytes);
    token.extend_from_slice(&signature);
    to_base64(&token)
}

/// Verify a token and extract the ID it was issued for
///
/// Returns `None` for anything that is not a well-formed token signed with `secret`.
pub fn verify(token: &str, secret: &[u8; 32]) -> Option<Uuid> {
    let data = from_base64(token.trim()).ok()?;
    if data.len() != ID_LEN + MAC_LEN {
        return None;
    }

    let (id_part, mac_part) = data.split_at(ID_LEN);
    let id_bytes: [u8; ID_LEN] = id_part.try_into().ok()?;
    let expected = hmac_sha256(secret, &id_bytes);

    if !constant_time_eq(mac_part, &expected) {
        return None;
    }

    Some(Uuid::from_bytes(id_bytes))
}
