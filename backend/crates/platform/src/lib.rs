//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no business meaning:
//! - Cryptographic utilities (SHA-256, HMAC, Base64, constant-time comparison)
//! - Signed ID tokens (`id || HMAC(id)`)
//! - Visitor identification from HTTP headers

pub mod crypto;
pub mod signed_token;
pub mod visitor;
