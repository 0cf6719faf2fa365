//! Visitor identification
//!
//! Unlocking is anonymous, so a visitor is only known by what its requests carry.
//! The fingerprint ties a server-side unlock session to the browser that opened it.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

use crate::crypto::sha256;

/// Fingerprint derived from request headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorFingerprint {
    /// SHA-256 of the User-Agent header
    pub hash: [u8; 32],
    /// Client IP (first X-Forwarded-For entry, else the direct peer); logging only
    pub ip: Option<IpAddr>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum VisitorError {
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),
}

impl VisitorFingerprint {
    /// Build the fingerprint for a request
    ///
    /// A request without a User-Agent is rejected: the binding would be meaningless.
    pub fn from_headers(headers: &HeaderMap, peer_ip: Option<IpAddr>) -> Result<Self, VisitorError> {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|ua| !ua.trim().is_empty())
            .ok_or(VisitorError::MissingHeader("User-Agent"))?;

        Ok(Self {
            hash: sha256(user_agent.as_bytes()),
            ip: forwarded_ip(headers).or(peer_ip),
        })
    }

    pub fn matches(&self, hash: &[u8; 32]) -> bool {
        crate::crypto::constant_time_eq(&self.hash, hash)
    }
}

/// First parseable address in X-Forwarded-For, if any
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse().ok())
}

/// Extract the bearer token from an Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_ua(ua: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(ua));
        headers
    }

    #[test]
    fn test_fingerprint_is_stable_per_user_agent() {
        let a = VisitorFingerprint::from_headers(&headers_with_ua("Mozilla/5.0 A"), None).unwrap();
        let b = VisitorFingerprint::from_headers(&headers_with_ua("Mozilla/5.0 A"), None).unwrap();
        let c = VisitorFingerprint::from_headers(&headers_with_ua("Mozilla/5.0 B"), None).unwrap();
        assert!(a.matches(&b.hash));
        assert!(!a.matches(&c.hash));
    }

    #[test]
    fn test_missing_user_agent() {
        let result = VisitorFingerprint::from_headers(&HeaderMap::new(), None);
        assert!(matches!(result, Err(VisitorError::MissingHeader("User-Agent"))));
    }

    #[test]
    fn test_forwarded_ip_preferred_over_peer() {
        let mut headers = headers_with_ua("Mozilla/5.0");
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let peer: IpAddr = "127.0.0.1".parse().unwrap();

        let fp = VisitorFingerprint::from_headers(&headers, Some(peer)).unwrap();
        assert_eq!(fp.ip, Some("203.0.113.9".parse().unwrap()));

        let fp = VisitorFingerprint::from_headers(&headers_with_ua("Mozilla/5.0"), Some(peer)).unwrap();
        assert_eq!(fp.ip, Some(peer));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);
    }
}
