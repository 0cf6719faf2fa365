//! Request Extractors

use crate::error::UnlockError;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use platform::visitor::VisitorFingerprint;
use std::net::SocketAddr;

/// Fingerprint of the anonymous visitor making the request
///
/// The peer address is only present when the server was started with
/// `into_make_service_with_connect_info`.
pub struct Visitor(pub VisitorFingerprint);

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = UnlockError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());

        Ok(Self(VisitorFingerprint::from_headers(&parts.headers, peer_ip)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, header};
    use std::net::IpAddr;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_peer_address_is_used_without_forwarding_header() {
        let peer: SocketAddr = "198.51.100.7:52344".parse().unwrap();
        let mut request = Request::builder()
            .header(header::USER_AGENT, "Mozilla/5.0")
            .body(())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let Visitor(fingerprint) = Visitor::from_request_parts(&mut parts(request), &())
            .await
            .unwrap();
        assert_eq!(fingerprint.ip, Some(peer.ip()));
        assert!(fingerprint.matches(&platform::crypto::sha256(b"Mozilla/5.0")));
    }

    #[tokio::test]
    async fn test_forwarded_address_wins_and_peer_is_optional() {
        let request = Request::builder()
            .header(header::USER_AGENT, "Mozilla/5.0")
            .header("x-forwarded-for", "203.0.113.9")
            .body(())
            .unwrap();

        let Visitor(fingerprint) = Visitor::from_request_parts(&mut parts(request), &())
            .await
            .unwrap();
        assert_eq!(fingerprint.ip, Some("203.0.113.9".parse::<IpAddr>().unwrap()));
    }

    #[tokio::test]
    async fn test_missing_user_agent_is_rejected() {
        let request = Request::builder().body(()).unwrap();
        let result = Visitor::from_request_parts(&mut parts(request), &()).await;
        assert!(matches!(result, Err(UnlockError::MissingHeader("User-Agent"))));
    }
}
