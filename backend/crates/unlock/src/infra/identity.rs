//! Signed Token Identity Adapter
//!
//! Accepts bearer tokens minted by the identity provider with the shared
//! secret (see `platform::signed_token`).

use crate::domain::gateway::IdentityProvider;
use crate::error::UnlockResult;
use kernel::id::CreatorId;

pub struct SignedTokenIdentity {
    secret: [u8; 32],
}

impl SignedTokenIdentity {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Mint a token for a creator, for tooling and tests
    pub fn issue(&self, creator_id: CreatorId) -> String {
        platform::signed_token::sign(creator_id.as_uuid(), &self.secret)
    }
}

impl IdentityProvider for SignedTokenIdentity {
    async fn current_creator(&self, bearer_token: &str) -> UnlockResult<Option<CreatorId>> {
        let creator = platform::signed_token::verify(bearer_token, &self.secret).map(CreatorId::from);
        if creator.is_none() {
            tracing::debug!("Rejected bearer token");
        }
        Ok(creator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issued_token_resolves() {
        let identity = SignedTokenIdentity::new([7u8; 32]);
        let creator = CreatorId::new();
        let token = identity.issue(creator);
        assert_eq!(identity.current_creator(&token).await.unwrap(), Some(creator));
    }

    #[tokio::test]
    async fn test_foreign_token_rejected() {
        let ours = SignedTokenIdentity::new([7u8; 32]);
        let theirs = SignedTokenIdentity::new([8u8; 32]);
        let token = theirs.issue(CreatorId::new());
        assert_eq!(ours.current_creator(&token).await.unwrap(), None);
        assert_eq!(ours.current_creator("garbage").await.unwrap(), None);
    }
}
