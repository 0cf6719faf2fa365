//! Gateway Traits
//!
//! Interfaces for the external services the unlock engine consumes.

use crate::error::UnlockResult;
use kernel::id::CreatorId;
use std::time::Duration;

/// Object storage holding private resource files
#[trait_variant::make(ObjectStorage: Send)]
pub trait LocalObjectStorage {
    /// Time-limited URL granting read access to a private object
    async fn create_signed_download_url(&self, path: &str, ttl: Duration) -> UnlockResult<String>;

    async fn delete_object(&self, path: &str) -> UnlockResult<()>;
}

/// Identity provider for creators
///
/// Visitors are anonymous; only the creator dashboard asks who is calling.
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Resolve a bearer token to the creator it was issued for
    async fn current_creator(&self, bearer_token: &str) -> UnlockResult<Option<CreatorId>>;
}
