//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use crate::domain::entities::{CreatorProfile, Resource};
use crate::error::UnlockResult;
use kernel::id::{CreatorId, ResourceId};

/// Resource repository trait
#[trait_variant::make(ResourceRepository: Send)]
pub trait LocalResourceRepository {
    async fn get_by_id(&self, id: ResourceId) -> UnlockResult<Option<Resource>>;

    /// Newest first
    async fn list_by_creator(&self, creator_id: CreatorId) -> UnlockResult<Vec<Resource>>;

    async fn create(&self, resource: &Resource) -> UnlockResult<()>;

    /// Delete a resource owned by `creator_id`, returning what was deleted
    async fn delete(
        &self,
        id: ResourceId,
        creator_id: CreatorId,
    ) -> UnlockResult<Option<Resource>>;

    /// Atomically add one to the unlock counter, returning the new value
    ///
    /// Must be a single server-side increment, never read-then-write.
    async fn increment_unlock_counter(&self, id: ResourceId) -> UnlockResult<i64>;
}

/// Creator profile repository trait
#[trait_variant::make(CreatorRepository: Send)]
pub trait LocalCreatorRepository {
    async fn get_profile(&self, creator_id: CreatorId) -> UnlockResult<Option<CreatorProfile>>;
}
