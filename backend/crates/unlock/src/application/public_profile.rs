//! Public Profile Use Cases
//!
//! A creator's public page: who they are and what is on offer, never how to
//! unlock it.

use crate::application::config::UnlockConfig;
use crate::application::grant_access::resolve_reference;
use crate::domain::entities::{CreatorProfile, Resource};
use crate::domain::gateway::ObjectStorage;
use crate::domain::repository::{CreatorRepository, ResourceRepository};
use crate::domain::value_objects::FileReference;
use crate::error::{UnlockError, UnlockResult};
use kernel::id::CreatorId;
use std::sync::Arc;

/// Resource as shown to anyone, with the preview link resolved
#[derive(Debug, Clone)]
pub struct PublicResource {
    pub resource: Resource,
    pub preview_url: Option<String>,
}

/// Profile header of the public page
#[derive(Debug, Clone)]
pub struct PublicProfile {
    pub profile: CreatorProfile,
    pub avatar_url: Option<String>,
    pub total_resources: usize,
    pub total_unlocks: i64,
}

/// Best-effort link for an image; a failure only hides the image
async fn resolve_image<S>(
    storage: &S,
    reference: Option<&FileReference>,
    config: &UnlockConfig,
) -> Option<String>
where
    S: ObjectStorage,
{
    let reference = reference?;
    resolve_reference(storage, reference, config.signed_url_ttl)
        .await
        .inspect_err(|e| {
            tracing::warn!(path = reference.as_str(), error = %e, "Image link skipped");
        })
        .ok()
}

pub struct ListPublicResourcesUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    resource_repo: Arc<R>,
    storage: Arc<S>,
    config: Arc<UnlockConfig>,
}

impl<R, S> ListPublicResourcesUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    pub fn new(resource_repo: Arc<R>, storage: Arc<S>, config: Arc<UnlockConfig>) -> Self {
        Self {
            resource_repo,
            storage,
            config,
        }
    }

    /// Newest first. Previews that cannot be signed are left out.
    pub async fn execute(&self, creator_id: CreatorId) -> UnlockResult<Vec<PublicResource>> {
        let resources = self.resource_repo.list_by_creator(creator_id).await?;

        let mut cards = Vec::with_capacity(resources.len());
        for resource in resources {
            let preview_url = resolve_image(
                self.storage.as_ref(),
                resource.preview_image.as_ref(),
                &self.config,
            )
            .await;
            cards.push(PublicResource {
                resource,
                preview_url,
            });
        }

        tracing::debug!(creator_id = %creator_id, count = cards.len(), "Listed public resources");
        Ok(cards)
    }
}

pub struct GetCreatorProfileUseCase<R, C, S>
where
    R: ResourceRepository,
    C: CreatorRepository,
    S: ObjectStorage,
{
    resource_repo: Arc<R>,
    creator_repo: Arc<C>,
    storage: Arc<S>,
    config: Arc<UnlockConfig>,
}

impl<R, C, S> GetCreatorProfileUseCase<R, C, S>
where
    R: ResourceRepository,
    C: CreatorRepository,
    S: ObjectStorage,
{
    pub fn new(
        resource_repo: Arc<R>,
        creator_repo: Arc<C>,
        storage: Arc<S>,
        config: Arc<UnlockConfig>,
    ) -> Self {
        Self {
            resource_repo,
            creator_repo,
            storage,
            config,
        }
    }

    /// A creator without a mirrored profile still has a page once they publish
    pub async fn execute(&self, creator_id: CreatorId) -> UnlockResult<PublicProfile> {
        let profile = self.creator_repo.get_profile(creator_id).await?;
        let resources = self.resource_repo.list_by_creator(creator_id).await?;

        let profile = match profile {
            Some(profile) => profile,
            None if !resources.is_empty() => CreatorProfile::anonymous(creator_id),
            None => return Err(UnlockError::CreatorNotFound),
        };

        // Avatars are uploads like any other file
        let avatar = profile
            .avatar
            .as_ref()
            .filter(|avatar| avatar.is_owned_by(creator_id));
        let avatar_url = resolve_image(self.storage.as_ref(), avatar, &self.config).await;

        Ok(PublicProfile {
            profile,
            avatar_url,
            total_resources: resources.len(),
            total_unlocks: resources.iter().map(|r| r.unlock_count).sum(),
        })
    }
}
