//! In-Memory Repository Implementations
//!
//! Test doubles for the use case and router tests.

use crate::domain::entities::{CreatorProfile, Resource};
use crate::domain::repository::{CreatorRepository, ResourceRepository};
use crate::error::{UnlockError, UnlockResult};
use kernel::id::{CreatorId, ResourceId};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryResourceRepository {
    resources: RwLock<HashMap<ResourceId, Resource>>,
}

impl InMemoryResourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            resources: RwLock::new(resources.into_iter().map(|r| (r.id, r)).collect()),
        }
    }
}

impl ResourceRepository for InMemoryResourceRepository {
    async fn get_by_id(&self, id: ResourceId) -> UnlockResult<Option<Resource>> {
        Ok(self.resources.read().await.get(&id).cloned())
    }

    async fn list_by_creator(&self, creator_id: CreatorId) -> UnlockResult<Vec<Resource>> {
        let mut owned: Vec<Resource> = self
            .resources
            .read()
            .await
            .values()
            .filter(|r| r.creator_id == creator_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn create(&self, resource: &Resource) -> UnlockResult<()> {
        let mut resources = self.resources.write().await;
        if resources.contains_key(&resource.id) {
            return Err(UnlockError::Validation("resource already exists".into()));
        }
        resources.insert(resource.id, resource.clone());
        Ok(())
    }

    async fn delete(
        &self,
        id: ResourceId,
        creator_id: CreatorId,
    ) -> UnlockResult<Option<Resource>> {
        let mut resources = self.resources.write().await;
        match resources.get(&id) {
            Some(r) if r.creator_id == creator_id => Ok(resources.remove(&id)),
            _ => Ok(None),
        }
    }

    async fn increment_unlock_counter(&self, id: ResourceId) -> UnlockResult<i64> {
        let mut resources = self.resources.write().await;
        let resource = resources.get_mut(&id).ok_or(UnlockError::ResourceNotFound)?;
        resource.unlock_count += 1;
        Ok(resource.unlock_count)
    }
}

#[derive(Default)]
pub struct InMemoryCreatorRepository {
    profiles: RwLock<HashMap<CreatorId, CreatorProfile>>,
}

impl InMemoryCreatorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = CreatorProfile>) -> Self {
        Self {
            profiles: RwLock::new(profiles.into_iter().map(|p| (p.creator_id, p)).collect()),
        }
    }
}

impl CreatorRepository for InMemoryCreatorRepository {
    async fn get_profile(&self, creator_id: CreatorId) -> UnlockResult<Option<CreatorProfile>> {
        Ok(self.profiles.read().await.get(&creator_id).cloned())
    }
}
