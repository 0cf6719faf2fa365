//! Creator Dashboard Use Cases
//!
//! Everything here requires a creator identity. Resources are only ever
//! mutated by creation, deletion and the unlock counter.

use crate::domain::entities::{CreatorProfile, Resource};
use crate::domain::gateway::{IdentityProvider, ObjectStorage};
use crate::domain::repository::{CreatorRepository, ResourceRepository};
use crate::domain::value_objects::{FileReference, FileType, UnlockMethod, UnlockRequirement};
use crate::error::{UnlockError, UnlockResult};
use chrono::Utc;
use kernel::id::{CreatorId, ResourceId};
use std::sync::Arc;

const TITLE_MAX_CHARS: usize = 120;
const DESCRIPTION_MAX_CHARS: usize = 2000;

async fn authenticate<I>(identity: &I, bearer_token: Option<&str>) -> UnlockResult<CreatorId>
where
    I: IdentityProvider,
{
    let token = bearer_token.ok_or(UnlockError::Unauthorized)?;
    identity
        .current_creator(token)
        .await?
        .ok_or(UnlockError::Unauthorized)
}

/// Dashboard view
#[derive(Debug, Clone)]
pub struct DashboardOutput {
    pub profile: CreatorProfile,
    pub resources: Vec<Resource>,
    pub total_unlocks: i64,
}

pub struct CreatorDashboardUseCase<R, C, I>
where
    R: ResourceRepository,
    C: CreatorRepository,
    I: IdentityProvider,
{
    resource_repo: Arc<R>,
    creator_repo: Arc<C>,
    identity: Arc<I>,
}

impl<R, C, I> CreatorDashboardUseCase<R, C, I>
where
    R: ResourceRepository,
    C: CreatorRepository,
    I: IdentityProvider,
{
    pub fn new(resource_repo: Arc<R>, creator_repo: Arc<C>, identity: Arc<I>) -> Self {
        Self {
            resource_repo,
            creator_repo,
            identity,
        }
    }

    pub async fn execute(&self, bearer_token: Option<&str>) -> UnlockResult<DashboardOutput> {
        let creator_id = authenticate(self.identity.as_ref(), bearer_token).await?;
        let profile = self
            .creator_repo
            .get_profile(creator_id)
            .await?
            .unwrap_or_else(|| CreatorProfile::anonymous(creator_id));
        let resources = self.resource_repo.list_by_creator(creator_id).await?;
        let total_unlocks = resources.iter().map(|r| r.unlock_count).sum();

        Ok(DashboardOutput {
            profile,
            resources,
            total_unlocks,
        })
    }
}

/// Create resource input
pub struct CreateResourceInput {
    pub title: String,
    pub description: String,
    pub file_type: FileType,
    /// Object path in the bucket, or a full URL
    pub file_url: String,
    pub preview_image: Option<String>,
    pub unlock_method: UnlockMethod,
    pub unlock_requirement: String,
}

pub struct CreateResourceUseCase<R, I>
where
    R: ResourceRepository,
    I: IdentityProvider,
{
    resource_repo: Arc<R>,
    identity: Arc<I>,
}

impl<R, I> CreateResourceUseCase<R, I>
where
    R: ResourceRepository,
    I: IdentityProvider,
{
    pub fn new(resource_repo: Arc<R>, identity: Arc<I>) -> Self {
        Self {
            resource_repo,
            identity,
        }
    }

    pub async fn execute(
        &self,
        bearer_token: Option<&str>,
        input: CreateResourceInput,
    ) -> UnlockResult<Resource> {
        let creator_id = authenticate(self.identity.as_ref(), bearer_token).await?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(UnlockError::Validation("title is required".into()));
        }
        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(UnlockError::Validation(format!(
                "title must be at most {} characters",
                TITLE_MAX_CHARS
            )));
        }
        let description = input.description.trim();
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(UnlockError::Validation(format!(
                "description must be at most {} characters",
                DESCRIPTION_MAX_CHARS
            )));
        }

        // Store the canonical form so the evaluator never sees sloppy input
        let requirement = UnlockRequirement::parse(input.unlock_method, &input.unlock_requirement)
            .map_err(into_validation)?;
        let file_url = FileReference::parse(&input.file_url).map_err(into_validation)?;
        if input.file_type == FileType::Link && file_url.internal_path().is_some() {
            return Err(UnlockError::Validation(
                "LINK resources need a full URL".into(),
            ));
        }
        let preview_image = input
            .preview_image
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(FileReference::parse)
            .transpose()
            .map_err(into_validation)?;
        for reference in std::iter::once(&file_url).chain(preview_image.as_ref()) {
            if !reference.is_owned_by(creator_id) {
                tracing::warn!(
                    creator_id = %creator_id,
                    path = reference.as_str(),
                    "Rejected storage path outside the creator folder"
                );
                return Err(UnlockError::Validation(
                    "stored files must live under your own folder".into(),
                ));
            }
        }

        let resource = Resource {
            id: ResourceId::new(),
            creator_id,
            title: title.to_string(),
            description: description.to_string(),
            file_type: input.file_type,
            file_url,
            preview_image,
            unlock_method: requirement.method(),
            unlock_requirement: requirement.to_raw(),
            unlock_count: 0,
            created_at: Utc::now(),
        };
        self.resource_repo.create(&resource).await?;

        tracing::info!(
            resource_id = %resource.id,
            creator_id = %creator_id,
            unlock_method = %resource.unlock_method,
            "Resource created"
        );
        Ok(resource)
    }
}

fn into_validation(e: UnlockError) -> UnlockError {
    match e {
        UnlockError::DataIntegrity(message) => UnlockError::Validation(message),
        other => other,
    }
}

pub struct DeleteResourceUseCase<R, S, I>
where
    R: ResourceRepository,
    S: ObjectStorage,
    I: IdentityProvider,
{
    resource_repo: Arc<R>,
    storage: Arc<S>,
    identity: Arc<I>,
}

impl<R, S, I> DeleteResourceUseCase<R, S, I>
where
    R: ResourceRepository,
    S: ObjectStorage,
    I: IdentityProvider,
{
    pub fn new(resource_repo: Arc<R>, storage: Arc<S>, identity: Arc<I>) -> Self {
        Self {
            resource_repo,
            storage,
            identity,
        }
    }

    /// Another creator's resource reads as not found
    pub async fn execute(
        &self,
        bearer_token: Option<&str>,
        resource_id: ResourceId,
    ) -> UnlockResult<()> {
        let creator_id = authenticate(self.identity.as_ref(), bearer_token).await?;
        let resource = self
            .resource_repo
            .delete(resource_id, creator_id)
            .await?
            .ok_or(UnlockError::ResourceNotFound)?;

        let stored = std::iter::once(&resource.file_url)
            .chain(resource.preview_image.as_ref())
            .filter(|reference| reference.internal_path().is_some());
        for reference in stored {
            let path = reference.as_str();
            // Rows created before paths were checked may point anywhere
            if !reference.is_owned_by(creator_id) {
                tracing::warn!(
                    resource_id = %resource.id,
                    path,
                    "Kept stored object outside the creator folder"
                );
                continue;
            }
            if let Err(e) = self.storage.delete_object(path).await {
                tracing::warn!(
                    resource_id = %resource.id,
                    path,
                    error = %e,
                    "Stored object left behind after delete"
                );
            }
        }

        tracing::info!(resource_id = %resource.id, creator_id = %creator_id, "Resource deleted");
        Ok(())
    }
}
