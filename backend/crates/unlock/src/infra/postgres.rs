//! PostgreSQL Repository Implementation

use crate::domain::entities::{CreatorProfile, Resource};
use crate::domain::repository::{CreatorRepository, ResourceRepository};
use crate::domain::value_objects::FileReference;
use crate::error::{UnlockError, UnlockResult};
use chrono::{DateTime, Utc};
use kernel::id::{CreatorId, ResourceId};
use sqlx::PgPool;
use uuid::Uuid;

const RESOURCE_COLUMNS: &str = r#"
    resource_id,
    creator_id,
    title,
    description,
    file_type,
    file_url,
    preview_image,
    unlock_method,
    unlock_requirement,
    unlock_count,
    created_at
"#;

/// PostgreSQL-backed resource repository
#[derive(Clone)]
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ResourceRepository for PgResourceRepository {
    async fn get_by_id(&self, id: ResourceId) -> UnlockResult<Option<Resource>> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE resource_id = $1"
        ))
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ResourceRow::into_resource).transpose()
    }

    async fn list_by_creator(&self, creator_id: CreatorId) -> UnlockResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE creator_id = $1 ORDER BY created_at DESC"
        ))
        .bind(creator_id.into_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ResourceRow::into_resource).collect()
    }

    async fn create(&self, resource: &Resource) -> UnlockResult<()> {
        sqlx::query(
            r#"
            INSERT INTO resources (
                resource_id,
                creator_id,
                title,
                description,
                file_type,
                file_url,
                preview_image,
                unlock_method,
                unlock_requirement,
                unlock_count,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(resource.id.into_uuid())
        .bind(resource.creator_id.into_uuid())
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(resource.file_type.as_str())
        .bind(resource.file_url.as_str())
        .bind(resource.preview_image.as_ref().map(FileReference::as_str))
        .bind(resource.unlock_method.as_str())
        .bind(&resource.unlock_requirement)
        .bind(resource.unlock_count)
        .bind(resource.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(resource_id = %resource.id, "Resource row inserted");
        Ok(())
    }

    async fn delete(
        &self,
        id: ResourceId,
        creator_id: CreatorId,
    ) -> UnlockResult<Option<Resource>> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "DELETE FROM resources WHERE resource_id = $1 AND creator_id = $2 RETURNING {RESOURCE_COLUMNS}"
        ))
        .bind(id.into_uuid())
        .bind(creator_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ResourceRow::into_resource).transpose()
    }

    async fn increment_unlock_counter(&self, id: ResourceId) -> UnlockResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE resources
            SET unlock_count = unlock_count + 1
            WHERE resource_id = $1
            RETURNING unlock_count
            "#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        count.ok_or(UnlockError::ResourceNotFound)
    }
}

/// PostgreSQL-backed creator profile repository
#[derive(Clone)]
pub struct PgCreatorRepository {
    pool: PgPool,
}

impl PgCreatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CreatorRepository for PgCreatorRepository {
    async fn get_profile(&self, creator_id: CreatorId) -> UnlockResult<Option<CreatorProfile>> {
        let row = sqlx::query_as::<_, CreatorRow>(
            r#"
            SELECT creator_id, display_name, bio, avatar_url
            FROM creators
            WHERE creator_id = $1
            "#,
        )
        .bind(creator_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CreatorRow::into_profile).transpose()
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct CreatorRow {
    creator_id: Uuid,
    display_name: String,
    bio: String,
    avatar_url: Option<String>,
}

impl CreatorRow {
    fn into_profile(self) -> UnlockResult<CreatorProfile> {
        Ok(CreatorProfile {
            creator_id: self.creator_id.into(),
            display_name: self.display_name,
            bio: self.bio,
            avatar: self
                .avatar_url
                .as_deref()
                .filter(|raw| !raw.trim().is_empty())
                .map(FileReference::parse)
                .transpose()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ResourceRow {
    resource_id: Uuid,
    creator_id: Uuid,
    title: String,
    description: String,
    file_type: String,
    file_url: String,
    preview_image: Option<String>,
    unlock_method: String,
    unlock_requirement: String,
    unlock_count: i64,
    created_at: DateTime<Utc>,
}

impl ResourceRow {
    fn into_resource(self) -> UnlockResult<Resource> {
        Ok(Resource {
            id: self.resource_id.into(),
            creator_id: self.creator_id.into(),
            title: self.title,
            description: self.description,
            file_type: self.file_type.parse()?,
            file_url: FileReference::parse(&self.file_url)?,
            preview_image: self
                .preview_image
                .as_deref()
                .filter(|raw| !raw.trim().is_empty())
                .map(FileReference::parse)
                .transpose()?,
            unlock_method: self.unlock_method.parse()?,
            unlock_requirement: self.unlock_requirement,
            unlock_count: self.unlock_count,
            created_at: self.created_at,
        })
    }
}
