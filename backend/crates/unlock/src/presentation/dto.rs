//! API DTOs (Data Transfer Objects)

use crate::application::manage_resources::{CreateResourceInput, DashboardOutput};
use crate::application::public_profile::{PublicProfile, PublicResource};
use crate::application::session_store::SessionSnapshot;
use crate::application::start_verification::StartOutput;
use crate::domain::entities::{CreatorProfile, Resource, SessionState};
use crate::domain::value_objects::{FileType, UnlockMethod};
use chrono::{DateTime, Utc};
use kernel::id::{CreatorId, ResourceId, UnlockSessionId};
use serde::{Deserialize, Serialize};

/// Resource as any visitor may see it: no code, no task link, no file path
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicResourceResponse {
    pub id: ResourceId,
    pub creator_id: CreatorId,
    pub title: String,
    pub description: String,
    pub file_type: FileType,
    pub unlock_method: UnlockMethod,
    pub unlock_count: i64,
    pub preview_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PublicResourceResponse {
    pub fn new(resource: Resource, preview_url: Option<String>) -> Self {
        Self {
            id: resource.id,
            creator_id: resource.creator_id,
            title: resource.title,
            description: resource.description,
            file_type: resource.file_type,
            unlock_method: resource.unlock_method,
            unlock_count: resource.unlock_count,
            preview_url,
            created_at: resource.created_at,
        }
    }
}

impl From<PublicResource> for PublicResourceResponse {
    fn from(card: PublicResource) -> Self {
        Self::new(card.resource, card.preview_url)
    }
}

/// Response for GET /api/creators/{creator_id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfileResponse {
    pub creator_id: CreatorId,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub total_resources: usize,
    pub total_unlocks: i64,
}

impl From<PublicProfile> for CreatorProfileResponse {
    fn from(p: PublicProfile) -> Self {
        Self {
            creator_id: p.profile.creator_id,
            display_name: p.profile.display_name,
            bio: p.profile.bio,
            avatar_url: p.avatar_url,
            total_resources: p.total_resources,
            total_unlocks: p.total_unlocks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: UnlockSessionId,
    pub resource_id: ResourceId,
    pub unlock_method: UnlockMethod,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(s: SessionSnapshot) -> Self {
        Self {
            session_id: s.id,
            resource_id: s.resource_id,
            unlock_method: s.method,
            state: s.state,
            remaining_seconds: s.remaining_seconds,
            error: s.error,
            download_url: s.download_url,
        }
    }
}

/// Response for POST /api/unlock/resources/{resource_id}/sessions
#[derive(Debug, Clone, Serialize)]
pub struct OpenSessionResponse {
    pub resource: PublicResourceResponse,
    pub session: SessionResponse,
}

/// Request for POST /api/unlock/sessions/{session_id}/code
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitCodeRequest {
    pub code: String,
}

/// Response for POST /api/unlock/sessions/{session_id}/start
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub session: SessionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_url: Option<String>,
}

impl From<StartOutput> for StartResponse {
    fn from(output: StartOutput) -> Self {
        Self {
            session: output.session.into(),
            task_url: output.task_url,
        }
    }
}

/// Resource as its creator sees it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedResourceResponse {
    pub id: ResourceId,
    pub title: String,
    pub description: String,
    pub file_type: FileType,
    pub file_url: String,
    pub preview_image: Option<String>,
    pub unlock_method: UnlockMethod,
    pub unlock_requirement: String,
    pub unlock_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Resource> for OwnedResourceResponse {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            file_type: r.file_type,
            file_url: r.file_url.as_str().to_string(),
            preview_image: r.preview_image.map(|p| p.as_str().to_string()),
            unlock_method: r.unlock_method,
            unlock_requirement: r.unlock_requirement,
            unlock_count: r.unlock_count,
            created_at: r.created_at,
        }
    }
}

/// The creator's own profile, with stored paths rather than signed links
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnProfileResponse {
    pub display_name: String,
    pub bio: String,
    pub avatar: Option<String>,
}

impl From<CreatorProfile> for OwnProfileResponse {
    fn from(p: CreatorProfile) -> Self {
        Self {
            display_name: p.display_name,
            bio: p.bio,
            avatar: p.avatar.map(|a| a.as_str().to_string()),
        }
    }
}

/// Response for GET /api/dashboard/resources
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub creator_id: CreatorId,
    pub profile: OwnProfileResponse,
    pub total_resources: usize,
    pub total_unlocks: i64,
    pub resources: Vec<OwnedResourceResponse>,
}

impl From<DashboardOutput> for DashboardResponse {
    fn from(output: DashboardOutput) -> Self {
        Self {
            creator_id: output.profile.creator_id,
            profile: output.profile.into(),
            total_resources: output.resources.len(),
            total_unlocks: output.total_unlocks,
            resources: output.resources.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request for POST /api/dashboard/resources
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub file_type: FileType,
    pub file_url: String,
    #[serde(default)]
    pub preview_image: Option<String>,
    pub unlock_method: UnlockMethod,
    pub unlock_requirement: String,
}

impl From<CreateResourceRequest> for CreateResourceInput {
    fn from(req: CreateResourceRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            file_type: req.file_type,
            file_url: req.file_url,
            preview_image: req.preview_image,
            unlock_method: req.unlock_method,
            unlock_requirement: req.unlock_requirement,
        }
    }
}
