//! HTTP Handlers

use crate::application::claim_access::ClaimAccessUseCase;
use crate::application::config::UnlockConfig;
use crate::application::grant_access::GrantAccessUseCase;
use crate::application::manage_resources::{
    CreateResourceUseCase, CreatorDashboardUseCase, DeleteResourceUseCase,
};
use crate::application::open_session::OpenSessionUseCase;
use crate::application::public_profile::{GetCreatorProfileUseCase, ListPublicResourcesUseCase};
use crate::application::session_status::{CloseSessionUseCase, SessionStatusUseCase};
use crate::application::session_store::UnlockSessionStore;
use crate::application::start_verification::StartVerificationUseCase;
use crate::application::submit_code::{SubmitCodeInput, SubmitCodeUseCase};
use crate::domain::gateway::{IdentityProvider, ObjectStorage};
use crate::domain::repository::{CreatorRepository, ResourceRepository};
use crate::error::UnlockResult;
use crate::presentation::dto::{
    CreateResourceRequest, CreatorProfileResponse, DashboardResponse, OpenSessionResponse,
    OwnedResourceResponse, PublicResourceResponse, SessionResponse, StartResponse,
    SubmitCodeRequest,
};
use crate::presentation::extract::Visitor;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use kernel::id::{CreatorId, ResourceId, UnlockSessionId};
use platform::visitor::bearer_token;
use std::sync::Arc;

/// Shared state for unlock handlers
pub struct UnlockAppState<R, C, S, I> {
    pub resource_repo: Arc<R>,
    pub creator_repo: Arc<C>,
    pub storage: Arc<S>,
    pub identity: Arc<I>,
    pub sessions: Arc<UnlockSessionStore>,
    pub config: Arc<UnlockConfig>,
}

impl<R, C, S, I> Clone for UnlockAppState<R, C, S, I> {
    fn clone(&self) -> Self {
        Self {
            resource_repo: Arc::clone(&self.resource_repo),
            creator_repo: Arc::clone(&self.creator_repo),
            storage: Arc::clone(&self.storage),
            identity: Arc::clone(&self.identity),
            sessions: Arc::clone(&self.sessions),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R, C, S, I> UnlockAppState<R, C, S, I>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    pub fn new(
        resource_repo: R,
        creator_repo: C,
        storage: S,
        identity: I,
        config: UnlockConfig,
    ) -> Self {
        Self {
            resource_repo: Arc::new(resource_repo),
            creator_repo: Arc::new(creator_repo),
            storage: Arc::new(storage),
            identity: Arc::new(identity),
            sessions: Arc::new(UnlockSessionStore::new()),
            config: Arc::new(config),
        }
    }

    pub(crate) fn grant(&self) -> GrantAccessUseCase<R, S> {
        GrantAccessUseCase::new(
            self.resource_repo.clone(),
            self.storage.clone(),
            self.config.clone(),
        )
    }
}

/// POST /api/unlock/resources/{resource_id}/sessions
pub async fn open_session<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(resource_id): Path<ResourceId>,
    Visitor(fingerprint): Visitor,
) -> UnlockResult<impl IntoResponse>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = OpenSessionUseCase::new(
        state.resource_repo.clone(),
        state.storage.clone(),
        state.sessions.clone(),
        state.config.clone(),
    );
    let output = use_case.execute(resource_id, &fingerprint).await?;

    Ok((
        StatusCode::CREATED,
        Json(OpenSessionResponse {
            resource: PublicResourceResponse::new(output.resource, output.preview_url),
            session: output.session.into(),
        }),
    ))
}

/// GET /api/unlock/sessions/{session_id}
pub async fn session_status<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(session_id): Path<UnlockSessionId>,
    Visitor(fingerprint): Visitor,
) -> UnlockResult<Json<SessionResponse>>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = SessionStatusUseCase::new(state.sessions.clone());
    let snapshot = use_case.execute(session_id, &fingerprint).await?;

    Ok(Json(snapshot.into()))
}

/// POST /api/unlock/sessions/{session_id}/code
pub async fn submit_code<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(session_id): Path<UnlockSessionId>,
    Visitor(fingerprint): Visitor,
    Json(req): Json<SubmitCodeRequest>,
) -> UnlockResult<Json<SessionResponse>>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case =
        SubmitCodeUseCase::new(state.sessions.clone(), state.grant(), state.config.clone());
    let snapshot = use_case
        .execute(SubmitCodeInput {
            session_id,
            visitor: fingerprint,
            code: req.code,
        })
        .await?;

    Ok(Json(snapshot.into()))
}

/// POST /api/unlock/sessions/{session_id}/start
pub async fn start_verification<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(session_id): Path<UnlockSessionId>,
    Visitor(fingerprint): Visitor,
) -> UnlockResult<Json<StartResponse>>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = StartVerificationUseCase::new(
        state.sessions.clone(),
        state.grant(),
        state.config.clone(),
    );
    let output = use_case.execute(session_id, &fingerprint).await?;

    Ok(Json(output.into()))
}

/// POST /api/unlock/sessions/{session_id}/claim
pub async fn claim_access<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(session_id): Path<UnlockSessionId>,
    Visitor(fingerprint): Visitor,
) -> UnlockResult<Json<SessionResponse>>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = ClaimAccessUseCase::new(state.sessions.clone(), state.grant());
    let snapshot = use_case.execute(session_id, &fingerprint).await?;

    Ok(Json(snapshot.into()))
}

/// DELETE /api/unlock/sessions/{session_id}
pub async fn close_session<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(session_id): Path<UnlockSessionId>,
    Visitor(fingerprint): Visitor,
) -> UnlockResult<StatusCode>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = CloseSessionUseCase::new(state.sessions.clone());
    use_case.execute(session_id, &fingerprint).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/creators/{creator_id}
pub async fn creator_profile<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(creator_id): Path<CreatorId>,
) -> UnlockResult<Json<CreatorProfileResponse>>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = GetCreatorProfileUseCase::new(
        state.resource_repo.clone(),
        state.creator_repo.clone(),
        state.storage.clone(),
        state.config.clone(),
    );
    let profile = use_case.execute(creator_id).await?;

    Ok(Json(profile.into()))
}

/// GET /api/creators/{creator_id}/resources
pub async fn list_public_resources<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(creator_id): Path<CreatorId>,
) -> UnlockResult<Json<Vec<PublicResourceResponse>>>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = ListPublicResourcesUseCase::new(
        state.resource_repo.clone(),
        state.storage.clone(),
        state.config.clone(),
    );
    let cards = use_case.execute(creator_id).await?;

    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

/// GET /api/dashboard/resources
pub async fn dashboard<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    headers: HeaderMap,
) -> UnlockResult<Json<DashboardResponse>>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = CreatorDashboardUseCase::new(
        state.resource_repo.clone(),
        state.creator_repo.clone(),
        state.identity.clone(),
    );
    let output = use_case.execute(bearer_token(&headers)).await?;

    Ok(Json(output.into()))
}

/// POST /api/dashboard/resources
pub async fn create_resource<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    headers: HeaderMap,
    Json(req): Json<CreateResourceRequest>,
) -> UnlockResult<impl IntoResponse>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case =
        CreateResourceUseCase::new(state.resource_repo.clone(), state.identity.clone());
    let resource = use_case
        .execute(bearer_token(&headers), req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OwnedResourceResponse::from(resource)),
    ))
}

/// DELETE /api/dashboard/resources/{resource_id}
pub async fn delete_resource<R, C, S, I>(
    State(state): State<UnlockAppState<R, C, S, I>>,
    Path(resource_id): Path<ResourceId>,
    headers: HeaderMap,
) -> UnlockResult<StatusCode>
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = DeleteResourceUseCase::new(
        state.resource_repo.clone(),
        state.storage.clone(),
        state.identity.clone(),
    );
    use_case.execute(bearer_token(&headers), resource_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
