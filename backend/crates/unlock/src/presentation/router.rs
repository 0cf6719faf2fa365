//! Unlock Router

use crate::application::config::UnlockConfig;
use crate::domain::gateway::{IdentityProvider, ObjectStorage};
use crate::domain::repository::{CreatorRepository, ResourceRepository};
use crate::infra::identity::SignedTokenIdentity;
use crate::infra::postgres::{PgCreatorRepository, PgResourceRepository};
use crate::infra::storage::SupabaseStorage;
use crate::presentation::handlers::{self, UnlockAppState};
use axum::{
    Router,
    routing::{get, post},
};

/// State wired to PostgreSQL, Supabase storage and signed creator tokens
pub type PgUnlockAppState =
    UnlockAppState<PgResourceRepository, PgCreatorRepository, SupabaseStorage, SignedTokenIdentity>;

/// Create the unlock router with the PostgreSQL repositories and Supabase storage
///
/// Returns the state too, so the caller can sweep its sessions.
pub fn unlock_router(
    resource_repo: PgResourceRepository,
    creator_repo: PgCreatorRepository,
    storage: SupabaseStorage,
    identity: SignedTokenIdentity,
    config: UnlockConfig,
) -> (Router, PgUnlockAppState) {
    let state = UnlockAppState::new(resource_repo, creator_repo, storage, identity, config);
    (unlock_router_with_state(state.clone()), state)
}

/// Create a generic unlock router for any set of adapters
pub fn unlock_router_with_state<R, C, S, I>(state: UnlockAppState<R, C, S, I>) -> Router
where
    R: ResourceRepository + Send + Sync + 'static,
    C: CreatorRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/unlock/resources/{resource_id}/sessions",
            post(handlers::open_session::<R, C, S, I>),
        )
        .route(
            "/unlock/sessions/{session_id}",
            get(handlers::session_status::<R, C, S, I>)
                .delete(handlers::close_session::<R, C, S, I>),
        )
        .route(
            "/unlock/sessions/{session_id}/code",
            post(handlers::submit_code::<R, C, S, I>),
        )
        .route(
            "/unlock/sessions/{session_id}/start",
            post(handlers::start_verification::<R, C, S, I>),
        )
        .route(
            "/unlock/sessions/{session_id}/claim",
            post(handlers::claim_access::<R, C, S, I>),
        )
        .route(
            "/creators/{creator_id}",
            get(handlers::creator_profile::<R, C, S, I>),
        )
        .route(
            "/creators/{creator_id}/resources",
            get(handlers::list_public_resources::<R, C, S, I>),
        )
        .route(
            "/dashboard/resources",
            get(handlers::dashboard::<R, C, S, I>).post(handlers::create_resource::<R, C, S, I>),
        )
        .route(
            "/dashboard/resources/{resource_id}",
            axum::routing::delete(handlers::delete_resource::<R, C, S, I>),
        )
        .with_state(state)
}
