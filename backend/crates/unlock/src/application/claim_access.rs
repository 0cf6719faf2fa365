//! Claim Access Use Case
//!
//! Lets a visitor pick up the grant once the requirement is met, and retries
//! link resolution after a storage failure left the session locked.

use crate::application::grant_access::GrantAccessUseCase;
use crate::application::now_ms;
use crate::application::session_store::{SessionSnapshot, UnlockSessionStore};
use crate::domain::gateway::ObjectStorage;
use crate::domain::repository::ResourceRepository;
use crate::error::UnlockResult;
use kernel::id::UnlockSessionId;
use platform::visitor::VisitorFingerprint;
use std::sync::Arc;

pub struct ClaimAccessUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    store: Arc<UnlockSessionStore>,
    grant: GrantAccessUseCase<R, S>,
}

impl<R, S> ClaimAccessUseCase<R, S>
where
    R: ResourceRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    pub fn new(store: Arc<UnlockSessionStore>, grant: GrantAccessUseCase<R, S>) -> Self {
        Self { store, grant }
    }

    pub async fn execute(
        &self,
        session_id: UnlockSessionId,
        visitor: &VisitorFingerprint,
    ) -> UnlockResult<SessionSnapshot> {
        let (_slot, mut guard) = self
            .store
            .checkout(session_id, visitor, now_ms())
            .await?;
        self.grant.execute(&mut guard.session).await?;
        Ok(SessionSnapshot::capture(&mut guard.session, now_ms()))
    }
}
