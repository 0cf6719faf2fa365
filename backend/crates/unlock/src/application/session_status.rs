//! Session Status Use Cases
//!
//! Polling and teardown of an unlock session.

use crate::application::now_ms;
use crate::application::session_store::{SessionSnapshot, UnlockSessionStore};
use crate::error::{UnlockError, UnlockResult};
use kernel::id::UnlockSessionId;
use platform::visitor::VisitorFingerprint;
use std::sync::Arc;

pub struct SessionStatusUseCase {
    store: Arc<UnlockSessionStore>,
}

impl SessionStatusUseCase {
    pub fn new(store: Arc<UnlockSessionStore>) -> Self {
        Self { store }
    }

    /// Current state, remaining countdown and any still-visible error
    pub async fn execute(
        &self,
        session_id: UnlockSessionId,
        visitor: &VisitorFingerprint,
    ) -> UnlockResult<SessionSnapshot> {
        let now = now_ms();
        let (_slot, mut guard) = self.store.checkout(session_id, visitor, now).await?;
        Ok(SessionSnapshot::capture(&mut guard.session, now))
    }
}

/// The visitor left the unlock view
pub struct CloseSessionUseCase {
    store: Arc<UnlockSessionStore>,
}

impl CloseSessionUseCase {
    pub fn new(store: Arc<UnlockSessionStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        session_id: UnlockSessionId,
        visitor: &VisitorFingerprint,
    ) -> UnlockResult<()> {
        // Ownership check; the guard is released before removal
        self.store
            .checkout(session_id, visitor, now_ms())
            .await?;
        if !self.store.remove(session_id).await {
            return Err(UnlockError::SessionNotFound);
        }
        tracing::debug!(session_id = %session_id, "Unlock session closed");
        Ok(())
    }
}
