//! Submit Code Use Case
//!
//! Checks a visitor's code for a `MANUAL_CODE` session.

use crate::application::config::UnlockConfig;
use crate::application::grant_access::GrantAccessUseCase;
use crate::application::now_ms;
use crate::application::session_store::{SessionSnapshot, UnlockSessionStore};
use crate::domain::gateway::ObjectStorage;
use crate::domain::repository::ResourceRepository;
use crate::domain::services::{evaluate, Outcome};
use crate::domain::value_objects::UnlockMethod;
use crate::error::{UnlockError, UnlockResult, INVALID_CODE_MESSAGE};
use kernel::id::UnlockSessionId;
use platform::visitor::VisitorFingerprint;
use std::sync::Arc;

pub struct SubmitCodeInput {
    pub session_id: UnlockSessionId,
    pub visitor: VisitorFingerprint,
    pub code: String,
}

pub struct SubmitCodeUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    store: Arc<UnlockSessionStore>,
    grant: GrantAccessUseCase<R, S>,
    config: Arc<UnlockConfig>,
}

impl<R, S> SubmitCodeUseCase<R, S>
where
    R: ResourceRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    pub fn new(
        store: Arc<UnlockSessionStore>,
        grant: GrantAccessUseCase<R, S>,
        config: Arc<UnlockConfig>,
    ) -> Self {
        Self {
            store,
            grant,
            config,
        }
    }

    /// A wrong code leaves the session `Locked` and returns `InvalidCode`;
    /// the visitor may retry without limit.
    pub async fn execute(&self, input: SubmitCodeInput) -> UnlockResult<SessionSnapshot> {
        let now = now_ms();
        let (_slot, mut guard) = self
            .store
            .checkout(input.session_id, &input.visitor, now)
            .await?;
        let session = &mut guard.session;

        if session.is_unlocked() {
            return Ok(SessionSnapshot::capture(session, now));
        }
        if session.method != UnlockMethod::ManualCode {
            return Err(UnlockError::UnsupportedAction(
                "Codes are only accepted for MANUAL_CODE resources",
            ));
        }

        let evaluation = evaluate(session.method, &session.requirement, Some(&input.code))?;
        match evaluation.outcome {
            Outcome::Pass => {
                session.record_passed_attempt(&input.code);
                self.grant.execute(session).await?;
                Ok(SessionSnapshot::capture(session, now_ms()))
            }
            Outcome::Fail | Outcome::Pending => {
                session.record_failed_attempt(
                    &input.code,
                    INVALID_CODE_MESSAGE,
                    now,
                    self.config.error_display_ms(),
                );
                tracing::info!(
                    session_id = %session.id,
                    resource_id = %session.resource_id,
                    "Invalid code submitted"
                );
                Err(UnlockError::InvalidCode)
            }
        }
    }
}
