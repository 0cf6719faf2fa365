//! Start Verification Use Case
//!
//! `LOCKED -> VERIFYING` for the two methods that complete on their own:
//! `TIME_DELAY` arms a countdown that ticks once per period, and
//! `TASK_VERIFICATION` hands out the task link and passes after a grace
//! window. Both run as background tasks tied to the session slot, so closing
//! the session cancels them.

use crate::application::config::UnlockConfig;
use crate::application::grant_access::GrantAccessUseCase;
use crate::application::now_ms;
use crate::application::session_store::{SessionSnapshot, SharedSlot, UnlockSessionStore};
use crate::domain::entities::{SessionState, Tick};
use crate::domain::gateway::ObjectStorage;
use crate::domain::repository::ResourceRepository;
use crate::domain::services::{evaluate, SideEffect};
use crate::domain::value_objects::UnlockMethod;
use crate::error::{UnlockError, UnlockResult};
use kernel::id::UnlockSessionId;
use platform::visitor::VisitorFingerprint;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct StartOutput {
    pub session: SessionSnapshot,
    /// Link the visitor should open, for `TASK_VERIFICATION`
    pub task_url: Option<String>,
}

pub struct StartVerificationUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    store: Arc<UnlockSessionStore>,
    grant: GrantAccessUseCase<R, S>,
    config: Arc<UnlockConfig>,
}

impl<R, S> StartVerificationUseCase<R, S>
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

    /// Repeating `start` on a running or finished session returns its current
    /// state without re-arming anything.
    pub async fn execute(
        &self,
        session_id: UnlockSessionId,
        visitor: &VisitorFingerprint,
    ) -> UnlockResult<StartOutput> {
        let now = now_ms();
        let (slot, mut guard) = self.store.checkout(session_id, visitor, now).await?;

        if guard.session.method == UnlockMethod::ManualCode {
            return Err(UnlockError::UnsupportedAction(
                "MANUAL_CODE resources are unlocked by submitting a code",
            ));
        }

        let evaluation = evaluate(guard.session.method, &guard.session.requirement, None)?;
        let task_url = match &evaluation.side_effect {
            Some(SideEffect::OpenExternal(url)) => Some(url.clone()),
            _ => None,
        };

        if guard.session.state != SessionState::Locked {
            return Ok(StartOutput {
                session: SessionSnapshot::capture(&mut guard.session, now),
                task_url,
            });
        }

        match evaluation.side_effect {
            Some(SideEffect::StartCountdown(seconds)) => {
                guard.session.begin_countdown(seconds)?;
                let token = guard.arm_timer();
                self.spawn_countdown(&slot, token);
                tracing::info!(
                    session_id = %guard.session.id,
                    resource_id = %guard.session.resource_id,
                    seconds,
                    "Countdown started"
                );
            }
            Some(SideEffect::OpenExternal(_)) => {
                guard.session.begin_task()?;
                let token = guard.arm_timer();
                self.spawn_task_grace(&slot, token);
                tracing::info!(
                    session_id = %guard.session.id,
                    resource_id = %guard.session.resource_id,
                    "Task link handed out"
                );
            }
            None => {
                return Err(UnlockError::Internal(
                    "pending evaluation without side effect".into(),
                ));
            }
        }

        Ok(StartOutput {
            session: SessionSnapshot::capture(&mut guard.session, now),
            task_url,
        })
    }

    fn spawn_countdown(&self, slot: &SharedSlot, token: CancellationToken) {
        let weak = Arc::downgrade(slot);
        let grant = self.grant.clone();
        let period = self.config.countdown_period;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = ticker.tick() => {}
                }

                let Some(slot) = weak.upgrade() else {
                    return;
                };
                let mut guard = slot.lock().await;
                // Closed while we waited for the lock
                if token.is_cancelled() {
                    return;
                }

                match guard.session.tick() {
                    Ok(Tick::Remaining(_)) => {}
                    Ok(Tick::Elapsed) => {
                        guard.clear_timer();
                        if let Err(e) = grant.execute(&mut guard.session).await {
                            tracing::warn!(
                                session_id = %guard.session.id,
                                error = %e,
                                "Grant after countdown failed"
                            );
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::debug!(session_id = %guard.session.id, error = %e, "Countdown stopped");
                        guard.clear_timer();
                        return;
                    }
                }
            }
        });
    }

    fn spawn_task_grace(&self, slot: &SharedSlot, token: CancellationToken) {
        let weak = Arc::downgrade(slot);
        let grant = self.grant.clone();
        let grace = self.config.task_grace;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(grace) => {}
            }

            let Some(slot) = weak.upgrade() else {
                return;
            };
            let mut guard = slot.lock().await;
            if token.is_cancelled() {
                return;
            }
            guard.clear_timer();

            if let Err(e) = guard.session.complete_task() {
                tracing::debug!(session_id = %guard.session.id, error = %e, "Task pass skipped");
                return;
            }
            if let Err(e) = grant.execute(&mut guard.session).await {
                tracing::warn!(
                    session_id = %guard.session.id,
                    error = %e,
                    "Grant after task failed"
                );
            }
        });
    }
}
