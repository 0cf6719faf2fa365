//! In-memory Unlock Session Store
//!
//! Sessions are never persisted. Each one sits in a slot together with the
//! guard of its scheduled task (countdown or delayed task pass); dropping the
//! guard cancels the task, so removing a slot can never leave a timer behind.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::{ResourceId, UnlockSessionId};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::domain::entities::{SessionState, UnlockSession};
use crate::domain::value_objects::UnlockMethod;
use crate::error::{UnlockError, UnlockResult};
use platform::visitor::VisitorFingerprint;

pub struct SessionSlot {
    pub session: UnlockSession,
    timer: Option<DropGuard>,
}

impl SessionSlot {
    fn new(session: UnlockSession) -> Self {
        Self {
            session,
            timer: None,
        }
    }

    /// Register a scheduled task; the returned token is cancelled on teardown
    pub fn arm_timer(&mut self) -> CancellationToken {
        let token = CancellationToken::new();
        self.timer = Some(token.clone().drop_guard());
        token
    }

    /// The task finished on its own
    pub fn clear_timer(&mut self) {
        if let Some(guard) = self.timer.take() {
            guard.disarm();
        }
    }

    /// Cancel the scheduled task, if any
    pub fn cancel_timer(&mut self) {
        self.timer.take();
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }
}

pub type SharedSlot = Arc<Mutex<SessionSlot>>;

/// Read model of a session, safe to hand to the visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub id: UnlockSessionId,
    pub resource_id: ResourceId,
    pub method: UnlockMethod,
    pub state: SessionState,
    pub remaining_seconds: Option<u32>,
    pub error: Option<String>,
    pub download_url: Option<String>,
}

impl SessionSnapshot {
    pub fn capture(session: &mut UnlockSession, now_ms: i64) -> Self {
        let error = session.visible_error(now_ms).map(str::to_string);
        Self {
            id: session.id,
            resource_id: session.resource_id,
            method: session.method,
            state: session.state,
            remaining_seconds: session.remaining_seconds,
            error,
            download_url: session.download_url.clone(),
        }
    }
}

#[derive(Default)]
pub struct UnlockSessionStore {
    slots: Mutex<HashMap<UnlockSessionId, SharedSlot>>,
}

impl UnlockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: UnlockSession) -> SharedSlot {
        let id = session.id;
        let slot = Arc::new(Mutex::new(SessionSlot::new(session)));
        self.slots.lock().await.insert(id, Arc::clone(&slot));
        slot
    }

    pub async fn get(&self, id: UnlockSessionId) -> Option<SharedSlot> {
        self.slots.lock().await.get(&id).cloned()
    }

    /// Look up a session for the visitor that owns it and lock it
    pub async fn checkout(
        &self,
        id: UnlockSessionId,
        visitor: &VisitorFingerprint,
        now_ms: i64,
    ) -> UnlockResult<(SharedSlot, OwnedMutexGuard<SessionSlot>)> {
        let slot = self.get(id).await.ok_or(UnlockError::SessionNotFound)?;
        let mut guard = Arc::clone(&slot).lock_owned().await;
        if !visitor.matches(&guard.session.visitor_hash) {
            return Err(UnlockError::SessionFingerprintMismatch);
        }
        guard.session.touch(now_ms);
        Ok((slot, guard))
    }

    /// Tear a session down, cancelling any scheduled task
    pub async fn remove(&self, id: UnlockSessionId) -> bool {
        let removed = self.slots.lock().await.remove(&id);
        match removed {
            Some(slot) => {
                slot.lock().await.cancel_timer();
                true
            }
            None => false,
        }
    }

    /// Drop sessions idle for at least `idle_ms`
    pub async fn purge_idle(&self, now_ms: i64, idle_ms: i64) -> usize {
        let snapshot: Vec<(UnlockSessionId, SharedSlot)> = self
            .slots
            .lock()
            .await
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();

        let mut purged = 0;
        for (id, slot) in snapshot {
            let idle = now_ms - slot.lock().await.session.last_seen_ms >= idle_ms;
            if idle && self.remove(id).await {
                purged += 1;
            }
        }

        if purged > 0 {
            tracing::info!(sessions = purged, "Purged idle unlock sessions");
        }
        purged
    }

    /// `purge_idle` against the current time
    pub async fn sweep_idle(&self, idle_ms: i64) -> usize {
        self.purge_idle(crate::application::now_ms(), idle_ms).await
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}
