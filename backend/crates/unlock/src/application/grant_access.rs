//! Grant Access Use Case
//!
//! Runs on the transition into `Unlocked`: resolve the download link, then
//! count the unlock. The link is resolved first so that a storage failure
//! leaves the session locked (fail closed).

use crate::application::config::UnlockConfig;
use crate::application::now_ms;
use crate::domain::entities::UnlockSession;
use crate::domain::gateway::ObjectStorage;
use crate::domain::repository::ResourceRepository;
use crate::domain::value_objects::FileReference;
use crate::error::{UnlockError, UnlockResult};
use kernel::id::ResourceId;
use std::sync::Arc;
use std::time::Duration;

/// Shown when the requirement was met but the link could not be prepared
pub const GRANT_FAILED_MESSAGE: &str = "Download link could not be prepared. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub download_url: String,
}

pub struct GrantAccessUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    resource_repo: Arc<R>,
    storage: Arc<S>,
    config: Arc<UnlockConfig>,
}

impl<R, S> Clone for GrantAccessUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    fn clone(&self) -> Self {
        Self {
            resource_repo: Arc::clone(&self.resource_repo),
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R, S> GrantAccessUseCase<R, S>
where
    R: ResourceRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    pub fn new(resource_repo: Arc<R>, storage: Arc<S>, config: Arc<UnlockConfig>) -> Self {
        Self {
            resource_repo,
            storage,
            config,
        }
    }

    /// Issue the grant for a session whose requirement is met
    ///
    /// Idempotent: an already unlocked session returns its existing grant and
    /// the counter is only incremented on the first transition.
    pub async fn execute(&self, session: &mut UnlockSession) -> UnlockResult<AccessGrant> {
        if session.is_unlocked() {
            if let Some(download_url) = &session.download_url {
                return Ok(AccessGrant {
                    download_url: download_url.clone(),
                });
            }
        }
        if !session.requirement_met {
            return Err(UnlockError::RequirementNotMet);
        }

        let download_url = match resolve_reference(
            self.storage.as_ref(),
            &session.file_url,
            self.config.signed_url_ttl,
        )
        .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    session_id = %session.id,
                    resource_id = %session.resource_id,
                    error = %e,
                    "Download link resolution failed, session stays locked"
                );
                session.show_error(
                    GRANT_FAILED_MESSAGE,
                    now_ms(),
                    self.config.error_display_ms(),
                );
                return Err(match e {
                    UnlockError::CollaboratorUnavailable(_) => e,
                    other => UnlockError::CollaboratorUnavailable(other.to_string()),
                });
            }
        };

        if session.unlock(download_url.clone())? {
            tracing::info!(
                session_id = %session.id,
                resource_id = %session.resource_id,
                unlock_method = %session.method,
                "Resource unlocked"
            );
            self.spawn_counter_increment(session.resource_id);
        }

        Ok(AccessGrant { download_url })
    }

    /// Fire-and-forget; a lost increment must never cost the visitor access
    fn spawn_counter_increment(&self, resource_id: ResourceId) {
        let repo = Arc::clone(&self.resource_repo);
        tokio::spawn(async move {
            match repo.increment_unlock_counter(resource_id).await {
                Ok(unlock_count) => {
                    tracing::debug!(
                        resource_id = %resource_id,
                        unlock_count,
                        "Unlock counter incremented"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        resource_id = %resource_id,
                        error = %e,
                        "Unlock counter increment failed"
                    );
                }
            }
        });
    }
}

/// Turn a stored file reference into a link a browser can fetch
///
/// Internal paths get a signed URL valid for `ttl`; external URLs pass through.
pub async fn resolve_reference<S>(
    storage: &S,
    reference: &FileReference,
    ttl: Duration,
) -> UnlockResult<String>
where
    S: ObjectStorage,
{
    match reference {
        FileReference::External(url) => Ok(url.clone()),
        FileReference::Internal(path) => storage.create_signed_download_url(path, ttl).await,
    }
}
