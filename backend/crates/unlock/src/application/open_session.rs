//! Open Session Use Case
//!
//! A visitor lands on the unlock view of a resource.

use crate::application::config::UnlockConfig;
use crate::application::grant_access::resolve_reference;
use crate::application::now_ms;
use crate::application::session_store::{SessionSnapshot, UnlockSessionStore};
use crate::domain::entities::{Resource, UnlockSession};
use crate::domain::gateway::ObjectStorage;
use crate::domain::repository::ResourceRepository;
use crate::domain::value_objects::UnlockRequirement;
use crate::error::{UnlockError, UnlockResult};
use kernel::id::ResourceId;
use platform::visitor::VisitorFingerprint;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct OpenSessionOutput {
    pub resource: Resource,
    /// Resolved preview link, absent when none is set or it could not be signed
    pub preview_url: Option<String>,
    pub session: SessionSnapshot,
}

pub struct OpenSessionUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    resource_repo: Arc<R>,
    storage: Arc<S>,
    store: Arc<UnlockSessionStore>,
    config: Arc<UnlockConfig>,
}

impl<R, S> OpenSessionUseCase<R, S>
where
    R: ResourceRepository,
    S: ObjectStorage,
{
    pub fn new(
        resource_repo: Arc<R>,
        storage: Arc<S>,
        store: Arc<UnlockSessionStore>,
        config: Arc<UnlockConfig>,
    ) -> Self {
        Self {
            resource_repo,
            storage,
            store,
            config,
        }
    }

    pub async fn execute(
        &self,
        resource_id: ResourceId,
        fingerprint: &VisitorFingerprint,
    ) -> UnlockResult<OpenSessionOutput> {
        let resource = self
            .resource_repo
            .get_by_id(resource_id)
            .await?
            .ok_or(UnlockError::ResourceNotFound)?;

        // Refuse to open anything we could never evaluate
        let requirement =
            match UnlockRequirement::parse(resource.unlock_method, &resource.unlock_requirement) {
                Ok(requirement) => requirement,
                Err(e) => {
                    tracing::error!(
                        resource_id = %resource.id,
                        unlock_method = %resource.unlock_method,
                        error = %e,
                        "Stored unlock requirement is malformed"
                    );
                    return Err(e);
                }
            };

        if !resource.file_url.is_owned_by(resource.creator_id) {
            tracing::error!(
                resource_id = %resource.id,
                creator_id = %resource.creator_id,
                "Stored file lies outside the creator folder"
            );
            return Err(UnlockError::DataIntegrity(
                "file reference outside the creator folder".into(),
            ));
        }

        let countdown = match requirement {
            UnlockRequirement::Delay(delay) => Some(delay.get()),
            _ => None,
        };

        let mut session = UnlockSession::new(&resource, fingerprint.hash, countdown);
        let snapshot = SessionSnapshot::capture(&mut session, now_ms());
        self.store.insert(session).await;

        let preview_url = match &resource.preview_image {
            Some(reference) => {
                match resolve_reference(self.storage.as_ref(), reference, self.config.signed_url_ttl)
                    .await
                {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::warn!(
                            resource_id = %resource.id,
                            error = %e,
                            "Preview image could not be resolved"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        tracing::info!(
            session_id = %snapshot.id,
            resource_id = %resource.id,
            unlock_method = %resource.unlock_method,
            ip = ?fingerprint.ip,
            "Unlock session opened"
        );

        Ok(OpenSessionOutput {
            resource,
            preview_url,
            session: snapshot,
        })
    }
}
