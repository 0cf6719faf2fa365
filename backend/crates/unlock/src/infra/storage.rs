//! Supabase Storage Adapter
//!
//! Talks to the Storage REST API with the service key. Signed URLs come back
//! relative to `/storage/v1` and are made absolute here.

use crate::domain::gateway::ObjectStorage;
use crate::error::{UnlockError, UnlockResult};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BUCKET: &str = "Lockflow";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    pub service_key: String,
    pub bucket: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    expires_in: u64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: [&'a str; 1],
}

#[derive(Clone)]
pub struct SupabaseStorage {
    http: Client,
    api_root: Url,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(config: StorageConfig) -> UnlockResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| UnlockError::Internal(format!("storage client: {}", e)))?;

        let api_root = Url::parse(&format!(
            "{}/storage/v1",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|e| UnlockError::Internal(format!("storage url: {}", e)))?;

        Ok(Self {
            http,
            api_root,
            service_key: config.service_key,
            bucket: config.bucket,
        })
    }

    /// `{api_root}/{segments...}/{object path}`, each piece percent-encoded
    fn endpoint(&self, segments: &[&str], object_path: &str) -> UnlockResult<Url> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|_| UnlockError::Internal("storage url cannot be a base".into()))?
            .extend(segments)
            .extend(object_path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn unavailable(context: &str, e: impl std::fmt::Display) -> UnlockError {
        UnlockError::CollaboratorUnavailable(format!("storage {}: {}", context, e))
    }
}

impl ObjectStorage for SupabaseStorage {
    async fn create_signed_download_url(&self, path: &str, ttl: Duration) -> UnlockResult<String> {
        let url = self.endpoint(&["object", "sign", self.bucket.as_str()], path)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&SignRequest {
                expires_in: ttl.as_secs(),
            })
            .send()
            .await
            .map_err(|e| Self::unavailable("sign request", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), body = %body, "Signed URL rejected");
            return Err(Self::unavailable("sign", status));
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable("sign response", e))?;

        Ok(format!("{}{}", self.api_root.as_str().trim_end_matches('/'), signed.signed_url))
    }

    async fn delete_object(&self, path: &str) -> UnlockResult<()> {
        let url = self.endpoint(&["object", self.bucket.as_str()], "")?;

        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&RemoveRequest { prefixes: [path] })
            .send()
            .await
            .map_err(|e| Self::unavailable("delete request", e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                tracing::debug!(path, "Object already gone");
                Ok(())
            }
            status => Err(Self::unavailable("delete", status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SupabaseStorage {
        SupabaseStorage::new(StorageConfig {
            base_url: "https://project.supabase.co/".into(),
            service_key: "service".into(),
            bucket: DEFAULT_BUCKET.into(),
        })
        .unwrap()
    }

    #[test]
    fn test_sign_endpoint() {
        let url = storage()
            .endpoint(&["object", "sign", "Lockflow"], "c1/resources/r1/My File.pdf")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/storage/v1/object/sign/Lockflow/c1/resources/r1/My%20File.pdf"
        );
    }

    #[test]
    fn test_remove_endpoint() {
        let url = storage().endpoint(&["object", "Lockflow"], "").unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/storage/v1/object/Lockflow"
        );
    }

    #[test]
    fn test_sign_body() {
        let json = serde_json::to_string(&SignRequest { expires_in: 3600 }).unwrap();
        assert_eq!(json, r#"{"expiresIn":3600}"#);
        let json = serde_json::to_string(&RemoveRequest { prefixes: ["a/b.zip"] }).unwrap();
        assert_eq!(json, r#"{"prefixes":["a/b.zip"]}"#);
    }
}
