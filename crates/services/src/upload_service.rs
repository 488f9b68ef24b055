use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UploadError;

#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub endpoint: String,
    pub token: String,
}

impl UploadConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("QUITCODE_UPLOAD_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        let token = env::var("QUITCODE_UPLOAD_TOKEN").unwrap_or_default();
        Some(Self { endpoint, token })
    }
}

/// Client for the hosted file store that backs page images.
///
/// Uploads go to a bucket endpoint under a freshly generated object key; the
/// store answers with the public URL that gets embedded in page content.
/// Without configuration the service stays disabled and page editing simply
/// offers no image uploads.
#[derive(Clone)]
pub struct UploadService {
    client: Client,
    config: Option<UploadConfig>,
}

impl UploadService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(UploadConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<UploadConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Upload one file and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Disabled` when no endpoint is configured,
    /// `::HttpStatus` for non-success responses, `::EmptyUrl` when the store
    /// answers without a URL, and `::Http` for transport failures.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError> {
        let config = self.config.as_ref().ok_or(UploadError::Disabled)?;

        let key = object_key(file_name);
        let url = format!("{}/{key}", config.endpoint.trim_end_matches('/'));

        let mut request = self.client.put(url).body(bytes);
        if !config.token.is_empty() {
            request = request.bearer_auth(&config.token);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(UploadError::HttpStatus(response.status()));
        }

        let body: UploadResponse = response.json().await?;
        if body.url.trim().is_empty() {
            return Err(UploadError::EmptyUrl);
        }
        Ok(body.url)
    }
}

/// Random object key that keeps the original extension, so repeated uploads
/// of the same file name never collide.
fn object_key(file_name: &str) -> String {
    let id = Uuid::new_v4();
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{id}.{ext}"),
        _ => id.to_string(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UploadResponse {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_keep_the_extension() {
        let key = object_key("diagram.png");
        assert!(key.ends_with(".png"));
        assert_ne!(key, object_key("diagram.png"));
    }

    #[test]
    fn extensionless_names_get_a_bare_key() {
        let key = object_key("README");
        assert!(!key.contains('.'));
    }

    #[tokio::test]
    async fn disabled_service_refuses_uploads() {
        let svc = UploadService::new(None);
        assert!(!svc.enabled());
        let err = svc.upload("a.png", vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, UploadError::Disabled));
    }
}
