use super::{ProgressReporter, SignedUploadService, UploadFile};
use crate::models::{HostUploadResponse, UploadAuthorization};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};

const DEFAULT_HOST_URL: &str = "https://api.cloudinary.com";
const CHUNK_SIZE: usize = 64 * 1024;

/// Uploads through a signature issued by the trusted backend.
///
/// No retry and no local timeout: a failed attempt surfaces immediately and a
/// slow one is bounded only by the transport.
pub struct SignedUploadClient {
    client: Client,
    signature_url: String,
    host_url: String,
}

impl SignedUploadClient {
    pub fn new(signature_url: String) -> Self {
        Self::new_with_client(signature_url, DEFAULT_HOST_URL.to_string(), Client::new())
    }

    pub fn new_with_client(signature_url: String, host_url: String, client: Client) -> Self {
        Self {
            client,
            signature_url,
            host_url: host_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_authorization(&self) -> Result<UploadAuthorization> {
        tracing::debug!("Requesting upload signature from {}", self.signature_url);

        let response = self
            .client
            .get(&self.signature_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach signing backend: {}", e);
                Error::AuthorizationFetchFailed(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::AuthorizationFetchFailed(e.to_string()))?;

        if !status.is_success() {
            tracing::error!("Signing backend error (status {}): {}", status, body);
            return Err(Error::AuthorizationFetchFailed(format!(
                "signing backend returned status {}",
                status
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse upload signature: {}\nBody: {}", e, body);
            Error::AuthorizationFetchFailed(format!("malformed signature payload: {}", e))
        })
    }

    fn upload_url(&self, cloud_name: &str) -> String {
        format!("{}/v1_1/{}/image/upload", self.host_url, cloud_name)
    }

    fn build_form(
        auth: &UploadAuthorization,
        file: &UploadFile,
        progress: &ProgressReporter,
    ) -> Result<Form> {
        let total = file.len();
        let bytes = file.bytes().clone();
        let chunks: Vec<Bytes> = (0..bytes.len())
            .step_by(CHUNK_SIZE)
            .map(|start| bytes.slice(start..(start + CHUNK_SIZE).min(bytes.len())))
            .collect();

        let reporter = progress.clone();
        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            reporter.report(sent, total);
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.file_name().to_string())
            .mime_str(file.content_type())
            .map_err(|e| Error::UploadFailed(format!("invalid content type: {}", e)))?;

        Ok(Form::new()
            .text("folder", auth.folder.clone())
            .text("upload_preset", auth.upload_preset.clone())
            .text("timestamp", auth.timestamp.to_string())
            .text("signature", auth.signature.clone())
            .text("api_key", auth.api_key.clone())
            .part("file", part))
    }
}

/// The host must hand back an absolute http(s) URL.
pub fn validate_locator(locator: &str) -> Result<Url> {
    let url = Url::parse(locator)
        .map_err(|e| Error::UploadFailed(format!("invalid secure_url '{}': {}", locator, e)))?;

    if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
        return Err(Error::UploadFailed(format!(
            "secure_url is not a web URL: {}",
            locator
        )));
    }
    Ok(url)
}

#[async_trait]
impl SignedUploadService for SignedUploadClient {
    async fn upload(&self, file: &UploadFile, progress: &ProgressReporter) -> Result<String> {
        let auth = self.fetch_authorization().await?;
        let url = self.upload_url(&auth.cloud_name);
        let form = Self::build_form(&auth, file, progress)?;

        tracing::info!(
            "Uploading {} ({} bytes) to folder '{}'",
            file.file_name(),
            file.len(),
            auth.folder
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Upload transfer failed: {}", e);
                Error::UploadFailed(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::UploadFailed(e.to_string()))?;

        if !status.is_success() {
            tracing::error!("Media host response (status {}): {}", status, body);
            return Err(Error::UploadFailed(format!(
                "media host returned status {}",
                status
            )));
        }

        let parsed: HostUploadResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse media host response: {}\nBody: {}", e, body);
            Error::UploadFailed(format!("unreadable media host response: {}", e))
        })?;

        let locator = parsed
            .secure_url
            .ok_or_else(|| Error::UploadFailed("media host response has no secure_url".to_string()))?;
        validate_locator(&locator)?;

        tracing::info!(
            "Upload stored as {} ({})",
            locator,
            parsed.public_id.as_deref().unwrap_or("no public id")
        );
        Ok(locator)
    }
}
