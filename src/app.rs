//! Application wiring for the admin dashboard core.

use crate::content::{ContentClient, ContentService, ContentSnapshot};
use crate::editor::ContentEditor;
use crate::models::Config;
use crate::orchestrator::UploadOrchestrator;
use crate::session::{AdminSession, FileSessionStore, SessionGate, SessionStore};
use crate::upload::{SignedUploadClient, SignedUploadService};
use crate::{Error, Result};
use reqwest::Url;
use std::sync::Arc;
use tracing::info;

/// Holds the backend clients and hands out session-gated components.
pub struct App {
    content: Arc<dyn ContentService>,
    uploader: Arc<dyn SignedUploadService>,
    gate: SessionGate,
    max_upload_bytes: u64,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub content: Arc<dyn ContentService>,
    pub uploader: Arc<dyn SignedUploadService>,
    pub session_store: Arc<dyn SessionStore>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// `login_url` is still needed because the gate performs the login call
    /// itself.
    pub fn with_services(services: AppServices, login_url: String, max_upload_bytes: u64) -> Self {
        Self {
            content: services.content,
            uploader: services.uploader,
            gate: SessionGate::new(services.session_store, login_url),
            max_upload_bytes,
        }
    }

    pub fn new(config: &Config) -> Result<Self> {
        for (name, url) in [
            ("CONTENT_API_URL", &config.content_api_url),
            ("SIGNATURE_URL", &config.signature_url),
            ("LOGIN_URL", &config.login_url),
            ("MEDIA_HOST_URL", &config.media_host_url),
        ] {
            Url::parse(url).map_err(|e| Error::Config(format!("{} '{}' is not a URL: {}", name, url, e)))?;
        }

        // One connection pool for the content API, signature endpoint, media host and login.
        let http_client = reqwest::Client::new();

        info!("Content API: {}", config.content_api_url);
        info!("Session file: {}", config.session_file.display());

        let content = ContentClient::new_with_client(config.content_api_url.clone(), http_client.clone());
        let uploader = SignedUploadClient::new_with_client(
            config.signature_url.clone(),
            config.media_host_url.clone(),
            http_client.clone(),
        );
        let store = FileSessionStore::new(config.session_file.clone());

        Ok(Self {
            content: Arc::new(content),
            uploader: Arc::new(uploader),
            gate: SessionGate::new_with_client(Arc::new(store), config.login_url.clone(), http_client),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn admit(&self) -> Result<AdminSession> {
        self.gate.admit()
    }

    pub fn orchestrator(&self, session: &AdminSession) -> UploadOrchestrator {
        UploadOrchestrator::new(self.uploader.clone(), self.content.clone(), session)
            .with_max_upload_bytes(self.max_upload_bytes)
    }

    pub fn editor<'a>(&'a self, session: &AdminSession) -> ContentEditor<'a> {
        ContentEditor::new(self.content.as_ref(), session)
    }

    /// Direct read/write access to the content API.
    pub fn content(&self, _session: &AdminSession) -> &dyn ContentService {
        self.content.as_ref()
    }

    pub async fn refresh(&self, _session: &AdminSession) -> ContentSnapshot {
        ContentSnapshot::fetch(self.content.as_ref()).await
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }
}
