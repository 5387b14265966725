//! Upload orchestration
//!
//! Drives one upload at a time: size check, signed upload, exactly one
//! metadata write for the chosen slot, then a full content refresh.
//!
//! `submit` takes `&mut self`, so one orchestrator can never have two uploads
//! in flight.

use crate::content::{ContentService, ContentSnapshot};
use crate::editor::modify_entity;
use crate::models::{EntityImage, EntityKind, NewGalleryItem, DEFAULT_MAX_UPLOAD_BYTES};
use crate::session::AdminSession;
use crate::upload::{progress_channel, ProgressReporter, SignedUploadService, UploadFile};
use crate::{Error, Result};
use chrono::Local;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// Where an uploaded image ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Hero,
    About,
    /// Gallery entry titled "Profile Photo" in the `profile` category.
    Profile,
    Gallery { category: String, title: String },
    ServiceImage { service_id: String, title: Option<String> },
    AwardImage { award_id: String, title: Option<String> },
}

impl Slot {
    /// Blank or missing values fall back to `general` / `Gallery Image`.
    pub fn gallery(category: Option<String>, title: Option<String>) -> Self {
        let present = |value: &String| !value.trim().is_empty();
        Slot::Gallery {
            category: category
                .filter(present)
                .unwrap_or_else(|| "general".to_string()),
            title: title
                .filter(present)
                .unwrap_or_else(|| "Gallery Image".to_string()),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Hero => write!(f, "hero"),
            Slot::About => write!(f, "about"),
            Slot::Profile => write!(f, "profile"),
            Slot::Gallery { .. } => write!(f, "gallery"),
            Slot::ServiceImage { .. } => write!(f, "service"),
            Slot::AwardImage { .. } => write!(f, "award"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading,
    MetadataWriting,
    Done,
    Failed,
}

pub struct UploadOrchestrator {
    uploader: Arc<dyn SignedUploadService>,
    content: Arc<dyn ContentService>,
    progress: ProgressReporter,
    state: UploadState,
    snapshot: ContentSnapshot,
    max_upload_bytes: u64,
}

impl UploadOrchestrator {
    pub fn new(
        uploader: Arc<dyn SignedUploadService>,
        content: Arc<dyn ContentService>,
        _session: &AdminSession,
    ) -> Self {
        let (progress, _) = progress_channel();
        Self {
            uploader,
            content,
            progress,
            state: UploadState::Idle,
            snapshot: ContentSnapshot::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Latest percentage (0–100) of the current or last upload.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    pub fn snapshot(&self) -> &ContentSnapshot {
        &self.snapshot
    }

    pub async fn refresh(&mut self) -> &ContentSnapshot {
        self.snapshot = ContentSnapshot::fetch(self.content.as_ref()).await;
        &self.snapshot
    }

    /// Upload `file` and attach the resulting locator to `slot`'s record.
    /// Returns the locator.
    ///
    /// A failed metadata write leaves the uploaded object unreferenced on the
    /// media host; nothing is rolled back.
    pub async fn submit(&mut self, file: &UploadFile, slot: Slot) -> Result<String> {
        file.ensure_within(self.max_upload_bytes).map_err(|e| {
            error!("Rejected {}: {}", file.file_name(), e);
            e
        })?;

        self.progress.reset();
        self.state = UploadState::Uploading;
        info!("Starting {} upload for {}", slot, file.file_name());

        let locator = match self.uploader.upload(file, &self.progress).await {
            Ok(locator) => locator,
            Err(e) => {
                self.state = UploadState::Failed;
                error!("Upload failed: {}", e);
                return Err(e);
            }
        };

        self.state = UploadState::MetadataWriting;
        if let Err(e) = self.attach(&slot, &locator).await {
            self.state = UploadState::Failed;
            error!(
                "Uploaded {} but could not attach it to {}: {}",
                locator, slot, e
            );
            return Err(Error::MetadataWriteFailed {
                slot: slot.to_string(),
                locator,
                reason: e.to_string(),
            });
        }

        self.refresh().await;
        self.state = UploadState::Done;
        info!("{} image uploaded successfully", capitalize(&slot.to_string()));

        Ok(locator)
    }

    async fn attach(&self, slot: &Slot, locator: &str) -> Result<()> {
        let content = self.content.as_ref();

        match slot {
            Slot::Hero => {
                let mut hero = content.get_hero().await?;
                hero.image = Some(locator.to_string());
                content.put_hero(&hero).await?;
            }
            Slot::About => {
                let mut about = content.get_about().await?;
                about.image = Some(locator.to_string());
                content.put_about(&about).await?;
            }
            Slot::Profile => {
                self.create_gallery_item(locator, "Profile Photo", "profile")
                    .await?;
            }
            Slot::Gallery { category, title } => {
                self.create_gallery_item(locator, title, category).await?;
            }
            Slot::ServiceImage { service_id, title } => {
                self.attach_entity_image(EntityKind::Service, service_id, title.as_deref(), locator)
                    .await?;
            }
            Slot::AwardImage { award_id, title } => {
                self.attach_entity_image(EntityKind::Award, award_id, title.as_deref(), locator)
                    .await?;
            }
        }

        Ok(())
    }

    async fn create_gallery_item(&self, locator: &str, title: &str, category: &str) -> Result<()> {
        let item = NewGalleryItem {
            title: title.to_string(),
            image: locator.to_string(),
            category: category.to_string(),
            description: format!("Uploaded {}", Local::now().format("%-m/%-d/%Y")),
        };
        self.content.create_gallery_item(&item).await?;
        Ok(())
    }

    async fn attach_entity_image(
        &self,
        kind: EntityKind,
        id: &str,
        title: Option<&str>,
        locator: &str,
    ) -> Result<()> {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(kind.default_image_title())
            .to_string();
        let image = EntityImage::new(locator, title);

        modify_entity(self.content.as_ref(), kind, id, move |record| {
            record.attach_image(image);
            true
        })
        .await?;

        info!("Attached image to {} {}", kind, id);
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
