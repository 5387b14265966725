//! Direct-to-host media uploads
//!
//! Fetches a short-lived signed authorization from the trusted backend, then
//! streams the file to the media host as multipart form data while
//! publishing percentage progress.

pub mod client;
pub mod file;
pub mod mime;
pub mod mock;
pub mod progress;

pub use client::SignedUploadClient;
pub use file::UploadFile;
pub use mock::MockSignedUploadClient;
pub use progress::{progress_channel, ProgressReporter};

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SignedUploadService: Send + Sync {
    /// Upload one file and return the host's stable secure URL.
    async fn upload(&self, file: &UploadFile, progress: &ProgressReporter) -> Result<String>;
}
