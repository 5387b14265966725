use super::mime::detect_image_mime;
use crate::{Error, Result};
use bytes::Bytes;
use std::path::Path;

/// A file selected for upload, held in memory.
#[derive(Debug, Clone)]
pub struct UploadFile {
    file_name: String,
    bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, refusing anything over `max_bytes` before the
    /// contents are loaded.
    pub async fn open(path: &Path, max_bytes: u64) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        ensure_within_limit(metadata.len(), max_bytes)?;

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        Ok(Self::new(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> &'static str {
        detect_image_mime(&self.bytes)
    }

    pub fn ensure_within(&self, max_bytes: u64) -> Result<()> {
        ensure_within_limit(self.len(), max_bytes)
    }
}

/// Files must be strictly smaller than the ceiling.
pub fn ensure_within_limit(size: u64, max_bytes: u64) -> Result<()> {
    if size >= max_bytes {
        return Err(Error::OversizeFile {
            size,
            limit: max_bytes,
        });
    }
    Ok(())
}
