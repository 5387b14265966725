use super::{ProgressReporter, SignedUploadService, UploadFile};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub struct MockSignedUploadClient {
    base_url: String,
    locators: Arc<Mutex<Vec<String>>>,
    uploaded: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockSignedUploadClient {
    pub fn new() -> Self {
        Self {
            base_url: "https://mock-media.example.com".to_string(),
            locators: Arc::new(Mutex::new(Vec::new())),
            uploaded: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Queue a locator to return; queued locators are handed out in order.
    pub fn with_locator(self, locator: String) -> Self {
        self.locators.lock().unwrap().push(locator);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_uploaded_files(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }
}

impl Default for MockSignedUploadClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignedUploadService for MockSignedUploadClient {
    async fn upload(&self, file: &UploadFile, progress: &ProgressReporter) -> Result<String> {
        *self.call_count.lock().unwrap() += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(Error::UploadFailed("Mock failure".to_string()));
        }

        progress.report(file.len() / 2, file.len());
        progress.report(file.len(), file.len());

        self.uploaded
            .lock()
            .unwrap()
            .push(file.file_name().to_string());

        let mut locators = self.locators.lock().unwrap();
        if locators.is_empty() {
            Ok(format!(
                "{}/{}-{}",
                self.base_url,
                Uuid::new_v4(),
                file.file_name()
            ))
        } else {
            Ok(locators.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::progress_channel;

    #[tokio::test]
    async fn test_mock_upload_returns_queued_locators_in_order() {
        let client = MockSignedUploadClient::new()
            .with_locator("https://host/1.jpg".to_string())
            .with_locator("https://host/2.jpg".to_string());
        let file = UploadFile::new("a.jpg", vec![1u8, 2, 3, 4]);

        let first = client.upload(&file, &ProgressReporter::detached()).await.unwrap();
        let second = client.upload(&file, &ProgressReporter::detached()).await.unwrap();

        assert_eq!(first, "https://host/1.jpg");
        assert_eq!(second, "https://host/2.jpg");
        assert_eq!(client.get_call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_upload_default_locator_uses_base_url() {
        let client = MockSignedUploadClient::new().with_base_url("https://cdn.test".to_string());
        let (reporter, rx) = progress_channel();

        let locator = client
            .upload(&UploadFile::new("pic.png", vec![0u8; 10]), &reporter)
            .await
            .unwrap();

        assert!(locator.starts_with("https://cdn.test/"));
        assert!(locator.ends_with("-pic.png"));
        assert_eq!(*rx.borrow(), 100);
        assert_eq!(client.get_uploaded_files(), vec!["pic.png".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_upload_failure() {
        let client = MockSignedUploadClient::new().with_failure(true);
        let result = client
            .upload(&UploadFile::new("a.jpg", vec![1u8]), &ProgressReporter::detached())
            .await;

        assert!(matches!(result, Err(Error::UploadFailed(_))));
        assert_eq!(client.get_call_count(), 1);
        assert!(client.get_uploaded_files().is_empty());
    }
}
