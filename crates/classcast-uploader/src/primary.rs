//! Primary channel uploader.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use classcast_core::UploadedVideo;

use crate::error::UploadError;
use crate::youtube::{resumable_upload, watch_url, ProgressFn};

/// Primary video host seam. Success here is required for pipeline success.
#[async_trait]
pub trait VideoHost: Send + Sync {
    async fn upload_primary(
        &self,
        path: &Path,
        title: &str,
        description: &str,
    ) -> Result<UploadedVideo, UploadError>;
}

/// Primary channel client. Uploads are always `unlisted`; visibility is a
/// fixed policy, not a per-call choice.
pub struct PrimaryUploader {
    client: reqwest::Client,
    access_token: String,
    progress: Option<ProgressFn>,
}

impl PrimaryUploader {
    pub fn new(access_token: String, timeout: Duration) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token,
            progress: None,
        })
    }

    /// Install an advisory byte-progress callback.
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }
}

#[async_trait]
impl VideoHost for PrimaryUploader {
    #[tracing::instrument(skip(self, description), fields(file = %path.display()))]
    async fn upload_primary(
        &self,
        path: &Path,
        title: &str,
        description: &str,
    ) -> Result<UploadedVideo, UploadError> {
        let metadata = serde_json::json!({
            "snippet": { "title": title, "description": description },
            "status": { "privacyStatus": "unlisted" },
        });

        let video_id = resumable_upload(
            &self.client,
            &self.access_token,
            path,
            metadata,
            self.progress.clone(),
        )
        .await?;

        let url = watch_url(&video_id);
        tracing::info!(video_id = %video_id, url = %url, "Primary upload complete");

        Ok(UploadedVideo { video_id, url })
    }
}
