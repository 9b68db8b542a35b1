//! Backup channel uploader.
//!
//! Best-effort redundancy: the backup channel has its own credential set and
//! two fixed destination playlists, one per recording kind. A failed playlist
//! attachment is logged and swallowed; only a failed core upload surfaces as
//! a [`BackupError`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use classcast_core::RecordingKind;

use crate::error::{BackupError, UploadError};
use crate::youtube::{resumable_upload, watch_url};

const PLAYLIST_ITEMS_ENDPOINT: &str =
    "https://www.googleapis.com/youtube/v3/playlistItems?part=snippet";

const BACKUP_PLAYLIST_CLASS: &str = "PLTggMWCaPKQwr_MALVMl_m1aQCo1qgrE1";
const BACKUP_PLAYLIST_SESSION: &str = "PLTggMWCaPKQzANMg4BVI7Zri5i3KjV-If";

/// Backup video host seam. Failure here never fails the pipeline.
#[async_trait]
pub trait BackupHost: Send + Sync {
    async fn upload_backup(
        &self,
        path: &Path,
        title: &str,
        description: &str,
        kind: RecordingKind,
    ) -> Result<String, BackupError>;
}

pub struct BackupUploader {
    client: reqwest::Client,
    access_token: String,
}

impl BackupUploader {
    pub fn new(access_token: String, timeout: Duration) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token,
        })
    }

    fn playlist_for(kind: RecordingKind) -> &'static str {
        match kind {
            RecordingKind::Class => BACKUP_PLAYLIST_CLASS,
            RecordingKind::Session => BACKUP_PLAYLIST_SESSION,
        }
    }

    async fn attach_to_playlist(
        &self,
        video_id: &str,
        playlist_id: &str,
    ) -> Result<(), UploadError> {
        let body = serde_json::json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": { "kind": "youtube#video", "videoId": video_id },
            }
        });

        let response = self
            .client
            .post(PLAYLIST_ITEMS_ENDPOINT)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl BackupHost for BackupUploader {
    #[tracing::instrument(skip(self, description), fields(file = %path.display()))]
    async fn upload_backup(
        &self,
        path: &Path,
        title: &str,
        description: &str,
        kind: RecordingKind,
    ) -> Result<String, BackupError> {
        let playlist_id = Self::playlist_for(kind);

        let metadata = serde_json::json!({
            "snippet": {
                "title": title,
                "description": description,
                "categoryId": "22",
            },
            "status": {
                "privacyStatus": "private",
                "selfDeclaredMadeForKids": false,
            },
        });

        let video_id =
            resumable_upload(&self.client, &self.access_token, path, metadata, None).await?;
        let url = watch_url(&video_id);
        tracing::info!(video_id = %video_id, url = %url, "Backup upload complete");

        // Attachment is not part of the upload contract: the backup URL is
        // valid whether or not the video made it into the playlist.
        if let Err(e) = self.attach_to_playlist(&video_id, playlist_id).await {
            tracing::warn!(
                error = %e,
                video_id = %video_id,
                playlist_id,
                "Failed to add backup video to playlist"
            );
        }

        Ok(url)
    }
}
