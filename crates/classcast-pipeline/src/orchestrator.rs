//! Per-file upload orchestration.
//!
//! One detected file walks a fixed sequence of awaited stages:
//!
//! ```text
//! Detected → Deduped → MetadataOk → PrimaryUploaded → Persisted
//!          → BackupAttempted → Done
//! ```
//!
//! Stages never reorder and never nest. Everything up to the primary insert
//! is fatal-on-error and leaves the source file untouched for retry; once
//! the primary row is committed, backup work is strictly best-effort and can
//! no longer fail the file.

use std::path::Path;
use std::sync::Arc;

use classcast_core::{
    extract, ExtractorConfig, ParseError, RecordingKind, SubjectMap, UploadRecord, UploadedVideo,
};
use classcast_db::{PersistError, RecordingStore};
use classcast_uploader::{BackupHost, UploadError, VideoHost};

/// Terminal success states for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Primary path complete. `backup_url` is `None` when the backup upload
    /// failed or its URL could not be patched; that is a valid terminal
    /// state, not an error.
    Done { backup_url: Option<String> },
    /// The filename is already recorded; nothing was uploaded.
    DuplicateSkip,
}

/// Terminal error states for one file. Each leaves the source file in place.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The dedup check was inconclusive. Uploading anyway could burn quota
    /// on a duplicate, so the pipeline fails closed.
    #[error("dedup check failed, refusing to upload: {0}")]
    DedupCheck(#[source] PersistError),

    #[error("metadata extraction failed: {0}")]
    Parse(#[from] ParseError),

    #[error("primary upload failed: {0}")]
    Upload(#[from] UploadError),

    /// The insert failed after a successful upload: the video now exists
    /// remotely with no local record. Surfaced distinctly because it cannot
    /// self-heal.
    #[error("record insert failed after upload; video {video_id} has no local record: {source}")]
    Persist {
        video_id: String,
        #[source]
        source: PersistError,
    },
}

/// The upload orchestrator. Collaborators are injected behind trait objects;
/// the subject map and extractor configuration are immutable for the life of
/// the pipeline.
pub struct Pipeline {
    store: Arc<dyn RecordingStore>,
    primary: Arc<dyn VideoHost>,
    backup: Arc<dyn BackupHost>,
    subjects: SubjectMap,
    extractor: ExtractorConfig,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn RecordingStore>,
        primary: Arc<dyn VideoHost>,
        backup: Arc<dyn BackupHost>,
        subjects: SubjectMap,
        extractor: ExtractorConfig,
    ) -> Self {
        Self {
            store,
            primary,
            backup,
            subjects,
            extractor,
        }
    }

    /// Process one detected file to a terminal state.
    #[tracing::instrument(skip(self), fields(file = %path.display()))]
    pub async fn process_file(&self, path: &Path) -> Result<PipelineOutcome, PipelineError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(ParseError::MissingField("filename"))?;

        // Kind is sniffed once from the prefix so the dedup query can hit the
        // right table before any extraction or upload work happens.
        let kind = RecordingKind::from_filename(filename).ok_or_else(|| {
            ParseError::UnknownKind(filename.split('_').next().unwrap_or("").to_string())
        })?;

        if self
            .store
            .already_processed(kind, filename)
            .await
            .map_err(PipelineError::DedupCheck)?
        {
            tracing::info!(%filename, "Already uploaded and recorded, skipping");
            return Ok(PipelineOutcome::DuplicateSkip);
        }

        let record = extract(&self.subjects, &self.extractor, filename)?;
        let title = record.title();
        let description = record.description();

        let video = self.primary.upload_primary(path, &title, &description).await?;

        self.store
            .insert_primary(&record, &video)
            .await
            .map_err(|source| {
                tracing::error!(
                    video_id = %video.video_id,
                    url = %video.url,
                    error = %source,
                    "INSERT FAILED AFTER UPLOAD: remote video has no local record"
                );
                PipelineError::Persist {
                    video_id: video.video_id.clone(),
                    source,
                }
            })?;

        let backup_url = self.attempt_backup(path, &record, &video).await;

        Ok(PipelineOutcome::Done { backup_url })
    }

    /// Backup stage. Runs unconditionally after persistence; every failure
    /// in here is logged and swallowed.
    async fn attempt_backup(
        &self,
        path: &Path,
        record: &UploadRecord,
        video: &UploadedVideo,
    ) -> Option<String> {
        let url = match self
            .backup
            .upload_backup(path, &record.title(), &record.description(), record.kind())
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file = %record.source_filename(),
                    "Backup upload failed; record stands without a backup url"
                );
                return None;
            }
        };

        if let Err(e) = self
            .store
            .patch_backup_url(record.kind(), &video.video_id, &url)
            .await
        {
            tracing::warn!(
                error = %e,
                video_id = %video.video_id,
                backup_url = %url,
                "Backup uploaded but url patch failed"
            );
        }

        Some(url)
    }
}
