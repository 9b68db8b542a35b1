//! End-to-end orchestrator tests against mock collaborators.
//!
//! The store and both video hosts are replaced by in-memory mocks so every
//! transition of the per-file state machine can be asserted without a
//! database or network.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use classcast_core::{ExtractorConfig, ParseError, RecordingKind, SubjectMap, UploadRecord, UploadedVideo};
use classcast_db::{PersistError, RecordingStore};
use classcast_pipeline::{Pipeline, PipelineError, PipelineOutcome};
use classcast_uploader::{BackupError, BackupHost, UploadError, VideoHost};

fn db_down() -> PersistError {
    PersistError::Database(sqlx::Error::PoolClosed)
}

#[derive(Default)]
struct MockStore {
    recorded: Mutex<HashSet<String>>,
    last_insert: Mutex<Option<(RecordingKind, String)>>,
    insert_calls: AtomicUsize,
    patched: Mutex<Option<(String, String)>>,
    fail_dedup: bool,
    fail_insert: bool,
}

#[async_trait]
impl RecordingStore for MockStore {
    async fn already_processed(
        &self,
        _kind: RecordingKind,
        source_filename: &str,
    ) -> Result<bool, PersistError> {
        if self.fail_dedup {
            return Err(db_down());
        }
        Ok(self.recorded.lock().unwrap().contains(source_filename))
    }

    async fn insert_primary(
        &self,
        record: &UploadRecord,
        _video: &UploadedVideo,
    ) -> Result<u64, PersistError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            return Err(db_down());
        }
        self.recorded
            .lock()
            .unwrap()
            .insert(record.source_filename().to_string());
        *self.last_insert.lock().unwrap() = Some((record.kind(), record.title()));
        Ok(1)
    }

    async fn patch_backup_url(
        &self,
        _kind: RecordingKind,
        video_id: &str,
        url: &str,
    ) -> Result<(), PersistError> {
        *self.patched.lock().unwrap() = Some((video_id.to_string(), url.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct MockPrimary {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl VideoHost for MockPrimary {
    async fn upload_primary(
        &self,
        _path: &Path,
        _title: &str,
        _description: &str,
    ) -> Result<UploadedVideo, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(UploadError::NoVideoId);
        }
        Ok(UploadedVideo {
            video_id: "vid123".to_string(),
            url: "https://www.youtube.com/watch?v=vid123".to_string(),
        })
    }
}

#[derive(Default)]
struct MockBackup {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl BackupHost for MockBackup {
    async fn upload_backup(
        &self,
        _path: &Path,
        _title: &str,
        _description: &str,
        _kind: RecordingKind,
    ) -> Result<String, BackupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(UploadError::NoVideoId.into());
        }
        Ok("https://www.youtube.com/watch?v=backup456".to_string())
    }
}

fn pipeline(
    store: Arc<MockStore>,
    primary: Arc<MockPrimary>,
    backup: Arc<MockBackup>,
) -> Pipeline {
    Pipeline::new(
        store,
        primary,
        backup,
        SubjectMap::default(),
        ExtractorConfig::default(),
    )
}

fn class_file() -> PathBuf {
    PathBuf::from("/inbox/Class_2024-05-01_2024-05_Lee_UNIX_b7.mp4")
}

#[tokio::test]
async fn class_file_reaches_done_with_backup_patched() {
    let store = Arc::new(MockStore::default());
    let primary = Arc::new(MockPrimary::default());
    let backup = Arc::new(MockBackup::default());
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let outcome = pipeline.process_file(&class_file()).await.unwrap();

    assert_eq!(
        outcome,
        PipelineOutcome::Done {
            backup_url: Some("https://www.youtube.com/watch?v=backup456".to_string())
        }
    );
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *store.patched.lock().unwrap(),
        Some((
            "vid123".to_string(),
            "https://www.youtube.com/watch?v=backup456".to_string()
        ))
    );
}

#[tokio::test]
async fn second_presentation_is_a_duplicate_skip() {
    let store = Arc::new(MockStore::default());
    let primary = Arc::new(MockPrimary::default());
    let backup = Arc::new(MockBackup::default());
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let first = pipeline.process_file(&class_file()).await.unwrap();
    assert!(matches!(first, PipelineOutcome::Done { .. }));

    let second = pipeline.process_file(&class_file()).await.unwrap();
    assert_eq!(second, PipelineOutcome::DuplicateSkip);

    // Exactly one upload and one insert across both presentations.
    assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_subject_spends_no_upload_quota() {
    let store = Arc::new(MockStore::default());
    let primary = Arc::new(MockPrimary::default());
    let backup = Arc::new(MockBackup::default());
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let err = pipeline
        .process_file(Path::new("/inbox/Class_2024-05-01_2024-05_Lee_Basketry_b7.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Parse(ParseError::UnknownSubject(_))
    ));
    assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn backup_failure_never_reopens_the_primary_outcome() {
    let store = Arc::new(MockStore::default());
    let primary = Arc::new(MockPrimary::default());
    let backup = Arc::new(MockBackup {
        fail: true,
        ..Default::default()
    });
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let outcome = pipeline.process_file(&class_file()).await.unwrap();

    assert_eq!(outcome, PipelineOutcome::Done { backup_url: None });
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backup.calls.load(Ordering::SeqCst), 1);
    // No patch without a backup url; the record stands with backup_url NULL.
    assert_eq!(*store.patched.lock().unwrap(), None);
}

#[tokio::test]
async fn persist_failure_is_reported_distinctly_from_upload_failure() {
    let store = Arc::new(MockStore {
        fail_insert: true,
        ..Default::default()
    });
    let primary = Arc::new(MockPrimary::default());
    let backup = Arc::new(MockBackup::default());
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let err = pipeline.process_file(&class_file()).await.unwrap_err();

    match err {
        PipelineError::Persist { video_id, .. } => assert_eq!(video_id, "vid123"),
        other => panic!("expected Persist, got {other:?}"),
    }
    // The backup stage never runs when the primary insert failed.
    assert_eq!(backup.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn primary_upload_failure_skips_persistence_and_backup() {
    let store = Arc::new(MockStore::default());
    let primary = Arc::new(MockPrimary {
        fail: true,
        ..Default::default()
    });
    let backup = Arc::new(MockBackup::default());
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let err = pipeline.process_file(&class_file()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Upload(UploadError::NoVideoId)));
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backup.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn inconclusive_dedup_check_fails_closed() {
    let store = Arc::new(MockStore {
        fail_dedup: true,
        ..Default::default()
    });
    let primary = Arc::new(MockPrimary::default());
    let backup = Arc::new(MockBackup::default());
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let err = pipeline.process_file(&class_file()).await.unwrap_err();

    assert!(matches!(err, PipelineError::DedupCheck(_)));
    assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn session_file_is_recorded_under_its_source_filename() {
    let store = Arc::new(MockStore::default());
    let primary = Arc::new(MockPrimary::default());
    let backup = Arc::new(MockBackup::default());
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let outcome = pipeline
        .process_file(Path::new("/inbox/Session_2024-05-02_42_Patel_GroupMock.mp4"))
        .await
        .unwrap();

    assert!(matches!(outcome, PipelineOutcome::Done { .. }));
    assert_eq!(
        *store.last_insert.lock().unwrap(),
        Some((
            RecordingKind::Session,
            "Session_2024-05-02_42_Patel_GroupMock.mp4".to_string()
        ))
    );
}

#[tokio::test]
async fn non_recording_filenames_are_rejected_before_any_io() {
    let store = Arc::new(MockStore::default());
    let primary = Arc::new(MockPrimary::default());
    let backup = Arc::new(MockBackup::default());
    let pipeline = pipeline(store.clone(), primary.clone(), backup.clone());

    let err = pipeline
        .process_file(Path::new("/inbox/Lecture_2024-05-01.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Parse(ParseError::UnknownKind(_))
    ));
    assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
}
