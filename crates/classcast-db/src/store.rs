//! Upload record persistence.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;

use classcast_core::{ClassRecord, RecordingKind, SessionRecord, UploadRecord, UploadedVideo};

use crate::error::PersistError;

/// Storage seam for the pipeline: dedup reads, the transactional primary
/// insert, and the later backup-URL patch. Mock implementations stand in for
/// this trait in pipeline tests.
#[async_trait]
pub trait RecordingStore: Send + Sync {
    /// Dedup gate: has this filename already been recorded in the
    /// kind-specific table? An `Err` here is inconclusive and the caller must
    /// fail closed (no upload).
    async fn already_processed(
        &self,
        kind: RecordingKind,
        source_filename: &str,
    ) -> Result<bool, PersistError>;

    /// Insert the primary upload outcome. Runs as a single transaction and
    /// returns the new row id. For class recordings a best-effort
    /// batch-linking write follows the commit; its failure is logged only.
    async fn insert_primary(
        &self,
        record: &UploadRecord,
        video: &UploadedVideo,
    ) -> Result<u64, PersistError>;

    /// Patch the backup URL onto the previously inserted row, keyed by video
    /// id. Idempotent; last write wins.
    async fn patch_backup_url(
        &self,
        kind: RecordingKind,
        video_id: &str,
        url: &str,
    ) -> Result<(), PersistError>;
}

/// MySQL-backed [`RecordingStore`].
#[derive(Clone)]
pub struct SqlRecordingStore {
    pool: MySqlPool,
}

impl SqlRecordingStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert_class(
        &self,
        class: &ClassRecord,
        video: &UploadedVideo,
    ) -> Result<u64, PersistError> {
        let last_modified = Utc::now().date_naive();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO recording
                (batchname, description, type, classdate, link, videoid,
                 subject, filename, lastmoddatetime, subject_id, backup_url)
            VALUES (?, ?, 'class', ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&class.batch_label)
        .bind(&class.clean_filename)
        .bind(&class.class_date)
        .bind(&video.url)
        .bind(&video.video_id)
        .bind(&class.subject)
        .bind(&class.source_filename)
        .bind(last_modified)
        .bind(class.subject_id)
        .execute(&mut *tx)
        .await;

        let record_id = match result {
            Ok(done) => {
                tx.commit().await?;
                done.last_insert_id()
            }
            Err(e) => {
                tx.rollback().await.ok();
                return Err(e.into());
            }
        };

        // Link the recording to its batch. This derived write is best-effort:
        // the primary row is already committed and a missing link never fails
        // the pipeline.
        if let Err(e) = sqlx::query(
            r#"
            INSERT INTO recording_batch (recording_id, batch_id)
            SELECT r.id, b.batchid
            FROM recording r
            JOIN batch b ON r.batchname = b.batchname
            WHERE r.id = ?
              AND NOT EXISTS (
                SELECT 1 FROM recording_batch rb
                WHERE rb.recording_id = r.id AND rb.batch_id = b.batchid
              )
            "#,
        )
        .bind(record_id)
        .execute(&self.pool)
        .await
        {
            tracing::warn!(
                error = %e,
                record_id,
                batch = %class.batch_label,
                "recording_batch link insert failed"
            );
        }

        Ok(record_id)
    }

    async fn insert_session(
        &self,
        session: &SessionRecord,
        video: &UploadedVideo,
    ) -> Result<u64, PersistError> {
        let last_modified = Utc::now().date_naive();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO session
                (title, status, sessiondate, type, subject, link, videoid,
                 lastmoddatetime, subject_id, backup_url)
            VALUES (?, 'Completed', ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&session.source_filename)
        .bind(&session.session_date)
        .bind(session.session_type.as_str())
        // The session table's `subject` column historically holds the
        // instructor name; the numeric subject_id is the real reference.
        .bind(&session.instructor_name)
        .bind(&video.url)
        .bind(&video.video_id)
        .bind(last_modified)
        .bind(session.subject_id)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(done) => {
                tx.commit().await?;
                Ok(done.last_insert_id())
            }
            Err(e) => {
                tx.rollback().await.ok();
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl RecordingStore for SqlRecordingStore {
    #[tracing::instrument(skip(self))]
    async fn already_processed(
        &self,
        kind: RecordingKind,
        source_filename: &str,
    ) -> Result<bool, PersistError> {
        let count: i64 = match kind {
            RecordingKind::Class => {
                sqlx::query_scalar("SELECT COUNT(*) FROM recording WHERE filename = ?")
                    .bind(source_filename)
                    .fetch_one(&self.pool)
                    .await?
            }
            RecordingKind::Session => {
                sqlx::query_scalar("SELECT COUNT(*) FROM session WHERE title = ?")
                    .bind(source_filename)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count > 0)
    }

    #[tracing::instrument(skip(self, record, video), fields(file = %record.source_filename(), video_id = %video.video_id))]
    async fn insert_primary(
        &self,
        record: &UploadRecord,
        video: &UploadedVideo,
    ) -> Result<u64, PersistError> {
        let record_id = match record {
            UploadRecord::Class(class) => self.insert_class(class, video).await?,
            UploadRecord::Session(session) => self.insert_session(session, video).await?,
        };

        tracing::info!(record_id, kind = %record.kind(), "Upload record inserted");
        Ok(record_id)
    }

    #[tracing::instrument(skip(self))]
    async fn patch_backup_url(
        &self,
        kind: RecordingKind,
        video_id: &str,
        url: &str,
    ) -> Result<(), PersistError> {
        let last_modified = Utc::now().date_naive();

        let query = match kind {
            RecordingKind::Class => {
                "UPDATE recording SET backup_url = ?, lastmoddatetime = ? WHERE videoid = ?"
            }
            RecordingKind::Session => {
                "UPDATE session SET backup_url = ?, lastmoddatetime = ? WHERE videoid = ?"
            }
        };

        let done = sqlx::query(query)
            .bind(url)
            .bind(last_modified)
            .bind(video_id)
            .execute(&self.pool)
            .await?;

        if done.rows_affected() == 0 {
            tracing::warn!(video_id, "backup url patch matched no row");
        }

        Ok(())
    }
}
