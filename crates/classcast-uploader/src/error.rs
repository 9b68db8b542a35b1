//! Upload error types.

/// Primary (or core backup) upload failure. Fatal for the file: nothing is
/// persisted and the source file stays in place for retry.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upload initiation returned no resumable session URL")]
    NoUploadUrl,

    #[error("upload rejected with status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider answered without a transport error but the response
    /// carried no video id. Treated as a hard failure.
    #[error("upload response contained no video id")]
    NoVideoId,
}

/// Failure of the backup channel's core upload. Propagated to the caller but
/// never allowed to affect the already-completed primary outcome; playlist
/// attachment failures are logged and swallowed before this type is reached.
#[derive(Debug, thiserror::Error)]
#[error("backup upload failed: {0}")]
pub struct BackupError(#[from] pub UploadError);
