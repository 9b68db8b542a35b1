//! Persistence error type.

/// Failure writing to or reading from the relational store.
///
/// After a successful primary upload this is the dangerous failure mode: the
/// video exists remotely with no local record, and nothing self-heals it.
/// Callers escalate it distinctly from upload failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
