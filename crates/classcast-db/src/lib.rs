//! Classcast database layer.
//!
//! Persistence for upload records lives behind the [`RecordingStore`] trait
//! so the pipeline can be tested against mocks without a database. The
//! production implementation, [`SqlRecordingStore`], talks to the existing
//! MySQL schema (`recording`, `session`, `recording_batch`) over a bounded
//! sqlx pool.

mod error;
mod pool;
mod store;

pub use error::PersistError;
pub use pool::connect_pool;
pub use store::{RecordingStore, SqlRecordingStore};
