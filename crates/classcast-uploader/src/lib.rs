//! Video host clients for the upload pipeline.
//!
//! Both channels speak the YouTube Data API v3 resumable upload protocol:
//! a metadata POST that returns a session URL in the `Location` header,
//! followed by a streaming PUT of the file bytes. The primary and backup
//! uploaders hold independent clients and credentials and never share
//! mutable state.

mod backup;
mod error;
mod primary;
mod youtube;

pub use backup::{BackupHost, BackupUploader};
pub use error::{BackupError, UploadError};
pub use primary::{PrimaryUploader, VideoHost};
pub use youtube::{watch_url, ProgressFn};
