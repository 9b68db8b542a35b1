//! Classcast core: domain models, filename metadata extraction, and
//! configuration for the recording upload pipeline.
//!
//! Everything in this crate is pure (no I/O); the database, upload, and
//! pipeline crates build on these types.

pub mod config;
pub mod extract;
pub mod models;
pub mod subjects;

pub use config::Config;
pub use extract::{extract, ExtractorConfig, FilenameFormat, ParseError};
pub use models::{
    ClassRecord, RecordingKind, SessionRecord, SessionType, UploadRecord, UploadedVideo,
    MAX_TITLE_LEN,
};
pub use subjects::SubjectMap;
