//! Domain models for one recording's trip through the pipeline.

use std::fmt;

/// Maximum title length accepted by the video host. Longer titles are
/// truncated before upload.
pub const MAX_TITLE_LEN: usize = 100;

/// The two recording families the pipeline knows about. The kind decides
/// which table a record lands in and which backup playlist receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingKind {
    Class,
    Session,
}

impl RecordingKind {
    /// Cheap discriminator used by the dedup gate before full extraction.
    /// Returns `None` when the leading token is neither `Class` nor `Session`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        match filename.split('_').next() {
            Some("Class") => Some(Self::Class),
            Some("Session") => Some(Self::Session),
            _ => None,
        }
    }
}

impl fmt::Display for RecordingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Session => write!(f, "session"),
        }
    }
}

/// Session category, reclassified from the raw filename token by a keyword
/// scan. The scan order is fixed; the first keyword found wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    GroupMock,
    IndividualMock,
    ResumeSession,
    InterviewPrep,
    JobHelp,
    InternalSessions,
    Misc,
}

impl SessionType {
    /// Scan the lower-cased filename for the first matching keyword.
    pub fn classify(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.contains("group") {
            Self::GroupMock
        } else if lower.contains("individual") {
            Self::IndividualMock
        } else if lower.contains("resume") {
            Self::ResumeSession
        } else if lower.contains("prep") || lower.contains("preparation") {
            Self::InterviewPrep
        } else if lower.contains("job") {
            Self::JobHelp
        } else if lower.contains("internal") {
            Self::InternalSessions
        } else {
            Self::Misc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupMock => "GroupMock",
            Self::IndividualMock => "IndividualMock",
            Self::ResumeSession => "ResumeSession",
            Self::InterviewPrep => "InterviewPrep",
            Self::JobHelp => "JobHelp",
            Self::InternalSessions => "InternalSessions",
            Self::Misc => "Misc",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata extracted from a `Class_...` filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub source_filename: String,
    /// Filename with the trailing batch-suffix token stripped; used as the
    /// upload title and the stored description.
    pub clean_filename: String,
    pub batch_label: String,
    pub class_date: String,
    pub subject: String,
    pub subject_id: i32,
}

/// Metadata extracted from a `Session_...` filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub source_filename: String,
    pub session_date: String,
    pub subject_id: i32,
    pub instructor_name: String,
    pub session_type: SessionType,
}

/// The in-memory record produced by the extractor. Downstream components
/// match on the variant; nothing re-parses the filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRecord {
    Class(ClassRecord),
    Session(SessionRecord),
}

impl UploadRecord {
    pub fn kind(&self) -> RecordingKind {
        match self {
            Self::Class(_) => RecordingKind::Class,
            Self::Session(_) => RecordingKind::Session,
        }
    }

    pub fn source_filename(&self) -> &str {
        match self {
            Self::Class(c) => &c.source_filename,
            Self::Session(s) => &s.source_filename,
        }
    }

    /// Upload title: the clean filename for classes, the source filename for
    /// sessions, truncated to the host limit.
    pub fn title(&self) -> String {
        let raw = match self {
            Self::Class(c) => c.clean_filename.as_str(),
            Self::Session(s) => s.source_filename.as_str(),
        };
        truncate_title(raw)
    }

    /// Upload description. Mirrors the title source without truncation.
    pub fn description(&self) -> String {
        match self {
            Self::Class(c) => c.clean_filename.clone(),
            Self::Session(s) => s.source_filename.clone(),
        }
    }
}

/// Outcome of a successful primary upload. Both fields are immutable for the
/// record's lifetime once persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedVideo {
    pub video_id: String,
    pub url: String,
}

fn truncate_title(s: &str) -> String {
    if s.chars().count() <= MAX_TITLE_LEN {
        s.to_string()
    } else {
        s.chars().take(MAX_TITLE_LEN).collect()
    }
}
