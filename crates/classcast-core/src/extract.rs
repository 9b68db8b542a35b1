//! Filename metadata extraction.
//!
//! Recording filenames are a contract with the people operating the capture
//! machines, and that contract has drifted over time. The positional layout
//! is therefore pinned behind an explicit [`FilenameFormat`] version instead
//! of being inferred from token counts; adding a new layout means adding a
//! variant, not another branch on `tokens.len()`.
//!
//! Layout (V1), split on `_`:
//!
//! ```text
//! Class_<date>_<batch>_<instructor>_<subject>[_<batch-suffix>].<ext>
//! Session_<date>_<subject-id>_<instructor>_<type>.<ext>
//! ```

use crate::models::{ClassRecord, SessionRecord, SessionType, UploadRecord};
use crate::subjects::SubjectMap;

/// Extraction failure. All variants are fatal for the file: no upload is
/// attempted and no quota is spent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown recording kind '{0}'")]
    UnknownKind(String),
    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),
    #[error("unknown subject '{0}'")]
    UnknownSubject(String),
}

/// Versioned filename layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameFormat {
    #[default]
    V1,
}

/// Extractor configuration, injected alongside the [`SubjectMap`].
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub format: FilenameFormat,
    pub delimiter: char,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            format: FilenameFormat::V1,
            delimiter: '_',
        }
    }
}

/// Derive a structured [`UploadRecord`] from a recording filename.
pub fn extract(
    subjects: &SubjectMap,
    config: &ExtractorConfig,
    filename: &str,
) -> Result<UploadRecord, ParseError> {
    let FilenameFormat::V1 = config.format;

    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (filename, None),
    };
    let tokens: Vec<&str> = stem.split(config.delimiter).collect();

    match tokens.first().copied() {
        Some("Class") => extract_class(subjects, filename, extension, &tokens),
        Some("Session") => extract_session(filename, &tokens),
        other => Err(ParseError::UnknownKind(other.unwrap_or("").to_string())),
    }
}

fn extract_class(
    subjects: &SubjectMap,
    filename: &str,
    extension: Option<&str>,
    tokens: &[&str],
) -> Result<UploadRecord, ParseError> {
    let class_date = required(tokens, 1, "class_date")?;
    let batch_label = required(tokens, 2, "batch_label")?;
    let subject = required(tokens, 4, "subject")?;

    let subject_id = subjects
        .resolve(subject)
        .ok_or_else(|| ParseError::UnknownSubject(subject.to_string()))?;

    // A sixth token is a batch suffix appended by the capture tooling; strip
    // it so titles and dedup keys are stable across re-exports.
    let clean_filename = if tokens.len() > 5 {
        let stem = tokens[..tokens.len() - 1].join("_");
        match extension {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        }
    } else {
        filename.to_string()
    };

    Ok(UploadRecord::Class(ClassRecord {
        source_filename: filename.to_string(),
        clean_filename,
        batch_label: batch_label.to_string(),
        class_date: class_date.to_string(),
        subject: subject.to_string(),
        subject_id,
    }))
}

fn extract_session(filename: &str, tokens: &[&str]) -> Result<UploadRecord, ParseError> {
    let session_date = required(tokens, 1, "session_date")?;
    let subject_id = required(tokens, 2, "subject_id")?
        .parse::<i32>()
        .map_err(|_| ParseError::MissingField("subject_id"))?;
    let instructor_name = required(tokens, 3, "instructor_name")?;
    required(tokens, 4, "session_type")?;

    Ok(UploadRecord::Session(SessionRecord {
        source_filename: filename.to_string(),
        session_date: session_date.to_string(),
        subject_id,
        instructor_name: instructor_name.to_string(),
        session_type: SessionType::classify(filename),
    }))
}

fn required<'a>(
    tokens: &[&'a str],
    index: usize,
    name: &'static str,
) -> Result<&'a str, ParseError> {
    match tokens.get(index) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ParseError::MissingField(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordingKind, SessionType};

    fn subjects() -> SubjectMap {
        SubjectMap::default()
    }

    fn config() -> ExtractorConfig {
        ExtractorConfig::default()
    }

    #[test]
    fn class_filename_parses_positionally() {
        let record = extract(
            &subjects(),
            &config(),
            "Class_2024-05-01_2024-05_Lee_UNIX_b7.mp4",
        )
        .unwrap();

        let UploadRecord::Class(class) = record else {
            panic!("expected a class record");
        };
        assert_eq!(class.class_date, "2024-05-01");
        assert_eq!(class.batch_label, "2024-05");
        assert_eq!(class.subject, "UNIX");
        assert_eq!(class.subject_id, 12);
        // Trailing batch suffix is stripped, extension kept.
        assert_eq!(class.clean_filename, "Class_2024-05-01_2024-05_Lee_UNIX.mp4");
    }

    #[test]
    fn class_filename_without_suffix_is_already_clean() {
        let record = extract(&subjects(), &config(), "Class_2024-05-01_2024-05_Lee_UNIX.mp4")
            .unwrap();
        let UploadRecord::Class(class) = record else {
            panic!("expected a class record");
        };
        assert_eq!(class.clean_filename, "Class_2024-05-01_2024-05_Lee_UNIX.mp4");
    }

    #[test]
    fn unknown_subject_is_a_hard_failure() {
        let err = extract(
            &subjects(),
            &config(),
            "Class_2024-05-01_2024-05_Lee_Basketry_b7.mp4",
        )
        .unwrap_err();
        assert_eq!(err, ParseError::UnknownSubject("Basketry".to_string()));
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let err = extract(&subjects(), &config(), "Lecture_2024-05-01.mp4").unwrap_err();
        assert_eq!(err, ParseError::UnknownKind("Lecture".to_string()));
    }

    #[test]
    fn missing_tokens_name_the_field() {
        let err = extract(&subjects(), &config(), "Class_2024-05-01.mp4").unwrap_err();
        assert_eq!(err, ParseError::MissingField("batch_label"));

        let err = extract(&subjects(), &config(), "Session_2024-05-01_xx_Lee_Mock.mp4")
            .unwrap_err();
        assert_eq!(err, ParseError::MissingField("subject_id"));
    }

    #[test]
    fn session_filename_parses_and_reclassifies_type() {
        let record = extract(
            &subjects(),
            &config(),
            "Session_2024-05-02_42_Patel_GroupMockResume.mp4",
        )
        .unwrap();

        assert_eq!(record.kind(), RecordingKind::Session);
        let UploadRecord::Session(session) = record else {
            panic!("expected a session record");
        };
        assert_eq!(session.session_date, "2024-05-02");
        assert_eq!(session.subject_id, 42);
        assert_eq!(session.instructor_name, "Patel");
        // "group" appears before "resume" in the priority order, so the
        // combined token resolves to GroupMock.
        assert_eq!(session.session_type, SessionType::GroupMock);
    }

    #[test]
    fn session_without_keyword_falls_back_to_misc() {
        let record = extract(
            &subjects(),
            &config(),
            "Session_2024-05-02_42_Patel_Standup.mp4",
        )
        .unwrap();
        let UploadRecord::Session(session) = record else {
            panic!("expected a session record");
        };
        assert_eq!(session.session_type, SessionType::Misc);
    }
}
