//! Input resolution: turn a user-supplied source into text.
//!
//! A source is either a local file path or `-` for standard input. Files are
//! checked for existence and read permission up front so the caller gets a
//! [`FlashcardError::FileNotFound`] or [`FlashcardError::PermissionDenied`]
//! naming the path rather than a bare I/O error.

use crate::error::FlashcardError;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The source name that means "read standard input".
pub const STDIN_SOURCE: &str = "-";

/// Check if the source names standard input.
pub fn is_stdin(source: &str) -> bool {
    source == STDIN_SOURCE
}

/// Read the whole source as UTF-8 text.
pub fn read_source(source: &str) -> Result<String, FlashcardError> {
    if is_stdin(source) {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| FlashcardError::Internal(format!("Failed to read stdin: {}", e)))?;
        debug!("Read {} bytes from stdin", text.len());
        return Ok(text);
    }
    read_local(Path::new(source))
}

/// Read a local file, validating existence and permissions.
fn read_local(path: &Path) -> Result<String, FlashcardError> {
    if !path.exists() {
        return Err(FlashcardError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FlashcardError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(FlashcardError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut text = String::new();
    file.read_to_string(&mut text).map_err(|e| {
        FlashcardError::Internal(format!("Failed to read '{}': {}", path.display(), e))
    })?;
    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}

/// Parse card-set JSON text into a raw value for the validator.
pub fn parse_json(text: &str) -> Result<Value, FlashcardError> {
    serde_json::from_str(text).map_err(|e| FlashcardError::InvalidJson {
        detail: format!("line {} column {}: {}", e.line(), e.column(), e),
    })
}

/// Read and parse a JSON source in one step.
pub fn read_json(source: &str) -> Result<Value, FlashcardError> {
    parse_json(&read_source(source)?)
}

/// Derive a display name for a source (`stdin` or the file stem).
pub fn source_stem(source: &str) -> Option<String> {
    if is_stdin(source) {
        return None;
    }
    PathBuf::from(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_stdin() {
        assert!(is_stdin("-"));
        assert!(!is_stdin("--"));
        assert!(!is_stdin("deck.json"));
        assert!(!is_stdin(""));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = read_source("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, FlashcardError::FileNotFound { .. }));
    }

    #[test]
    fn reads_local_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "front,back\nQ,A\n").unwrap();
        let text = read_source(f.path().to_str().unwrap()).unwrap();
        assert_eq!(text, "front,back\nQ,A\n");
    }

    #[test]
    fn invalid_json_reports_position() {
        let err = parse_json("{\"title\": }").unwrap_err();
        match err {
            FlashcardError::InvalidJson { detail } => assert!(detail.starts_with("line 1 column")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stem_of_path() {
        assert_eq!(source_stem("decks/french.csv").as_deref(), Some("french"));
        assert_eq!(source_stem("-"), None);
    }
}
