//! Error types for the cardforge library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`FlashcardError`] — **Fatal**: the call cannot produce its artifact at
//!   all (invalid card set, unknown template, unwritable output path).
//!   Returned as `Err(FlashcardError)` from every entry point in
//!   [`crate::tools`].
//!
//! * [`Issue`] — **Diagnostic**: one path-tagged problem inside the input
//!   (an empty card front, a CSV row that references a missing column, an
//!   unparseable timestamp). Validation and CSV mapping collect every issue
//!   in a single pass and hand back the whole list, either inside a
//!   [`FlashcardError`] or next to a successful result.
//!
//! Every fatal error can be flattened into issues with
//! [`FlashcardError::issues`], so callers always receive an enumerable
//! `(path, kind, message)` list rather than an opaque string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable category of an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Structural shape violation: a missing, mistyped or empty field.
    Schema,
    /// A value outside its allowed set, e.g. an unknown theme.
    Enum,
    /// A dangling reference: CSV column out of range, template not found.
    Reference,
    /// An unparseable value that does not block rendering (timestamps).
    Format,
    /// The output location could not be written.
    Resource,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::Schema => "schema",
            IssueKind::Enum => "enum",
            IssueKind::Reference => "reference",
            IssueKind::Format => "format",
            IssueKind::Resource => "resource",
        };
        f.write_str(s)
    }
}

/// Whether an [`Issue`] blocks the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Error,
    /// Reported but never fatal.
    Warning,
}

/// One structured diagnostic, e.g. `cards[2].front` / `schema` / "must not be empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: String,
    pub kind: IssueKind,
    #[serde(default)]
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn error(path: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(path: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "$" } else { &self.path };
        match self.severity {
            Severity::Error => write!(f, "{path}: [{}] {}", self.kind, self.message),
            Severity::Warning => write!(f, "{path}: [{} warning] {}", self.kind, self.message),
        }
    }
}

/// All fatal errors returned by the cardforge library.
///
/// Issue-level problems live in [`Issue`] and are carried by the
/// `Validation` and `EmptyConversion` variants.
#[derive(Debug, Error)]
pub enum FlashcardError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The card set failed validation; `issues` holds every problem found.
    #[error("Card set failed validation with {} issue(s):\n{}", .issues.len(), format_issues(.issues))]
    Validation { issues: Vec<Issue> },

    /// The input text is not JSON at all.
    #[error("Input is not valid JSON: {detail}")]
    InvalidJson { detail: String },

    /// The column mapping itself is unusable (before any row is read).
    #[error("Invalid column mapping: {0}")]
    InvalidMapping(String),

    /// Every CSV row was rejected; nothing is left to build a card set from.
    #[error("No usable rows in CSV input ({rows} data rows, all rejected):\n{}", format_issues(.issues))]
    EmptyConversion { rows: usize, issues: Vec<Issue> },

    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Render errors ─────────────────────────────────────────────────────
    /// No HTML template with this name is registered.
    #[error("Template '{name}' not found. Available templates: {available}")]
    TemplateNotFound { name: String, available: String },

    /// No PDF layout with this name exists.
    #[error("Unknown PDF layout '{name}'. Available layouts: single, a4_8")]
    UnknownLayout { name: String },

    /// lopdf refused to encode or serialise the document.
    #[error("PDF encoding failed: {0}")]
    PdfEncoding(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlashcardError {
    /// Flatten this error into the structured issue list reported to callers.
    pub fn issues(&self) -> Vec<Issue> {
        match self {
            FlashcardError::Validation { issues } => issues.clone(),
            FlashcardError::EmptyConversion { issues, .. } => {
                let mut all = issues.clone();
                all.push(Issue::error(
                    "cards",
                    IssueKind::Schema,
                    "no CSV row could be mapped to a card",
                ));
                all
            }
            FlashcardError::InvalidJson { detail } => {
                vec![Issue::error("", IssueKind::Schema, detail.clone())]
            }
            FlashcardError::InvalidMapping(msg) => {
                vec![Issue::error("mapping", IssueKind::Schema, msg.clone())]
            }
            FlashcardError::TemplateNotFound { name, .. } => vec![Issue::error(
                "template",
                IssueKind::Reference,
                format!("template '{name}' not found"),
            )],
            FlashcardError::UnknownLayout { name } => vec![Issue::error(
                "layout",
                IssueKind::Enum,
                format!("unknown layout '{name}', expected one of: single, a4_8"),
            )],
            FlashcardError::FileNotFound { path } | FlashcardError::PermissionDenied { path } => {
                vec![Issue::error(
                    path.display().to_string(),
                    IssueKind::Resource,
                    self.to_string(),
                )]
            }
            FlashcardError::OutputWriteFailed { path, source } => vec![Issue::error(
                path.display().to_string(),
                IssueKind::Resource,
                source.to_string(),
            )],
            FlashcardError::PdfEncoding(_)
            | FlashcardError::InvalidConfig(_)
            | FlashcardError::Internal(_) => {
                vec![Issue::error("", IssueKind::Resource, self.to_string())]
            }
        }
    }
}

fn format_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_every_issue() {
        let e = FlashcardError::Validation {
            issues: vec![
                Issue::error("title", IssueKind::Schema, "must not be empty"),
                Issue::error("cards", IssueKind::Schema, "must contain at least one card"),
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("2 issue(s)"), "got: {msg}");
        assert!(msg.contains("title: [schema] must not be empty"));
        assert!(msg.contains("cards: [schema]"));
    }

    #[test]
    fn warning_display_is_marked() {
        let i = Issue::warning("metadata.created_at", IssueKind::Format, "not ISO-8601");
        assert!(!i.is_fatal());
        assert_eq!(
            i.to_string(),
            "metadata.created_at: [format warning] not ISO-8601"
        );
    }

    #[test]
    fn template_not_found_flattens_to_reference_issue() {
        let e = FlashcardError::TemplateNotFound {
            name: "fancy".into(),
            available: "default, minimal, listen".into(),
        };
        let issues = e.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Reference);
        assert!(e.to_string().contains("fancy"));
    }

    #[test]
    fn empty_conversion_keeps_row_issues() {
        let e = FlashcardError::EmptyConversion {
            rows: 1,
            issues: vec![Issue::error(
                "rows[0].front_columns[0]",
                IssueKind::Reference,
                "column 4 out of range",
            )],
        };
        let issues = e.issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path, "rows[0].front_columns[0]");
    }

    #[test]
    fn output_write_failed_is_resource_issue() {
        let e = FlashcardError::OutputWriteFailed {
            path: PathBuf::from("/nope/out.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(e.issues()[0].kind, IssueKind::Resource);
        assert!(e.to_string().contains("/nope/out.pdf"));
    }

    #[test]
    fn issue_serialises_snake_case() {
        let i = Issue::error("cards[0].back", IssueKind::Schema, "missing");
        let v = serde_json::to_value(&i).unwrap();
        assert_eq!(v["kind"], "schema");
        assert_eq!(v["severity"], "error");
    }
}
