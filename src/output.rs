//! Result types returned by the operations in [`crate::tools`].

use crate::config::PdfLayout;
use crate::error::Issue;
use crate::model::CardSet;
use crate::templates::{LayoutDescriptor, TemplateDescriptor};
use serde::Serialize;
use std::path::PathBuf;

/// Counters collected while laying out a PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutStats {
    /// Total pages in the document.
    pub pages: usize,
    pub front_pages: usize,
    pub back_pages: usize,
    /// Cards placed (each appears once on a front and once on a back page).
    pub cards: usize,
    /// Card faces whose text was clipped to fit the cell.
    pub overflowed_faces: usize,
}

/// A finished PDF document.
#[derive(Debug, Clone, Serialize)]
pub struct PdfOutput {
    /// Where the PDF was written, if anywhere.
    pub path: Option<PathBuf>,
    /// The complete document.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub layout: PdfLayout,
    pub stats: LayoutStats,
}

impl PdfOutput {
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// One-line confirmation naming the file and its size.
    pub fn summary(&self) -> String {
        match &self.path {
            Some(path) => format!(
                "PDF written to {} ({} bytes, {} pages, layout {})",
                path.display(),
                self.bytes.len(),
                self.stats.pages,
                self.layout
            ),
            None => format!(
                "PDF generated in memory ({} bytes, {} pages, layout {})",
                self.bytes.len(),
                self.stats.pages,
                self.layout
            ),
        }
    }
}

/// What a CSV conversion produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvFormat {
    Json,
    Html,
}

/// A CSV conversion: the artifact plus the rows that were left out.
#[derive(Debug, Clone, Serialize)]
pub struct CsvConversion {
    pub format: CsvFormat,
    /// Pretty-printed card-set JSON, or a complete HTML page.
    pub output: String,
    pub card_count: usize,
    /// Data rows read, header excluded.
    pub rows_read: usize,
    /// One entry per excluded row problem.
    pub issues: Vec<Issue>,
}

/// Outcome of validating a card set.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// No error-severity issues were found.
    pub valid: bool,
    pub card_count: usize,
    /// Errors and warnings, in check order.
    pub issues: Vec<Issue>,
    /// The validated card set when `valid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_set: Option<CardSet>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| !i.is_fatal())
    }
}

/// Everything a caller can choose from.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateCatalog {
    pub templates: Vec<TemplateDescriptor>,
    pub layouts: Vec<LayoutDescriptor>,
    pub themes: Vec<&'static str>,
    /// Output formats: `html` and `pdf`.
    pub formats: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;

    #[test]
    fn summary_names_path_and_size() {
        let out = PdfOutput {
            path: Some(PathBuf::from("/tmp/deck_a4_8.pdf")),
            bytes: vec![0; 1234],
            layout: PdfLayout::A4Eight,
            stats: LayoutStats {
                pages: 2,
                ..LayoutStats::default()
            },
        };
        let s = out.summary();
        assert!(s.contains("/tmp/deck_a4_8.pdf"));
        assert!(s.contains("1234 bytes"));
        assert!(s.contains("a4_8"));
    }

    #[test]
    fn pdf_output_json_omits_bytes() {
        let out = PdfOutput {
            path: None,
            bytes: vec![1, 2, 3],
            layout: PdfLayout::Single,
            stats: LayoutStats::default(),
        };
        let v = serde_json::to_value(&out).unwrap();
        assert!(v.get("bytes").is_none());
        assert_eq!(v["layout"], "single");
        assert!(out.summary().contains("in memory"));
    }

    #[test]
    fn report_splits_errors_and_warnings() {
        let report = ValidationReport {
            valid: false,
            card_count: 0,
            issues: vec![
                Issue::error("title", IssueKind::Schema, "must not be empty"),
                Issue::warning("metadata.created_at", IssueKind::Format, "bad"),
            ],
            card_set: None,
        };
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
        let v = serde_json::to_value(&report).unwrap();
        assert!(v.get("card_set").is_none());
    }
}
