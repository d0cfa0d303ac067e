//! The external operations.
//!
//! Five request/response operations sit on top of the pipeline stages:
//!
//! | Operation | Input | Output |
//! |-----------|-------|--------|
//! | [`create_flashcards_from_json`] | cards + title + template/theme | HTML page |
//! | [`generate_flashcards_pdf`] | cards + title + layout | [`PdfOutput`] (optionally written to disk) |
//! | [`convert_csv_to_json`] / [`convert_csv_to_flashcards`] | CSV text + column mapping | [`CsvConversion`] |
//! | [`validate_flashcard_data`] | raw card-set JSON | [`ValidationReport`] |
//! | [`get_flashcard_templates`] | — | [`TemplateCatalog`] |
//!
//! The argument structs deserialize from JSON with the same defaults a
//! caller would get by omitting a field, so a host that speaks JSON can
//! forward requests verbatim. Every operation is independent; nothing is
//! shared between calls except the read-only template registry.

use crate::config::{GeneratorConfig, PdfLayout};
use crate::error::{FlashcardError, Issue, IssueKind};
use crate::model::{CardSet, StyleConfig, Theme};
use crate::output::{CsvConversion, CsvFormat, PdfOutput, TemplateCatalog, ValidationReport};
use crate::pipeline::csv_import::{self, ColumnMapping};
use crate::pipeline::markdown::MarkdownRenderer;
use crate::pipeline::template::DEFAULT_FONT;
use crate::pipeline::{pdf, template, validate};
use crate::templates;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static RE_UNSAFE_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static RE_FILENAME_GAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

// ── Arguments ────────────────────────────────────────────────────────────────

fn default_title() -> String {
    "My Flashcard Set".to_string()
}

fn default_csv_title() -> String {
    "CSV Imported Flashcards".to_string()
}

fn default_front_columns() -> Vec<usize> {
    vec![0]
}

fn default_back_columns() -> Vec<usize> {
    vec![1]
}

fn default_true() -> bool {
    true
}

fn default_column_separator() -> String {
    " ".to_string()
}

fn default_tag_delimiter() -> String {
    ",".to_string()
}

/// Arguments for [`create_flashcards_from_json`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFlashcardsArgs {
    /// Array of `{front, back, tags?, id?}` objects.
    pub cards: Value,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Template name; falls back to [`GeneratorConfig::default_template`].
    #[serde(default)]
    pub template: Option<String>,
    /// `light`, `dark` or `custom`. Default: `light`.
    #[serde(default)]
    pub theme: Option<String>,
}

impl CreateFlashcardsArgs {
    pub fn new(cards: Value) -> Self {
        Self {
            cards,
            title: default_title(),
            description: None,
            template: None,
            theme: None,
        }
    }
}

/// Arguments for [`generate_flashcards_pdf`].
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePdfArgs {
    /// Array of `{front, back, tags?, id?}` objects.
    pub cards: Value,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `single` or `a4_8`; falls back to [`GeneratorConfig::default_layout`].
    #[serde(default)]
    pub layout: Option<String>,
    /// A `.pdf` file, or a directory to create a derived file name in.
    /// Empty means "not given".
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub show_deck_name: Option<bool>,
    #[serde(default)]
    pub show_card_index: Option<bool>,
}

impl GeneratePdfArgs {
    pub fn new(cards: Value) -> Self {
        Self {
            cards,
            title: default_title(),
            description: None,
            layout: None,
            output_path: None,
            show_deck_name: None,
            show_card_index: None,
        }
    }
}

/// Arguments for [`convert_csv_to_json`] and [`convert_csv_to_flashcards`].
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertCsvArgs {
    pub csv_content: String,
    /// `[0, 1]` or `"0,1"`. Default: column 0.
    #[serde(default = "default_front_columns", deserialize_with = "column_list")]
    pub front_columns: Vec<usize>,
    /// `[2]` or `"2"`. Default: column 1.
    #[serde(default = "default_back_columns", deserialize_with = "column_list")]
    pub back_columns: Vec<usize>,
    #[serde(default)]
    pub tags_column: Option<usize>,
    #[serde(default = "default_true")]
    pub has_header: bool,
    #[serde(default = "default_csv_title")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_column_separator")]
    pub column_separator: String,
    #[serde(default = "default_tag_delimiter")]
    pub tag_delimiter: String,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl ConvertCsvArgs {
    pub fn new(csv_content: impl Into<String>) -> Self {
        Self {
            csv_content: csv_content.into(),
            front_columns: default_front_columns(),
            back_columns: default_back_columns(),
            tags_column: None,
            has_header: true,
            title: default_csv_title(),
            description: None,
            column_separator: default_column_separator(),
            tag_delimiter: default_tag_delimiter(),
            template: None,
            theme: None,
        }
    }

    pub fn mapping(&self) -> ColumnMapping {
        ColumnMapping {
            front_columns: self.front_columns.clone(),
            back_columns: self.back_columns.clone(),
            tags_column: self.tags_column,
            has_header: self.has_header,
            column_separator: self.column_separator.clone(),
            tag_delimiter: self.tag_delimiter.clone(),
        }
    }
}

/// Accept a column list as `"0,1"`, `[0, 1]` or a bare `0`.
fn column_list<'de, D>(deserializer: D) -> Result<Vec<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        List(Vec<usize>),
        One(usize),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Text(s) => csv_import::parse_column_list(&s).map_err(serde::de::Error::custom),
        Repr::List(v) => Ok(v),
        Repr::One(n) => Ok(vec![n]),
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Build a card set from `args` and render it as a standalone HTML page.
pub fn create_flashcards_from_json(
    args: CreateFlashcardsArgs,
    config: &GeneratorConfig,
) -> Result<String, FlashcardError> {
    let template_name = args
        .template
        .unwrap_or_else(|| config.default_template.clone());
    require_template(&template_name)?;

    let mut style = Map::new();
    style.insert(
        "theme".into(),
        Value::String(args.theme.unwrap_or_else(|| Theme::default().to_string())),
    );
    style.insert("template".into(), Value::String(template_name.clone()));
    let value = json!({
        "title": args.title,
        "description": args.description,
        "cards": args.cards,
        "style": style,
    });

    let set = validate_value(&value, config)?;
    render_card_set_html(&set, Some(&template_name), config)
}

/// Build a card set from `args`, lay it out as a PDF and optionally write it.
///
/// Layout and the file write run on tokio's blocking pool. The file, when
/// requested, is written atomically: it either appears complete or not at
/// all.
pub async fn generate_flashcards_pdf(
    args: GeneratePdfArgs,
    config: &GeneratorConfig,
) -> Result<PdfOutput, FlashcardError> {
    let layout = match args.layout.as_deref() {
        Some(name) => name.parse::<PdfLayout>()?,
        None => config.default_layout,
    };
    let value = json!({
        "title": args.title,
        "description": args.description,
        "cards": args.cards,
    });
    let set = validate_value(&value, config)?;

    let request = PdfRequest {
        layout,
        output_path: args.output_path.filter(|p| !p.as_os_str().is_empty()),
        show_deck_name: args.show_deck_name.unwrap_or(config.display.show_deck_name),
        show_card_index: args
            .show_card_index
            .unwrap_or(config.display.show_card_index),
    };
    render_card_set_pdf(set, request, config).await
}

/// Synchronous wrapper around [`generate_flashcards_pdf`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_flashcards_pdf_sync(
    args: GeneratePdfArgs,
    config: &GeneratorConfig,
) -> Result<PdfOutput, FlashcardError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlashcardError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_flashcards_pdf(args, config))
}

/// Map CSV rows to a card set and return it as pretty-printed JSON.
pub fn convert_csv_to_json(
    args: ConvertCsvArgs,
    config: &GeneratorConfig,
) -> Result<CsvConversion, FlashcardError> {
    let (mapped, _) = map_csv(&args, config)?;
    let output = serde_json::to_string_pretty(&mapped.card_set)
        .map_err(|e| FlashcardError::Internal(format!("card set serialisation: {e}")))?;
    Ok(CsvConversion {
        format: CsvFormat::Json,
        output,
        card_count: mapped.card_set.cards.len(),
        rows_read: mapped.rows_read,
        issues: mapped.issues,
    })
}

/// Map CSV rows to a card set and render it as an HTML page.
pub fn convert_csv_to_flashcards(
    args: ConvertCsvArgs,
    config: &GeneratorConfig,
) -> Result<CsvConversion, FlashcardError> {
    let (mapped, template_name) = map_csv(&args, config)?;
    let output = render_card_set_html(&mapped.card_set, Some(&template_name), config)?;
    Ok(CsvConversion {
        format: CsvFormat::Html,
        output,
        card_count: mapped.card_set.cards.len(),
        rows_read: mapped.rows_read,
        issues: mapped.issues,
    })
}

/// Validate raw card-set JSON. Never fails; problems are in the report.
pub fn validate_flashcard_data(value: &Value, config: &GeneratorConfig) -> ValidationReport {
    validate::validate_report(value, &config.limits)
}

/// Registered templates, PDF layouts, themes and output formats.
pub fn get_flashcard_templates() -> TemplateCatalog {
    TemplateCatalog {
        templates: templates::all().to_vec(),
        layouts: templates::layouts(),
        themes: templates::themes(),
        formats: vec!["html", "pdf"],
    }
}

// ── Card-set entry points ────────────────────────────────────────────────────

/// PDF options for [`render_card_set_pdf`].
#[derive(Debug, Clone, Default)]
pub struct PdfRequest {
    pub layout: PdfLayout,
    /// See [`resolve_output_path`].
    pub output_path: Option<PathBuf>,
    pub show_deck_name: bool,
    pub show_card_index: bool,
}

/// Validate a complete card set, logging any warnings.
pub fn validate_value(value: &Value, config: &GeneratorConfig) -> Result<CardSet, FlashcardError> {
    let report = validate::validate_report(value, &config.limits);
    for issue in report.warnings() {
        warn!("{}", issue);
    }
    match report.card_set {
        Some(set) => Ok(set),
        None => Err(FlashcardError::Validation {
            issues: report.issues,
        }),
    }
}

/// Render an already-validated card set to HTML.
///
/// Template precedence: `template`, then the card set's `style.template`,
/// then [`GeneratorConfig::default_template`].
pub fn render_card_set_html(
    set: &CardSet,
    template: Option<&str>,
    config: &GeneratorConfig,
) -> Result<String, FlashcardError> {
    let name = template
        .or_else(|| set.style.as_ref().and_then(|s| s.template.as_deref()))
        .unwrap_or(config.default_template.as_str());
    info!("Rendering {} card(s) as HTML with template '{}'", set.cards.len(), name);
    template::render(
        set,
        name,
        &config.display,
        &MarkdownRenderer::new(config.allow_inline_html),
    )
}

/// Lay out an already-validated card set as a PDF.
pub async fn render_card_set_pdf(
    set: CardSet,
    request: PdfRequest,
    config: &GeneratorConfig,
) -> Result<PdfOutput, FlashcardError> {
    let path = resolve_output_path(
        request.output_path.as_deref(),
        config.output_dir.as_deref(),
        &set.title,
        request.layout,
    );
    let options = pdf::PdfOptions {
        show_deck_name: request.show_deck_name,
        show_card_index: request.show_card_index,
        markdown: MarkdownRenderer::new(config.allow_inline_html),
        progress: config.progress_callback.clone(),
    };
    let layout = request.layout;

    tokio::task::spawn_blocking(move || {
        let (bytes, stats) = pdf::render(&set, layout, &options)?;
        if let Some(path) = &path {
            write_atomic(path, &bytes)?;
            info!("Wrote {} ({} bytes)", path.display(), bytes.len());
        }
        Ok::<_, FlashcardError>(PdfOutput {
            path,
            bytes,
            layout,
            stats,
        })
    })
    .await
    .map_err(|e| FlashcardError::Internal(format!("PDF task panicked: {}", e)))?
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn require_template(name: &str) -> Result<(), FlashcardError> {
    match templates::find(name) {
        Some(_) => Ok(()),
        None => Err(FlashcardError::TemplateNotFound {
            name: name.to_string(),
            available: templates::names().join(", "),
        }),
    }
}

fn map_csv(
    args: &ConvertCsvArgs,
    config: &GeneratorConfig,
) -> Result<(csv_import::MappedCardSet, String), FlashcardError> {
    let template_name = args
        .template
        .clone()
        .unwrap_or_else(|| config.default_template.clone());
    require_template(&template_name)?;

    let theme = match args.theme.as_deref() {
        None => Theme::default(),
        Some(name) => name.parse::<Theme>().map_err(|msg| FlashcardError::Validation {
            issues: vec![Issue::error("style.theme", IssueKind::Enum, msg)],
        })?,
    };
    let style = StyleConfig {
        theme,
        font: Some(DEFAULT_FONT.to_string()),
        template: Some(template_name.clone()),
        ..StyleConfig::default()
    };

    let mapped = csv_import::map_to_card_set(
        &args.csv_content,
        &args.mapping(),
        &args.title,
        args.description.as_deref(),
        Some(style),
        &config.limits,
    )?;
    for issue in &mapped.issues {
        warn!("Skipped CSV row: {}", issue);
    }
    Ok((mapped, template_name))
}

/// File name for a deck's PDF: the title made filesystem-safe plus the layout.
///
/// Characters other than letters, digits, `_`, `-` and whitespace are
/// dropped; runs of whitespace and dashes become `_`.
pub fn pdf_file_name(title: &str, layout: PdfLayout) -> String {
    let cleaned = RE_UNSAFE_FILENAME.replace_all(title, "");
    let joined = RE_FILENAME_GAPS.replace_all(cleaned.trim(), "_");
    let stem = joined.trim_matches('_');
    let stem = if stem.is_empty() { "flashcards" } else { stem };
    format!("{stem}_{}.pdf", layout.as_str())
}

/// Where a PDF should be written, if anywhere.
///
/// A path ending in `.pdf` is used as given; any other path is a directory
/// that receives [`pdf_file_name`]. Without a path, `output_dir` is used the
/// same way, and without either the PDF stays in memory.
pub fn resolve_output_path(
    output_path: Option<&Path>,
    output_dir: Option<&Path>,
    title: &str,
    layout: PdfLayout,
) -> Option<PathBuf> {
    let target = output_path.or(output_dir)?;
    let is_pdf_file = target
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf_file {
        Some(target.to_path_buf())
    } else {
        Some(target.join(pdf_file_name(title, layout)))
    }
}

/// Write `bytes` to `path` through a temp file in the same directory.
///
/// On any error the temp file is removed and `path` is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FlashcardError> {
    let write_err = |source: std::io::Error| FlashcardError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Persisted {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_sanitised() {
        assert_eq!(
            pdf_file_name("French: Verbs & Nouns!", PdfLayout::A4Eight),
            "French_Verbs_Nouns_a4_8.pdf"
        );
        assert_eq!(pdf_file_name("a - b", PdfLayout::Single), "a_b_single.pdf");
        assert_eq!(pdf_file_name("???", PdfLayout::Single), "flashcards_single.pdf");
        assert_eq!(pdf_file_name("日本語 単語", PdfLayout::Single), "日本語_単語_single.pdf");
    }

    #[test]
    fn output_path_resolution() {
        let layout = PdfLayout::A4Eight;
        assert_eq!(resolve_output_path(None, None, "T", layout), None);
        assert_eq!(
            resolve_output_path(Some(Path::new("out/deck.PDF")), None, "T", layout),
            Some(PathBuf::from("out/deck.PDF"))
        );
        assert_eq!(
            resolve_output_path(Some(Path::new("out")), None, "My Deck", layout),
            Some(PathBuf::from("out/My_Deck_a4_8.pdf"))
        );
        assert_eq!(
            resolve_output_path(None, Some(Path::new("pdfs")), "T", PdfLayout::Single),
            Some(PathBuf::from("pdfs/T_single.pdf"))
        );
    }

    #[test]
    fn column_lists_deserialize_from_string_or_array() {
        let args: ConvertCsvArgs = serde_json::from_value(json!({
            "csv_content": "a,b\n",
            "front_columns": "0, 2",
            "back_columns": [1, 3],
            "tags_column": 4
        }))
        .unwrap();
        assert_eq!(args.front_columns, vec![0, 2]);
        assert_eq!(args.back_columns, vec![1, 3]);
        assert_eq!(args.tags_column, Some(4));
        assert!(args.has_header);
        assert_eq!(args.column_separator, " ");
        assert_eq!(args.title, "CSV Imported Flashcards");
    }

    #[test]
    fn bad_column_list_fails_to_deserialize() {
        let r: Result<ConvertCsvArgs, _> = serde_json::from_value(json!({
            "csv_content": "",
            "front_columns": "zero"
        }));
        assert!(r.is_err());
    }

    #[test]
    fn args_defaults_match_new() {
        let args: CreateFlashcardsArgs = serde_json::from_value(json!({"cards": []})).unwrap();
        assert_eq!(args.title, "My Flashcard Set");
        assert!(args.template.is_none());

        let pdf: GeneratePdfArgs = serde_json::from_value(json!({"cards": []})).unwrap();
        assert_eq!(pdf.title, GeneratePdfArgs::new(json!([])).title);
        assert!(pdf.layout.is_none());
    }

    #[test]
    fn atomic_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.pdf");
        write_atomic(&path, b"%PDF-1.7").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn atomic_write_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // The target is an existing directory, so the final rename fails.
        let target = dir.path().join("taken");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();
        let err = write_atomic(&target, b"%PDF").unwrap_err();
        assert!(matches!(err, FlashcardError::OutputWriteFailed { .. }));
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("taken")]);
    }
}
