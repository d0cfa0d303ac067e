//! Configuration types for flashcard generation.
//!
//! All generation behaviour is controlled through [`GeneratorConfig`], built
//! via its [`GeneratorConfigBuilder`]. Per-call arguments (cards, title,
//! template name) travel in the request structs of [`crate::tools`]; this
//! struct holds the knobs that stay fixed for a whole process.

use crate::error::FlashcardError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Process-wide configuration for all operations.
///
/// # Example
/// ```rust
/// use cardforge::{GeneratorConfig, PdfLayout};
///
/// let config = GeneratorConfig::builder()
///     .max_cards(200)
///     .default_layout(PdfLayout::Single)
///     .show_card_index(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.limits.max_cards, 200);
/// ```
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Size limits enforced by the validator.
    pub limits: Limits,

    /// Deck name / card index / tag visibility for both output formats.
    pub display: DisplayOptions,

    /// Let the fixed inline-HTML allow-list (`<br>`, `<sub>`, `<sup>`,
    /// `<ruby>`, `<rt>`, `<rp>`) through the Markdown stage. Default: false,
    /// every raw tag is escaped.
    pub allow_inline_html: bool,

    /// Template used when neither the caller nor the card set names one. Default: `minimal`.
    pub default_template: String,

    /// PDF layout used when the caller does not name one. Default: [`PdfLayout::A4Eight`].
    pub default_layout: PdfLayout,

    /// Directory PDFs are written to when a call gives no output path.
    /// `None` means "return the bytes only".
    pub output_dir: Option<PathBuf>,

    /// Receives per-page events while a PDF is laid out.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            display: DisplayOptions::default(),
            allow_inline_html: false,
            default_template: "minimal".to_string(),
            default_layout: PdfLayout::default(),
            output_dir: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("limits", &self.limits)
            .field("display", &self.display)
            .field("allow_inline_html", &self.allow_inline_html)
            .field("default_template", &self.default_template)
            .field("default_layout", &self.default_layout)
            .field("output_dir", &self.output_dir)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn LayoutProgressCallback>"),
            )
            .finish()
    }
}

impl GeneratorConfig {
    /// Create a new builder for `GeneratorConfig`.
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    pub fn max_cards(mut self, n: usize) -> Self {
        self.config.limits.max_cards = n;
        self
    }

    pub fn max_content_length(mut self, n: usize) -> Self {
        self.config.limits.max_content_length = n;
        self
    }

    pub fn max_tags_per_card(mut self, n: usize) -> Self {
        self.config.limits.max_tags_per_card = n;
        self
    }

    pub fn max_tag_length(mut self, n: usize) -> Self {
        self.config.limits.max_tag_length = n;
        self
    }

    pub fn show_deck_name(mut self, v: bool) -> Self {
        self.config.display.show_deck_name = v;
        self
    }

    pub fn show_card_index(mut self, v: bool) -> Self {
        self.config.display.show_card_index = v;
        self
    }

    pub fn show_tags(mut self, v: bool) -> Self {
        self.config.display.show_tags = v;
        self
    }

    pub fn allow_inline_html(mut self, v: bool) -> Self {
        self.config.allow_inline_html = v;
        self
    }

    pub fn default_template(mut self, name: impl Into<String>) -> Self {
        self.config.default_template = name.into();
        self
    }

    pub fn default_layout(mut self, layout: PdfLayout) -> Self {
        self.config.default_layout = layout;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GeneratorConfig, FlashcardError> {
        let c = &self.config;
        if c.limits.max_cards == 0 {
            return Err(FlashcardError::InvalidConfig(
                "max_cards must be ≥ 1".into(),
            ));
        }
        if c.limits.max_content_length == 0 {
            return Err(FlashcardError::InvalidConfig(
                "max_content_length must be ≥ 1".into(),
            ));
        }
        if crate::templates::find(&c.default_template).is_none() {
            return Err(FlashcardError::InvalidConfig(format!(
                "default template '{}' is not registered (available: {})",
                c.default_template,
                crate::templates::names().join(", ")
            )));
        }
        Ok(self.config)
    }
}

/// Size limits enforced by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of cards in one deck. Default: 1000.
    pub max_cards: usize,
    /// Maximum characters in a single front or back. Default: 10 000.
    pub max_content_length: usize,
    /// Maximum tags on one card. Default: 10.
    pub max_tags_per_card: usize,
    /// Maximum characters in one tag. Default: 50.
    pub max_tag_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_cards: 1000,
            max_content_length: 10_000,
            max_tags_per_card: 10,
            max_tag_length: 50,
        }
    }
}

/// Optional decorations shared by the HTML and PDF outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Print the deck title on every page / card. Default: false.
    pub show_deck_name: bool,
    /// Print the 1-based card number. Default: false.
    pub show_card_index: bool,
    /// Render each card's tag list (HTML only). Default: true.
    pub show_tags: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_deck_name: false,
            show_card_index: false,
            show_tags: true,
        }
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Pagination strategy for print output.
///
/// | Layout | Cards per page | Pages for N cards |
/// |--------|----------------|-------------------|
/// | `single` | 1 | 2N (front, back, front, back, …) |
/// | `a4_8`   | 8 (2 × 4 grid) | 2 × ceil(N / 8) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PdfLayout {
    /// One card face per A4 page.
    #[serde(rename = "single")]
    Single,
    /// Eight cards per A4 sheet with a mirrored back page for duplex printing. (default)
    #[default]
    #[serde(rename = "a4_8")]
    A4Eight,
}

impl PdfLayout {
    pub const ALL: [PdfLayout; 2] = [PdfLayout::Single, PdfLayout::A4Eight];

    pub fn as_str(&self) -> &'static str {
        match self {
            PdfLayout::Single => "single",
            PdfLayout::A4Eight => "a4_8",
        }
    }

    /// Cards that fit on one physical sheet.
    pub fn cards_per_page(&self) -> usize {
        match self {
            PdfLayout::Single => 1,
            PdfLayout::A4Eight => 8,
        }
    }
}

impl fmt::Display for PdfLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PdfLayout {
    type Err = FlashcardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(PdfLayout::Single),
            "a4_8" => Ok(PdfLayout::A4Eight),
            other => Err(FlashcardError::UnknownLayout {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = GeneratorConfig::default();
        assert_eq!(c.limits.max_cards, 1000);
        assert_eq!(c.limits.max_tag_length, 50);
        assert!(c.display.show_tags);
        assert!(!c.allow_inline_html);
        assert_eq!(c.default_template, "minimal");
        assert_eq!(c.default_layout, PdfLayout::A4Eight);
    }

    #[test]
    fn build_rejects_zero_max_cards() {
        let err = GeneratorConfig::builder().max_cards(0).build().unwrap_err();
        assert!(matches!(err, FlashcardError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_unregistered_default_template() {
        let err = GeneratorConfig::builder()
            .default_template("glossy")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("glossy"));
    }

    #[test]
    fn layout_parses_known_names() {
        assert_eq!("single".parse::<PdfLayout>().unwrap(), PdfLayout::Single);
        assert_eq!(" a4_8 ".parse::<PdfLayout>().unwrap(), PdfLayout::A4Eight);
        assert!(matches!(
            "a4_16".parse::<PdfLayout>(),
            Err(FlashcardError::UnknownLayout { .. })
        ));
    }

    #[test]
    fn layout_serde_names() {
        assert_eq!(
            serde_json::to_string(&PdfLayout::A4Eight).unwrap(),
            "\"a4_8\""
        );
        assert_eq!(PdfLayout::A4Eight.cards_per_page(), 8);
    }
}
