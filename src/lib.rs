//! # cardforge
//!
//! Turn flashcard decks written in Markdown into interactive HTML pages and
//! duplex-ready PDFs.
//!
//! ## Why this crate?
//!
//! A deck is just a list of front/back pairs, but getting it onto paper so
//! that each answer lands behind its question after a long-edge duplex print
//! takes a mirrored layout. Getting it into a browser safely takes Markdown
//! rendering that never lets raw markup or `javascript:` links through. This
//! crate does both from the same validated [`CardSet`].
//!
//! ## Pipeline Overview
//!
//! ```text
//! JSON / CSV
//!  │
//!  ├─ 1. Input     read a file or stdin, parse JSON or map CSV columns
//!  ├─ 2. Validate  collect every issue with its path (cards[3].front, …)
//!  ├─ 3. Markdown  sanitized HTML fragments / text blocks for print
//!  ├─ 4a. Template fill a registered HTML template (default, minimal, listen)
//!  └─ 4b. Layout   single or a4_8 (4×2 grid, backs mirrored) → lopdf PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardforge::{generate_flashcards_pdf, GeneratePdfArgs, GeneratorConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GeneratorConfig::builder().output_dir("pdfs").build()?;
//!     let mut args = GeneratePdfArgs::new(json!([
//!         {"front": "**bonjour**", "back": "hello", "tags": ["greetings"]},
//!         {"front": "merci", "back": "thank you"},
//!     ]));
//!     args.title = "French Basics".into();
//!     let output = generate_flashcards_pdf(args, &config).await?;
//!     eprintln!("{}", output.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cardforge` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! cardforge = { version = "0.3", default-features = false }
//! ```
//!
//! ## Layouts
//!
//! | Layout | Cards / page | Pages per 8 cards | Notes |
//! |--------|-------------|-------------------|-------|
//! | `single` | 1 | 16 | front page, then its back page |
//! | `a4_8`   | 8 | 2  | 4 rows × 2 columns, back columns mirrored, cut guides |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod templates;
pub mod tools;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DisplayOptions, GeneratorConfig, GeneratorConfigBuilder, Limits, PdfLayout};
pub use error::{FlashcardError, Issue, IssueKind, Severity};
pub use model::{Card, CardSet, Metadata, StyleConfig, Theme};
pub use output::{
    CsvConversion, CsvFormat, LayoutStats, PdfOutput, TemplateCatalog, ValidationReport,
};
pub use progress::{LayoutProgressCallback, NoopProgressCallback, ProgressCallback};
pub use tools::{
    convert_csv_to_flashcards, convert_csv_to_json, create_flashcards_from_json,
    generate_flashcards_pdf, generate_flashcards_pdf_sync, get_flashcard_templates,
    validate_flashcard_data, ConvertCsvArgs, CreateFlashcardsArgs, GeneratePdfArgs, PdfRequest,
};
