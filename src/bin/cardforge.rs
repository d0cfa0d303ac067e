//! CLI binary for cardforge.
//!
//! A thin shim over the library crate that maps subcommands and flags to
//! `GeneratorConfig` plus the operation argument structs, and prints results.

use anyhow::{Context, Result};
use cardforge::pipeline::input;
use cardforge::tools::{self, PdfRequest};
use cardforge::{
    ConvertCsvArgs, GeneratorConfig, LayoutProgressCallback, PdfLayout, ProgressCallback, Theme,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the pages of the PDF being laid out.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Validating deck…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl LayoutProgressCallback for CliProgressCallback {
    fn on_layout_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Laying out");
    }

    fn on_page_rendered(&self, _page_num: usize, _total_pages: usize, is_back: bool) {
        self.bar
            .set_message(if is_back { "backs" } else { "fronts" }.to_string());
        self.bar.inc(1);
    }

    fn on_layout_complete(&self, total_pages: usize, byte_len: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages laid out  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{byte_len} bytes"))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive HTML page (stdout)
  cardforge html deck.json > deck.html

  # Print-ready PDF, 8 cards per sheet with mirrored backs
  cardforge pdf deck.json -o deck.pdf

  # One card per page into a directory (file name derived from the title)
  cardforge pdf --layout single deck.json -o pdfs/

  # CSV with question in column 0, answer in columns 1+2, tags in column 3
  cardforge csv vocab.csv --front 0 --back 1,2 --tags 3 -o vocab.json

  # Straight from CSV to HTML
  cardforge csv vocab.csv --html --template listen -o vocab.html

  # Check a deck; exit status 1 when invalid
  cardforge validate deck.json

  # Read from stdin
  cat deck.json | cardforge pdf - -o deck.pdf

PRINTING a4_8:
  Print double-sided, flipping on the LONG edge. Each back page mirrors
  its front page column-wise, so every answer lands behind its question.
  Cut along the dashed guides.

DECK FORMAT:
  {"title": "French", "cards": [{"front": "**bonjour**", "back": "hello",
   "tags": ["greetings"]}], "style": {"theme": "dark"}}

ENVIRONMENT VARIABLES:
  CARDFORGE_TEMPLATE     Default HTML template (default, minimal, listen)
  CARDFORGE_LAYOUT       Default PDF layout (single, a4_8)
  CARDFORGE_OUTPUT_DIR   Directory for PDFs written without -o
  CARDFORGE_ALLOW_HTML   Pass <br>, <sub>, <sup>, <ruby>, <rt>, <rp> through
  RUST_LOG               Override log filtering (e.g. cardforge=debug)
"#;

/// Build interactive HTML pages and duplex-ready PDFs from flashcard decks.
#[derive(Parser, Debug)]
#[command(
    name = "cardforge",
    version,
    about = "Build interactive HTML pages and duplex-ready PDFs from flashcard decks",
    long_about = "Turn flashcard decks (JSON, or CSV through a column mapping) whose card faces \
are Markdown into standalone HTML study pages or A4 PDFs. The a4_8 layout prints eight cards \
per sheet with mirrored backs for long-edge duplex printing.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Let a small inline-HTML allow-list through Markdown (br, sub, sup, ruby).
    #[arg(long, global = true, env = "CARDFORGE_ALLOW_HTML")]
    allow_html: bool,

    /// Maximum cards accepted in one deck.
    #[arg(long, global = true, env = "CARDFORGE_MAX_CARDS", default_value_t = 1000)]
    max_cards: usize,

    /// Disable progress bar.
    #[arg(long, global = true, env = "CARDFORGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CARDFORGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "CARDFORGE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON deck as a standalone HTML page.
    Html {
        /// Deck JSON file, or `-` for stdin.
        input: String,

        /// HTML template: default, minimal, listen.
        #[arg(long, env = "CARDFORGE_TEMPLATE")]
        template: Option<String>,

        /// Override the deck's theme: light, dark, custom.
        #[arg(long)]
        theme: Option<String>,

        /// Write HTML to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Lay out a JSON deck as an A4 PDF.
    Pdf {
        /// Deck JSON file, or `-` for stdin.
        input: String,

        /// PDF layout: single or a4_8.
        #[arg(long, env = "CARDFORGE_LAYOUT", default_value = "a4_8")]
        layout: String,

        /// A `.pdf` file, or a directory to write `<title>_<layout>.pdf` into.
        #[arg(short, long, env = "CARDFORGE_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Print the deck title at the top of every page.
        #[arg(long)]
        show_deck_name: bool,

        /// Print `#n` on every card face.
        #[arg(long)]
        show_card_index: bool,

        /// Output a JSON summary instead of a status line.
        #[arg(long)]
        json: bool,
    },

    /// Map CSV rows to cards and emit card-set JSON (or HTML with --html).
    Csv {
        /// CSV file, or `-` for stdin.
        input: String,

        /// Column(s) joined into the front, e.g. `0` or `0,2`.
        #[arg(long, default_value = "0")]
        front: String,

        /// Column(s) joined into the back.
        #[arg(long, default_value = "1")]
        back: String,

        /// Column holding tags.
        #[arg(long)]
        tags: Option<usize>,

        /// The first row is data, not a header.
        #[arg(long)]
        no_header: bool,

        /// Joins multiple columns of one face.
        #[arg(long, default_value = " ")]
        separator: String,

        /// Splits the tags column.
        #[arg(long, default_value = ",")]
        tag_delimiter: String,

        /// Deck title.
        #[arg(long)]
        title: Option<String>,

        /// Deck description.
        #[arg(long)]
        description: Option<String>,

        /// Render HTML instead of emitting JSON.
        #[arg(long)]
        html: bool,

        /// HTML template: default, minimal, listen.
        #[arg(long, env = "CARDFORGE_TEMPLATE")]
        template: Option<String>,

        /// Theme: light, dark, custom.
        #[arg(long)]
        theme: Option<String>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a JSON deck and list every issue; exit status 1 when invalid.
    Validate {
        /// Deck JSON file, or `-` for stdin.
        input: String,

        /// Output the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List templates, PDF layouts and themes.
    Templates {
        /// Output the catalog as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && matches!(cli.command, Command::Pdf { json: false, .. });
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn LayoutProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    match &cli.command {
        Command::Html {
            input: source,
            template,
            theme,
            output,
        } => {
            let value = input::read_json(source).context("Failed to read deck")?;
            let mut set = tools::validate_value(&value, &config).context("Invalid deck")?;
            if let Some(theme) = theme {
                let theme: Theme = theme.parse().map_err(anyhow::Error::msg)?;
                set.style.get_or_insert_with(Default::default).theme = theme;
            }
            let html = tools::render_card_set_html(&set, template.as_deref(), &config)
                .context("Failed to render HTML")?;
            emit(&html, output.as_deref())?;
            if !cli.quiet {
                if let Some(path) = output {
                    eprintln!(
                        "{} {} cards  →  {}",
                        green("✔"),
                        set.cards.len(),
                        bold(&path.display().to_string())
                    );
                }
            }
        }

        Command::Pdf {
            input: source,
            layout,
            output,
            show_deck_name,
            show_card_index,
            json,
        } => {
            let layout: PdfLayout = layout.parse()?;
            let value = input::read_json(source).context("Failed to read deck")?;
            let set = tools::validate_value(&value, &config).context("Invalid deck")?;
            let request = PdfRequest {
                layout,
                // Without -o the PDF goes next to the caller, named after the deck.
                output_path: Some(output.clone().unwrap_or_else(|| PathBuf::from("."))),
                show_deck_name: *show_deck_name || config.display.show_deck_name,
                show_card_index: *show_card_index || config.display.show_card_index,
            };
            let pdf = tools::render_card_set_pdf(set, request, &config)
                .await
                .context("PDF generation failed")?;

            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&pdf).context("Failed to serialise output")?
                );
            } else if !cli.quiet {
                eprintln!("{} {}", green("✔"), pdf.summary());
                if pdf.stats.overflowed_faces > 0 {
                    eprintln!(
                        "{} {} card face(s) were clipped to fit their cell",
                        yellow("⚠"),
                        pdf.stats.overflowed_faces
                    );
                }
            }
        }

        Command::Csv {
            input: source,
            front,
            back,
            tags,
            no_header,
            separator,
            tag_delimiter,
            title,
            description,
            html,
            template,
            theme,
            output,
        } => {
            let csv_content = input::read_source(source).context("Failed to read CSV")?;
            let mut args = ConvertCsvArgs::new(csv_content);
            args.front_columns = cardforge::pipeline::csv_import::parse_column_list(front)?;
            args.back_columns = cardforge::pipeline::csv_import::parse_column_list(back)?;
            args.tags_column = *tags;
            args.has_header = !*no_header;
            args.column_separator = separator.clone();
            args.tag_delimiter = tag_delimiter.clone();
            if let Some(title) = title.clone().or_else(|| input::source_stem(source)) {
                args.title = title;
            }
            args.description = description.clone();
            args.template = template.clone();
            args.theme = theme.clone();

            let conversion = if *html {
                tools::convert_csv_to_flashcards(args, &config)
            } else {
                tools::convert_csv_to_json(args, &config)
            }
            .context("CSV conversion failed")?;

            emit(&conversion.output, output.as_deref())?;
            if !cli.quiet {
                for issue in &conversion.issues {
                    eprintln!("  {} {}", yellow("skipped"), issue);
                }
                eprintln!(
                    "{} {}/{} rows converted",
                    if conversion.issues.is_empty() {
                        green("✔")
                    } else {
                        yellow("⚠")
                    },
                    conversion.card_count,
                    conversion.rows_read
                );
            }
        }

        Command::Validate {
            input: source,
            json,
        } => {
            let value = input::read_json(source).context("Failed to read deck")?;
            let report = tools::validate_flashcard_data(&value, &config);
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise report")?
                );
            } else {
                for issue in report.errors() {
                    println!("{} {}", red("✗"), issue);
                }
                for issue in report.warnings() {
                    println!("{} {}", yellow("⚠"), issue);
                }
                if report.valid {
                    println!("{} valid deck with {} cards", green("✔"), report.card_count);
                } else {
                    println!(
                        "{} {} error(s)",
                        red("✘"),
                        bold(&report.errors().count().to_string())
                    );
                }
            }
            if !report.valid {
                std::process::exit(1);
            }
        }

        Command::Templates { json } => {
            let catalog = tools::get_flashcard_templates();
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&catalog).context("Failed to serialise catalog")?
                );
            } else {
                println!("{}", bold("Templates"));
                for t in &catalog.templates {
                    let mut extras = Vec::new();
                    if t.supports_voice {
                        extras.push("voice");
                    }
                    if t.supports_print {
                        extras.push("print");
                    }
                    println!("  {:<10} {}  {}", t.name, t.description, dim(&extras.join(", ")));
                }
                println!("{}", bold("PDF layouts"));
                for l in &catalog.layouts {
                    println!(
                        "  {:<10} {}  {}",
                        l.name,
                        l.description,
                        dim(&format!("{}, {} per page", l.page_size, l.cards_per_page))
                    );
                }
                println!("{}  {}", bold("Themes"), catalog.themes.join(", "));
            }
        }
    }

    Ok(())
}

/// Map global CLI flags to `GeneratorConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GeneratorConfig> {
    let mut builder = GeneratorConfig::builder()
        .max_cards(cli.max_cards)
        .allow_inline_html(cli.allow_html);

    if let Ok(template) = std::env::var("CARDFORGE_TEMPLATE") {
        builder = builder.default_template(template);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Write `text` to `path` atomically, or to stdout.
fn emit(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => tools::write_atomic(path, text.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
            Ok(())
        }
    }
}
