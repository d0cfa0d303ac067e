//! Markdown → sanitized HTML, and Markdown → styled text blocks.
//!
//! Both outputs parse with the same `pulldown-cmark` options, so the HTML page
//! and the PDF agree on block structure. Only the HTML path needs the
//! sanitizing pass below; text blocks never carry markup.
//!
//! ## Sanitizing rules
//!
//! 1. Raw HTML (block or inline) becomes literal text unless
//!    [`MarkdownRenderer::allow_html`] is set; then only the tags in
//!    [`ALLOWED_INLINE_TAGS`] survive, stripped of attributes, and every
//!    other tag is still escaped.
//! 2. Link and image destinations using `javascript:`, `vbscript:` or a
//!    `data:` URL (other than a raster image, for `<img>`) are replaced by `#`.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag};
use regex::Regex;

/// Inline tags that may pass through when raw HTML is enabled.
pub const ALLOWED_INLINE_TAGS: &[&str] = &["br", "sub", "sup", "ruby", "rt", "rp"];

static RE_ALLOWED_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*(/?)\s*(br|sub|sup|ruby|rt|rp)\s*/?\s*>").expect("valid regex")
});

/// Render Markdown with default options (raw HTML escaped).
pub fn render(text: &str) -> String {
    MarkdownRenderer::default().render(text)
}

/// Markdown renderer shared by the HTML and PDF outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownRenderer {
    /// Pass the [`ALLOWED_INLINE_TAGS`] through instead of escaping them.
    pub allow_html: bool,
}

impl MarkdownRenderer {
    pub fn new(allow_html: bool) -> Self {
        Self { allow_html }
    }

    /// Convert Markdown to an HTML fragment.
    ///
    /// Deterministic and total: any input string produces some fragment.
    pub fn render(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 3 / 2 + 16);
        html::push_html(&mut out, self.events(text));
        out
    }

    /// Flatten Markdown into plain-text blocks for fixed-layout output.
    ///
    /// Links lose their destinations and raw HTML stays literal text, except
    /// that allow-listed tags are dropped (and `<br>` breaks the line) when
    /// raw HTML is enabled.
    pub fn text_blocks(&self, text: &str) -> Vec<TextBlock> {
        let mut builder = BlockBuilder::default();
        let mut stack: Vec<Context> = Vec::new();
        let mut list_counters: Vec<Option<u64>> = Vec::new();

        for event in Parser::new_ext(text, parser_options()) {
            match event {
                Event::Start(tag) => {
                    let ctx = match &tag {
                        Tag::Heading { level, .. } => {
                            builder.open(TextBlockKind::Heading(heading_level(*level)), "");
                            Context::Heading
                        }
                        Tag::Paragraph => {
                            builder.open(context_kind(&stack), "");
                            Context::Other
                        }
                        Tag::CodeBlock(_) => {
                            builder.open(TextBlockKind::Code, "");
                            Context::Code
                        }
                        Tag::List(start) => {
                            builder.flush();
                            list_counters.push(*start);
                            Context::List
                        }
                        Tag::Item => {
                            let marker = match list_counters.last_mut() {
                                Some(Some(n)) => {
                                    let m = format!("{n}. ");
                                    *n += 1;
                                    m
                                }
                                _ => "- ".to_string(),
                            };
                            let depth = stack.iter().filter(|c| **c == Context::Item).count();
                            let prefix = format!("{}{marker}", "  ".repeat(depth));
                            builder.force_open(TextBlockKind::ListItem, &prefix);
                            Context::Item
                        }
                        Tag::BlockQuote(_) => {
                            builder.flush();
                            Context::Quote
                        }
                        Tag::TableHead | Tag::TableRow => {
                            builder.open(TextBlockKind::TableRow, "");
                            Context::Row
                        }
                        Tag::TableCell => {
                            builder.separate_cell();
                            Context::Other
                        }
                        _ => Context::Other,
                    };
                    stack.push(ctx);
                }
                Event::End(_) => match stack.pop() {
                    Some(Context::List) => {
                        list_counters.pop();
                        builder.flush();
                    }
                    Some(Context::Heading | Context::Code | Context::Item | Context::Quote | Context::Row) => {
                        builder.flush();
                    }
                    // Paragraphs nested in items or quotes are flushed by the
                    // next `open`, so a loose item's first paragraph stays on
                    // its bullet line.
                    _ if stack.is_empty() => builder.flush(),
                    _ => {}
                },
                Event::Text(s) | Event::Code(s) => builder.push(context_kind(&stack), &s),
                Event::Html(raw) | Event::InlineHtml(raw) => {
                    builder.push(context_kind(&stack), &html_to_text(&raw, self.allow_html));
                }
                Event::SoftBreak => builder.push(context_kind(&stack), " "),
                Event::HardBreak => builder.push(context_kind(&stack), "\n"),
                Event::Rule => {
                    builder.flush();
                    builder.blocks.push(TextBlock {
                        kind: TextBlockKind::Rule,
                        text: String::new(),
                    });
                }
                Event::TaskListMarker(done) => {
                    builder.push(context_kind(&stack), if done { "[x] " } else { "[ ] " });
                }
                _ => {}
            }
        }
        builder.flush();
        builder.blocks
    }

    /// The sanitized event stream the HTML output is built from.
    fn events<'a>(&self, text: &'a str) -> impl Iterator<Item = Event<'a>> + 'a {
        let allow_html = self.allow_html;
        Parser::new_ext(text, parser_options()).map(move |event| sanitize_event(event, allow_html))
    }
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

fn sanitize_event(event: Event<'_>, allow_html: bool) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) if !allow_html => Event::Text(raw),
        Event::Html(raw) => Event::Html(CowStr::from(sanitize_inline_html(&raw))),
        Event::InlineHtml(raw) => Event::InlineHtml(CowStr::from(sanitize_inline_html(&raw))),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_destination(dest_url, false),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_destination(dest_url, true),
            title,
            id,
        }),
        other => other,
    }
}

/// Keep allow-listed tags (normalised, attribute-free) and escape the rest.
fn sanitize_inline_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    let mut last = 0;
    for caps in RE_ALLOWED_TAG.captures_iter(raw) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&escape_html(&raw[last..m.start()]));
        let name = caps[2].to_ascii_lowercase();
        if name == "br" {
            out.push_str("<br>");
        } else {
            out.push('<');
            out.push_str(&caps[1]);
            out.push_str(&name);
            out.push('>');
        }
        last = m.end();
    }
    out.push_str(&escape_html(&raw[last..]));
    out
}

/// Plain-text reading of a raw HTML fragment.
fn html_to_text(raw: &str, allow_html: bool) -> String {
    if !allow_html {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in RE_ALLOWED_TAG.captures_iter(raw) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&raw[last..m.start()]);
        if caps[2].eq_ignore_ascii_case("br") {
            out.push('\n');
        }
        last = m.end();
    }
    out.push_str(&raw[last..]);
    out
}

fn safe_destination(dest: CowStr<'_>, is_image: bool) -> CowStr<'_> {
    if is_unsafe_url(&dest, is_image) {
        CowStr::Borrowed("#")
    } else {
        dest
    }
}

/// True for script-capable URL schemes.
pub fn is_unsafe_url(url: &str, is_image: bool) -> bool {
    let normalised: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if normalised.starts_with("javascript:") || normalised.starts_with("vbscript:") {
        return true;
    }
    if let Some(rest) = normalised.strip_prefix("data:") {
        let raster = ["image/png", "image/gif", "image/jpeg", "image/webp"]
            .iter()
            .any(|mime| rest.starts_with(mime));
        return !(is_image && raster);
    }
    false
}

/// Escape text for an HTML body or double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Text blocks ──────────────────────────────────────────────────────────────

/// One styled run of plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub kind: TextBlockKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBlockKind {
    Paragraph,
    /// Heading level 1–6.
    Heading(u8),
    /// Preformatted; line breaks are significant.
    Code,
    ListItem,
    Quote,
    /// Table cells joined with ` | `.
    TableRow,
    /// Thematic break; `text` is empty.
    Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Heading,
    Code,
    Item,
    Quote,
    Row,
    List,
    Other,
}

fn context_kind(stack: &[Context]) -> TextBlockKind {
    for ctx in stack.iter().rev() {
        match ctx {
            Context::Code => return TextBlockKind::Code,
            Context::Row => return TextBlockKind::TableRow,
            Context::Item => return TextBlockKind::ListItem,
            Context::Quote => return TextBlockKind::Quote,
            _ => {}
        }
    }
    TextBlockKind::Paragraph
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<TextBlock>,
    current: Option<TextBlock>,
    /// The open block holds nothing but its prefix.
    fresh: bool,
}

impl BlockBuilder {
    /// Start a block unless a fresh one of the same kind is already open.
    fn open(&mut self, kind: TextBlockKind, prefix: &str) {
        if self.fresh && self.current.as_ref().is_some_and(|b| b.kind == kind) {
            return;
        }
        self.force_open(kind, prefix);
    }

    fn force_open(&mut self, kind: TextBlockKind, prefix: &str) {
        self.flush();
        self.current = Some(TextBlock {
            kind,
            text: prefix.to_string(),
        });
        self.fresh = true;
    }

    fn push(&mut self, kind: TextBlockKind, s: &str) {
        if self.current.is_none() {
            self.force_open(kind, "");
        }
        if let Some(block) = self.current.as_mut() {
            block.text.push_str(s);
            self.fresh = false;
        }
    }

    fn separate_cell(&mut self) {
        if let Some(block) = self.current.as_mut() {
            if !block.text.is_empty() {
                block.text.push_str(" | ");
            }
        }
    }

    fn flush(&mut self) {
        self.fresh = false;
        let Some(mut block) = self.current.take() else {
            return;
        };
        let trimmed = match block.kind {
            TextBlockKind::Code => block.text.trim_end_matches('\n').to_string(),
            TextBlockKind::ListItem => block.text.trim_end().to_string(),
            _ => block.text.trim().to_string(),
        };
        if trimmed.trim().is_empty() {
            return;
        }
        block.text = trimmed;
        self.blocks.push(block);
    }
}
