//! PDF emission: a [`PagePlan`] list drawn into a `lopdf` document.
//!
//! Every page is A4 portrait. Card text goes through the Markdown stage's
//! text blocks and is word-wrapped with a Helvetica width estimate; the four
//! standard Type1 fonts (Helvetica, Helvetica-Bold, Helvetica-Oblique,
//! Courier) are referenced, never embedded, and text is encoded as WinAnsi.
//! Characters WinAnsi cannot encode print as `?`. Code blocks keep their
//! indentation and wrap by character.
//!
//! Text that does not fit its cell is clipped at the last whole line that
//! fits. Each clipped face is counted in [`LayoutStats::overflowed_faces`] and
//! logged; fonts are never shrunk to make room.
//!
//! The document is assembled fully in memory. Bytes only leave this module
//! once `save_to` has succeeded, so a failure never yields a partial PDF.

use crate::config::PdfLayout;
use crate::error::FlashcardError;
use crate::model::CardSet;
use crate::output::LayoutStats;
use crate::pipeline::layout::{self, Face, PagePlan};
use crate::pipeline::markdown::{MarkdownRenderer, TextBlockKind};
use crate::progress::ProgressCallback;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, info, warn};

// ── Page geometry (points) ───────────────────────────────────────────────────

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const PAGE_MARGIN: f32 = 15.0;
const HEADER_HEIGHT: f32 = 16.0;
const CELL_PADDING: f32 = 10.0;
const LINE_SPACING: f32 = 1.25;

/// Options for one PDF render.
#[derive(Clone, Default)]
pub struct PdfOptions {
    /// Print the deck title at the top of every page.
    pub show_deck_name: bool,
    /// Print `#n` in the corner of every card face.
    pub show_card_index: bool,
    pub markdown: MarkdownRenderer,
    pub progress: Option<ProgressCallback>,
}

/// Render `set` with `layout` into PDF bytes.
pub fn render(
    set: &CardSet,
    layout: PdfLayout,
    options: &PdfOptions,
) -> Result<(Vec<u8>, LayoutStats), FlashcardError> {
    let plan = layout::plan(layout, set.cards.len());
    let total_pages = plan.len();
    info!(
        "Laying out {} card(s) on {} page(s) ({})",
        set.cards.len(),
        total_pages,
        layout
    );
    if let Some(cb) = &options.progress {
        cb.on_layout_start(total_pages);
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let resources_id = add_font_resources(&mut doc);

    let mut stats = LayoutStats {
        cards: set.cards.len(),
        ..LayoutStats::default()
    };
    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(total_pages);

    for (n, page) in plan.iter().enumerate() {
        let content = draw_page(set, layout, page, options, &mut stats);
        let bytes = content
            .encode()
            .map_err(|e| FlashcardError::PdfEncoding(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), bytes));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id);

        match page.face {
            Face::Front => stats.front_pages += 1,
            Face::Back => stats.back_pages += 1,
        }
        if let Some(cb) = &options.progress {
            cb.on_page_rendered(n + 1, total_pages, page.face == Face::Back);
        }
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(to_win_ansi(&set.title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("cardforge ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(
            chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string(),
        ),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| FlashcardError::PdfEncoding(e.to_string()))?;

    stats.pages = total_pages;
    if stats.overflowed_faces > 0 {
        warn!(
            "{} card face(s) did not fit their cell and were clipped",
            stats.overflowed_faces
        );
    }
    if let Some(cb) = &options.progress {
        cb.on_layout_complete(total_pages, bytes.len());
    }
    debug!("PDF serialised: {} bytes", bytes.len());
    Ok((bytes, stats))
}

fn add_font_resources(doc: &mut Document) -> ObjectId {
    let font = |doc: &mut Document, base: &str| {
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(base.as_bytes().to_vec()),
            "Encoding" => "WinAnsiEncoding",
        })
    };
    let regular = font(doc, "Helvetica");
    let bold = font(doc, "Helvetica-Bold");
    let oblique = font(doc, "Helvetica-Oblique");
    let mono = font(doc, "Courier");
    doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
            "F3" => oblique,
            "F4" => mono,
        },
    })
}

// ── Fonts and text measurement ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontKind {
    Regular,
    Bold,
    Oblique,
    Mono,
}

impl FontKind {
    fn resource(self) -> &'static str {
        match self {
            FontKind::Regular => "F1",
            FontKind::Bold => "F2",
            FontKind::Oblique => "F3",
            FontKind::Mono => "F4",
        }
    }

    /// Approximate advance width in points.
    fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = match self {
            FontKind::Mono => 600 * text.chars().count() as u32,
            FontKind::Bold => text.chars().map(|c| helvetica_units(c) * 21 / 20).sum(),
            FontKind::Regular | FontKind::Oblique => text.chars().map(helvetica_units).sum(),
        };
        units as f32 * size / 1000.0
    }
}

/// Helvetica advance widths (1/1000 em), grouped by shape.
fn helvetica_units(c: char) -> u32 {
    match c {
        'i' | 'j' | 'l' | '‘' | '’' | '‚' => 222,
        '“' | '”' | '„' | '‹' | '›' | 'ˆ' | '˜' => 333,
        '•' => 350,
        '—' | '…' | '‰' | '™' | 'Œ' => 1000,
        'œ' => 944,
        'Š' | 'Ÿ' => 667,
        'Ž' => 611,
        'š' | 'ž' => 500,
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' | 'I' | 'f' | 't' | '/' | '[' | ']' => 278,
        'r' | '(' | ')' | '-' | '`' => 333,
        'm' | 'M' => 833,
        'W' => 944,
        'w' | 'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' => 778,
        'A'..='Z' => 667,
        _ => 556,
    }
}

/// Map to single-byte WinAnsi; characters it cannot encode become `?`.
fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars().map(win_ansi_byte).collect()
}

/// WinAnsi (cp1252) byte for `c`. 0x80–0x9F hold typographic glyphs rather
/// than the C1 controls, so those code points have no byte of their own.
fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{00}'..='\u{7F}' | '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

/// Greedy word wrap; words wider than `width` are broken by character.
///
/// Monospaced text is preformatted and goes through [`wrap_preformatted`].
fn wrap(text: &str, font: FontKind, size: f32, width: f32) -> Vec<String> {
    if font == FontKind::Mono {
        return wrap_preformatted(text, font, size, width);
    }
    let mut lines = Vec::new();
    for hard_line in text.split('\n') {
        let mut current = String::new();
        for word in hard_line.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if font.text_width(&candidate, size) <= width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                current.push(c);
                if font.text_width(&current, size) > width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Character wrap that keeps each line's leading whitespace.
///
/// Tabs count as four spaces. Continuation lines repeat the indent unless it
/// would take more than half the width.
fn wrap_preformatted(text: &str, font: FontKind, size: f32, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for hard_line in text.split('\n') {
        let hard_line = hard_line.replace('\t', "    ");
        let body = hard_line.trim_start_matches(' ');
        let indent = &hard_line[..hard_line.len() - body.len()];
        let continuation = if font.text_width(indent, size) * 2.0 > width {
            ""
        } else {
            indent
        };

        let mut current = indent.to_string();
        let mut floor = indent.chars().count();
        for c in body.chars() {
            current.push(c);
            if font.text_width(&current, size) > width && current.chars().count() > floor + 1 {
                current.pop();
                lines.push(std::mem::replace(&mut current, continuation.to_string()));
                floor = continuation.chars().count();
                current.push(c);
            }
        }
        lines.push(current);
    }
    lines
}

// ── Face layout ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct PlacedLine {
    font: FontKind,
    size: f32,
    text: String,
    indent: f32,
    /// Distance from the top of the text box to the baseline.
    baseline: f32,
    /// Draw a horizontal rule instead of text.
    rule: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct FaceLayout {
    lines: Vec<PlacedLine>,
    height: f32,
    overflowed: bool,
}

fn layout_face(
    markdown: &MarkdownRenderer,
    text: &str,
    width: f32,
    height: f32,
    base_size: f32,
) -> FaceLayout {
    let mut lines = Vec::new();
    let mut y = 0.0f32;
    let mut overflowed = false;

    'blocks: for (i, block) in markdown.text_blocks(text).iter().enumerate() {
        let gap = if i == 0 { 0.0 } else { base_size * 0.5 };
        let (font, size, indent) = match block.kind {
            TextBlockKind::Heading(level) => {
                let scale = match level {
                    1 => 1.4,
                    2 => 1.25,
                    _ => 1.1,
                };
                (FontKind::Bold, base_size * scale, 0.0)
            }
            TextBlockKind::Code => (FontKind::Mono, base_size * 0.9, 0.0),
            TextBlockKind::Quote => (FontKind::Oblique, base_size, 8.0),
            TextBlockKind::TableRow => (FontKind::Regular, base_size * 0.9, 0.0),
            TextBlockKind::ListItem | TextBlockKind::Paragraph | TextBlockKind::Rule => {
                (FontKind::Regular, base_size, 0.0)
            }
        };

        if block.kind == TextBlockKind::Rule {
            let bottom = y + gap + size * 0.6;
            if bottom > height {
                overflowed = true;
                break;
            }
            lines.push(PlacedLine {
                font,
                size,
                text: String::new(),
                indent: 0.0,
                baseline: y + gap + size * 0.3,
                rule: true,
            });
            y = bottom;
            continue;
        }

        for (j, line) in wrap(&block.text, font, size, width - indent).into_iter().enumerate() {
            let top = if j == 0 { y + gap } else { y };
            let bottom = top + size * LINE_SPACING;
            if bottom > height {
                overflowed = true;
                break 'blocks;
            }
            lines.push(PlacedLine {
                font,
                size,
                text: line,
                indent,
                baseline: top + size,
                rule: false,
            });
            y = bottom;
        }
    }

    FaceLayout {
        lines,
        height: y,
        overflowed,
    }
}

// ── Page drawing ─────────────────────────────────────────────────────────────

struct Cell {
    x: f32,
    top: f32,
    width: f32,
    height: f32,
}

fn draw_page(
    set: &CardSet,
    layout: PdfLayout,
    page: &PagePlan,
    options: &PdfOptions,
    stats: &mut LayoutStats,
) -> Content {
    let mut ops: Vec<Operation> = Vec::new();

    let mut grid_top = PAGE_HEIGHT - PAGE_MARGIN;
    if options.show_deck_name {
        text_op(
            &mut ops,
            FontKind::Bold,
            9.0,
            PAGE_MARGIN,
            PAGE_HEIGHT - PAGE_MARGIN - 9.0,
            &set.title,
            0.3,
        );
        grid_top -= HEADER_HEIGHT;
    }

    let grid_width = PAGE_WIDTH - 2.0 * PAGE_MARGIN;
    let grid_height = grid_top - PAGE_MARGIN;
    let cell_width = grid_width / page.columns as f32;
    let cell_height = grid_height / page.rows as f32;
    let base_size = match layout {
        PdfLayout::Single => 14.0,
        PdfLayout::A4Eight => 10.0,
    };

    for slot in &page.slots {
        let Some(index) = slot.card_index else {
            continue;
        };
        let Some(card) = set.cards.get(index) else {
            continue;
        };
        let cell = Cell {
            x: PAGE_MARGIN + slot.column as f32 * cell_width,
            top: grid_top - slot.row as f32 * cell_height,
            width: cell_width,
            height: cell_height,
        };

        if layout == PdfLayout::A4Eight {
            cut_guide(&mut ops, &cell);
        }
        if options.show_card_index {
            let label = format!("#{}", index + 1);
            let w = FontKind::Regular.text_width(&label, 7.0);
            text_op(
                &mut ops,
                FontKind::Regular,
                7.0,
                cell.x + cell.width - 4.0 - w,
                cell.top - 9.0,
                &label,
                0.5,
            );
        }

        let text = match page.face {
            Face::Front => &card.front,
            Face::Back => &card.back,
        };
        let inner_width = cell.width - 2.0 * CELL_PADDING;
        let inner_height = cell.height - 2.0 * CELL_PADDING;
        let face = layout_face(&options.markdown, text, inner_width, inner_height, base_size);
        if face.overflowed {
            stats.overflowed_faces += 1;
            warn!(
                "Card {} ({:?} face) overflows its cell; text clipped",
                index + 1,
                page.face
            );
        }

        // Fronts are centred in the cell; backs read from the top-left.
        let offset = match page.face {
            Face::Front if !face.overflowed => (inner_height - face.height) / 2.0,
            _ => 0.0,
        };
        let text_top = cell.top - CELL_PADDING - offset;
        for line in &face.lines {
            let y = text_top - line.baseline;
            if line.rule {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("G", vec![0.6f32.into()]));
                ops.push(Operation::new("w", vec![0.5f32.into()]));
                ops.push(Operation::new("m", vec![(cell.x + CELL_PADDING).into(), y.into()]));
                ops.push(Operation::new(
                    "l",
                    vec![(cell.x + CELL_PADDING + inner_width).into(), y.into()],
                ));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
                continue;
            }
            // Code keeps its indentation, so it is never centred.
            let x = match page.face {
                Face::Front if line.font != FontKind::Mono => {
                    let w = line.font.text_width(&line.text, line.size);
                    cell.x + CELL_PADDING + line.indent + ((inner_width - line.indent - w) / 2.0).max(0.0)
                }
                _ => cell.x + CELL_PADDING + line.indent,
            };
            text_op(&mut ops, line.font, line.size, x, y, &line.text, 0.0);
        }
    }

    Content { operations: ops }
}

fn text_op(ops: &mut Vec<Operation>, font: FontKind, size: f32, x: f32, y: f32, text: &str, gray: f32) {
    if text.is_empty() {
        return;
    }
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("g", vec![gray.into()]));
    ops.push(Operation::new("Tf", vec![font.resource().into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Dashed rectangle around an occupied cell.
fn cut_guide(ops: &mut Vec<Operation>, cell: &Cell) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("G", vec![0.7f32.into()]));
    ops.push(Operation::new("w", vec![0.5f32.into()]));
    ops.push(Operation::new(
        "d",
        vec![Object::Array(vec![3.into(), 3.into()]), 0.into()],
    ));
    ops.push(Operation::new(
        "re",
        vec![
            cell.x.into(),
            (cell.top - cell.height).into(),
            cell.width.into(),
            cell.height.into(),
        ],
    ));
    ops.push(Operation::new("S", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Card;

    fn deck(n: usize) -> CardSet {
        CardSet::new(
            "Deck",
            (1..=n)
                .map(|i| Card::new(format!("Q{i}"), format!("A{i}")))
                .collect(),
        )
    }

    fn page_texts(bytes: &[u8]) -> Vec<String> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
            .collect()
    }

    #[test]
    fn a4_8_document_has_interleaved_pages() {
        let (bytes, stats) = render(&deck(10), PdfLayout::A4Eight, &PdfOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert_eq!(stats.pages, 4);
        assert_eq!(stats.front_pages, 2);
        assert_eq!(stats.back_pages, 2);
        assert_eq!(stats.overflowed_faces, 0);

        let pages = page_texts(&bytes);
        assert_eq!(pages.len(), 4);
        assert!(pages[0].contains("(Q1)") && pages[0].contains("(Q8)"));
        assert!(pages[1].contains("(A1)") && !pages[1].contains("(Q1)"));
        assert!(pages[2].contains("(Q9)") && pages[2].contains("(Q10)"));
        assert!(pages[3].contains("(A10)"));
    }

    #[test]
    fn single_layout_has_two_pages_per_card() {
        let (bytes, stats) = render(&deck(3), PdfLayout::Single, &PdfOptions::default()).unwrap();
        assert_eq!(stats.pages, 6);
        let pages = page_texts(&bytes);
        assert!(pages[0].contains("(Q1)"));
        assert!(pages[1].contains("(A1)"));
        assert!(pages[4].contains("(Q3)"));
        assert!(pages[5].contains("(A3)"));
    }

    #[test]
    fn back_page_places_cards_in_mirrored_column() {
        let (bytes, _) = render(&deck(2), PdfLayout::A4Eight, &PdfOptions::default()).unwrap();
        let pages = page_texts(&bytes);
        // Front: card 1 on the left. Back: card 1 on the right, so A2 is drawn first.
        let back = &pages[1];
        assert!(back.find("(A2)").unwrap() < back.find("(A1)").unwrap());
    }

    #[test]
    fn decorations_are_optional() {
        let options = PdfOptions {
            show_deck_name: true,
            show_card_index: true,
            ..PdfOptions::default()
        };
        let (bytes, _) = render(&deck(1), PdfLayout::A4Eight, &options).unwrap();
        let pages = page_texts(&bytes);
        assert!(pages[0].contains("(Deck)"));
        assert!(pages[0].contains("(#1)"));

        let (plain, _) = render(&deck(1), PdfLayout::A4Eight, &PdfOptions::default()).unwrap();
        assert!(!page_texts(&plain)[0].contains("(#1)"));
    }

    #[test]
    fn overflowing_text_is_clipped_and_counted() {
        let long = "word ".repeat(2000);
        let set = CardSet::new("Deck", vec![Card::new("short", long)]);
        let (_, stats) = render(&set, PdfLayout::A4Eight, &PdfOptions::default()).unwrap();
        assert_eq!(stats.overflowed_faces, 1);
    }

    #[test]
    fn non_latin1_becomes_question_mark() {
        assert_eq!(to_win_ansi("é→x"), vec![0xE9, b'?', b'x']);
        assert_eq!(to_win_ansi("日\u{85}"), vec![b'?', b'?']);
    }

    #[test]
    fn typographic_punctuation_uses_win_ansi_bytes() {
        assert_eq!(
            to_win_ansi("“Hello” — it’s €5…"),
            vec![
                0x93, b'H', b'e', b'l', b'l', b'o', 0x94, b' ', 0x97, b' ', b'i', b't', 0x92,
                b's', b' ', 0x80, b'5', 0x85
            ]
        );
        assert_eq!(to_win_ansi("–•™Œœ"), vec![0x96, 0x95, 0x99, 0x8C, 0x9C]);
        assert!(helvetica_units('—') > helvetica_units('-'));
    }

    #[test]
    fn smart_quotes_reach_the_page_intact() {
        let set = CardSet::new("Deck", vec![Card::new("“Hi” – €5", "A")]);
        let (bytes, _) = render(&set, PdfLayout::Single, &PdfOptions::default()).unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let first = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(first).unwrap();
        let needle: &[u8] = &[0x93, b'H', b'i', 0x94, b' ', 0x96, b' ', 0x80, b'5'];
        assert!(content.windows(needle.len()).any(|w| w == needle));
        assert!(!content.windows(3).any(|w| w == b"?Hi"));
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("alpha beta gamma delta", FontKind::Regular, 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(FontKind::Regular.text_width(line, 10.0) <= 60.0, "{line}");
        }
        let joined = lines.join(" ");
        assert_eq!(joined, "alpha beta gamma delta");
    }

    #[test]
    fn wrap_breaks_long_words() {
        let lines = wrap(&"x".repeat(100), FontKind::Mono, 10.0, 60.0);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.concat().len(), 100);
    }

    #[test]
    fn code_blocks_keep_indentation() {
        let face = layout_face(
            &MarkdownRenderer::default(),
            "```python\ndef f():\n    return 1\n```",
            200.0,
            200.0,
            10.0,
        );
        let texts: Vec<_> = face.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["def f():", "    return 1"]);
        assert!(face.lines.iter().all(|l| l.font == FontKind::Mono));
    }

    #[test]
    fn tabs_indent_as_four_spaces() {
        let lines = wrap("\tx", FontKind::Mono, 10.0, 200.0);
        assert_eq!(lines, vec!["    x"]);
    }

    #[test]
    fn long_code_lines_wrap_under_their_indent() {
        let line = format!("  {}", "y".repeat(30));
        let lines = wrap(&line, FontKind::Mono, 10.0, 60.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.starts_with("  ")));
        assert!(lines.iter().all(|l| FontKind::Mono.text_width(l, 10.0) <= 60.0));
        let body: String = lines.iter().map(|l| &l[2..]).collect();
        assert_eq!(body, "y".repeat(30));
    }

    #[test]
    fn face_layout_styles_blocks() {
        let face = layout_face(
            &MarkdownRenderer::default(),
            "# Title\n\nbody\n\n```\ncode\n```",
            200.0,
            200.0,
            10.0,
        );
        assert!(!face.overflowed);
        assert_eq!(face.lines[0].font, FontKind::Bold);
        assert_eq!(face.lines[1].font, FontKind::Regular);
        assert_eq!(face.lines[2].font, FontKind::Mono);
        assert!(face.lines[0].baseline < face.lines[1].baseline);
    }
}
