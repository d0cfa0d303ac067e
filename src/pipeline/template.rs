//! Template renderer: card set + registered template → standalone HTML page.
//!
//! The renderer owns the card markup; the template shell owns everything
//! else. Shells are filled in a single pass over their `{{name}}` slots, so
//! text inside a card that happens to look like a slot is never expanded.
//!
//! | Slot | Value |
//! |------|-------|
//! | `{{title}}` | escaped deck title |
//! | `{{description_section}}` | `<p class="description">…</p>` or nothing |
//! | `{{theme}}` | `theme-light` / `theme-dark` / `theme-custom` |
//! | `{{style_vars}}` | CSS custom properties (palette, font, column count) |
//! | `{{total_cards}}` | number of cards |
//! | `{{cards}}` | the card markup |

use crate::config::DisplayOptions;
use crate::error::FlashcardError;
use crate::model::{Card, CardSet, Theme};
use crate::pipeline::markdown::{escape_html, MarkdownRenderer};
use crate::templates::{self, LayoutKind};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::debug;

static RE_SLOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([a-z_]+)\}\}").expect("valid regex"));

static RE_BARE_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

/// Font used when the card set names none.
pub const DEFAULT_FONT: &str = "Arial, sans-serif";

/// Colour roles, in the order they are emitted as CSS variables.
pub const COLOR_ROLES: &[&str] = &[
    "primary",
    "secondary",
    "background",
    "text",
    "card_bg",
    "card_border",
    "card_front_bg",
    "card_back_bg",
];

const LIGHT_PALETTE: [&str; 8] = [
    "#007bff", "#6c757d", "#ffffff", "#333333", "#ffffff", "#dddddd", "#ffffff", "#f5f5f5",
];

const DARK_PALETTE: [&str; 8] = [
    "#007bff", "#6c757d", "#1a1a1a", "#ffffff", "#2d2d2d", "#444444", "#2d2d2d", "#3d3d3d",
];

/// Render `set` through the template called `template_name`.
pub fn render(
    set: &CardSet,
    template_name: &str,
    display: &DisplayOptions,
    markdown: &MarkdownRenderer,
) -> Result<String, FlashcardError> {
    let template = templates::find(template_name).ok_or_else(|| FlashcardError::TemplateNotFound {
        name: template_name.to_string(),
        available: templates::names().join(", "),
    })?;

    let cards = match template.layout_kind {
        LayoutKind::Grid { columns } => grid_markup(set, columns, display, markdown),
        LayoutKind::Single => list_markup(set, display, markdown),
    };
    let columns = match template.layout_kind {
        LayoutKind::Grid { columns } => columns,
        LayoutKind::Single => 1,
    };

    let mut slots: BTreeMap<&str, String> = BTreeMap::new();
    slots.insert("title", escape_html(&set.title));
    slots.insert("description_section", description_section(set));
    slots.insert("theme", format!("theme-{}", set.theme()));
    slots.insert("style_vars", style_vars(set, columns));
    slots.insert("total_cards", set.cards.len().to_string());
    slots.insert("cards", cards);

    let html = RE_SLOT
        .replace_all(template.source, |caps: &Captures<'_>| {
            slots
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned();

    debug!(
        "Rendered {} card(s) with template '{}' ({} bytes)",
        set.cards.len(),
        template.name,
        html.len()
    );
    Ok(html)
}

/// The effective palette as `(role, colour)` pairs in [`COLOR_ROLES`] order.
///
/// `custom` starts from the light palette and overrides the roles present in
/// `style.colors`; a bare hex value gets its `#`.
pub fn palette(set: &CardSet) -> Vec<(&'static str, String)> {
    let theme = set.theme();
    let base = match theme {
        Theme::Dark => DARK_PALETTE,
        Theme::Light | Theme::Custom => LIGHT_PALETTE,
    };
    let overrides = set
        .style
        .as_ref()
        .filter(|_| theme == Theme::Custom)
        .map(|s| &s.colors);

    COLOR_ROLES
        .iter()
        .zip(base)
        .map(|(role, default)| {
            let value = match overrides.and_then(|c| c.get(*role)) {
                Some(v) if RE_BARE_HEX.is_match(v.trim()) => format!("#{}", v.trim()),
                Some(v) => v.trim().to_string(),
                None => default.to_string(),
            };
            (*role, value)
        })
        .collect()
}

fn style_vars(set: &CardSet, columns: usize) -> String {
    let font = set
        .style
        .as_ref()
        .and_then(|s| s.font.as_deref())
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(DEFAULT_FONT);

    let mut out = String::new();
    for (role, value) in palette(set) {
        let _ = writeln!(out, "  --{}: {};", role.replace('_', "-"), css_value(&value));
    }
    let _ = writeln!(out, "  --font: {};", css_value(font));
    let _ = write!(out, "  --columns: {columns};");
    out
}

/// Keep a value inside its declaration and out of the markup.
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';' | '\n' | '\r'))
        .collect()
}

fn description_section(set: &CardSet) -> String {
    match set.description.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => format!("<p class=\"description\">{}</p>", escape_html(d)),
        _ => String::new(),
    }
}

// ── Card markup ──────────────────────────────────────────────────────────────

fn grid_markup(
    set: &CardSet,
    columns: usize,
    display: &DisplayOptions,
    markdown: &MarkdownRenderer,
) -> String {
    let mut out = String::new();
    for (row, chunk) in set.cards.chunks(columns.max(1)).enumerate() {
        out.push_str("<div class=\"card-row\">\n");
        for (offset, card) in chunk.iter().enumerate() {
            let index = row * columns.max(1) + offset;
            let _ = write!(
                out,
                "<div class=\"card\" {attrs}>\n<div class=\"card-inner\">\n\
                 <div class=\"card-face card-front\">{badges}{front}</div>\n\
                 <div class=\"card-face card-back\">{back}{tags}</div>\n\
                 </div>\n</div>\n",
                attrs = card_attributes(card, index),
                badges = badges(set, index, display),
                front = markdown.render(&card.front),
                back = markdown.render(&card.back),
                tags = tag_list(card, display),
            );
        }
        out.push_str("</div>\n");
    }
    out
}

fn list_markup(set: &CardSet, display: &DisplayOptions, markdown: &MarkdownRenderer) -> String {
    let mut out = String::new();
    for (index, card) in set.cards.iter().enumerate() {
        let _ = write!(
            out,
            "<li class=\"card\" {attrs}>\n{badges}\
             <div class=\"card-front\">{front}</div>\n\
             <div class=\"card-back\">{back}{tags}</div>\n</li>\n",
            attrs = card_attributes(card, index),
            badges = badges(set, index, display),
            front = markdown.render(&card.front),
            back = markdown.render(&card.back),
            tags = tag_list(card, display),
        );
    }
    out
}

fn card_attributes(card: &Card, index: usize) -> String {
    format!(
        "id=\"{}\" data-index=\"{}\"",
        escape_html(&card.display_id(index)),
        index + 1
    )
}

fn badges(set: &CardSet, index: usize, display: &DisplayOptions) -> String {
    let mut out = String::new();
    if display.show_deck_name {
        let _ = write!(out, "<span class=\"deck-name\">{}</span>", escape_html(&set.title));
    }
    if display.show_card_index {
        let _ = write!(out, "<span class=\"card-index\">#{}</span>", index + 1);
    }
    out
}

fn tag_list(card: &Card, display: &DisplayOptions) -> String {
    if !display.show_tags || card.tags.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"card-tags\">");
    for tag in &card.tags {
        let _ = write!(out, "<li>{}</li>", escape_html(tag));
    }
    out.push_str("</ul>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StyleConfig;

    fn deck(n: usize) -> CardSet {
        CardSet::new(
            "Deck <1>",
            (1..=n)
                .map(|i| Card::new(format!("Q{i}"), format!("A{i}")))
                .collect(),
        )
    }

    fn render_default(set: &CardSet, name: &str) -> String {
        render(set, name, &DisplayOptions::default(), &MarkdownRenderer::default()).unwrap()
    }

    #[test]
    fn unknown_template_is_an_error() {
        let err = render(
            &deck(1),
            "glossy",
            &DisplayOptions::default(),
            &MarkdownRenderer::default(),
        )
        .unwrap_err();
        match err {
            FlashcardError::TemplateNotFound { name, available } => {
                assert_eq!(name, "glossy");
                assert!(available.contains("minimal"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn grid_places_two_cards_per_row_in_order() {
        let html = render_default(&deck(3), "default");
        assert_eq!(html.matches("<div class=\"card-row\">").count(), 2);
        assert_eq!(html.matches("card-face card-front").count(), 3);
        let q1 = html.find("<p>Q1</p>").unwrap();
        let q2 = html.find("<p>Q2</p>").unwrap();
        let q3 = html.find("<p>Q3</p>").unwrap();
        assert!(q1 < q2 && q2 < q3);
    }

    #[test]
    fn single_layout_is_an_ordered_list() {
        let html = render_default(&deck(2), "minimal");
        assert!(html.contains("class=\"card-list\""));
        assert_eq!(html.matches("<li class=\"card\"").count(), 2);
        assert!(html.find("id=\"card-1\"").unwrap() < html.find("id=\"card-2\"").unwrap());
    }

    #[test]
    fn title_is_escaped_and_counted() {
        let html = render_default(&deck(2), "listen");
        assert!(html.contains("<title>Deck &lt;1&gt;</title>"));
        assert!(html.contains("data-total-cards=\"2\""));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn card_text_is_not_treated_as_a_slot() {
        let set = CardSet::new("T", vec![Card::new("{{title}}", "A")]);
        let html = render_default(&set, "minimal");
        assert!(html.contains("<p>{{title}}</p>"));
    }

    #[test]
    fn tags_keep_order_and_duplicates() {
        let set = CardSet::new(
            "T",
            vec![Card::new("Q", "A").with_tags(["b", "a", "b"])],
        );
        let html = render_default(&set, "default");
        assert!(html.contains("<ul class=\"card-tags\"><li>b</li><li>a</li><li>b</li></ul>"));

        let hidden = DisplayOptions {
            show_tags: false,
            ..DisplayOptions::default()
        };
        let html = render(&set, "default", &hidden, &MarkdownRenderer::default()).unwrap();
        assert!(!html.contains("<ul class=\"card-tags\">"));
    }

    #[test]
    fn index_and_deck_name_badges() {
        let display = DisplayOptions {
            show_deck_name: true,
            show_card_index: true,
            show_tags: true,
        };
        let html = render(&deck(2), "minimal", &display, &MarkdownRenderer::default()).unwrap();
        assert!(html.contains("<span class=\"card-index\">#2</span>"));
        assert!(html.contains("<span class=\"deck-name\">Deck &lt;1&gt;</span>"));
    }

    #[test]
    fn description_section_is_optional() {
        let mut set = deck(1);
        assert!(!render_default(&set, "minimal").contains("class=\"description\""));
        set.description = Some("About & more".into());
        assert!(render_default(&set, "minimal")
            .contains("<p class=\"description\">About &amp; more</p>"));
    }

    #[test]
    fn dark_theme_uses_dark_palette() {
        let mut set = deck(1);
        set.style = Some(StyleConfig {
            theme: Theme::Dark,
            ..StyleConfig::default()
        });
        let html = render_default(&set, "default");
        assert!(html.contains("class=\"theme-dark\""));
        assert!(html.contains("--background: #1a1a1a;"));
        assert!(html.contains("--columns: 2;"));
    }

    #[test]
    fn custom_colors_override_light_palette() {
        let mut set = deck(1);
        let mut style = StyleConfig {
            theme: Theme::Custom,
            font: Some("Georgia, serif".into()),
            ..StyleConfig::default()
        };
        style.colors.insert("primary".into(), "ff0000".into());
        style.colors.insert("text".into(), "navy".into());
        set.style = Some(style);

        let colors: BTreeMap<_, _> = palette(&set).into_iter().collect();
        assert_eq!(colors["primary"], "#ff0000");
        assert_eq!(colors["text"], "navy");
        assert_eq!(colors["background"], "#ffffff");

        let html = render_default(&set, "minimal");
        assert!(html.contains("--font: Georgia, serif;"));
        assert!(html.contains("--card-back-bg: #f5f5f5;"));
    }

    #[test]
    fn colors_are_ignored_without_custom_theme() {
        let mut set = deck(1);
        let mut style = StyleConfig::default();
        style.colors.insert("primary".into(), "#000000".into());
        set.style = Some(style);
        let colors: BTreeMap<_, _> = palette(&set).into_iter().collect();
        assert_eq!(colors["primary"], "#007bff");
    }

    #[test]
    fn css_values_cannot_escape_the_declaration() {
        assert_eq!(css_value("Arial; } </style><script>"), "Arial  /stylescript");
    }

    #[test]
    fn markdown_is_rendered_inside_faces() {
        let set = CardSet::new("T", vec![Card::new("**bold**", "<script>x</script>")]);
        let html = render_default(&set, "default");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    }
}
