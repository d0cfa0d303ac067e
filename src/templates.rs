//! The HTML template registry.
//!
//! A closed, process-wide list of [`TemplateDescriptor`]s built once on first
//! access and never mutated, so concurrent readers need no locking. Lookups
//! go through [`find`]; an unknown name is an error for the caller to report,
//! never a silent fallback to another template.

use crate::config::PdfLayout;
use crate::model::Theme;
use once_cell::sync::Lazy;
use serde::Serialize;

/// How a template arranges cards on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutKind {
    /// Cards in rows of `columns`, each with a flippable front and back.
    Grid { columns: usize },
    /// One card at a time, navigated client-side.
    Single,
}

/// A registered HTML template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub layout_kind: LayoutKind,
    pub supports_voice: bool,
    pub supports_print: bool,
    /// The HTML shell with `{{placeholder}}` slots.
    #[serde(skip)]
    pub(crate) source: &'static str,
}

/// A PDF layout as advertised to callers.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub page_size: &'static str,
    pub cards_per_page: usize,
}

static REGISTRY: Lazy<Vec<TemplateDescriptor>> = Lazy::new(|| {
    vec![
        TemplateDescriptor {
            name: "default",
            description: "Grid of flippable cards with tag filters and print styles",
            layout_kind: LayoutKind::Grid { columns: 2 },
            supports_voice: false,
            supports_print: true,
            source: include_str!("../templates/default.html"),
        },
        TemplateDescriptor {
            name: "minimal",
            description: "One card at a time, content only",
            layout_kind: LayoutKind::Single,
            supports_voice: false,
            supports_print: true,
            source: include_str!("../templates/minimal.html"),
        },
        TemplateDescriptor {
            name: "listen",
            description: "One card at a time with read-aloud and dictation controls",
            layout_kind: LayoutKind::Single,
            supports_voice: true,
            supports_print: false,
            source: include_str!("../templates/listen.html"),
        },
    ]
});

/// Every registered template, in registration order.
pub fn all() -> &'static [TemplateDescriptor] {
    &REGISTRY
}

/// Look up a template by exact name.
pub fn find(name: &str) -> Option<&'static TemplateDescriptor> {
    REGISTRY.iter().find(|t| t.name == name)
}

/// Registered template names, in registration order.
pub fn names() -> Vec<&'static str> {
    REGISTRY.iter().map(|t| t.name).collect()
}

/// Descriptors for the PDF layouts.
pub fn layouts() -> Vec<LayoutDescriptor> {
    PdfLayout::ALL
        .iter()
        .map(|layout| match layout {
            PdfLayout::Single => LayoutDescriptor {
                name: layout.as_str(),
                description: "One card face per page; each front is followed by its back",
                page_size: "A4",
                cards_per_page: layout.cards_per_page(),
            },
            PdfLayout::A4Eight => LayoutDescriptor {
                name: layout.as_str(),
                description: "Eight cards per A4 sheet with a mirrored back page for duplex printing",
                page_size: "A4",
                cards_per_page: layout.cards_per_page(),
            },
        })
        .collect()
}

/// Theme names accepted in `style.theme`.
pub fn themes() -> Vec<&'static str> {
    Theme::ALL.iter().map(|t| t.as_str()).collect()
}
