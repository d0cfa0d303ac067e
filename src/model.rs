//! Card-set data model.
//!
//! These are the *validated* shapes. Raw caller input arrives as
//! `serde_json::Value` and only becomes a [`CardSet`] by passing through
//! [`crate::pipeline::validate`], which reports every problem at once instead
//! of failing on the first serde error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One front/back Markdown pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Stable identifier; renderers fall back to `card-N` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub front: String,
    pub back: String,
    /// Display-only labels. Duplicates are kept, order is preserved.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Card {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: None,
            front: front.into(),
            back: back.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Identifier used in rendered output for the card at `index` (0-based).
    pub fn display_id(&self, index: usize) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => format!("card-{}", index + 1),
        }
    }
}

/// A named, ordered deck of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSet {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl CardSet {
    pub fn new(title: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            title: title.into(),
            description: None,
            cards,
            style: None,
            metadata: None,
        }
    }

    /// The effective theme (light when no style block is present).
    pub fn theme(&self) -> Theme {
        self.style.as_ref().map(|s| s.theme).unwrap_or_default()
    }
}

/// Visual theme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Uses the caller's `colors` map on top of the light palette.
    Custom,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Custom => "custom",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "custom" => Ok(Theme::Custom),
            other => Err(format!(
                "unknown theme '{other}', expected one of: light, dark, custom"
            )),
        }
    }
}

/// Presentation parameters substituted into HTML templates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Colour role → colour literal. Only consulted for [`Theme::Custom`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<String, String>,
    /// Preferred HTML template when the caller does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Other presentation keys (`card_width`, …), carried but not rendered.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Descriptive data carried alongside a deck; never affects rendering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// ISO-8601 timestamp, kept as the caller wrote it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Any other keys, round-tripped untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
