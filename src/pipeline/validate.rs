//! Validator: raw JSON value → [`CardSet`] or the complete list of problems.
//!
//! Checks run in a fixed order (top-level shape, each card, style, metadata)
//! and every check runs regardless of earlier failures, so one call surfaces
//! the whole problem set. Warnings (unparseable `created_at`) are reported
//! but never block the card set.
//!
//! The validator never fills in defaults or assigns ids; a valid input comes
//! back field-for-field.

use crate::config::Limits;
use crate::error::{Issue, IssueKind};
use crate::model::{Card, CardSet, Metadata, StyleConfig, Theme};
use crate::output::ValidationReport;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

static RE_HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

/// CSS Color Module Level 4 named colors, plus `transparent`.
const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "transparent", "turquoise", "violet", "wheat", "white",
    "whitesmoke", "yellow", "yellowgreen",
];

/// Validate `value`, returning the card set or every issue found.
///
/// `Err` carries warnings as well as errors so nothing is lost.
///
/// Re-validating an accepted card set succeeds again with an equal card set
/// and no errors. Warnings are not part of that guarantee: a `created_at`
/// that is not ISO-8601 is carried verbatim and warned about every time.
pub fn validate(value: &Value, limits: &Limits) -> Result<CardSet, Vec<Issue>> {
    let report = validate_report(value, limits);
    match report.card_set {
        Some(set) => Ok(set),
        None => Err(report.issues),
    }
}

/// Validate `value` and report issues alongside the card set (if any).
pub fn validate_report(value: &Value, limits: &Limits) -> ValidationReport {
    let mut issues = Vec::new();
    let card_set = check_card_set(value, limits, &mut issues);
    let valid = !issues.iter().any(Issue::is_fatal);
    debug!(
        "Validation finished: {} issue(s), valid = {}",
        issues.len(),
        valid
    );
    ValidationReport {
        valid,
        card_count: card_set.as_ref().map_or(0, |s| s.cards.len()),
        card_set: if valid { card_set } else { None },
        issues,
    }
}

/// True for a hex triplet/sixplet (leading `#` optional) or a CSS named color.
pub fn is_color_literal(value: &str) -> bool {
    let v = value.trim();
    RE_HEX_COLOR.is_match(v) || NAMED_COLORS.contains(&v.to_ascii_lowercase().as_str())
}

/// True when `value` parses as RFC 3339, a naive ISO date-time, or a date.
pub fn is_iso8601(value: &str) -> bool {
    let v = value.trim();
    DateTime::parse_from_rfc3339(v).is_ok()
        || NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok()
}

// ── Top level ────────────────────────────────────────────────────────────────

fn check_card_set(value: &Value, limits: &Limits, issues: &mut Vec<Issue>) -> Option<CardSet> {
    let Some(obj) = value.as_object() else {
        issues.push(Issue::error(
            "",
            IssueKind::Schema,
            format!("card set must be a JSON object, got {}", type_name(value)),
        ));
        return None;
    };

    let title = required_text(obj, "title", "title", issues);
    let description = optional_string(obj, "description", "description", issues);
    let cards = check_cards(obj.get("cards"), limits, issues);
    let style = check_style(obj.get("style"), issues);
    let metadata = check_metadata(obj.get("metadata"), issues);

    Some(CardSet {
        title: title?,
        description: description?,
        cards: cards?,
        style: style?,
        metadata: metadata?,
    })
}

fn check_cards(value: Option<&Value>, limits: &Limits, issues: &mut Vec<Issue>) -> Option<Vec<Card>> {
    let items = match value {
        None | Some(Value::Null) => {
            issues.push(Issue::error("cards", IssueKind::Schema, "is required"));
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            issues.push(Issue::error(
                "cards",
                IssueKind::Schema,
                format!("must be an array, got {}", type_name(other)),
            ));
            return None;
        }
    };

    if items.is_empty() {
        issues.push(Issue::error(
            "cards",
            IssueKind::Schema,
            "must contain at least one card",
        ));
        return None;
    }
    let mut ok = true;
    if items.len() > limits.max_cards {
        issues.push(Issue::error(
            "cards",
            IssueKind::Schema,
            format!(
                "has {} cards, more than the limit of {}",
                items.len(),
                limits.max_cards
            ),
        ));
        ok = false;
    }

    let mut cards = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match check_card(i, item, limits, issues) {
            Some(card) => cards.push(card),
            None => ok = false,
        }
    }
    ok.then_some(cards)
}

// ── Cards ────────────────────────────────────────────────────────────────────

fn check_card(index: usize, value: &Value, limits: &Limits, issues: &mut Vec<Issue>) -> Option<Card> {
    let path = format!("cards[{index}]");
    let Some(obj) = value.as_object() else {
        issues.push(Issue::error(
            path,
            IssueKind::Schema,
            format!("card must be an object, got {}", type_name(value)),
        ));
        return None;
    };

    let front = card_content(obj, "front", &path, limits, issues);
    let back = card_content(obj, "back", &path, limits, issues);
    let tags = card_tags(obj, &path, limits, issues);
    let id = optional_string(obj, "id", &format!("{path}.id"), issues);

    Some(Card {
        id: id?,
        front: front?,
        back: back?,
        tags: tags?,
    })
}

fn card_content(
    obj: &Map<String, Value>,
    key: &str,
    card_path: &str,
    limits: &Limits,
    issues: &mut Vec<Issue>,
) -> Option<String> {
    let path = format!("{card_path}.{key}");
    let text = required_text(obj, key, &path, issues)?;
    let len = text.chars().count();
    if len > limits.max_content_length {
        issues.push(Issue::error(
            path,
            IssueKind::Schema,
            format!(
                "is {len} characters, over the limit of {}",
                limits.max_content_length
            ),
        ));
        return None;
    }
    Some(text)
}

fn card_tags(
    obj: &Map<String, Value>,
    card_path: &str,
    limits: &Limits,
    issues: &mut Vec<Issue>,
) -> Option<Vec<String>> {
    let path = format!("{card_path}.tags");
    let items = match obj.get("tags") {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            issues.push(Issue::error(
                path,
                IssueKind::Schema,
                format!("must be an array of strings, got {}", type_name(other)),
            ));
            return None;
        }
    };

    let mut ok = true;
    if items.len() > limits.max_tags_per_card {
        issues.push(Issue::error(
            path.clone(),
            IssueKind::Schema,
            format!(
                "has {} tags, more than the limit of {}",
                items.len(),
                limits.max_tags_per_card
            ),
        ));
        ok = false;
    }

    let mut tags = Vec::with_capacity(items.len());
    for (j, item) in items.iter().enumerate() {
        match item {
            Value::String(tag) if tag.chars().count() > limits.max_tag_length => {
                issues.push(Issue::error(
                    format!("{path}[{j}]"),
                    IssueKind::Schema,
                    format!(
                        "is {} characters, over the limit of {}",
                        tag.chars().count(),
                        limits.max_tag_length
                    ),
                ));
                ok = false;
            }
            Value::String(tag) => tags.push(tag.clone()),
            other => {
                issues.push(Issue::error(
                    format!("{path}[{j}]"),
                    IssueKind::Schema,
                    format!("must be a string, got {}", type_name(other)),
                ));
                ok = false;
            }
        }
    }
    ok.then_some(tags)
}

// ── Style ────────────────────────────────────────────────────────────────────

fn check_style(value: Option<&Value>, issues: &mut Vec<Issue>) -> Option<Option<StyleConfig>> {
    let obj = match value {
        None | Some(Value::Null) => return Some(None),
        Some(Value::Object(obj)) => obj,
        Some(other) => {
            issues.push(Issue::error(
                "style",
                IssueKind::Schema,
                format!("must be an object, got {}", type_name(other)),
            ));
            return None;
        }
    };

    let theme = match obj.get("theme") {
        None | Some(Value::Null) => Some(Theme::default()),
        Some(Value::String(s)) => match s.parse::<Theme>() {
            Ok(theme) => Some(theme),
            Err(msg) => {
                issues.push(Issue::error("style.theme", IssueKind::Enum, msg));
                None
            }
        },
        Some(other) => {
            issues.push(Issue::error(
                "style.theme",
                IssueKind::Schema,
                format!("must be a string, got {}", type_name(other)),
            ));
            None
        }
    };

    let font = optional_string(obj, "font", "style.font", issues);
    let template = match optional_string(obj, "template", "style.template", issues) {
        Some(Some(name)) if crate::templates::find(&name).is_none() => {
            issues.push(Issue::error(
                "style.template",
                IssueKind::Reference,
                format!(
                    "template '{name}' not found (available: {})",
                    crate::templates::names().join(", ")
                ),
            ));
            None
        }
        other => other,
    };
    let colors = check_colors(obj.get("colors"), theme == Some(Theme::Custom), issues);
    let extra: BTreeMap<String, Value> = obj
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "theme" | "font" | "colors" | "template"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if !extra.is_empty() {
        debug!(
            "Carrying unrendered style keys: {}",
            extra.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }

    Some(Some(StyleConfig {
        theme: theme?,
        font: font?,
        colors: colors?,
        template: template?,
        extra,
    }))
}

fn check_colors(
    value: Option<&Value>,
    require_literals: bool,
    issues: &mut Vec<Issue>,
) -> Option<BTreeMap<String, String>> {
    let obj = match value {
        None | Some(Value::Null) => return Some(BTreeMap::new()),
        Some(Value::Object(obj)) => obj,
        Some(other) => {
            issues.push(Issue::error(
                "style.colors",
                IssueKind::Schema,
                format!("must be an object, got {}", type_name(other)),
            ));
            return None;
        }
    };

    let mut ok = true;
    let mut colors = BTreeMap::new();
    for (role, v) in obj {
        let path = format!("style.colors.{role}");
        match v {
            Value::String(s) if require_literals && !is_color_literal(s) => {
                issues.push(Issue::error(
                    path,
                    IssueKind::Format,
                    format!("'{s}' is not a hex color or a CSS color name"),
                ));
                ok = false;
            }
            Value::String(s) => {
                colors.insert(role.clone(), s.clone());
            }
            other => {
                issues.push(Issue::error(
                    path,
                    IssueKind::Schema,
                    format!("must be a string, got {}", type_name(other)),
                ));
                ok = false;
            }
        }
    }
    ok.then_some(colors)
}

// ── Metadata ─────────────────────────────────────────────────────────────────

fn check_metadata(value: Option<&Value>, issues: &mut Vec<Issue>) -> Option<Option<Metadata>> {
    let obj = match value {
        None | Some(Value::Null) => return Some(None),
        Some(Value::Object(obj)) => obj,
        Some(other) => {
            issues.push(Issue::error(
                "metadata",
                IssueKind::Schema,
                format!("must be an object, got {}", type_name(other)),
            ));
            return None;
        }
    };

    let version = optional_string(obj, "version", "metadata.version", issues);
    let author = optional_string(obj, "author", "metadata.author", issues);
    let created_at = optional_string(obj, "created_at", "metadata.created_at", issues);
    if let Some(Some(ts)) = &created_at {
        if !is_iso8601(ts) {
            issues.push(Issue::warning(
                "metadata.created_at",
                IssueKind::Format,
                format!("'{ts}' is not an ISO-8601 timestamp"),
            ));
        }
    }

    let extra = obj
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "version" | "author" | "created_at"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Some(Some(Metadata {
        version: version?,
        author: author?,
        created_at: created_at?,
        extra,
    }))
}

// ── Field helpers ────────────────────────────────────────────────────────────

/// A required string that must be non-empty after trimming.
fn required_text(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<Issue>,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => {
            issues.push(Issue::error(path, IssueKind::Schema, "is required"));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            issues.push(Issue::error(path, IssueKind::Schema, "must not be empty"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(Issue::error(
                path,
                IssueKind::Schema,
                format!("must be a string, got {}", type_name(other)),
            ));
            None
        }
    }
}

/// `Some(None)` when absent or null, `None` when present with the wrong type.
fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<Issue>,
) -> Option<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(other) => {
            issues.push(Issue::error(
                path,
                IssueKind::Schema,
                format!("must be a string, got {}", type_name(other)),
            ));
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use serde_json::json;

    fn limits() -> Limits {
        Limits::default()
    }

    #[test]
    fn minimal_card_set_is_valid() {
        let value = json!({
            "title": "Deck",
            "cards": [{"front": "Q", "back": "A"}]
        });
        let set = validate(&value, &limits()).unwrap();
        assert_eq!(set.title, "Deck");
        assert_eq!(set.cards, vec![Card::new("Q", "A")]);
        assert!(set.style.is_none());
    }

    #[test]
    fn empty_title_and_empty_cards_report_two_issues() {
        let issues = validate(&json!({"title": "", "cards": []}), &limits()).unwrap_err();
        assert_eq!(issues.len(), 2, "{issues:?}");
        assert_eq!(issues[0].path, "title");
        assert_eq!(issues[0].kind, IssueKind::Schema);
        assert_eq!(issues[1].path, "cards");
        assert_eq!(issues[1].kind, IssueKind::Schema);
    }

    #[test]
    fn every_bad_card_is_reported() {
        let value = json!({
            "title": "Deck",
            "cards": [
                {"front": "ok", "back": "ok"},
                {"front": "   ", "back": "A"},
                {"front": "Q"},
                "not a card",
                {"front": "Q", "back": "A", "tags": ["a", 3]}
            ]
        });
        let issues = validate(&value, &limits()).unwrap_err();
        let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["cards[1].front", "cards[2].back", "cards[3]", "cards[4].tags[1]"]
        );
    }

    #[test]
    fn non_object_input_is_a_single_schema_issue() {
        let issues = validate(&json!([1, 2]), &limits()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "");
        assert!(issues[0].message.contains("an array"));
    }

    #[test]
    fn unknown_theme_is_an_enum_issue() {
        let value = json!({
            "title": "Deck",
            "cards": [{"front": "Q", "back": "A"}],
            "style": {"theme": "neon"}
        });
        let issues = validate(&value, &limits()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "style.theme");
        assert_eq!(issues[0].kind, IssueKind::Enum);
    }

    #[test]
    fn custom_theme_checks_color_literals() {
        let value = json!({
            "title": "Deck",
            "cards": [{"front": "Q", "back": "A"}],
            "style": {"theme": "custom", "colors": {
                "primary": "#ff0000",
                "secondary": "00f",
                "text": "RebeccaPurple",
                "background": "not-a-colour"
            }}
        });
        let issues = validate(&value, &limits()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "style.colors.background");
    }

    #[test]
    fn colors_are_not_checked_outside_custom_theme() {
        let value = json!({
            "title": "Deck",
            "cards": [{"front": "Q", "back": "A"}],
            "style": {"theme": "dark", "colors": {"primary": "whatever"}}
        });
        assert!(validate(&value, &limits()).is_ok());
    }

    #[test]
    fn unknown_style_template_is_a_reference_issue() {
        let value = json!({
            "title": "Deck",
            "cards": [{"front": "Q", "back": "A"}],
            "style": {"template": "glossy"}
        });
        let issues = validate(&value, &limits()).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::Reference);
    }

    #[test]
    fn bad_timestamp_is_only_a_warning() {
        let value = json!({
            "title": "Deck",
            "cards": [{"front": "Q", "back": "A"}],
            "metadata": {"created_at": "last tuesday", "version": "1.0"}
        });
        let report = validate_report(&value, &limits());
        assert!(report.valid);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Warning);
        assert_eq!(report.issues[0].kind, IssueKind::Format);
        assert!(report.card_set.is_some());
    }

    #[test]
    fn iso_timestamps_are_accepted() {
        assert!(is_iso8601("2024-01-01"));
        assert!(is_iso8601("2024-01-01T12:30:00"));
        assert!(is_iso8601("2024-01-01T12:30:00.123"));
        assert!(is_iso8601("2024-01-01T12:30:00Z"));
        assert!(is_iso8601("2024-01-01T12:30:00+08:00"));
        assert!(!is_iso8601("01/02/2024"));
    }

    #[test]
    fn limits_are_enforced() {
        let tight = Limits {
            max_cards: 1,
            max_content_length: 5,
            max_tags_per_card: 1,
            max_tag_length: 3,
        };
        let value = json!({
            "title": "Deck",
            "cards": [
                {"front": "too long front", "back": "A", "tags": ["a", "b"]},
                {"front": "Q", "back": "A", "tags": ["long"]}
            ]
        });
        let issues = validate(&value, &tight).unwrap_err();
        let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["cards", "cards[0].front", "cards[0].tags", "cards[1].tags[0]"]
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let value = json!({
            "title": "Deck",
            "description": "d",
            "cards": [{"id": "x", "front": "Q", "back": "A", "tags": ["t", "t"]}],
            "style": {"theme": "light", "font": "Georgia"},
            "metadata": {"version": "1", "custom": [1, 2]}
        });
        let first = validate(&value, &limits()).unwrap();
        let again = validate(&serde_json::to_value(&first).unwrap(), &limits()).unwrap();
        assert_eq!(first, again);
        assert_eq!(first.cards[0].tags, vec!["t", "t"]);
        assert_eq!(first.metadata.unwrap().extra["custom"], json!([1, 2]));
    }

    #[test]
    fn unknown_style_keys_are_carried() {
        let value = json!({
            "title": "Deck",
            "cards": [{"front": "Q", "back": "A"}],
            "style": {"theme": "dark", "card_width": "300px", "card_front_font": 18}
        });
        let set = validate(&value, &limits()).unwrap();
        let style = set.style.clone().unwrap();
        assert_eq!(style.theme, Theme::Dark);
        assert_eq!(style.extra["card_width"], json!("300px"));
        assert_eq!(style.extra["card_front_font"], json!(18));

        let round_trip = serde_json::to_value(&set).unwrap();
        assert_eq!(round_trip["style"]["card_width"], "300px");
        assert_eq!(validate(&round_trip, &limits()).unwrap(), set);
    }

    #[test]
    fn revalidation_repeats_warnings_but_never_errors() {
        let value = json!({
            "title": "Deck",
            "cards": [{"front": "Q", "back": "A"}],
            "metadata": {"created_at": "last tuesday"}
        });
        let first = validate_report(&value, &limits());
        assert!(first.valid);
        let set = first.card_set.unwrap();

        let again = validate_report(&serde_json::to_value(&set).unwrap(), &limits());
        assert!(again.valid);
        assert_eq!(again.errors().count(), 0);
        assert_eq!(again.issues, first.issues);
        assert_eq!(again.card_set, Some(set));
    }

    #[test]
    fn color_literal_recognition() {
        assert!(is_color_literal("#abc"));
        assert!(is_color_literal("A1B2C3"));
        assert!(is_color_literal("white"));
        assert!(!is_color_literal("#abcd"));
        assert!(!is_color_literal("rgb(0,0,0)"));
    }
}
