//! CSV mapper: tabular rows → cards via a column mapping.
//!
//! Rows are parsed with the `csv` crate (RFC 4180 quoting, ragged rows
//! allowed). A row that cannot be mapped is excluded and reported as an
//! [`Issue`] next to the rows that could; the conversion only fails as a
//! whole when no row survives.

use crate::config::Limits;
use crate::error::{FlashcardError, Issue, IssueKind};
use crate::model::{Card, CardSet, Metadata, StyleConfig};
use crate::pipeline::validate;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which CSV columns feed which card field. Column indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub front_columns: Vec<usize>,
    pub back_columns: Vec<usize>,
    pub tags_column: Option<usize>,
    /// Skip the first record. Default: true.
    pub has_header: bool,
    /// Joins the values of multi-column fronts/backs. Default: a single space.
    pub column_separator: String,
    /// Splits the tags cell. Default: `,`.
    pub tag_delimiter: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            front_columns: vec![0],
            back_columns: vec![1],
            tags_column: None,
            has_header: true,
            column_separator: " ".to_string(),
            tag_delimiter: ",".to_string(),
        }
    }
}

impl ColumnMapping {
    fn check(&self) -> Result<(), FlashcardError> {
        if self.front_columns.is_empty() {
            return Err(FlashcardError::InvalidMapping(
                "front_columns must name at least one column".into(),
            ));
        }
        if self.back_columns.is_empty() {
            return Err(FlashcardError::InvalidMapping(
                "back_columns must name at least one column".into(),
            ));
        }
        if self.tags_column.is_some() && self.tag_delimiter.is_empty() {
            return Err(FlashcardError::InvalidMapping(
                "tag_delimiter must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Parse a column list written as `"0,1"` (whitespace allowed).
pub fn parse_column_list(list: &str) -> Result<Vec<usize>, FlashcardError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>().map_err(|_| {
                FlashcardError::InvalidMapping(format!(
                    "'{s}' is not a column index (expected a list like \"0,1\")"
                ))
            })
        })
        .collect()
}

/// Cards mapped from CSV rows, plus the problems with the rows left out.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRows {
    pub cards: Vec<Card>,
    pub issues: Vec<Issue>,
    /// Data rows read, header excluded.
    pub rows_read: usize,
}

/// A validated card set built from CSV, with the row-level issues.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedCardSet {
    pub card_set: CardSet,
    pub issues: Vec<Issue>,
    pub rows_read: usize,
}

/// Map every data row of `csv_text` to a card.
///
/// Cards get eager `card-N` ids in output order.
pub fn map(csv_text: &str, mapping: &ColumnMapping) -> Result<MappedRows, FlashcardError> {
    mapping.check()?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let mut cards = Vec::new();
    let mut issues = Vec::new();
    let mut rows_read = 0usize;

    let skip = usize::from(mapping.has_header);
    for result in reader.records().skip(skip) {
        let row = rows_read;
        rows_read += 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                issues.push(Issue::error(
                    format!("rows[{row}]"),
                    IssueKind::Schema,
                    format!("malformed CSV record: {e}"),
                ));
                continue;
            }
        };
        if record.iter().all(|field| field.trim().is_empty()) {
            debug!("Skipping blank CSV row {}", row);
            issues.push(Issue::warning(
                format!("rows[{row}]"),
                IssueKind::Schema,
                "blank row skipped",
            ));
            continue;
        }
        if let Some(mut card) = map_row(row, &record, mapping, &mut issues) {
            card.id = Some(format!("card-{}", cards.len() + 1));
            cards.push(card);
        }
    }

    info!(
        "Mapped {} of {} CSV row(s) to cards ({} issue(s))",
        cards.len(),
        rows_read,
        issues.len()
    );

    if cards.is_empty() {
        return Err(FlashcardError::EmptyConversion {
            rows: rows_read,
            issues,
        });
    }
    Ok(MappedRows {
        cards,
        issues,
        rows_read,
    })
}

/// Map the rows and validate the resulting card set.
///
/// The card set carries `metadata.version = "1.0.0"` and a `created_at`
/// stamp of the current time. Validator issues are fatal and returned
/// together with the row issues.
pub fn map_to_card_set(
    csv_text: &str,
    mapping: &ColumnMapping,
    title: &str,
    description: Option<&str>,
    style: Option<StyleConfig>,
    limits: &Limits,
) -> Result<MappedCardSet, FlashcardError> {
    let rows = map(csv_text, mapping)?;

    let draft = CardSet {
        title: title.to_string(),
        description: description.map(str::to_string),
        cards: rows.cards,
        style,
        metadata: Some(Metadata {
            version: Some("1.0.0".to_string()),
            created_at: Some(chrono::Local::now().to_rfc3339()),
            ..Metadata::default()
        }),
    };
    let value = serde_json::to_value(&draft)
        .map_err(|e| FlashcardError::Internal(format!("card set serialisation: {e}")))?;

    match validate::validate(&value, limits) {
        Ok(card_set) => Ok(MappedCardSet {
            card_set,
            issues: rows.issues,
            rows_read: rows.rows_read,
        }),
        Err(mut validation) => {
            let mut issues = rows.issues;
            issues.append(&mut validation);
            Err(FlashcardError::Validation { issues })
        }
    }
}

fn map_row(
    row: usize,
    record: &StringRecord,
    mapping: &ColumnMapping,
    issues: &mut Vec<Issue>,
) -> Option<Card> {
    let before = issues.len();
    let front = join_columns(row, record, "front_columns", &mapping.front_columns, &mapping.column_separator, issues);
    let back = join_columns(row, record, "back_columns", &mapping.back_columns, &mapping.column_separator, issues);
    let tags = match mapping.tags_column {
        None => Vec::new(),
        Some(col) => match record.get(col) {
            Some(cell) => cell
                .split(mapping.tag_delimiter.as_str())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            None => {
                issues.push(out_of_range(format!("rows[{row}].tags_column"), col, record.len()));
                Vec::new()
            }
        },
    };
    if issues.len() > before {
        return None;
    }

    if front.is_empty() {
        issues.push(Issue::error(
            format!("rows[{row}].front"),
            IssueKind::Schema,
            "mapped front is empty",
        ));
    }
    if back.is_empty() {
        issues.push(Issue::error(
            format!("rows[{row}].back"),
            IssueKind::Schema,
            "mapped back is empty",
        ));
    }
    if issues.len() > before {
        return None;
    }

    Some(Card::new(front, back).with_tags(tags))
}

fn join_columns(
    row: usize,
    record: &StringRecord,
    field: &str,
    columns: &[usize],
    separator: &str,
    issues: &mut Vec<Issue>,
) -> String {
    let mut parts = Vec::with_capacity(columns.len());
    for (j, &col) in columns.iter().enumerate() {
        match record.get(col) {
            Some(value) => {
                let value = value.trim();
                if !value.is_empty() {
                    parts.push(value);
                }
            }
            None => issues.push(out_of_range(format!("rows[{row}].{field}[{j}]"), col, record.len())),
        }
    }
    parts.join(separator)
}

fn out_of_range(path: String, column: usize, width: usize) -> Issue {
    Issue::error(
        path,
        IssueKind::Reference,
        format!("column {column} is out of range (row has {width} field(s))"),
    )
}
