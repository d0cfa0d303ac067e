//! Pipeline stages for card-set conversion.
//!
//! Each submodule implements exactly one transformation step and is pure
//! apart from `input` (which reads files) so stages can be tested alone.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌──▶ csv_import ──┐
//! input ─────┤                 ├──▶ validate ──▶ template ──▶ HTML
//! (path/-)   └──▶ JSON value ──┘       │
//!                                      └──▶ layout ──▶ pdf ──▶ PDF
//!                       markdown (used by template and pdf)
//! ```
//!
//! 1. [`input`]      read a file or stdin; parse JSON text
//! 2. [`csv_import`] map CSV rows to cards through a column mapping
//! 3. [`validate`]   raw value → [`crate::model::CardSet`] or every issue
//! 4. [`markdown`]   card text → sanitized HTML, or → text blocks for print
//! 5. [`template`]   card set + registered template → standalone page
//! 6. [`layout`]     page/slot plan for a print layout (mirrored backs)
//! 7. [`pdf`]        draw the plan with `lopdf`

pub mod csv_import;
pub mod input;
pub mod layout;
pub mod markdown;
pub mod pdf;
pub mod template;
pub mod validate;
