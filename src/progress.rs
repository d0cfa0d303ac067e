//! Progress-callback trait for per-page PDF layout events.
//!
//! Inject an [`Arc<dyn LayoutProgressCallback>`] via
//! [`crate::config::GeneratorConfigBuilder::progress_callback`] to receive
//! events while the layout engine emits pages. Large decks (a thousand cards
//! in `single` layout is two thousand pages) take long enough that a CLI
//! wants to show a bar; the library itself never prints anything.
//!
//! # Example
//!
//! ```rust
//! use cardforge::{GeneratorConfig, LayoutProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl LayoutProgressCallback for CountingCallback {
//!     fn on_page_rendered(&self, page_num: usize, total_pages: usize, is_back: bool) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page_num}/{total_pages} (back: {is_back})");
//!     }
//! }
//!
//! let config = GeneratorConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { pages: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the PDF layout engine as it emits each page.
///
/// Implementations must be `Send + Sync`: PDF generation runs on tokio's
/// blocking pool, not on the caller's thread. All methods default to no-ops.
pub trait LayoutProgressCallback: Send + Sync {
    /// Called once before the first page is emitted.
    fn on_layout_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page's content stream is built.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    /// * `is_back`     — true for back-face pages
    fn on_page_rendered(&self, page_num: usize, total_pages: usize, is_back: bool) {
        let _ = (page_num, total_pages, is_back);
    }

    /// Called once the document has been serialised.
    fn on_layout_complete(&self, total_pages: usize, byte_len: usize) {
        let _ = (total_pages, byte_len);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl LayoutProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GeneratorConfig`].
pub type ProgressCallback = Arc<dyn LayoutProgressCallback>;
