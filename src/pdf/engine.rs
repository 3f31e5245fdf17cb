//! Container traits
//!
//! Containers are not required to be `Send`: MuPDF documents are bound to
//! the thread that opened them. Callers open, use and drop a container
//! inside a single blocking task.

use std::path::Path;

use super::error::PdfResult;
use super::types::BookmarkTable;

/// Factory for PDF containers
pub trait PdfEngine: Send + Sync + 'static {
    type Document: PdfContainer;

    /// Open an existing document from disk
    fn open(&self, path: &Path) -> PdfResult<Self::Document>;

    /// Create an empty document with no pages and no outline
    fn create(&self) -> PdfResult<Self::Document>;
}

/// An open PDF document
///
/// Dropping the container closes it.
pub trait PdfContainer: Sized {
    /// Number of pages
    fn page_count(&self) -> PdfResult<usize>;

    /// Plain text of the page at `index` (zero-based), possibly empty
    fn page_text(&self, index: usize) -> PdfResult<String>;

    /// Append a copy of page `index` of `source` after the last page
    fn append_page(&mut self, source: &Self, index: usize) -> PdfResult<()>;

    /// Read the outline as a flat table
    fn bookmarks(&self) -> PdfResult<BookmarkTable>;

    /// Replace the outline wholesale
    fn set_bookmarks(&mut self, table: &BookmarkTable) -> PdfResult<()>;

    /// Write the document to `path`
    fn save(&self, path: &Path) -> PdfResult<()>;
}
