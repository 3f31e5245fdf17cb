//! Outline transfer from the source document to the reassembled one
//!
//! Targets are never remapped. Reassembly keeps page `i` at index `i`, so the
//! table stays valid as long as the page count matches, which `apply` checks.

use crate::pdf::{BookmarkTable, PdfContainer};

use super::types::PipelineError;

/// A source outline captured together with the source page count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkTransfer {
    table: BookmarkTable,
    source_page_count: usize,
}

impl BookmarkTransfer {
    /// Capture the outline of `source` exactly as found
    pub fn extract<C: PdfContainer>(source: &C) -> Result<Self, PipelineError> {
        let table = source.bookmarks().map_err(PipelineError::Bookmarks)?;
        let source_page_count = source.page_count().map_err(PipelineError::Bookmarks)?;

        if let Some(max) = table.max_target_page() {
            if max >= source_page_count {
                tracing::warn!(
                    "Outline points at page {} but the document has {}; copying it unchanged",
                    max + 1,
                    source_page_count
                );
            }
        }
        tracing::debug!(
            "Extracted {} bookmarks from a {}-page document",
            table.len(),
            source_page_count
        );
        Ok(Self {
            table,
            source_page_count,
        })
    }

    pub fn source_page_count(&self) -> usize {
        self.source_page_count
    }

    /// Overwrite the outline of `output` with the captured table
    pub fn apply<C: PdfContainer>(&self, output: &mut C) -> Result<(), PipelineError> {
        let actual = output.page_count().map_err(PipelineError::Bookmarks)?;
        if actual != self.source_page_count {
            return Err(PipelineError::PageCountMismatch {
                expected: self.source_page_count,
                actual,
            });
        }

        output
            .set_bookmarks(&self.table)
            .map_err(PipelineError::Bookmarks)?;
        tracing::debug!("Applied {} bookmarks", self.table.len());
        Ok(())
    }
}
