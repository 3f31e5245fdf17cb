//! Page classification
//!
//! A digital page reliably yields plenty of extractable text; a scanned page
//! yields none, or a handful of stray characters far below the threshold.

use crate::pdf::{PdfContainer, PdfResult};

use super::types::PageKind;

/// Default minimum number of stripped text characters for a digital page
pub const SCANNED_TEXT_THRESHOLD: usize = 50;

/// Classify already-extracted page text
///
/// Leading and trailing whitespace is ignored; length is counted in
/// characters. Exactly `threshold` characters is digital.
pub fn classify_text(text: &str, threshold: usize) -> PageKind {
    if text.trim().chars().count() < threshold {
        PageKind::Scanned
    } else {
        PageKind::Digital
    }
}

/// Classify page `index` of an open document
pub fn classify<C: PdfContainer>(doc: &C, index: usize, threshold: usize) -> PdfResult<PageKind> {
    let text = doc.page_text(index)?;
    let kind = classify_text(&text, threshold);
    tracing::debug!(
        "Page {} has {} text characters: {:?}",
        index + 1,
        text.trim().chars().count(),
        kind
    );
    Ok(kind)
}
