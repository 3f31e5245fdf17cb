//! Selective OCR pipeline
//!
//! Classifies every page of a document as scanned or digital, OCRs only the
//! scanned ones and rebuilds the document with the original page order and
//! outline.
//!
//! # Flow
//!
//! 1. [`BookmarkTransfer::extract`] reads the outline before anything else
//! 2. [`classify`] labels each page from its extractable text length
//! 3. [`PageOcr`] isolates each scanned page and runs the OCR engine on it
//! 4. [`Reassembler`] copies digital pages, substitutes recognized ones,
//!    reapplies the outline and saves, but only if some page needed OCR

mod bookmarks;
mod classifier;
mod page_ocr;
mod reassembler;
mod types;

pub use bookmarks::BookmarkTransfer;
pub use classifier::{classify, classify_text, SCANNED_TEXT_THRESHOLD};
pub use page_ocr::{PageOcr, RecognizedPage};
pub use reassembler::Reassembler;
pub use types::{DocumentPipeline, PageKind, PipelineError, PipelineOutcome};
