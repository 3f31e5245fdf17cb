//! Pipeline types

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::ocr::OcrError;
use crate::pdf::PdfError;

/// Classification of a single page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Too little extractable text; an image of text
    Scanned,
    /// Carries a usable text layer
    Digital,
}

impl PageKind {
    pub fn is_scanned(self) -> bool {
        self == PageKind::Scanned
    }
}

/// Result of running the pipeline on one document
///
/// `output_path` is present exactly when OCR was performed and a non-empty
/// document was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    output_path: Option<PathBuf>,
    ocr_performed: bool,
}

impl PipelineOutcome {
    /// Nothing was written; the caller keeps using the original file
    pub fn unchanged(ocr_performed: bool) -> Self {
        Self {
            output_path: None,
            ocr_performed,
        }
    }

    /// A reassembled document was written to `path`
    pub fn written(path: PathBuf) -> Self {
        Self {
            output_path: Some(path),
            ocr_performed: true,
        }
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn ocr_performed(&self) -> bool {
        self.ocr_performed
    }
}

/// Pipeline errors
///
/// Page numbers are 1-based in messages.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to open {document}: {source}")]
    Open {
        document: String,
        #[source]
        source: PdfError,
    },

    #[error("Failed to classify page {page_no} of {document}: {source}", page_no = .page + 1)]
    Classify {
        document: String,
        page: usize,
        #[source]
        source: PdfError,
    },

    #[error("Failed to isolate page {page_no} of {document}: {source}", page_no = .page + 1)]
    Isolate {
        document: String,
        page: usize,
        #[source]
        source: PdfError,
    },

    #[error("OCR failed on page {page_no} of {document}: {source}", page_no = .page + 1)]
    Ocr {
        document: String,
        page: usize,
        #[source]
        source: OcrError,
    },

    #[error("Failed to read OCR output for page {page_no} of {document}: {reason}", page_no = .page + 1)]
    ReadBack {
        document: String,
        page: usize,
        reason: String,
    },

    #[error("Failed to copy page {page_no} into {document}: {source}", page_no = .page + 1)]
    Assemble {
        document: String,
        page: usize,
        #[source]
        source: PdfError,
    },

    #[error("Failed to transfer bookmarks: {0}")]
    Bookmarks(#[source] PdfError),

    #[error("Output has {actual} pages but the source has {expected}; bookmark targets would be stale")]
    PageCountMismatch { expected: usize, actual: usize },

    #[error("Failed to save {document}: {source}")]
    Save {
        document: String,
        #[source]
        source: PdfError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Processing timed out after {0} seconds")]
    Timeout(u64),
}

/// Something that turns an input PDF into an optional OCR'd output PDF
#[async_trait]
pub trait DocumentPipeline: Send + Sync {
    async fn process(&self, source: &Path, output: &Path) -> Result<PipelineOutcome, PipelineError>;
}
