//! PDF container error types

use thiserror::Error;

/// Errors raised by a PDF container backend
#[derive(Debug, Error)]
pub enum PdfError {
    /// Failed to open or parse a document
    #[error("Failed to load PDF {path}: {message}")]
    Load { path: String, message: String },

    /// Page index outside the document
    #[error("Page {index} not found (document has {count} pages)")]
    PageNotFound { index: usize, count: usize },

    /// Failed to extract page text
    #[error("Text extraction error: {0}")]
    TextExtraction(String),

    /// Failed to write the document
    #[error("Failed to save PDF {path}: {message}")]
    Save { path: String, message: String },

    /// Malformed outline
    #[error("Outline error: {0}")]
    Outline(String),

    /// MuPDF error
    #[error("MuPDF error: {0}")]
    MuPdf(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for container operations
pub type PdfResult<T> = std::result::Result<T, PdfError>;

impl From<mupdf::Error> for PdfError {
    fn from(err: mupdf::Error) -> Self {
        PdfError::MuPdf(err.to_string())
    }
}
