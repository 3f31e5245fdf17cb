//! OCR Module
//!
//! Rasterizes and recognizes whole PDF documents, producing a PDF with a
//! text layer. The pipeline only ever hands this module one-page documents.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pdf_ocr_server::config::OcrConfig;
//! use pdf_ocr_server::ocr::{OcrEngine, OcrMyPdf};
//!
//! let engine = OcrMyPdf::new(OcrConfig::default())?;
//! if engine.is_available().await {
//!     engine.recognize(&isolated_page, &recognized_page).await?;
//! }
//! ```

mod engine;
mod ocrmypdf;
mod types;

pub use engine::OcrEngine;
pub use ocrmypdf::OcrMyPdf;
pub use types::OcrError;
