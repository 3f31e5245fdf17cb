//! Selective PDF OCR server
//!
//! Downloads a PDF from S3-compatible storage, OCRs only the pages that lack
//! a usable text layer, rebuilds the document with its original page order
//! and outline, and uploads the result next to the original.

pub mod config;
pub mod error;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod processor;
pub mod routes;
pub mod state;
pub mod storage;
