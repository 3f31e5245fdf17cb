//! OCR engine trait

use std::path::Path;

use async_trait::async_trait;

use super::types::OcrError;

/// Rasterize-and-recognize collaborator
///
/// Operates on whole documents: reads the PDF at `input` and writes a PDF
/// with the same pages plus a recognized text layer to `output`.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Check if the engine can be invoked
    async fn is_available(&self) -> bool;

    /// Recognize `input`, writing the result to `output`
    async fn recognize(&self, input: &Path, output: &Path) -> Result<(), OcrError>;
}
