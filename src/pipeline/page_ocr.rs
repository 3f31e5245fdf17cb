//! Single-page OCR adapter
//!
//! The OCR engine works on whole documents, so each scanned page is first
//! copied into a standalone one-page PDF. All per-page files live in a
//! private temporary directory that is removed when the returned
//! [`RecognizedPage`] (or the error path) drops it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::ocr::OcrEngine;
use crate::pdf::{PdfContainer, PdfEngine};

use super::types::PipelineError;

const ISOLATED_FILE: &str = "isolated.pdf";
const RECOGNIZED_FILE: &str = "recognized.pdf";

/// A recognized one-page document on disk
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct RecognizedPage {
    page: usize,
    path: PathBuf,
    _dir: TempDir,
}

impl RecognizedPage {
    /// Zero-based index of the source page this replaces
    pub fn page(&self) -> usize {
        self.page
    }

    /// Recognized document; its first page is the replacement
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Isolates a page, OCRs it and verifies the result
pub struct PageOcr<E: PdfEngine> {
    engine: Arc<E>,
    ocr: Arc<dyn OcrEngine>,
}

impl<E: PdfEngine> Clone for PageOcr<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            ocr: Arc::clone(&self.ocr),
        }
    }
}

impl<E: PdfEngine> PageOcr<E> {
    pub fn new(engine: Arc<E>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { engine, ocr }
    }

    /// OCR page `page` (zero-based) of the document at `source`
    ///
    /// Temporary files are created under `scratch`.
    #[tracing::instrument(level = "debug", skip_all, fields(page = page + 1))]
    pub async fn ocr_page(
        &self,
        source: &Path,
        page: usize,
        scratch: &Path,
    ) -> Result<RecognizedPage, PipelineError> {
        let document = source.display().to_string();
        let dir = tempfile::Builder::new()
            .prefix(&format!("page-{}-", page + 1))
            .tempdir_in(scratch)?;
        let isolated = dir.path().join(ISOLATED_FILE);
        let recognized = dir.path().join(RECOGNIZED_FILE);

        // Container work stays on one blocking thread
        let engine = Arc::clone(&self.engine);
        let source_owned = source.to_path_buf();
        let isolated_owned = isolated.clone();
        tokio::task::spawn_blocking(move || {
            let src = engine.open(&source_owned)?;
            let mut single = engine.create()?;
            single.append_page(&src, page)?;
            single.save(&isolated_owned)
        })
        .await?
        .map_err(|source| PipelineError::Isolate {
            document: document.clone(),
            page,
            source,
        })?;

        tracing::debug!("Running {} on isolated page {}", self.ocr.name(), page + 1);
        self.ocr
            .recognize(&isolated, &recognized)
            .await
            .map_err(|source| PipelineError::Ocr {
                document: document.clone(),
                page,
                source,
            })?;

        if let Err(e) = tokio::fs::remove_file(&isolated).await {
            tracing::warn!("Failed to remove {}: {}", isolated.display(), e);
        }

        let engine = Arc::clone(&self.engine);
        let recognized_owned = recognized.clone();
        let page_count = tokio::task::spawn_blocking(move || {
            engine.open(&recognized_owned)?.page_count()
        })
        .await?
        .map_err(|e| PipelineError::ReadBack {
            document: document.clone(),
            page,
            reason: e.to_string(),
        })?;

        if page_count == 0 {
            return Err(PipelineError::ReadBack {
                document,
                page,
                reason: "OCR output has no pages".to_string(),
            });
        }
        if page_count > 1 {
            tracing::warn!(
                "OCR output for page {} has {} pages; using the first",
                page + 1,
                page_count
            );
        }

        Ok(RecognizedPage {
            page,
            path: recognized,
            _dir: dir,
        })
    }
}
