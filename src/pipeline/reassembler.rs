//! Document reassembly
//!
//! Output page `i` always comes from source page `i`: digital pages are
//! copied verbatim, scanned pages are replaced by the first page of their
//! recognized document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};

use crate::config::PipelineConfig;
use crate::ocr::OcrEngine;
use crate::pdf::{PdfContainer, PdfEngine};

use super::bookmarks::BookmarkTransfer;
use super::classifier::classify;
use super::page_ocr::{PageOcr, RecognizedPage};
use super::types::{DocumentPipeline, PageKind, PipelineError, PipelineOutcome};

/// Classifies, selectively OCRs and rebuilds documents
pub struct Reassembler<E: PdfEngine> {
    engine: Arc<E>,
    page_ocr: PageOcr<E>,
    config: PipelineConfig,
}

/// What the first pass learned about the source
struct Survey {
    bookmarks: BookmarkTransfer,
    kinds: Vec<PageKind>,
}

impl<E: PdfEngine> Reassembler<E> {
    pub fn new(engine: Arc<E>, ocr: Arc<dyn OcrEngine>, config: PipelineConfig) -> Self {
        let page_ocr = PageOcr::new(Arc::clone(&engine), ocr);
        Self {
            engine,
            page_ocr,
            config,
        }
    }

    /// Rebuild `source` into `output` if any page needs OCR
    ///
    /// Returns [`PipelineOutcome::unchanged`] without writing anything when
    /// every page is digital.
    #[tracing::instrument(skip_all, fields(source = %source.display()))]
    pub async fn reassemble(
        &self,
        source: &Path,
        output: &Path,
    ) -> Result<PipelineOutcome, PipelineError> {
        let survey = self.survey(source).await?;

        let scanned: Vec<usize> = survey
            .kinds
            .iter()
            .enumerate()
            .filter(|(_, kind)| kind.is_scanned())
            .map(|(index, _)| index)
            .collect();

        if scanned.is_empty() {
            tracing::info!("No scanned pages; leaving the document untouched");
            return Ok(PipelineOutcome::unchanged(false));
        }
        tracing::info!(
            "{} of {} pages need OCR",
            scanned.len(),
            survey.kinds.len()
        );

        let scratch_parent = output.parent().unwrap_or_else(|| Path::new("."));
        let scratch = tempfile::Builder::new()
            .prefix("ocr-pages-")
            .tempdir_in(scratch_parent)?;

        let recognized = self.recognize_pages(source, &scanned, scratch.path()).await?;

        let written = self.assemble(source, output, survey, recognized).await;
        match written {
            Ok(0) => {
                tracing::warn!("Reassembled document has no pages; keeping the original");
                remove_partial(output).await;
                Ok(PipelineOutcome::unchanged(true))
            }
            Ok(pages) => {
                tracing::info!("Wrote {} pages to {}", pages, output.display());
                Ok(PipelineOutcome::written(output.to_path_buf()))
            }
            Err(e) => {
                remove_partial(output).await;
                Err(e)
            }
        }
    }

    /// Read the outline and classify every page in ascending order
    async fn survey(&self, source: &Path) -> Result<Survey, PipelineError> {
        let engine = Arc::clone(&self.engine);
        let path = source.to_path_buf();
        let threshold = self.config.scanned_text_threshold;

        tokio::task::spawn_blocking(move || {
            let document = path.display().to_string();
            let doc = engine.open(&path).map_err(|source| PipelineError::Open {
                document: document.clone(),
                source,
            })?;

            // Captured before any other work touches the document
            let bookmarks = BookmarkTransfer::extract(&doc)?;

            let mut kinds = Vec::with_capacity(bookmarks.source_page_count());
            for page in 0..bookmarks.source_page_count() {
                let kind = classify(&doc, page, threshold).map_err(|source| {
                    PipelineError::Classify {
                        document: document.clone(),
                        page,
                        source,
                    }
                })?;
                match kind {
                    PageKind::Scanned => tracing::info!("Page {} is scanned", page + 1),
                    PageKind::Digital => tracing::info!("Page {} is digital", page + 1),
                }
                kinds.push(kind);
            }

            Ok(Survey { bookmarks, kinds })
        })
        .await?
    }

    /// OCR the given pages with bounded concurrency, keyed by page index
    async fn recognize_pages(
        &self,
        source: &Path,
        pages: &[usize],
        scratch: &Path,
    ) -> Result<BTreeMap<usize, RecognizedPage>, PipelineError> {
        let concurrency = self.config.ocr_concurrency.max(1);

        let recognized: Vec<RecognizedPage> = futures::stream::iter(pages.iter().copied())
            .map(|page| self.page_ocr.ocr_page(source, page, scratch))
            .buffered(concurrency)
            .try_collect()
            .await?;

        Ok(recognized
            .into_iter()
            .map(|page| (page.page(), page))
            .collect())
    }

    /// Build and save the output; returns the number of pages written
    async fn assemble(
        &self,
        source: &Path,
        output: &Path,
        survey: Survey,
        recognized: BTreeMap<usize, RecognizedPage>,
    ) -> Result<usize, PipelineError> {
        let engine = Arc::clone(&self.engine);
        let source = source.to_path_buf();
        let output: PathBuf = output.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let target = output.display().to_string();
            let src = engine.open(&source).map_err(|e| PipelineError::Open {
                document: source.display().to_string(),
                source: e,
            })?;
            let mut out = engine.create().map_err(|e| PipelineError::Open {
                document: target.clone(),
                source: e,
            })?;

            for page in 0..survey.kinds.len() {
                let appended = match recognized.get(&page) {
                    Some(ocr) => engine
                        .open(ocr.path())
                        .and_then(|doc| out.append_page(&doc, 0)),
                    None => out.append_page(&src, page),
                };
                appended.map_err(|source| PipelineError::Assemble {
                    document: target.clone(),
                    page,
                    source,
                })?;
            }

            let pages = out.page_count().map_err(|source| PipelineError::Save {
                document: target.clone(),
                source,
            })?;
            if pages == 0 {
                return Ok(0);
            }

            survey.bookmarks.apply(&mut out)?;
            out.save(&output).map_err(|source| PipelineError::Save {
                document: target,
                source,
            })?;
            Ok(pages)
        })
        .await?
    }
}

#[async_trait]
impl<E: PdfEngine> DocumentPipeline for Reassembler<E> {
    async fn process(&self, source: &Path, output: &Path) -> Result<PipelineOutcome, PipelineError> {
        self.reassemble(source, output).await
    }
}

async fn remove_partial(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => tracing::debug!("Removed partial output {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove partial output {}: {}", output.display(), e),
    }
}
