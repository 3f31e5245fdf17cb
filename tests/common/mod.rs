//! Shared fakes for integration tests
//!
//! Documents are JSON files: each page records its text and where it came
//! from, so tests can check page provenance after reassembly.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pdf_ocr_server::config::{PipelineConfig, ProcessingConfig};
use pdf_ocr_server::error::StorageError;
use pdf_ocr_server::ocr::{OcrEngine, OcrError};
use pdf_ocr_server::pdf::{BookmarkTable, PdfContainer, PdfEngine, PdfError, PdfResult};
use pdf_ocr_server::pipeline::Reassembler;
use pdf_ocr_server::processor::Processor;
use pdf_ocr_server::storage::{ObjectLocation, ObjectMetadata, ObjectStore};

/// Text long enough to classify as digital
pub const DIGITAL_TEXT: &str =
    "This page carries a proper text layer with well over fifty characters of content.";

/// Text that makes [`ScriptedOcr`] fail
pub const FAIL_MARKER: &str = "FAIL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakePage {
    pub text: String,
    pub origin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakeDoc {
    pub pages: Vec<FakePage>,
    pub bookmarks: BookmarkTable,
}

impl FakeDoc {
    /// Pages tagged `source:<index>`
    pub fn with_pages(texts: &[&str]) -> Self {
        Self {
            pages: texts
                .iter()
                .enumerate()
                .map(|(i, text)| FakePage {
                    text: text.to_string(),
                    origin: format!("source:{}", i),
                })
                .collect(),
            bookmarks: BookmarkTable::default(),
        }
    }

    pub fn bookmarked(mut self, bookmarks: BookmarkTable) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap()
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).unwrap();
    }

    pub fn read(path: &Path) -> Self {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    pub fn origins(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.origin.as_str()).collect()
    }
}

impl PdfContainer for FakeDoc {
    fn page_count(&self) -> PdfResult<usize> {
        Ok(self.pages.len())
    }

    fn page_text(&self, index: usize) -> PdfResult<String> {
        self.pages
            .get(index)
            .map(|p| p.text.clone())
            .ok_or(PdfError::PageNotFound {
                index,
                count: self.pages.len(),
            })
    }

    fn append_page(&mut self, source: &Self, index: usize) -> PdfResult<()> {
        let page = source.pages.get(index).cloned().ok_or(PdfError::PageNotFound {
            index,
            count: source.pages.len(),
        })?;
        self.pages.push(page);
        Ok(())
    }

    fn bookmarks(&self) -> PdfResult<BookmarkTable> {
        Ok(self.bookmarks.clone())
    }

    fn set_bookmarks(&mut self, table: &BookmarkTable) -> PdfResult<()> {
        self.bookmarks = table.clone();
        Ok(())
    }

    fn save(&self, path: &Path) -> PdfResult<()> {
        let bytes = serde_json::to_vec(self).map_err(|e| PdfError::Save {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeEngine;

impl PdfEngine for FakeEngine {
    type Document = FakeDoc;

    fn open(&self, path: &Path) -> PdfResult<FakeDoc> {
        let bytes = std::fs::read(path).map_err(|e| PdfError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| PdfError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn create(&self) -> PdfResult<FakeDoc> {
        Ok(FakeDoc::default())
    }
}

/// OCR double: rewrites every page with long recognized text
///
/// Fails on pages containing [`FAIL_MARKER`]. Optional per-text delays let
/// tests force out-of-order completion.
#[derive(Default)]
pub struct ScriptedOcr {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delays: HashMap<String, Duration>,
    produce_empty: bool,
}

impl ScriptedOcr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, text: &str, delay: Duration) -> Self {
        self.delays.insert(text.to_string(), delay);
        self
    }

    /// Write documents with no pages
    pub fn producing_empty_output(mut self) -> Self {
        self.produce_empty = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for ScriptedOcr {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(&self, input: &Path, output: &Path) -> Result<(), OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.rewrite(input, output).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl ScriptedOcr {
    async fn rewrite(&self, input: &Path, output: &Path) -> Result<(), OcrError> {
        let bytes = tokio::fs::read(input).await?;
        let mut doc: FakeDoc = serde_json::from_slice(&bytes)
            .map_err(|e| OcrError::ProcessingError(e.to_string()))?;

        if let Some(delay) = doc.pages.first().and_then(|p| self.delays.get(&p.text)) {
            tokio::time::sleep(*delay).await;
        }

        if doc.pages.iter().any(|p| p.text.contains(FAIL_MARKER)) {
            return Err(OcrError::ProcessingError("unreadable scan".to_string()));
        }

        if self.produce_empty {
            doc.pages.clear();
        }
        for page in &mut doc.pages {
            page.text = format!("Recognized text for {}: {}", page.origin, DIGITAL_TEXT);
            page.origin = format!("ocr:{}", page.origin);
        }

        let bytes = serde_json::to_vec(&doc).map_err(|e| OcrError::ProcessingError(e.to_string()))?;
        tokio::fs::write(output, bytes).await?;
        Ok(())
    }
}

/// In-memory object store
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    uploads: Mutex<Vec<ObjectLocation>>,
    fail_fetch: AtomicBool,
    fail_store: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), bytes);
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn uploads(&self) -> Vec<ObjectLocation> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn fail_fetches(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fail_stores(&self) {
        self.fail_store.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn fetch(&self, location: &ObjectLocation, dest: &Path) -> Result<(), StorageError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StorageError::AccessDenied(location.key.clone()));
        }
        let bytes = self
            .get(&location.bucket, &location.key)
            .ok_or_else(|| StorageError::ObjectNotFound(location.key.clone()))?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }

    async fn store(&self, src: &Path, location: &ObjectLocation) -> Result<(), StorageError> {
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(StorageError::SdkError("connection reset".to_string()));
        }
        let bytes = tokio::fs::read(src).await?;
        self.put(&location.bucket, &location.key, bytes);
        self.uploads.lock().unwrap().push(location.clone());
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMetadata>, StorageError> {
        let objects = self.objects.lock().unwrap();
        let mut listed: Vec<ObjectMetadata> = objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), bytes)| ObjectMetadata::new(k.as_str(), bytes.len() as i64))
            .collect();
        listed.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(listed)
    }
}

pub fn pipeline_config(concurrency: usize) -> PipelineConfig {
    PipelineConfig {
        ocr_concurrency: concurrency,
        ..Default::default()
    }
}

pub fn reassembler(ocr: Arc<ScriptedOcr>, concurrency: usize) -> Reassembler<FakeEngine> {
    Reassembler::new(Arc::new(FakeEngine), ocr, pipeline_config(concurrency))
}

/// Processor over the fakes, with working directories under `work_root`
pub fn processor(store: Arc<MemoryStore>, ocr: Arc<ScriptedOcr>, work_root: &Path) -> Processor {
    processor_with(
        store,
        ocr,
        ProcessingConfig {
            work_dir: Some(work_root.to_path_buf()),
            ..Default::default()
        },
    )
}

pub fn processor_with(
    store: Arc<MemoryStore>,
    ocr: Arc<ScriptedOcr>,
    config: ProcessingConfig,
) -> Processor {
    Processor::new(
        store,
        Arc::new(reassembler(ocr, 1)),
        Some("default-bucket".to_string()),
        config,
    )
}

/// Number of entries directly inside `dir`
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
