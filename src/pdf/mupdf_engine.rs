//! MuPDF-backed PDF containers
//!
//! Thin adapter over `mupdf::pdf::PdfDocument`. A copied page is a fresh
//! page dictionary whose content and resources are grafted from the source.
//! Each output keeps one graft map per source document, so resources shared
//! between copied pages are carried over once.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use mupdf::pdf::{PdfDocument, PdfGraftMap, PdfObject};
use mupdf::{Outline, TextPageOptions};

use super::engine::{PdfContainer, PdfEngine};
use super::error::{PdfError, PdfResult};
use super::types::{BookmarkTable, OutlineNode};

/// Insert position understood by `pdf_insert_page`
const APPEND: i32 = -1;

/// Page dictionary entries carried over to a copied page
///
/// Looked up with inheritance, so attributes set on an ancestor page tree
/// node land on the copy. `/Parent` is never copied: grafting it would pull
/// the whole source page tree into the output. `/Annots` is left out for the
/// same reason, annotations point back at their page through `/P`.
const PAGE_KEYS: [&str; 9] = [
    "Contents",
    "Resources",
    "MediaBox",
    "CropBox",
    "BleedBox",
    "TrimBox",
    "ArtBox",
    "Rotate",
    "UserUnit",
];

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(0);

/// Production engine
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfEngine;

impl MupdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PdfEngine for MupdfEngine {
    type Document = MupdfDocument;

    fn open(&self, path: &Path) -> PdfResult<MupdfDocument> {
        let path_str = path.to_string_lossy();
        let inner = PdfDocument::open(&path_str).map_err(|e| PdfError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(MupdfDocument::wrap(inner))
    }

    fn create(&self) -> PdfResult<MupdfDocument> {
        Ok(MupdfDocument::wrap(PdfDocument::new()))
    }
}

/// An open MuPDF document
pub struct MupdfDocument {
    id: u64,
    inner: PdfDocument,
    /// Graft maps keyed by the id of the document pages were copied from
    grafts: HashMap<u64, PdfGraftMap>,
}

impl MupdfDocument {
    fn wrap(inner: PdfDocument) -> Self {
        Self {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            inner,
            grafts: HashMap::new(),
        }
    }

    fn check_index(&self, index: usize) -> PdfResult<i32> {
        let count = self.page_count()?;
        if index >= count {
            return Err(PdfError::PageNotFound { index, count });
        }
        Ok(index as i32)
    }

    /// Build a page dictionary for this document from a source page object
    fn graft_page_dict(&mut self, source: &MupdfDocument, page: &PdfObject) -> PdfResult<PdfObject> {
        let graft = match self.grafts.entry(source.id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.inner.new_graft_map()?),
        };

        let mut copy = self.inner.new_dict()?;
        copy.dict_put("Type", PdfObject::new_name("Page")?)?;
        for key in PAGE_KEYS {
            if let Some(value) = page.get_dict_inheritable(key)? {
                copy.dict_put(key, graft.graft_object(&value)?)?;
            }
        }
        Ok(copy)
    }
}

impl PdfContainer for MupdfDocument {
    fn page_count(&self) -> PdfResult<usize> {
        Ok(self.inner.page_count()? as usize)
    }

    fn page_text(&self, index: usize) -> PdfResult<String> {
        let page_no = self.check_index(index)?;
        let page = self.inner.load_page(page_no)?;
        let text_page = page
            .to_text_page(TextPageOptions::empty())
            .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", index + 1, e)))?;
        text_page
            .to_text()
            .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", index + 1, e)))
    }

    fn append_page(&mut self, source: &Self, index: usize) -> PdfResult<()> {
        let page_no = source.check_index(index)?;
        let page = source.inner.find_page(page_no)?;
        let copy = self.graft_page_dict(source, &page)?;
        let copy = self.inner.add_object(&copy)?;
        self.inner.insert_page(APPEND, &copy)?;
        Ok(())
    }

    fn bookmarks(&self) -> PdfResult<BookmarkTable> {
        let outlines = self.inner.outlines()?;
        let nodes: Vec<OutlineNode> = outlines.iter().map(outline_to_node).collect();
        Ok(BookmarkTable::from_nodes(&nodes))
    }

    fn set_bookmarks(&mut self, table: &BookmarkTable) -> PdfResult<()> {
        let outlines: Vec<Outline> = table.to_nodes().iter().map(node_to_outline).collect();
        self.inner
            .set_outlines(&outlines)
            .map_err(|e| PdfError::Outline(e.to_string()))
    }

    fn save(&self, path: &Path) -> PdfResult<()> {
        let path_str = path.to_string_lossy();
        self.inner.save(&path_str).map_err(|e| PdfError::Save {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

fn outline_to_node(outline: &Outline) -> OutlineNode {
    OutlineNode {
        title: outline.title.clone(),
        page: outline.page.map(|p| p as usize),
        uri: outline.uri.clone(),
        children: outline.down.iter().map(outline_to_node).collect(),
    }
}

fn node_to_outline(node: &OutlineNode) -> Outline {
    Outline {
        title: node.title.clone(),
        uri: node.uri.clone(),
        page: node.page.map(|p| p as u32),
        down: node.children.iter().map(node_to_outline).collect(),
        x: 0.0,
        y: 0.0,
    }
}
