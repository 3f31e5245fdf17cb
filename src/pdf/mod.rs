//! PDF container access
//!
//! The pipeline talks to PDF files through two small traits so the
//! classification and reassembly logic never touches MuPDF directly:
//!
//! - [`PdfEngine`]: opens existing documents and creates empty ones
//! - [`PdfContainer`]: page count, page text, page copy, outline get/set, save
//!
//! [`MupdfEngine`] is the production implementation.

mod engine;
mod error;
mod mupdf_engine;
mod types;

pub use engine::{PdfContainer, PdfEngine};
pub use error::{PdfError, PdfResult};
pub use mupdf_engine::{MupdfDocument, MupdfEngine};
pub use types::{Bookmark, BookmarkTable, OutlineNode};
