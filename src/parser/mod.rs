//! Span sources: where positioned text comes from.

mod content;
mod options;
mod pdf_source;

pub use options::{ErrorMode, ParseOptions};
pub use pdf_source::{detect_pdf_version, PdfSpanSource};

use std::path::Path;

use crate::error::Result;
use crate::model::SpanDocument;

/// Anything that can turn a document into pages of positioned spans.
///
/// Implement this trait to feed the pipeline from another parser.
pub trait SpanSource: Send + Sync {
    /// Read the document at `path`.
    fn load(&self, path: &Path) -> Result<SpanDocument>;

    /// Read a document held in memory.
    fn load_bytes(&self, data: &[u8]) -> Result<SpanDocument>;
}
