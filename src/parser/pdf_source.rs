//! PDF span source using lopdf.

use std::fs;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::{BoundingBox, SpanDocument, SpanPage, TextSpan};

use super::content::{ContentReader, RawSpan};
use super::options::{ErrorMode, ParseOptions};
use super::SpanSource;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Share of the font size above the baseline.
const ASCENT: f32 = 0.8;
/// Share of the font size below the baseline.
const DESCENT: f32 = 0.2;

/// Letter size, used when a page declares no MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Check the PDF header and return the declared version (e.g. "1.7").
pub fn detect_pdf_version(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let valid = version[0].is_ascii_digit() && version[1] == b'.' && version[2].is_ascii_digit();
    let version = String::from_utf8_lossy(version).to_string();
    if !valid {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(version)
}

/// Reads positioned text spans out of PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfSpanSource {
    options: ParseOptions,
}

impl PdfSpanSource {
    /// Create a span source with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a span source with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// The options this source was built with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Read every page of a loaded document.
    pub fn read_document(&self, doc: &LopdfDocument) -> Result<SpanDocument> {
        let mut document = SpanDocument::new();

        for (page_num, page_id) in doc.get_pages() {
            match self.read_page(doc, page_num, page_id) {
                Ok(page) => document.add_page(page),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Failed to read spans from page {}: {}", page_num, e);
                    let [llx, lly, urx, ury] = media_box(doc, page_id);
                    document.add_page(SpanPage::new(page_num, urx - llx, ury - lly));
                }
            }
        }

        log::debug!(
            "Read {} spans from {} pages",
            document.span_count(),
            document.page_count()
        );

        Ok(document)
    }

    /// Read the spans of a single page.
    fn read_page(&self, doc: &LopdfDocument, page_num: u32, page_id: ObjectId) -> Result<SpanPage> {
        let media_box = media_box(doc, page_id);
        let [llx, lly, urx, ury] = media_box;
        let mut page = SpanPage::new(page_num, urx - llx, ury - lly);

        let reader = ContentReader::for_page(doc, page_id)?;
        let content = reader.page_content(page_id)?;
        if content.is_empty() {
            return Ok(page);
        }

        for raw in reader.read(&content)? {
            if let Some(span) = self.to_span(raw, page_num, &media_box) {
                page.add_span(span);
            }
        }

        Ok(page)
    }

    /// Convert a raw run into a top-left origin span; blank runs are dropped.
    fn to_span(&self, raw: RawSpan, page_num: u32, media_box: &[f32; 4]) -> Option<TextSpan> {
        let text = raw.text.trim();
        if text.is_empty() {
            return None;
        }
        let text: String = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        let [llx, _, _, ury] = *media_box;
        let x0 = raw.x - llx;
        let bbox = BoundingBox::new(
            x0,
            ury - (raw.y + raw.font_size * ASCENT),
            x0 + raw.width,
            ury - (raw.y - raw.font_size * DESCENT),
        );

        Some(
            TextSpan::new(text, raw.font_name, raw.font_size, page_num, bbox).with_bold(raw.bold),
        )
    }
}

impl SpanSource for PdfSpanSource {
    fn load(&self, path: &Path) -> Result<SpanDocument> {
        let data = fs::read(path)?;
        self.load_bytes(&data)
    }

    fn load_bytes(&self, data: &[u8]) -> Result<SpanDocument> {
        detect_pdf_version(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        self.read_document(&doc)
    }
}

/// MediaBox of a page, following /Parent for inherited boxes.
fn media_box(doc: &LopdfDocument, page_id: ObjectId) -> [f32; 4] {
    let mut current = Some(page_id);
    // Page trees are shallow; the bound guards against reference cycles.
    for _ in 0..32 {
        let Some(id) = current else { break };
        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };

        if let Ok(array) = dict.get(b"MediaBox").and_then(|o| o.as_array()) {
            if array.len() >= 4 {
                let mut rect = DEFAULT_MEDIA_BOX;
                for (slot, obj) in rect.iter_mut().zip(array) {
                    if let Ok(v) = obj.as_float() {
                        *slot = v;
                    }
                }
                return rect;
            }
        }

        current = match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => Some(*parent),
            _ => None,
        };
    }

    DEFAULT_MEDIA_BOX
}
