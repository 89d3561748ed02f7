//! Positioned text spans as produced by a span source.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page space.
///
/// The origin is the top-left corner of the page and `y` grows downward,
/// so a smaller `y0` means the span sits higher on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A run of text sharing one font, with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content (trimmed, never blank when produced by a span source)
    pub text: String,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Bold style flag reported by the font itself
    pub bold: bool,
    /// 1-based page number
    pub page_number: u32,
    /// Position on the page
    pub bbox: BoundingBox,
}

impl TextSpan {
    /// Create a new span.
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f32,
        page_number: u32,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            text: text.into(),
            font_name: font_name.into(),
            font_size,
            bold: false,
            page_number,
            bbox,
        }
    }

    /// Set the bold style flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Top edge of the span.
    pub fn top(&self) -> f32 {
        self.bbox.y0
    }

    /// Whether the span carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// All spans of one page, in content order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanPage {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Spans in the order the span source produced them
    pub spans: Vec<TextSpan>,
}

impl SpanPage {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            spans: Vec::new(),
        }
    }

    /// Create an empty page with standard Letter size.
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a span to the page.
    pub fn add_span(&mut self, span: TextSpan) {
        self.spans.push(span);
    }

    /// Check if the page has no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// A document as seen by the extraction core: pages of spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanDocument {
    /// Pages ordered by page number
    pub pages: Vec<SpanPage>,
}

impl SpanDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: SpanPage) {
        self.pages.push(page);
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Total number of spans across all pages.
    pub fn span_count(&self) -> usize {
        self.pages.iter().map(|p| p.spans.len()).sum()
    }

    /// Whether the document has no extractable text at all.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.is_empty())
    }

    /// Iterate over every span in document order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.pages.iter().flat_map(|p| p.spans.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_union() {
        let a = BoundingBox::new(10.0, 20.0, 50.0, 30.0);
        let b = BoundingBox::new(5.0, 22.0, 80.0, 28.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(5.0, 20.0, 80.0, 30.0));
        assert_eq!(u.width(), 75.0);
        assert_eq!(u.height(), 10.0);
    }

    #[test]
    fn test_document_counts() {
        let mut doc = SpanDocument::new();
        assert!(doc.is_empty());

        let mut page = SpanPage::letter(1);
        page.add_span(TextSpan::new(
            "Hello",
            "Helvetica",
            12.0,
            1,
            BoundingBox::new(0.0, 0.0, 30.0, 12.0),
        ));
        doc.add_page(page);
        doc.add_page(SpanPage::letter(2));

        assert!(!doc.is_empty());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.span_count(), 1);
        assert_eq!(doc.spans().next().map(|s| s.text.as_str()), Some("Hello"));
    }

    #[test]
    fn test_blank_span() {
        let span = TextSpan::new("   ", "Helvetica", 12.0, 1, BoundingBox::default());
        assert!(span.is_blank());
    }
}
