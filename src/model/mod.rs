//! Data model shared by the span source and the extraction pipeline.
//!
//! Spans flow in, an [`ExtractionResult`] flows out. Everything here is plain
//! data with serde support.

mod outline;
mod span;

pub use outline::{BlockLabel, ExtractionResult, HeadingLevel, OutlineEntry};
pub use span::{BoundingBox, SpanDocument, SpanPage, TextSpan};
