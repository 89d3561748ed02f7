//! # pdf-outline
//!
//! Title and heading outline extraction from PDF layout signals.
//!
//! Text spans are reduced to four layout features (rounded font size,
//! boldness, indentation, page), classified as title, heading or body text,
//! assigned a heading depth, and assembled into an ordered outline.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_file, render, Models};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     // Load both classifiers once
//!     let models = Models::load("models")?;
//!
//!     // Extract the outline of a PDF file
//!     let result = extract_file("document.pdf", &models)?;
//!     println!("{}", render::to_json(&result, render::JsonFormat::Pretty)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Pluggable models**: any [`Classifier`] can stand in for the shipped softmax model
//! - **Deterministic output**: stable ordering, byte-identical results across runs
//! - **Batch processing**: whole directories in parallel with Rayon
//! - **Schema validation**: checks rendered JSON against the output contract

pub mod batch;
pub mod classify;
pub mod error;
pub mod features;
pub mod model;
pub mod outline;
pub mod parser;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use batch::{
    process_directory, process_directory_with_events, BatchEvent, BatchOptions, BatchSummary,
    DocumentFailure,
};
pub use classify::{BlockClassifier, Classifier, LabelVocabulary, LevelClassifier, Models};
pub use error::{Error, Result};
pub use features::{
    BoldDetection, EncodedUnit, EncoderOptions, FeatureEncoder, FeatureVector, Granularity,
};
pub use model::{
    BlockLabel, BoundingBox, ExtractionResult, HeadingLevel, OutlineEntry, SpanDocument,
    SpanPage, TextSpan,
};
pub use parser::{ErrorMode, ParseOptions, PdfSpanSource, SpanSource};
pub use pipeline::{extract_outline, ExtractOptions};
pub use render::JsonFormat;

use std::path::Path;

/// Extract the title and outline of a PDF file.
///
/// # Arguments
///
/// * `path` - Path to the PDF file
/// * `models` - Loaded classifiers
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_file, Models};
///
/// let models = Models::load("models").unwrap();
/// let result = extract_file("document.pdf", &models).unwrap();
/// println!("{}", result.title);
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P, models: &Models) -> Result<ExtractionResult> {
    extract_file_with_options(
        path,
        models,
        ParseOptions::default(),
        &ExtractOptions::default(),
    )
}

/// Extract from a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_file_with_options, EncoderOptions, ExtractOptions, Models, ParseOptions};
///
/// let models = Models::load("models").unwrap();
/// let options = ExtractOptions::new().with_encoder(EncoderOptions::new().lines());
/// let result =
///     extract_file_with_options("document.pdf", &models, ParseOptions::new().lenient(), &options)
///         .unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    models: &Models,
    parse: ParseOptions,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    let doc = PdfSpanSource::with_options(parse).load(path.as_ref())?;
    extract_outline(&doc, models, options)
}

/// Extract from PDF bytes.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_bytes, Models};
///
/// let models = Models::load("models").unwrap();
/// let data = std::fs::read("document.pdf").unwrap();
/// let result = extract_bytes(&data, &models).unwrap();
/// ```
pub fn extract_bytes(data: &[u8], models: &Models) -> Result<ExtractionResult> {
    let doc = PdfSpanSource::new().load_bytes(data)?;
    extract_outline(&doc, models, &ExtractOptions::default())
}

/// Read the positioned text spans of a PDF file.
pub fn read_spans<P: AsRef<Path>>(path: P) -> Result<SpanDocument> {
    PdfSpanSource::new().load(path.as_ref())
}

/// Extract from a PDF file and render it as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, models: &Models, format: JsonFormat) -> Result<String> {
    let result = extract_file(path, models)?;
    render::to_json(&result, format)
}
