//! The per-document extraction pipeline.
//!
//! spans → feature vectors → block labels → {title, headings} → levels →
//! outline. Every stage is a pure function of its input and of the shared,
//! read-only [`Models`], so documents can be processed on any number of
//! threads at once.

use crate::classify::Models;
use crate::error::Result;
use crate::features::{EncodedUnit, EncoderOptions, FeatureEncoder, FeatureVector};
use crate::model::{BlockLabel, ExtractionResult, SpanDocument};
use crate::outline::{assemble_outline, resolve_title};

/// Options for outline extraction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtractOptions {
    /// Feature encoder options
    pub encoder: EncoderOptions,
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set encoder options.
    pub fn with_encoder(mut self, encoder: EncoderOptions) -> Self {
        self.encoder = encoder;
        self
    }
}

/// Extract the title and outline of one document.
pub fn extract_outline(
    doc: &SpanDocument,
    models: &Models,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    let encoder = FeatureEncoder::new(options.encoder);
    let units = encoder.encode_document(doc)?;
    extract_from_units(&units, models)
}

/// Run classification, title resolution and assembly over encoded units.
pub fn extract_from_units(units: &[EncodedUnit], models: &Models) -> Result<ExtractionResult> {
    if units.is_empty() {
        return Ok(ExtractionResult::empty());
    }

    let features: Vec<FeatureVector> = units.iter().map(|u| u.features).collect();
    let labels = models.block().label(&features)?;

    let title = resolve_title(units, &labels);

    let heading_units: Vec<&EncodedUnit> = units
        .iter()
        .zip(&labels)
        .filter(|(_, label)| **label == BlockLabel::Heading)
        .map(|(unit, _)| unit)
        .collect();
    let heading_features: Vec<FeatureVector> =
        heading_units.iter().map(|u| u.features).collect();
    let levels = models.level().levels(&heading_features)?;

    let headings = heading_units.into_iter().zip(levels).collect();
    let outline = assemble_outline(headings, &title.text);

    log::debug!(
        "Extracted title {:?} ({:?}) and {} outline entries from {} units",
        title.text,
        title.source,
        outline.len(),
        units.len()
    );

    Ok(ExtractionResult::new(title.text, outline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{BlockClassifier, Classifier, LabelVocabulary, LevelClassifier};
    use crate::model::{BoundingBox, HeadingLevel, SpanPage, TextSpan};
    use std::sync::Arc;

    /// Title for size >= 20, heading for bold text, other otherwise.
    struct RuleBlock;

    impl Classifier for RuleBlock {
        fn classify(&self, features: &[FeatureVector]) -> Result<Vec<Vec<f32>>> {
            Ok(features
                .iter()
                .map(|f| {
                    if f.avg_size >= 20.0 {
                        vec![0.9, 0.05, 0.05]
                    } else if f.is_bold {
                        vec![0.05, 0.9, 0.05]
                    } else {
                        vec![0.05, 0.05, 0.9]
                    }
                })
                .collect())
        }
    }

    /// H1 for size >= 16, H2 for >= 13, H3 otherwise.
    struct RuleLevel;

    impl Classifier for RuleLevel {
        fn classify(&self, features: &[FeatureVector]) -> Result<Vec<Vec<f32>>> {
            Ok(features
                .iter()
                .map(|f| {
                    if f.avg_size >= 16.0 {
                        vec![1.0, 0.0, 0.0]
                    } else if f.avg_size >= 13.0 {
                        vec![0.0, 1.0, 0.0]
                    } else {
                        vec![0.0, 0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    fn models() -> Models {
        Models::new(
            BlockClassifier::new(Arc::new(RuleBlock), LabelVocabulary::block_default()),
            LevelClassifier::new(Arc::new(RuleLevel), LabelVocabulary::level_default()),
        )
    }

    fn span(text: &str, font: &str, size: f32, top: f32) -> TextSpan {
        TextSpan::new(
            text,
            font,
            size,
            1,
            BoundingBox::new(10.0, top, 300.0, top + size),
        )
    }

    #[test]
    fn test_three_span_document() {
        let mut page = SpanPage::letter(1);
        page.add_span(span("Document Title", "Arial-Bold", 22.0, 40.0));
        page.add_span(span("1. Introduction", "Arial-Bold", 16.0, 100.0));
        page.add_span(span("This is body text.", "Arial", 11.0, 130.0));
        let mut doc = SpanDocument::new();
        doc.add_page(page);

        let result = extract_outline(&doc, &models(), &ExtractOptions::default()).unwrap();
        assert_eq!(result.title, "Document Title");
        assert_eq!(result.outline.len(), 1);
        assert_eq!(result.outline[0].level, HeadingLevel::H1);
        assert_eq!(result.outline[0].text, "1. Introduction");
        assert_eq!(result.outline[0].page, 1);
    }

    #[test]
    fn test_empty_document() {
        let mut doc = SpanDocument::new();
        doc.add_page(SpanPage::letter(1));
        let result = extract_outline(&doc, &models(), &ExtractOptions::default()).unwrap();
        assert_eq!(result, ExtractionResult::empty());
    }

    #[test]
    fn test_idempotent() {
        let mut page = SpanPage::letter(1);
        page.add_span(span("Report", "Times-Bold", 24.0, 30.0));
        page.add_span(span("Scope", "Times-Bold", 14.0, 90.0));
        page.add_span(span("Details", "Times-Bold", 12.0, 60.0));
        let mut doc = SpanDocument::new();
        doc.add_page(page);

        let models = models();
        let first = extract_outline(&doc, &models, &ExtractOptions::default()).unwrap();
        let second = extract_outline(&doc, &models, &ExtractOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.outline[0].text, "Details");
        assert_eq!(first.outline[0].level, HeadingLevel::H3);
    }
}
