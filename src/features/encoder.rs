//! Conversion of spans into model-ready feature vectors.
//!
//! One encoder serves every consumer (inference and dataset preparation), so
//! font size quantization is applied identically everywhere.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{BoundingBox, SpanDocument, TextSpan};

use super::lines::{group_into_lines, line_text, DEFAULT_LINE_TOLERANCE};

/// Feature column names, in model input order.
pub const FEATURE_NAMES: [&str; 4] = ["avg_size", "is_bold", "x_indentation", "page_num"];

/// Number of model input features.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Numeric description of one unit of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Mean font size, rounded to the nearest integer
    pub avg_size: f32,
    /// Whether the unit is set in a bold face
    pub is_bold: bool,
    /// Left edge of the unit
    pub x_indentation: f32,
    /// 1-based page number
    pub page_num: u32,
}

impl FeatureVector {
    /// Features as a model input row, ordered as [`FEATURE_NAMES`].
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.avg_size,
            if self.is_bold { 1.0 } else { 0.0 },
            self.x_indentation,
            self.page_num as f32,
        ]
    }
}

/// How spans are grouped before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Every span is its own unit
    #[default]
    Span,
    /// Spans on the same visual line are merged into one unit
    Line,
}

/// How the bold flag is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoldDetection {
    /// Font name of the first span contains "bold" (case-insensitive)
    #[default]
    FontName,
    /// Font name check, or the bold style flag of the first span
    Strict,
}

/// Options for the feature encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderOptions {
    /// Unit granularity
    pub granularity: Granularity,

    /// Bold detection rule
    pub bold_detection: BoldDetection,

    /// Maximum top-edge difference for spans on one line
    pub line_tolerance: f32,
}

impl EncoderOptions {
    /// Create new encoder options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set unit granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Merge spans into lines before encoding.
    pub fn lines(mut self) -> Self {
        self.granularity = Granularity::Line;
        self
    }

    /// Set bold detection rule.
    pub fn with_bold_detection(mut self, detection: BoldDetection) -> Self {
        self.bold_detection = detection;
        self
    }

    /// Also honor the span's bold style flag.
    pub fn strict_bold(mut self) -> Self {
        self.bold_detection = BoldDetection::Strict;
        self
    }

    /// Set the line grouping tolerance.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Span,
            bold_detection: BoldDetection::FontName,
            line_tolerance: DEFAULT_LINE_TOLERANCE,
        }
    }
}

/// A unit of text together with its features and position.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedUnit {
    /// Text of the unit
    pub text: String,
    /// 1-based page number
    pub page: u32,
    /// Bounding box covering every span of the unit
    pub bbox: BoundingBox,
    /// Model input
    pub features: FeatureVector,
}

impl EncodedUnit {
    /// Top edge, used for reading order within a page.
    pub fn top(&self) -> f32 {
        self.bbox.y0
    }
}

/// Feature encoder.
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    options: EncoderOptions,
}

impl FeatureEncoder {
    /// Create an encoder with the given options.
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// The options this encoder was built with.
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encode one unit of spans.
    ///
    /// Fails with [`Error::InvalidInput`] when `spans` is empty.
    pub fn encode(&self, spans: &[TextSpan]) -> Result<FeatureVector> {
        let first = spans
            .first()
            .ok_or_else(|| Error::InvalidInput("cannot encode an empty unit".to_string()))?;

        let total: f32 = spans.iter().map(|s| s.font_size).sum();
        let avg_size = (total / spans.len() as f32).round();

        let name_bold = first.font_name.to_lowercase().contains("bold");
        let is_bold = match self.options.bold_detection {
            BoldDetection::FontName => name_bold,
            BoldDetection::Strict => name_bold || first.bold,
        };

        let x_indentation = spans
            .iter()
            .map(|s| s.bbox.x0)
            .fold(f32::INFINITY, f32::min);

        Ok(FeatureVector {
            avg_size,
            is_bold,
            x_indentation,
            page_num: first.page_number,
        })
    }

    /// Encode one unit of spans, keeping its text and position.
    pub fn encode_unit(&self, spans: &[TextSpan]) -> Result<EncodedUnit> {
        let features = self.encode(spans)?;

        let text = line_text(spans);
        if text.is_empty() {
            return Err(Error::InvalidInput(
                "cannot encode a unit without visible text".to_string(),
            ));
        }

        let bbox = spans
            .iter()
            .skip(1)
            .fold(spans[0].bbox, |acc, s| acc.union(&s.bbox));

        Ok(EncodedUnit {
            text,
            page: features.page_num,
            bbox,
            features,
        })
    }

    /// Encode a whole document in content order.
    ///
    /// Blank spans are dropped before grouping, so no empty unit ever reaches
    /// [`FeatureEncoder::encode`].
    pub fn encode_document(&self, doc: &SpanDocument) -> Result<Vec<EncodedUnit>> {
        let mut units = Vec::with_capacity(doc.span_count());

        for page in &doc.pages {
            let spans: Vec<TextSpan> = page
                .spans
                .iter()
                .filter(|s| !s.is_blank())
                .cloned()
                .collect();

            match self.options.granularity {
                Granularity::Span => {
                    for span in &spans {
                        units.push(self.encode_unit(std::slice::from_ref(span))?);
                    }
                }
                Granularity::Line => {
                    for line in group_into_lines(&spans, self.options.line_tolerance) {
                        units.push(self.encode_unit(&line)?);
                    }
                }
            }
        }

        log::debug!(
            "Encoded {} units from {} pages ({:?} granularity)",
            units.len(),
            doc.page_count(),
            self.options.granularity
        );

        Ok(units)
    }
}
