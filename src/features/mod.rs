//! Feature encoding.

mod encoder;
mod lines;

pub use encoder::{
    BoldDetection, EncodedUnit, EncoderOptions, FeatureEncoder, FeatureVector, Granularity,
    FEATURE_COUNT, FEATURE_NAMES,
};
pub use lines::{group_into_lines, line_text, DEFAULT_LINE_TOLERANCE};
