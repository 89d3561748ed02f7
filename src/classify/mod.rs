//! Classification of feature vectors.
//!
//! The models themselves are black boxes behind the [`Classifier`] trait: any
//! implementation that turns feature vectors into per-class probability
//! distributions can be plugged in. [`BlockClassifier`] and
//! [`LevelClassifier`] map those distributions back to labels through a
//! [`LabelVocabulary`] loaded alongside the model.

mod block;
mod level;
mod models;
mod softmax;
mod vocabulary;

pub use block::BlockClassifier;
pub use level::LevelClassifier;
pub use models::{
    Models, BLOCK_LABELS_FILE, BLOCK_MODEL_FILE, LEVEL_LABELS_FILE, LEVEL_MODEL_FILE,
};
pub use softmax::SoftmaxModel;
pub use vocabulary::{collapse_block_label, LabelVocabulary, BLOCK_LABEL_TABLE};

use crate::error::Result;
use crate::features::FeatureVector;

/// A classification model.
///
/// Implement this trait to plug in a new model.
pub trait Classifier: Send + Sync {
    /// Return one probability distribution per input vector, in input order.
    ///
    /// Each distribution has one entry per class of the model's vocabulary.
    fn classify(&self, features: &[FeatureVector]) -> Result<Vec<Vec<f32>>>;
}
