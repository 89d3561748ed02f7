//! Block-level classification: Title / Heading / Other.

use std::sync::Arc;

use crate::error::Result;
use crate::features::FeatureVector;
use crate::model::BlockLabel;

use super::{Classifier, LabelVocabulary};

/// Labels feature vectors with a [`BlockLabel`] through an injected model.
#[derive(Clone)]
pub struct BlockClassifier {
    model: Arc<dyn Classifier>,
    vocabulary: LabelVocabulary<BlockLabel>,
}

impl BlockClassifier {
    /// Wrap a model and the vocabulary naming its classes.
    pub fn new(model: Arc<dyn Classifier>, vocabulary: LabelVocabulary<BlockLabel>) -> Self {
        Self { model, vocabulary }
    }

    /// The label vocabulary.
    pub fn vocabulary(&self) -> &LabelVocabulary<BlockLabel> {
        &self.vocabulary
    }

    /// Label every feature vector, one label per input, in input order.
    pub fn label(&self, features: &[FeatureVector]) -> Result<Vec<BlockLabel>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let distributions = self.model.classify(features)?;
        let labels = self.vocabulary.decide_all(&distributions, features.len())?;

        log::debug!(
            "Block labels: {} title, {} heading, {} other",
            labels.iter().filter(|l| **l == BlockLabel::Title).count(),
            labels.iter().filter(|l| **l == BlockLabel::Heading).count(),
            labels.iter().filter(|l| **l == BlockLabel::Other).count()
        );

        Ok(labels)
    }
}

impl std::fmt::Debug for BlockClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockClassifier")
            .field("vocabulary", &self.vocabulary)
            .finish_non_exhaustive()
    }
}
