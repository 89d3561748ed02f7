//! Heading depth classification: H1 / H2 / H3.

use std::sync::Arc;

use crate::error::Result;
use crate::features::FeatureVector;
use crate::model::HeadingLevel;

use super::{Classifier, LabelVocabulary};

/// Assigns a [`HeadingLevel`] to vectors already labeled as headings.
#[derive(Clone)]
pub struct LevelClassifier {
    model: Arc<dyn Classifier>,
    vocabulary: LabelVocabulary<HeadingLevel>,
}

impl LevelClassifier {
    /// Wrap a model and the vocabulary naming its classes.
    pub fn new(model: Arc<dyn Classifier>, vocabulary: LabelVocabulary<HeadingLevel>) -> Self {
        Self { model, vocabulary }
    }

    /// The label vocabulary.
    pub fn vocabulary(&self) -> &LabelVocabulary<HeadingLevel> {
        &self.vocabulary
    }

    /// Assign a level to every heading vector.
    ///
    /// An empty input is a no-op: the model is not consulted.
    pub fn levels(&self, headings: &[FeatureVector]) -> Result<Vec<HeadingLevel>> {
        if headings.is_empty() {
            return Ok(Vec::new());
        }

        let distributions = self.model.classify(headings)?;
        self.vocabulary.decide_all(&distributions, headings.len())
    }
}

impl std::fmt::Debug for LevelClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelClassifier")
            .field("vocabulary", &self.vocabulary)
            .finish_non_exhaustive()
    }
}
