//! The process-wide pair of loaded classifiers.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::{BlockClassifier, LabelVocabulary, LevelClassifier, SoftmaxModel};

/// Block model file name inside a model directory.
pub const BLOCK_MODEL_FILE: &str = "block_model.json";
/// Block label vocabulary file name.
pub const BLOCK_LABELS_FILE: &str = "block_labels.json";
/// Level model file name.
pub const LEVEL_MODEL_FILE: &str = "level_model.json";
/// Level label vocabulary file name.
pub const LEVEL_LABELS_FILE: &str = "level_labels.json";

/// Both classifiers needed by the pipeline.
///
/// Built once at startup and shared by reference; nothing in it is mutated
/// afterwards, so one instance serves any number of concurrent documents.
#[derive(Debug, Clone)]
pub struct Models {
    block: BlockClassifier,
    level: LevelClassifier,
}

impl Models {
    /// Assemble from already constructed classifiers.
    pub fn new(block: BlockClassifier, level: LevelClassifier) -> Self {
        Self { block, level }
    }

    /// Load all four artifacts from a model directory.
    ///
    /// Loading is all-or-nothing: the first missing or malformed artifact
    /// fails the whole call with [`Error::ModelLoad`].
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let block_model = SoftmaxModel::load(dir.join(BLOCK_MODEL_FILE))?;
        let block_names = read_label_names(&dir.join(BLOCK_LABELS_FILE))?;
        let block_vocab = LabelVocabulary::from_block_names(&block_names)
            .map_err(|e| Error::model_load(dir.join(BLOCK_LABELS_FILE), e.to_string()))?;
        check_shape(
            &dir.join(BLOCK_MODEL_FILE),
            block_model.class_count(),
            block_vocab.len(),
        )?;

        let level_model = SoftmaxModel::load(dir.join(LEVEL_MODEL_FILE))?;
        let level_names = read_label_names(&dir.join(LEVEL_LABELS_FILE))?;
        let level_vocab = LabelVocabulary::from_level_names(&level_names)
            .map_err(|e| Error::model_load(dir.join(LEVEL_LABELS_FILE), e.to_string()))?;
        check_shape(
            &dir.join(LEVEL_MODEL_FILE),
            level_model.class_count(),
            level_vocab.len(),
        )?;

        log::info!(
            "Loaded models from {} (block classes: {:?}, level classes: {:?})",
            dir.display(),
            block_vocab.labels(),
            level_vocab.labels()
        );

        Ok(Self {
            block: BlockClassifier::new(Arc::new(block_model), block_vocab),
            level: LevelClassifier::new(Arc::new(level_model), level_vocab),
        })
    }

    /// The block classifier.
    pub fn block(&self) -> &BlockClassifier {
        &self.block
    }

    /// The level classifier.
    pub fn level(&self) -> &LevelClassifier {
        &self.level
    }
}

/// Read a JSON array of label names.
fn read_label_names(path: &Path) -> Result<Vec<String>> {
    let json = fs::read_to_string(path).map_err(|e| Error::model_load(path, e.to_string()))?;
    serde_json::from_str(&json)
        .map_err(|e| Error::model_load(path, format!("expected a JSON array of labels: {}", e)))
}

fn check_shape(path: &Path, classes: usize, labels: usize) -> Result<()> {
    if classes != labels {
        return Err(Error::model_load(
            path,
            format!(
                "model scores {} classes but its vocabulary names {}",
                classes, labels
            ),
        ));
    }
    Ok(())
}
