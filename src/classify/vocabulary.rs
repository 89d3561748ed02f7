//! Label vocabularies and the argmax decision rule.

use std::fmt;

use crate::error::{Error, Result};
use crate::model::{BlockLabel, HeadingLevel};

/// Raw label names and the block class each collapses into.
///
/// Dataset labels (title text, outline levels, body text) and the names a
/// block vocabulary artifact may use are all resolved through this table.
pub const BLOCK_LABEL_TABLE: &[(&str, BlockLabel)] = &[
    ("Title", BlockLabel::Title),
    ("title", BlockLabel::Title),
    ("Heading", BlockLabel::Heading),
    ("heading", BlockLabel::Heading),
    ("H1", BlockLabel::Heading),
    ("H2", BlockLabel::Heading),
    ("H3", BlockLabel::Heading),
    ("H4", BlockLabel::Heading),
    ("Other", BlockLabel::Other),
    ("other", BlockLabel::Other),
    ("body_text", BlockLabel::Other),
];

/// Collapse a raw label name into its block class.
pub fn collapse_block_label(raw: &str) -> Option<BlockLabel> {
    BLOCK_LABEL_TABLE
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, label)| *label)
}

/// Ordered label set of one classifier; position `i` names class index `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary<L> {
    labels: Vec<L>,
}

impl<L: Copy + PartialEq + fmt::Debug> LabelVocabulary<L> {
    /// Create a vocabulary. Labels must be non-empty and distinct.
    pub fn new(labels: Vec<L>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::InvalidInput("label vocabulary is empty".to_string()));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(Error::InvalidInput(format!(
                    "duplicate label {:?} in vocabulary",
                    label
                )));
            }
        }
        Ok(Self { labels })
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed vocabulary.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in class index order.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Pick the label with the highest probability.
    ///
    /// Ties go to the lowest class index and NaN entries never win.
    pub fn decide(&self, distribution: &[f32]) -> Result<L> {
        if distribution.len() != self.labels.len() {
            return Err(Error::Classification(format!(
                "distribution has {} classes, vocabulary has {}",
                distribution.len(),
                self.labels.len()
            )));
        }

        let mut best: Option<(usize, f32)> = None;
        for (i, &p) in distribution.iter().enumerate() {
            if p.is_nan() {
                continue;
            }
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((i, p)),
            }
        }

        let (index, _) = best.ok_or_else(|| {
            Error::Classification("distribution contains no usable probability".to_string())
        })?;
        Ok(self.labels[index])
    }

    /// Decide every distribution, checking there is one per input.
    pub fn decide_all(&self, distributions: &[Vec<f32>], expected: usize) -> Result<Vec<L>> {
        if distributions.len() != expected {
            return Err(Error::Classification(format!(
                "classifier returned {} distributions for {} inputs",
                distributions.len(),
                expected
            )));
        }
        distributions.iter().map(|d| self.decide(d)).collect()
    }
}

impl LabelVocabulary<BlockLabel> {
    /// Build a block vocabulary from raw label names.
    pub fn from_block_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let labels = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                collapse_block_label(name)
                    .ok_or_else(|| Error::InvalidInput(format!("unknown block label: {}", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(labels)
    }

    /// The inference-time block vocabulary in canonical order.
    pub fn block_default() -> Self {
        Self {
            labels: vec![BlockLabel::Title, BlockLabel::Heading, BlockLabel::Other],
        }
    }
}

impl LabelVocabulary<HeadingLevel> {
    /// Build a level vocabulary from label names ("H1", "H2", "H3").
    pub fn from_level_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let labels = names
            .iter()
            .map(|name| name.as_ref().parse::<HeadingLevel>())
            .collect::<Result<Vec<_>>>()?;
        Self::new(labels)
    }

    /// The level vocabulary in canonical order.
    pub fn level_default() -> Self {
        Self {
            labels: vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_table() {
        assert_eq!(collapse_block_label("title"), Some(BlockLabel::Title));
        assert_eq!(collapse_block_label("H4"), Some(BlockLabel::Heading));
        assert_eq!(collapse_block_label("heading"), Some(BlockLabel::Heading));
        assert_eq!(collapse_block_label("body_text"), Some(BlockLabel::Other));
        assert_eq!(collapse_block_label("H5"), None);
    }

    #[test]
    fn test_decide_argmax() {
        let vocab = LabelVocabulary::block_default();
        assert_eq!(vocab.decide(&[0.1, 0.7, 0.2]).unwrap(), BlockLabel::Heading);
        assert_eq!(vocab.decide(&[0.5, 0.2, 0.3]).unwrap(), BlockLabel::Title);
    }

    #[test]
    fn test_decide_tie_takes_lowest_index() {
        let vocab = LabelVocabulary::level_default();
        assert_eq!(vocab.decide(&[0.2, 0.4, 0.4]).unwrap(), HeadingLevel::H2);
    }

    #[test]
    fn test_decide_skips_nan() {
        let vocab = LabelVocabulary::level_default();
        assert_eq!(
            vocab.decide(&[f32::NAN, 0.1, 0.05]).unwrap(),
            HeadingLevel::H2
        );
        assert!(vocab.decide(&[f32::NAN, f32::NAN, f32::NAN]).is_err());
    }

    #[test]
    fn test_decide_length_mismatch() {
        let vocab = LabelVocabulary::block_default();
        assert!(matches!(
            vocab.decide(&[0.5, 0.5]),
            Err(Error::Classification(_))
        ));
        assert!(vocab.decide_all(&[vec![1.0, 0.0, 0.0]], 2).is_err());
    }

    #[test]
    fn test_vocabulary_order_comes_from_artifact() {
        let vocab = LabelVocabulary::from_block_names(&["Title", "heading", "other"]).unwrap();
        assert_eq!(vocab.labels(), LabelVocabulary::block_default().labels());

        let swapped = LabelVocabulary::from_block_names(&["other", "Title", "heading"]).unwrap();
        assert_eq!(swapped.decide(&[0.9, 0.05, 0.05]).unwrap(), BlockLabel::Other);
    }

    #[test]
    fn test_vocabulary_rejects_duplicates_and_unknowns() {
        assert!(LabelVocabulary::from_block_names(&["H1", "heading", "other"]).is_err());
        assert!(LabelVocabulary::from_block_names(&["caption"]).is_err());
        assert!(LabelVocabulary::from_level_names(&["H1", "H4"]).is_err());
        assert!(LabelVocabulary::<HeadingLevel>::new(vec![]).is_err());
    }
}
