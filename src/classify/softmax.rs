//! Multinomial softmax model over the four layout features.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};

use super::Classifier;

/// A linear softmax classifier stored as JSON.
///
/// `weights[k]` and `bias[k]` score class `k`. When `mean` and `scale` are
/// present, each feature is standardized as `(x - mean) / scale` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxModel {
    /// Per-class feature weights
    pub weights: Vec<[f32; FEATURE_COUNT]>,

    /// Per-class intercepts
    pub bias: Vec<f32>,

    /// Feature means for standardization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<[f32; FEATURE_COUNT]>,

    /// Feature scales for standardization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; FEATURE_COUNT]>,
}

impl SoftmaxModel {
    /// Create a model without standardization.
    pub fn new(weights: Vec<[f32; FEATURE_COUNT]>, bias: Vec<f32>) -> Result<Self> {
        let model = Self {
            weights,
            bias,
            mean: None,
            scale: None,
        };
        model.validate().map_err(Error::InvalidInput)?;
        Ok(model)
    }

    /// Add feature standardization.
    pub fn with_standardization(
        mut self,
        mean: [f32; FEATURE_COUNT],
        scale: [f32; FEATURE_COUNT],
    ) -> Result<Self> {
        self.mean = Some(mean);
        self.scale = Some(scale);
        self.validate().map_err(Error::InvalidInput)?;
        Ok(self)
    }

    /// Parse a model from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: SoftmaxModel = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("invalid model JSON: {}", e)))?;
        model.validate().map_err(Error::InvalidInput)?;
        Ok(model)
    }

    /// Load a model file. Any failure is a [`Error::ModelLoad`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| Error::model_load(path, e.to_string()))?;
        Self::from_json(&json).map_err(|e| Error::model_load(path, e.to_string()))
    }

    /// Number of classes the model scores.
    pub fn class_count(&self) -> usize {
        self.weights.len()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.weights.is_empty() {
            return Err("model has no classes".to_string());
        }
        if self.bias.len() != self.weights.len() {
            return Err(format!(
                "model has {} weight rows but {} biases",
                self.weights.len(),
                self.bias.len()
            ));
        }
        if self.mean.is_some() != self.scale.is_some() {
            return Err("mean and scale must be given together".to_string());
        }
        if let Some(scale) = &self.scale {
            if scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err("scale entries must be finite and non-zero".to_string());
            }
        }
        let finite = self.weights.iter().flatten().chain(&self.bias).all(|v| v.is_finite());
        if !finite {
            return Err("model parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Class probabilities for one feature vector.
    pub fn probabilities(&self, features: &FeatureVector) -> Vec<f32> {
        let mut x = features.to_array();
        if let (Some(mean), Some(scale)) = (&self.mean, &self.scale) {
            for i in 0..FEATURE_COUNT {
                x[i] = (x[i] - mean[i]) / scale[i];
            }
        }

        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| w.iter().zip(&x).map(|(wi, xi)| wi * xi).sum::<f32>() + b)
            .collect();

        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exps.iter().sum();
        exps.into_iter().map(|e| e / total).collect()
    }
}

impl Classifier for SoftmaxModel {
    fn classify(&self, features: &[FeatureVector]) -> Result<Vec<Vec<f32>>> {
        Ok(features.iter().map(|f| self.probabilities(f)).collect())
    }
}
