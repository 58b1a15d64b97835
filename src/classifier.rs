use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Numeric features consumed by the quality model. Field naming and order
/// match the columns the model was trained on.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
    pub word_count: usize,
    pub sentence_count: usize,
    pub flesch_reading_ease: f64,
}

impl FeatureVector {
    fn as_row(&self) -> [f64; 3] {
        [
            self.word_count as f64,
            self.sentence_count as f64,
            self.flesch_reading_ease,
        ]
    }
}

/// Opaque categorical label emitted by a quality model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityLabel(pub String);

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An already-trained content-quality predictor.
///
/// Implementations are pure and side-effect free; the pipeline never retrains
/// or mutates them. Alternate backends slot in without touching the pipeline.
pub trait QualityModel {
    fn predict(&self, features: &FeatureVector) -> Result<QualityLabel>;
}

/// Linear scorer over the three features, one coefficient row and bias per
/// class; predicts the argmax class. Weights are exported by the offline
/// training job as JSON.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinearModel {
    classes: Vec<String>,
    weights: Vec<[f64; 3]>,
    bias: Vec<f64>,
}

impl LinearModel {
    /// Load and shape-check a model export. Failures here are hard errors:
    /// analysis must not run with a missing or mis-shaped model.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading quality model {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("loading quality model {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let model: LinearModel = serde_json::from_str(raw)?;
        if model.classes.is_empty() {
            bail!("model defines no classes");
        }
        if model.weights.len() != model.classes.len() || model.bias.len() != model.classes.len() {
            bail!(
                "model shape mismatch: {} classes, {} weight rows, {} biases",
                model.classes.len(),
                model.weights.len(),
                model.bias.len()
            );
        }
        Ok(model)
    }
}

impl QualityModel for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<QualityLabel> {
        let x = features.as_row();
        let mut best: Option<(usize, f64)> = None;
        for (i, (w, b)) in self.weights.iter().zip(&self.bias).enumerate() {
            let score = w[0] * x[0] + w[1] * x[1] + w[2] * x[2] + b;
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        let (i, _) = best.context("model has no classes")?;
        Ok(QualityLabel(self.classes[i].clone()))
    }
}

// ── Tests ──
