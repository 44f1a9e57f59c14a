//! Classifier formats understood at serving time.
//!
//! Both formats are plain JSON exported by the training job and evaluated
//! here without any native runtime. Evaluation is deterministic.

mod linear;
mod trees;

pub use linear::SoftmaxRegression;
pub use trees::{RegressionTree, TreeEnsemble, TreeNode};

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    GradientBoostedTrees(TreeEnsemble),
    SoftmaxRegression(SoftmaxRegression),
}

/// An exported classifier that cannot be evaluated safely.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed classifier: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("feature_names is empty")]
    NoFeatures,

    #[error("model has no classes")]
    NoClasses,

    #[error("ensemble has no trees")]
    NoTrees,

    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },

    #[error("tree {tree} node {node}: child {child} is not a forward link")]
    BackwardLink {
        tree: usize,
        node: usize,
        child: usize,
    },

    #[error("tree {tree} node {node}: split feature {feature} out of {features}")]
    UnknownFeature {
        tree: usize,
        node: usize,
        feature: usize,
        features: usize,
    },

    #[error("tree {tree}: class {class} exceeds num_class {num_class}")]
    UnknownClass {
        tree: usize,
        class: usize,
        num_class: usize,
    },

    #[error("{parameter} is not finite")]
    NonFinite { parameter: String },

    #[error("{what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
}

/// The feature vector does not have the width the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl Classifier {
    /// Parse and structurally validate an exported classifier.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let classifier: Classifier = serde_json::from_slice(bytes)?;
        classifier.validate()?;
        Ok(classifier)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Classifier::GradientBoostedTrees(model) => model.validate(),
            Classifier::SoftmaxRegression(model) => model.validate(),
        }
    }

    /// Ordered feature column names the classifier was trained on.
    pub fn feature_names(&self) -> &[String] {
        match self {
            Classifier::GradientBoostedTrees(model) => &model.feature_names,
            Classifier::SoftmaxRegression(model) => &model.feature_names,
        }
    }

    pub fn num_features(&self) -> usize {
        self.feature_names().len()
    }

    pub fn num_classes(&self) -> usize {
        match self {
            Classifier::GradientBoostedTrees(model) => model.num_class,
            Classifier::SoftmaxRegression(model) => model.intercepts.len(),
        }
    }

    /// Class probability distribution for one feature vector. Missing values
    /// are encoded as NaN.
    pub fn predict_proba(
        &self,
        features: ArrayView1<'_, f64>,
    ) -> Result<Array1<f64>, ShapeMismatch> {
        let expected = self.num_features();
        if features.len() != expected {
            return Err(ShapeMismatch {
                expected,
                actual: features.len(),
            });
        }
        let margins = match self {
            Classifier::GradientBoostedTrees(model) => model.margins(features),
            Classifier::SoftmaxRegression(model) => model.margins(features),
        };
        Ok(softmax(margins))
    }
}

fn softmax(margins: Array1<f64>) -> Array1<f64> {
    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp = margins.mapv(|margin| (margin - max).exp());
    let total = exp.sum();
    exp / total
}
