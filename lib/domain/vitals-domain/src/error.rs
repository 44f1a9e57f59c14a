//! Error taxonomy of the processing pipeline.
//!
//! [`ArtifactError`] is fatal at startup. [`ValidationError`], [`EncodingError`]
//! and [`InferenceError`] are per-message and leave the offset uncommitted.
//! [`PublishError`] is logged and never blocks the commit.

use std::path::PathBuf;

use thiserror::Error;

use crate::prediction::PredictionDomain;

/// A model or encoder artifact could not be made resident.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("missing artifact {}: {source}", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt artifact {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("inconsistent {domain} bundle: {reason}")]
    Inconsistent {
        domain: PredictionDomain,
        reason: String,
    },
}

/// The inbound payload does not match the metric record schema.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("field `{field}` = {value} is outside {bounds}")]
    OutOfRange {
        field: &'static str,
        value: String,
        bounds: String,
    },
}

/// A validated record could not be projected onto a model's feature columns.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("{domain}: `{field}` value `{value}` is not in the training vocabulary")]
    UnseenCategory {
        domain: PredictionDomain,
        field: &'static str,
        value: String,
    },

    #[error("{domain}: model declares {expected} feature columns, encoder produces {actual}")]
    FeatureCountMismatch {
        domain: PredictionDomain,
        expected: usize,
        actual: usize,
    },

    #[error("{domain}: column {index} is `{expected}` in the model but `{actual}` in the encoder")]
    FeatureNameMismatch {
        domain: PredictionDomain,
        index: usize,
        expected: String,
        actual: String,
    },
}

/// The classifier rejected the input or produced an unusable output.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{domain}: model expects {expected} features, got {actual}")]
    ShapeMismatch {
        domain: PredictionDomain,
        expected: usize,
        actual: usize,
    },

    #[error("{domain}: model produced no usable class probabilities")]
    InvalidDistribution { domain: PredictionDomain },

    #[error("{domain}: class index {index} is outside the target vocabulary of {classes}")]
    UnknownClass {
        domain: PredictionDomain,
        index: usize,
        classes: usize,
    },

    #[error("{domain}: label `{label}` is not a numeric score")]
    NonNumericLabel {
        domain: PredictionDomain,
        label: String,
    },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize insight: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to enqueue insight on {topic}: {reason}")]
    Enqueue { topic: String, reason: String },
}

/// Per-message failure: the message is logged and left unacknowledged.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl MessageError {
    pub fn kind(&self) -> &'static str {
        match self {
            MessageError::Validation(_) => "validation",
            MessageError::Encoding(_) => "encoding",
            MessageError::Inference(_) => "inference",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_names_path() {
        let err = ArtifactError::Missing {
            path: PathBuf::from("models/stress/model.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "missing artifact models/stress/model.json: no such file"
        );
    }

    #[test]
    fn test_corrupt_artifact_keeps_its_cause() {
        let cause = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ArtifactError::Corrupt {
            path: PathBuf::from("models/stress/gender.json"),
            source: Box::new(cause),
        };
        assert!(err.to_string().starts_with("corrupt artifact models/stress/gender.json: "));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_unseen_category_display() {
        let err = EncodingError::UnseenCategory {
            domain: PredictionDomain::HealthRisk,
            field: "bmi_category",
            value: "Obese".into(),
        };
        assert_eq!(
            err.to_string(),
            "health_risk: `bmi_category` value `Obese` is not in the training vocabulary"
        );
    }

    #[test]
    fn test_message_error_kind() {
        let err = MessageError::from(InferenceError::InvalidDistribution {
            domain: PredictionDomain::Stress,
        });
        assert_eq!(err.kind(), "inference");
        assert_eq!(
            err.to_string(),
            "stress: model produced no usable class probabilities"
        );

        let err = MessageError::from(ValidationError::OutOfRange {
            field: "age",
            value: "130".into(),
            bounds: "[0, 120]".into(),
        });
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.to_string(), "field `age` = 130 is outside [0, 120]");
    }
}
