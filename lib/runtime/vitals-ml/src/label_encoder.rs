use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Training-time category vocabulary: class `i` is encoded as `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLabelEncoder", into = "RawLabelEncoder")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Result<Self, LabelEncoderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(LabelEncoderError::Empty);
        }
        let mut index = HashMap::with_capacity(classes.len());
        for (position, class) in classes.iter().enumerate() {
            if index.insert(class.clone(), position).is_some() {
                return Err(LabelEncoderError::Duplicate(class.clone()));
            }
        }
        Ok(Self { classes, index })
    }

    /// Encoded index of `value`, or `None` when it was never seen in training.
    pub fn transform(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelEncoderError {
    #[error("encoder has no classes")]
    Empty,

    #[error("class `{0}` appears twice")]
    Duplicate(String),
}

/// Exported vocabularies may hold numeric classes (e.g. the 1-10 stress scale).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ClassLabel {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<ClassLabel> for String {
    fn from(label: ClassLabel) -> Self {
        match label {
            ClassLabel::Integer(value) => value.to_string(),
            ClassLabel::Float(value) => value.to_string(),
            ClassLabel::Text(value) => value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLabelEncoder {
    classes: Vec<ClassLabel>,
}

impl TryFrom<RawLabelEncoder> for LabelEncoder {
    type Error = LabelEncoderError;

    fn try_from(raw: RawLabelEncoder) -> Result<Self, Self::Error> {
        LabelEncoder::new(raw.classes.into_iter().map(String::from))
    }
}

impl From<LabelEncoder> for RawLabelEncoder {
    fn from(encoder: LabelEncoder) -> Self {
        Self {
            classes: encoder.classes.into_iter().map(ClassLabel::Text).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_uses_training_positions() {
        let encoder = LabelEncoder::new(["Female", "Male"]).unwrap();
        assert_eq!(encoder.transform("Female"), Some(0));
        assert_eq!(encoder.transform("Male"), Some(1));
        assert_eq!(encoder.transform("male"), None);
        assert_eq!(encoder.inverse_transform(1), Some("Male"));
        assert_eq!(encoder.inverse_transform(2), None);
    }

    #[test]
    fn test_numeric_classes_render_as_text() {
        let encoder: LabelEncoder =
            serde_json::from_str(r#"{"classes": [3, 4, 5.5, "8"]}"#).unwrap();
        assert_eq!(encoder.classes(), ["3", "4", "5.5", "8"]);
        assert_eq!(encoder.transform("4"), Some(1));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_vocabularies() {
        assert_eq!(LabelEncoder::new(Vec::<String>::new()), Err(LabelEncoderError::Empty));
        assert!(serde_json::from_str::<LabelEncoder>(r#"{"classes": []}"#).is_err());
        let err = serde_json::from_str::<LabelEncoder>(r#"{"classes": ["Normal", "Normal"]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_serializes_back_to_classes_list() {
        let encoder = LabelEncoder::new(["Low", "High"]).unwrap();
        let json = serde_json::to_value(&encoder).unwrap();
        assert_eq!(json, serde_json::json!({"classes": ["Low", "High"]}));
    }
}
