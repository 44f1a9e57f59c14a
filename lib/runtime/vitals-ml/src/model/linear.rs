use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Multinomial logistic regression: `softmax(W·x + b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxRegression {
    pub feature_names: Vec<String>,
    /// One row per class, one column per feature.
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    /// Value substituted for a missing (NaN) feature; zero when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_values: Option<Vec<f64>>,
}

impl SoftmaxRegression {
    pub fn validate(&self) -> Result<(), ModelError> {
        let width = self.feature_names.len();
        if width == 0 {
            return Err(ModelError::NoFeatures);
        }
        if self.intercepts.is_empty() {
            return Err(ModelError::NoClasses);
        }
        if self.coefficients.len() != self.intercepts.len() {
            return Err(ModelError::DimensionMismatch {
                what: "coefficient rows".to_string(),
                expected: self.intercepts.len(),
                actual: self.coefficients.len(),
            });
        }
        if let Some((row, values)) = self
            .coefficients
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != width)
        {
            return Err(ModelError::DimensionMismatch {
                what: format!("coefficient row {row}"),
                expected: width,
                actual: values.len(),
            });
        }
        if let Some(missing) = &self.missing_values {
            if missing.len() != width {
                return Err(ModelError::DimensionMismatch {
                    what: "missing_values".to_string(),
                    expected: width,
                    actual: missing.len(),
                });
            }
        }
        let all_finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .chain(self.missing_values.iter().flatten())
            .all(|value| value.is_finite());
        if !all_finite {
            return Err(ModelError::NonFinite {
                parameter: "softmax regression parameter".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn margins(&self, features: ArrayView1<'_, f64>) -> Array1<f64> {
        let imputed: Array1<f64> = features
            .iter()
            .enumerate()
            .map(|(column, value)| {
                if value.is_nan() {
                    self.missing_values
                        .as_ref()
                        .and_then(|missing| missing.get(column).copied())
                        .unwrap_or(0.0)
                } else {
                    *value
                }
            })
            .collect();

        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| ArrayView1::from(row.as_slice()).dot(&imputed) + intercept)
            .collect()
    }
}
