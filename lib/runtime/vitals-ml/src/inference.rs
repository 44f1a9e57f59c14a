use ndarray::ArrayView1;

use vitals_domain::{InferenceError, PredictionResult};

use crate::bundle::ModelArtifactBundle;

pub struct InferenceEngine;

impl InferenceEngine {
    /// Most probable class label and its probability.
    ///
    /// Ties resolve to the lowest class index so repeated calls agree.
    pub fn predict(
        features: ArrayView1<'_, f64>,
        bundle: &ModelArtifactBundle,
    ) -> Result<PredictionResult, InferenceError> {
        let domain = bundle.domain;
        let probabilities = bundle.model.predict_proba(features).map_err(|shape| {
            InferenceError::ShapeMismatch {
                domain,
                expected: shape.expected,
                actual: shape.actual,
            }
        })?;

        let mut best: Option<(usize, f64)> = None;
        for (index, probability) in probabilities.iter().copied().enumerate() {
            if !probability.is_finite() {
                return Err(InferenceError::InvalidDistribution { domain });
            }
            if best.is_none_or(|(_, top)| probability > top) {
                best = Some((index, probability));
            }
        }
        let (index, confidence) = best.ok_or(InferenceError::InvalidDistribution { domain })?;

        let category = bundle
            .target_encoder
            .inverse_transform(index)
            .ok_or(InferenceError::UnknownClass {
                domain,
                index,
                classes: bundle.target_encoder.len(),
            })?;

        Ok(PredictionResult {
            category: category.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureEncoder;
    use crate::fixtures;
    use crate::model::{Classifier, SoftmaxRegression};
    use crate::LabelEncoder;
    use ndarray::array;
    use vitals_domain::PredictionDomain;

    #[test]
    fn test_stress_fixture_predicts_low_scale_value() {
        let bundle = fixtures::stress_bundle();
        let features = FeatureEncoder::encode(&fixtures::sample_record(), &bundle).unwrap();
        let result = InferenceEngine::predict(features.view(), &bundle).unwrap();

        assert_eq!(result.category, "3");
        assert!((result.confidence - 0.843_794).abs() < 1e-6);
    }

    #[test]
    fn test_health_fixture_uses_reported_stress_level() {
        let bundle = fixtures::health_risk_bundle();
        let mut record = fixtures::sample_record();
        let features = FeatureEncoder::encode(&record, &bundle).unwrap();
        let result = InferenceEngine::predict(features.view(), &bundle).unwrap();
        assert_eq!(result.category, "High");
        assert!((result.confidence - 0.899_050).abs() < 1e-6);

        record.stress_level = None;
        let features = FeatureEncoder::encode(&record, &bundle).unwrap();
        let result = InferenceEngine::predict(features.view(), &bundle).unwrap();
        assert_eq!(result.category, "Low");
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let bundle = fixtures::health_risk_bundle();
        let features = FeatureEncoder::encode(&fixtures::sample_record(), &bundle).unwrap();
        let first = InferenceEngine::predict(features.view(), &bundle).unwrap();
        for _ in 0..10 {
            assert_eq!(InferenceEngine::predict(features.view(), &bundle).unwrap(), first);
        }
    }

    #[test]
    fn test_ties_resolve_to_first_class() {
        let model = Classifier::SoftmaxRegression(SoftmaxRegression {
            feature_names: vec!["x".into()],
            coefficients: vec![vec![0.0], vec![0.0]],
            intercepts: vec![0.0, 0.0],
            missing_values: None,
        });
        let bundle = crate::ModelArtifactBundle::new(
            PredictionDomain::Stress,
            model,
            LabelEncoder::new(["Female", "Male"]).unwrap(),
            LabelEncoder::new(["Normal"]).unwrap(),
            LabelEncoder::new(["4", "7"]).unwrap(),
        )
        .unwrap();
        let result = InferenceEngine::predict(array![1.0].view(), &bundle).unwrap();
        assert_eq!(result.category, "4");
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_wrong_width_is_an_inference_error() {
        let bundle = fixtures::stress_bundle();
        let err = InferenceEngine::predict(array![1.0, 2.0].view(), &bundle).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::ShapeMismatch { expected: 10, actual: 2, .. }
        ));
    }
}
