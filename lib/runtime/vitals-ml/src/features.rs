//! Projection of a validated metric record onto a model's feature columns.

use ndarray::Array1;

use vitals_domain::{EncodingError, MetricRecord, PredictionDomain};

use crate::bundle::ModelArtifactBundle;

/// A model input column, named exactly as in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Gender,
    Age,
    SleepDuration,
    QualityOfSleep,
    PhysicalActivityLevel,
    StressLevel,
    BmiCategory,
    SystolicBp,
    DiastolicBp,
    HeartRate,
    DailySteps,
}

pub const STRESS_FEATURES: [Feature; 10] = [
    Feature::Gender,
    Feature::Age,
    Feature::SleepDuration,
    Feature::QualityOfSleep,
    Feature::PhysicalActivityLevel,
    Feature::BmiCategory,
    Feature::SystolicBp,
    Feature::DiastolicBp,
    Feature::HeartRate,
    Feature::DailySteps,
];

/// Same columns as the stress model plus the reported stress level, placed
/// before `bmi_category`.
pub const HEALTH_RISK_FEATURES: [Feature; 11] = [
    Feature::Gender,
    Feature::Age,
    Feature::SleepDuration,
    Feature::QualityOfSleep,
    Feature::PhysicalActivityLevel,
    Feature::StressLevel,
    Feature::BmiCategory,
    Feature::SystolicBp,
    Feature::DiastolicBp,
    Feature::HeartRate,
    Feature::DailySteps,
];

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Gender => "gender",
            Feature::Age => "age",
            Feature::SleepDuration => "sleep_duration",
            Feature::QualityOfSleep => "quality_of_sleep",
            Feature::PhysicalActivityLevel => "physical_activity_level",
            Feature::StressLevel => "stress_level",
            Feature::BmiCategory => "bmi_category",
            Feature::SystolicBp => "systolic_bp",
            Feature::DiastolicBp => "diastolic_bp",
            Feature::HeartRate => "heart_rate",
            Feature::DailySteps => "daily_steps",
        }
    }

    pub fn columns(domain: PredictionDomain) -> &'static [Feature] {
        match domain {
            PredictionDomain::Stress => &STRESS_FEATURES,
            PredictionDomain::HealthRisk => &HEALTH_RISK_FEATURES,
        }
    }
}

pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Encode `record` for `bundle`'s model.
    ///
    /// The model's declared columns are checked against the domain layout
    /// first; a wrong width or order would otherwise score silently. The
    /// health-risk domain reads `stress_level` from the record itself and
    /// passes NaN when it is absent.
    pub fn encode(
        record: &MetricRecord,
        bundle: &ModelArtifactBundle,
    ) -> Result<Array1<f64>, EncodingError> {
        let domain = bundle.domain;
        let columns = Feature::columns(domain);
        Self::check_columns(domain, columns, bundle.model.feature_names())?;

        columns
            .iter()
            .map(|feature| Self::value(record, bundle, *feature))
            .collect::<Result<Vec<f64>, _>>()
            .map(Array1::from)
    }

    fn check_columns(
        domain: PredictionDomain,
        columns: &[Feature],
        declared: &[String],
    ) -> Result<(), EncodingError> {
        if declared.len() != columns.len() {
            return Err(EncodingError::FeatureCountMismatch {
                domain,
                expected: declared.len(),
                actual: columns.len(),
            });
        }
        for (index, (feature, expected)) in columns.iter().zip(declared).enumerate() {
            if feature.name() != expected {
                return Err(EncodingError::FeatureNameMismatch {
                    domain,
                    index,
                    expected: expected.clone(),
                    actual: feature.name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn value(
        record: &MetricRecord,
        bundle: &ModelArtifactBundle,
        feature: Feature,
    ) -> Result<f64, EncodingError> {
        let value = match feature {
            Feature::Gender => {
                Self::categorical(bundle, feature, &bundle.gender_encoder, record.gender.as_str())?
            }
            Feature::BmiCategory => Self::categorical(
                bundle,
                feature,
                &bundle.bmi_encoder,
                record.bmi_category.as_str(),
            )?,
            Feature::Age => record.age as f64,
            Feature::SleepDuration => record.sleep_duration,
            Feature::QualityOfSleep => record.quality_of_sleep as f64,
            Feature::PhysicalActivityLevel => record.physical_activity_level as f64,
            Feature::StressLevel => record.stress_level.map_or(f64::NAN, |level| level as f64),
            Feature::SystolicBp => record.systolic_bp as f64,
            Feature::DiastolicBp => record.diastolic_bp as f64,
            Feature::HeartRate => record.heart_rate as f64,
            Feature::DailySteps => record.daily_steps as f64,
        };
        Ok(value)
    }

    fn categorical(
        bundle: &ModelArtifactBundle,
        feature: Feature,
        encoder: &crate::label_encoder::LabelEncoder,
        value: &str,
    ) -> Result<f64, EncodingError> {
        encoder
            .transform(value)
            .map(|index| index as f64)
            .ok_or_else(|| EncodingError::UnseenCategory {
                domain: bundle.domain,
                field: feature.name(),
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_stress_vector_excludes_stress_level() {
        let record = fixtures::sample_record();
        let bundle = fixtures::stress_bundle();
        let vector = FeatureEncoder::encode(&record, &bundle).unwrap();

        assert_eq!(vector.len(), 10);
        // Female -> 0, Normal -> 1 in the fixture vocabularies.
        assert_eq!(
            vector.to_vec(),
            vec![0.0, 34.0, 6.5, 7.0, 40.0, 1.0, 118.0, 76.0, 72.0, 6000.0]
        );
    }

    #[test]
    fn test_health_vector_places_stress_level_before_bmi() {
        let record = fixtures::sample_record();
        let bundle = fixtures::health_risk_bundle();
        let vector = FeatureEncoder::encode(&record, &bundle).unwrap();

        assert_eq!(vector.len(), 11);
        assert_eq!(vector[5], 8.0);
        assert_eq!(vector[6], 1.0);
    }

    #[test]
    fn test_absent_stress_level_is_missing() {
        let mut record = fixtures::sample_record();
        record.stress_level = None;
        let vector = FeatureEncoder::encode(&record, &fixtures::health_risk_bundle()).unwrap();
        assert!(vector[5].is_nan());
    }

    #[test]
    fn test_unseen_category_is_an_error() {
        let mut record = fixtures::sample_record();
        record.bmi_category = vitals_domain::BmiCategory::Underweight;
        let mut bundle = fixtures::health_risk_bundle();
        bundle.bmi_encoder =
            crate::LabelEncoder::new(["Normal", "Obese", "Overweight"]).unwrap();

        match FeatureEncoder::encode(&record, &bundle) {
            Err(EncodingError::UnseenCategory { field, value, .. }) => {
                assert_eq!(field, "bmi_category");
                assert_eq!(value, "Underweight");
            }
            other => panic!("expected unseen category, got {other:?}"),
        }
    }

    #[test]
    fn test_column_count_mismatch_is_detected() {
        let record = fixtures::sample_record();
        // A stress-shaped model loaded into the health-risk slot.
        let mut bundle = fixtures::health_risk_bundle();
        bundle.model = fixtures::stress_bundle().model;

        match FeatureEncoder::encode(&record, &bundle) {
            Err(EncodingError::FeatureCountMismatch { expected, actual, .. }) => {
                assert_eq!(expected, 10);
                assert_eq!(actual, 11);
            }
            other => panic!("expected count mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_column_order_mismatch_is_detected() {
        let record = fixtures::sample_record();
        let mut bundle = fixtures::stress_bundle();
        if let crate::Classifier::GradientBoostedTrees(model) = &mut bundle.model {
            model.feature_names.swap(0, 1);
        }

        match FeatureEncoder::encode(&record, &bundle) {
            Err(EncodingError::FeatureNameMismatch { index, expected, actual, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(expected, "age");
                assert_eq!(actual, "gender");
            }
            other => panic!("expected order mismatch, got {other:?}"),
        }
    }
}
