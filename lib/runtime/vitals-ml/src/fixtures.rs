//! Small deterministic artifacts for tests.
//!
//! The stress model keys on `quality_of_sleep` (threshold 6.5) and the
//! health-risk model keys on `stress_level` (threshold 7.5, missing goes
//! below). [`sample_record`] scores as stress `"3"` and health risk `"High"`.

use std::path::Path;

use vitals_domain::{ArtifactsConfig, BmiCategory, Gender, MetricRecord, PredictionDomain};

use crate::bundle::ModelArtifactBundle;
use crate::features::Feature;
use crate::label_encoder::LabelEncoder;
use crate::model::{Classifier, RegressionTree, TreeEnsemble, TreeNode};
use crate::registry::ArtifactSet;

pub const GENDER_CLASSES: [&str; 2] = ["Female", "Male"];
pub const BMI_CLASSES: [&str; 4] = ["Underweight", "Normal", "Overweight", "Obese"];
pub const STRESS_CLASSES: [&str; 3] = ["3", "5", "8"];
pub const HEALTH_RISK_CLASSES: [&str; 3] = ["High", "Low", "Medium"];

pub fn sample_record() -> MetricRecord {
    MetricRecord {
        gender: Gender::Female,
        age: 34,
        sleep_duration: 6.5,
        quality_of_sleep: 7,
        physical_activity_level: 40,
        stress_level: Some(8),
        bmi_category: BmiCategory::Normal,
        systolic_bp: 118,
        diastolic_bp: 76,
        heart_rate: 72,
        daily_steps: 6000,
    }
}

/// JSON payload equivalent to [`sample_record`].
pub fn sample_payload() -> Vec<u8> {
    serde_json::json!({
        "gender": "Female",
        "age": 34,
        "sleep_duration": 6.5,
        "quality_of_sleep": 7,
        "physical_activity_level": 40,
        "stress_level": 8,
        "bmi_category": "Normal",
        "systolic_bp": 118,
        "diastolic_bp": 76,
        "heart_rate": 72,
        "daily_steps": 6000
    })
    .to_string()
    .into_bytes()
}

fn stump(feature: usize, threshold: f64, below: f64, above: f64) -> RegressionTree {
    RegressionTree {
        class: None,
        nodes: vec![
            TreeNode::Split {
                split: feature,
                split_condition: threshold,
                yes: 1,
                no: 2,
                missing: 1,
            },
            TreeNode::Leaf { leaf: below },
            TreeNode::Leaf { leaf: above },
        ],
    }
}

fn leaf(value: f64) -> RegressionTree {
    RegressionTree {
        class: None,
        nodes: vec![TreeNode::Leaf { leaf: value }],
    }
}

fn column_names(domain: PredictionDomain) -> Vec<String> {
    Feature::columns(domain)
        .iter()
        .map(|feature| feature.name().to_string())
        .collect()
}

pub fn stress_model() -> Classifier {
    // quality_of_sleep is column 3
    Classifier::GradientBoostedTrees(TreeEnsemble {
        feature_names: column_names(PredictionDomain::Stress),
        num_class: 3,
        base_score: 0.5,
        trees: vec![stump(3, 6.5, -1.0, 2.0), leaf(0.0), stump(3, 6.5, 2.0, -1.0)],
    })
}

pub fn health_risk_model() -> Classifier {
    // stress_level is column 5
    Classifier::GradientBoostedTrees(TreeEnsemble {
        feature_names: column_names(PredictionDomain::HealthRisk),
        num_class: 3,
        base_score: 0.5,
        trees: vec![stump(5, 7.5, -1.0, 2.5), stump(5, 7.5, 2.0, -1.0), leaf(0.0)],
    })
}

fn encoder<const N: usize>(classes: [&str; N]) -> LabelEncoder {
    LabelEncoder::new(classes).unwrap_or_else(|err| panic!("fixture encoder: {err}"))
}

pub fn stress_bundle() -> ModelArtifactBundle {
    ModelArtifactBundle::new(
        PredictionDomain::Stress,
        stress_model(),
        encoder(GENDER_CLASSES),
        encoder(BMI_CLASSES),
        encoder(STRESS_CLASSES),
    )
    .unwrap_or_else(|err| panic!("fixture stress bundle: {err}"))
}

pub fn health_risk_bundle() -> ModelArtifactBundle {
    ModelArtifactBundle::new(
        PredictionDomain::HealthRisk,
        health_risk_model(),
        encoder(GENDER_CLASSES),
        encoder(BMI_CLASSES),
        encoder(HEALTH_RISK_CLASSES),
    )
    .unwrap_or_else(|err| panic!("fixture health-risk bundle: {err}"))
}

pub fn artifact_set() -> ArtifactSet {
    ArtifactSet::new(stress_bundle(), health_risk_bundle())
}

/// Write the fixture artifacts under `root` in the standard layout.
pub fn write_artifacts(root: &Path) -> std::io::Result<ArtifactsConfig> {
    let paths = ArtifactsConfig::under(root);
    for (domain, bundle) in [
        (PredictionDomain::Stress, stress_bundle()),
        (PredictionDomain::HealthRisk, health_risk_bundle()),
    ] {
        let files = paths.for_domain(domain);
        write_json(&files.model, &bundle.model)?;
        write_json(&files.gender_encoder, &bundle.gender_encoder)?;
        write_json(&files.bmi_encoder, &bundle.bmi_encoder)?;
        write_json(&files.target_encoder, &bundle.target_encoder)?;
    }
    Ok(paths)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
    std::fs::write(path, bytes)
}
