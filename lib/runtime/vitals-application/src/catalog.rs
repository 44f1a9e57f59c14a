//! Static advice text per domain and category.

use vitals_domain::PredictionDomain;

use crate::categories::{HealthRiskCategory, StressCategory};

const STRESS_LOW: &[&str] = &[
    "Keep up the good work maintaining low stress.",
    "Continue your healthy habits.",
];
const STRESS_MODERATE: &[&str] = &[
    "Try short mindfulness or meditation sessions daily.",
    "Take breaks during work to reduce stress.",
];
const STRESS_HIGH: &[&str] = &[
    "Consider seeing a professional counselor or therapist.",
    "Focus on sleep quality and relaxation exercises.",
    "Reduce caffeine and alcohol intake.",
];

const HEALTH_LOW: &[&str] = &[
    "Maintain your current healthy habits.",
    "Regular checkups recommended.",
];
const HEALTH_MEDIUM: &[&str] = &[
    "Consider lifestyle changes to improve diet and activity.",
    "Monitor your vital signs regularly.",
];
const HEALTH_HIGH: &[&str] = &[
    "Consult a healthcare professional for a full assessment.",
    "Take urgent actions to improve sleep, diet, and physical activity.",
];
const HEALTH_CRITICAL: &[&str] = &[
    "Immediate medical attention required!",
    "Prioritize urgent lifestyle changes and clinical interventions.",
];

pub struct RecommendationCatalog;

impl RecommendationCatalog {
    pub fn stress(category: StressCategory) -> &'static [&'static str] {
        match category {
            StressCategory::Low => STRESS_LOW,
            StressCategory::Moderate => STRESS_MODERATE,
            StressCategory::High => STRESS_HIGH,
        }
    }

    pub fn health_risk(category: HealthRiskCategory) -> &'static [&'static str] {
        match category {
            HealthRiskCategory::Low => HEALTH_LOW,
            HealthRiskCategory::Medium => HEALTH_MEDIUM,
            HealthRiskCategory::High => HEALTH_HIGH,
            HealthRiskCategory::Critical => HEALTH_CRITICAL,
        }
    }

    /// Advice for a normalized category label. Labels outside the domain's
    /// canonical set have no advice and yield an empty slice.
    pub fn lookup(domain: PredictionDomain, category: &str) -> &'static [&'static str] {
        match domain {
            PredictionDomain::Stress => match category {
                "low" => Self::stress(StressCategory::Low),
                "moderate" => Self::stress(StressCategory::Moderate),
                "high" => Self::stress(StressCategory::High),
                _ => &[],
            },
            PredictionDomain::HealthRisk => HealthRiskCategory::parse(category)
                .map(Self::health_risk)
                .unwrap_or(&[]),
        }
    }
}
