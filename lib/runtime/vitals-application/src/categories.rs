//! Canonical category labels of both domains.

use std::fmt;

use vitals_domain::{InferenceError, PredictionDomain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StressCategory {
    Low,
    Moderate,
    High,
}

impl StressCategory {
    /// Bucket a score on the 1-10 stress scale: up to 4 is low, up to 6 is
    /// moderate, anything above is high.
    pub fn from_score(score: f64) -> Self {
        if score <= 4.0 {
            StressCategory::Low
        } else if score <= 6.0 {
            StressCategory::Moderate
        } else {
            StressCategory::High
        }
    }

    /// Bucket the stress model's decoded label.
    pub fn from_label(label: &str) -> Result<Self, InferenceError> {
        label
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|score| !score.is_nan())
            .map(Self::from_score)
            .ok_or_else(|| InferenceError::NonNumericLabel {
                domain: PredictionDomain::Stress,
                label: label.to_string(),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressCategory::Low => "low",
            StressCategory::Moderate => "moderate",
            StressCategory::High => "high",
        }
    }
}

impl fmt::Display for StressCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthRiskCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl HealthRiskCategory {
    /// Lower-case form of a health-risk label as published downstream.
    pub fn normalize(label: &str) -> String {
        label.trim().to_lowercase()
    }

    /// Recognize a normalized label; other labels have no catalog entry.
    pub fn parse(normalized: &str) -> Option<Self> {
        match normalized {
            "low" => Some(HealthRiskCategory::Low),
            "medium" => Some(HealthRiskCategory::Medium),
            "high" => Some(HealthRiskCategory::High),
            "critical" => Some(HealthRiskCategory::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthRiskCategory::Low => "low",
            HealthRiskCategory::Medium => "medium",
            HealthRiskCategory::High => "high",
            HealthRiskCategory::Critical => "critical",
        }
    }
}

impl fmt::Display for HealthRiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_buckets_are_monotonic() {
        assert_eq!(StressCategory::from_score(1.0), StressCategory::Low);
        assert_eq!(StressCategory::from_score(4.0), StressCategory::Low);
        assert_eq!(StressCategory::from_score(5.0), StressCategory::Moderate);
        assert_eq!(StressCategory::from_score(6.0), StressCategory::Moderate);
        assert_eq!(StressCategory::from_score(7.0), StressCategory::High);
        assert_eq!(StressCategory::from_score(10.0), StressCategory::High);

        let mut previous = StressCategory::Low;
        for score in 1..=10 {
            let bucket = StressCategory::from_score(score as f64);
            assert!(rank(bucket) >= rank(previous));
            previous = bucket;
        }
    }

    fn rank(category: StressCategory) -> u8 {
        match category {
            StressCategory::Low => 0,
            StressCategory::Moderate => 1,
            StressCategory::High => 2,
        }
    }

    #[test]
    fn test_stress_labels_parse_as_scores() {
        assert_eq!(StressCategory::from_label("8").unwrap(), StressCategory::High);
        assert_eq!(StressCategory::from_label("4.5").unwrap(), StressCategory::Moderate);
        assert_eq!(StressCategory::from_label(" 3 ").unwrap(), StressCategory::Low);
    }

    #[test]
    fn test_non_numeric_stress_label_is_an_error() {
        for label in ["calm", "", "NaN"] {
            match StressCategory::from_label(label) {
                Err(InferenceError::NonNumericLabel { domain, label: got }) => {
                    assert_eq!(domain, PredictionDomain::Stress);
                    assert_eq!(got, label);
                }
                other => panic!("expected non-numeric label error for {label:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_health_labels_are_lower_cased() {
        assert_eq!(HealthRiskCategory::normalize("High"), "high");
        assert_eq!(HealthRiskCategory::normalize("CRITICAL"), "critical");
        assert_eq!(
            HealthRiskCategory::parse(&HealthRiskCategory::normalize("Medium")),
            Some(HealthRiskCategory::Medium)
        );
        assert_eq!(HealthRiskCategory::parse("elevated"), None);
    }
}
