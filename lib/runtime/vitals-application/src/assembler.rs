use vitals_domain::{PredictionDomain, RecommendationBlock, UrgencyThresholds};

use crate::catalog::RecommendationCatalog;
use crate::urgency::UrgencyClassifier;

/// Packages a domain's category, confidence, urgency and advice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationAssembler {
    urgency: UrgencyClassifier,
}

impl RecommendationAssembler {
    pub fn new(thresholds: UrgencyThresholds) -> Self {
        Self {
            urgency: UrgencyClassifier::new(thresholds),
        }
    }

    pub fn assemble(
        &self,
        domain: PredictionDomain,
        category: &str,
        confidence: f64,
    ) -> RecommendationBlock {
        RecommendationBlock {
            category: category.to_string(),
            confidence,
            urgency: self.urgency.classify(category, confidence),
            recommendations: RecommendationCatalog::lookup(domain, category)
                .iter()
                .map(|advice| advice.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitals_domain::Urgency;

    #[test]
    fn test_block_for_critical_health_risk() {
        let block = RecommendationAssembler::default().assemble(
            PredictionDomain::HealthRisk,
            "critical",
            0.93,
        );
        assert_eq!(block.category, "critical");
        assert_eq!(block.confidence, 0.93);
        assert_eq!(block.urgency, Urgency::High);
        assert_eq!(block.recommendations.len(), 2);
    }

    #[test]
    fn test_moderate_stress_is_medium_urgency() {
        let block =
            RecommendationAssembler::default().assemble(PredictionDomain::Stress, "moderate", 0.4);
        assert_eq!(block.urgency, Urgency::Medium);
        assert_eq!(
            block.recommendations[0],
            "Try short mindfulness or meditation sessions daily."
        );
    }

    #[test]
    fn test_unmatched_category_yields_empty_list() {
        let block = RecommendationAssembler::default().assemble(
            PredictionDomain::HealthRisk,
            "unknown",
            0.99,
        );
        assert!(block.recommendations.is_empty());
        assert_eq!(block.urgency, Urgency::Low);
    }
}
