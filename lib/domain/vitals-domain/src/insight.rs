use serde::{Deserialize, Serialize};

use crate::error::PublishError;

/// Model output for one domain of one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub category: String,
    /// Highest class probability, within `[0, 1]`.
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBlock {
    pub category: String,
    pub confidence: f64,
    pub urgency: Urgency,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightPredictions {
    pub stress: String,
    pub health: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecommendations {
    pub stress: RecommendationBlock,
    pub health_risk: RecommendationBlock,
}

/// Outbound record published for downstream dashboards and notifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedInsight {
    pub predictions: InsightPredictions,
    pub recommendations: InsightRecommendations,
}

impl EnrichedInsight {
    pub fn from_blocks(stress: RecommendationBlock, health_risk: RecommendationBlock) -> Self {
        Self {
            predictions: InsightPredictions {
                stress: stress.category.clone(),
                health: health_risk.category.clone(),
            },
            recommendations: InsightRecommendations {
                stress,
                health_risk,
            },
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, PublishError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(category: &str, urgency: Urgency, recommendations: &[&str]) -> RecommendationBlock {
        RecommendationBlock {
            category: category.to_string(),
            confidence: 0.9,
            urgency,
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_outbound_wire_shape() {
        let insight = EnrichedInsight::from_blocks(
            block("moderate", Urgency::Medium, &["Take breaks."]),
            block("critical", Urgency::High, &[]),
        );
        let value: serde_json::Value =
            serde_json::from_slice(&insight.to_json_bytes().unwrap()).unwrap();

        assert_eq!(value["predictions"]["stress"], "moderate");
        assert_eq!(value["predictions"]["health"], "critical");
        assert_eq!(value["recommendations"]["stress"]["urgency"], "medium");
        assert_eq!(value["recommendations"]["stress"]["confidence"], 0.9);
        assert_eq!(
            value["recommendations"]["stress"]["recommendations"][0],
            "Take breaks."
        );
        assert_eq!(value["recommendations"]["health_risk"]["urgency"], "high");
        assert!(
            value["recommendations"]["health_risk"]["recommendations"]
                .as_array()
                .unwrap()
                .is_empty()
        );
    }
}
