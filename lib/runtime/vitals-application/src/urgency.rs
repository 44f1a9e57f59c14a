use vitals_domain::{Urgency, UrgencyThresholds};

/// Maps a normalized category and its confidence to an urgency tier.
///
/// Rules are evaluated in order and the first match wins:
/// 1. `high`/`critical` with confidence strictly above `thresholds.high` is high.
/// 2. `moderate`/`medium` is medium, whatever the confidence.
/// 3. Anything else is low.
///
/// A `high` or `critical` category at or below the high threshold therefore
/// lands on low, not medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrgencyClassifier {
    thresholds: UrgencyThresholds,
}

impl Default for UrgencyClassifier {
    fn default() -> Self {
        Self::new(UrgencyThresholds::default())
    }
}

impl UrgencyClassifier {
    pub fn new(thresholds: UrgencyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &UrgencyThresholds {
        &self.thresholds
    }

    pub fn classify(&self, category: &str, confidence: f64) -> Urgency {
        match category {
            "high" | "critical" if confidence > self.thresholds.high => Urgency::High,
            "moderate" | "medium" => Urgency::Medium,
            _ => Urgency::Low,
        }
    }
}
