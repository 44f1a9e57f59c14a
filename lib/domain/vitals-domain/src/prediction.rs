use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two independent prediction tasks served per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionDomain {
    Stress,
    HealthRisk,
}

impl PredictionDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionDomain::Stress => "stress",
            PredictionDomain::HealthRisk => "health_risk",
        }
    }
}

impl fmt::Display for PredictionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
