//! Per-message state machine from raw payload to enriched insight.
//!
//! `Received → Validated → Encoded → Inferred → Enriched` is pure and lives in
//! [`InsightPipeline`]; `Published` and `Acknowledged` involve the broker and
//! are driven by [`crate::worker::PartitionWorker`]. Any failure before
//! `Enriched` stops the message without acknowledging it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use vitals_domain::{
    EnrichedInsight, MessageError, MetricRecord, PredictionDomain, PredictionResult,
    RecommendationBlock, UrgencyThresholds,
};
use vitals_ml::{ArtifactSet, FeatureEncoder, InferenceEngine};

use crate::assembler::RecommendationAssembler;
use crate::categories::{HealthRiskCategory, StressCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Received,
    Validated,
    Encoded,
    Inferred,
    Enriched,
    Published,
    Acknowledged,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Encoded => "encoded",
            Stage::Inferred => "inferred",
            Stage::Enriched => "enriched",
            Stage::Published => "published",
            Stage::Acknowledged => "acknowledged",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message stopped before reaching `stage`.
#[derive(Debug, Error)]
#[error("{}failed before {stage}: {error}", domain_prefix(.domain))]
pub struct StageFailure {
    pub stage: Stage,
    /// Domain being scored when encoding or inference failed.
    pub domain: Option<PredictionDomain>,
    #[source]
    pub error: MessageError,
}

fn domain_prefix(domain: &Option<PredictionDomain>) -> String {
    domain.map(|domain| format!("{domain} ")).unwrap_or_default()
}

impl StageFailure {
    fn new(
        stage: Stage,
        domain: Option<PredictionDomain>,
        error: impl Into<MessageError>,
    ) -> Self {
        Self {
            stage,
            domain,
            error: error.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }
}

/// Scores a payload against both domains and assembles the outbound insight.
///
/// Holds its own handle on the resident artifacts, so any number of
/// pipelines can share one [`ArtifactSet`].
#[derive(Debug, Clone)]
pub struct InsightPipeline {
    artifacts: Arc<ArtifactSet>,
    assembler: RecommendationAssembler,
}

impl InsightPipeline {
    pub fn new(artifacts: Arc<ArtifactSet>, thresholds: UrgencyThresholds) -> Self {
        Self {
            artifacts,
            assembler: RecommendationAssembler::new(thresholds),
        }
    }

    pub fn enrich(&self, payload: &[u8]) -> Result<EnrichedInsight, StageFailure> {
        let record = MetricRecord::from_json(payload)
            .map_err(|err| StageFailure::new(Stage::Validated, None, err))?;

        let stress = self.score(&record, PredictionDomain::Stress)?;
        let stress_category = StressCategory::from_label(&stress.category).map_err(|err| {
            StageFailure::new(Stage::Inferred, Some(PredictionDomain::Stress), err)
        })?;

        // Independent of the stress prediction: the health-risk model reads
        // the stress level reported on the record.
        let health = self.score(&record, PredictionDomain::HealthRisk)?;
        let health_category = HealthRiskCategory::normalize(&health.category);

        let stress_block = self.block(PredictionDomain::Stress, stress_category.as_str(), &stress);
        let health_block = self.block(PredictionDomain::HealthRisk, &health_category, &health);
        Ok(EnrichedInsight::from_blocks(stress_block, health_block))
    }

    fn score(
        &self,
        record: &MetricRecord,
        domain: PredictionDomain,
    ) -> Result<PredictionResult, StageFailure> {
        let bundle = self.artifacts.bundle(domain);
        let features = FeatureEncoder::encode(record, bundle)
            .map_err(|err| StageFailure::new(Stage::Encoded, Some(domain), err))?;
        let prediction = InferenceEngine::predict(features.view(), bundle)
            .map_err(|err| StageFailure::new(Stage::Inferred, Some(domain), err))?;
        tracing::trace!(%domain, confidence = prediction.confidence, "domain scored");
        Ok(prediction)
    }

    fn block(
        &self,
        domain: PredictionDomain,
        category: &str,
        prediction: &PredictionResult,
    ) -> RecommendationBlock {
        self.assembler.assemble(domain, category, prediction.confidence)
    }
}
