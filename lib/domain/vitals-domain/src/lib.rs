//! Domain models and invariants for the health insight pipeline.

pub mod config;
pub mod error;
pub mod insight;
pub mod prediction;
pub mod record;

pub use config::{
    ArtifactsConfig, DomainArtifactPaths, KafkaConfig, LogFormat, LoggingConfig, ServiceConfig,
    UrgencyThresholds, VitalsConfig,
};
pub use error::{
    ArtifactError, EncodingError, InferenceError, MessageError, PublishError, ValidationError,
};
pub use insight::{
    EnrichedInsight, InsightPredictions, InsightRecommendations, PredictionResult,
    RecommendationBlock, Urgency,
};
pub use prediction::PredictionDomain;
pub use record::{BmiCategory, Gender, MetricRecord};
