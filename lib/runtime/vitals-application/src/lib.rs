//! Decision logic and message orchestration of the processing service.

pub mod assembler;
pub mod catalog;
pub mod categories;
pub mod pipeline;
pub mod urgency;
pub mod worker;

pub use assembler::RecommendationAssembler;
pub use catalog::RecommendationCatalog;
pub use categories::{HealthRiskCategory, StressCategory};
pub use pipeline::{InsightPipeline, Stage, StageFailure};
pub use urgency::UrgencyClassifier;
pub use worker::{MessageOutcome, PartitionWorker, WorkerStats};
