//! Service configuration: YAML file with defaults, overridden by environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::prediction::PredictionDomain;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
    pub kafka: KafkaConfig,
    pub artifacts: ArtifactsConfig,
    pub urgency: UrgencyThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "processing-service".to_string(),
            environment: "development".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub group_id: String,
    pub input_topic: String,
    pub output_topic: String,
    pub auto_offset_reset: String,
    pub enable_auto_commit: bool,
    pub linger_ms: u64,
    pub poll_timeout_ms: u64,
    pub max_batch: usize,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "kafka:29092".to_string(),
            group_id: "processing-service-group".to_string(),
            input_topic: "raw-metrics".to_string(),
            output_topic: "processed-insights".to_string(),
            auto_offset_reset: "earliest".to_string(),
            enable_auto_commit: false,
            linger_ms: 5,
            poll_timeout_ms: 1000,
            max_batch: 64,
        }
    }
}

/// Filesystem locations of the eight serving artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub stress_model_path: PathBuf,
    pub stress_gender_encoder_path: PathBuf,
    pub stress_bmi_encoder_path: PathBuf,
    pub stress_target_encoder_path: PathBuf,
    pub health_model_path: PathBuf,
    pub health_gender_encoder_path: PathBuf,
    pub health_bmi_encoder_path: PathBuf,
    pub health_target_encoder_path: PathBuf,
}

impl ArtifactsConfig {
    /// Conventional layout: `<root>/stress/*.json` and `<root>/health_risk/*.json`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let stress = root.as_ref().join("stress");
        let health = root.as_ref().join("health_risk");
        Self {
            stress_model_path: stress.join("model.json"),
            stress_gender_encoder_path: stress.join("gender_encoder.json"),
            stress_bmi_encoder_path: stress.join("bmi_encoder.json"),
            stress_target_encoder_path: stress.join("stress_encoder.json"),
            health_model_path: health.join("model.json"),
            health_gender_encoder_path: health.join("gender_encoder.json"),
            health_bmi_encoder_path: health.join("bmi_encoder.json"),
            health_target_encoder_path: health.join("stress_encoder.json"),
        }
    }

    pub fn for_domain(&self, domain: PredictionDomain) -> DomainArtifactPaths {
        match domain {
            PredictionDomain::Stress => DomainArtifactPaths {
                model: self.stress_model_path.clone(),
                gender_encoder: self.stress_gender_encoder_path.clone(),
                bmi_encoder: self.stress_bmi_encoder_path.clone(),
                target_encoder: self.stress_target_encoder_path.clone(),
            },
            PredictionDomain::HealthRisk => DomainArtifactPaths {
                model: self.health_model_path.clone(),
                gender_encoder: self.health_gender_encoder_path.clone(),
                bmi_encoder: self.health_bmi_encoder_path.clone(),
                target_encoder: self.health_target_encoder_path.clone(),
            },
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self::under("models")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainArtifactPaths {
    pub model: PathBuf,
    pub gender_encoder: PathBuf,
    pub bmi_encoder: PathBuf,
    pub target_encoder: PathBuf,
}

/// Confidence thresholds consulted by the urgency classifier.
///
/// Only `high` participates in the decision; `low` and `medium` are read
/// from config but unused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            low: 0.3,
            medium: 0.6,
            high: 0.8,
        }
    }
}

impl VitalsConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Load the file when present (defaults otherwise), apply process
    /// environment overrides and validate the result.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_path(path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides using the variable names of the deployed `.env` files.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set_string = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };
        set_string(&mut self.service.name, "SERVICE_NAME");
        set_string(&mut self.service.environment, "ENV");
        set_string(&mut self.kafka.bootstrap_servers, "KAFKA_BOOTSTRAP_SERVERS");
        set_string(&mut self.kafka.group_id, "KAFKA_GROUP_ID");
        set_string(&mut self.kafka.input_topic, "RAW_METRICS_TOPIC");
        set_string(&mut self.kafka.output_topic, "PROCESSED_INSIGHTS_TOPIC");
        set_string(&mut self.kafka.auto_offset_reset, "KAFKA_AUTO_OFFSET_RESET");

        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.to_ascii_lowercase();
        }
        if let Some(raw) = lookup("KAFKA_ENABLE_AUTO_COMMIT") {
            self.kafka.enable_auto_commit = parse_bool(&raw)
                .with_context(|| format!("KAFKA_ENABLE_AUTO_COMMIT={raw} is not a boolean"))?;
        }

        let artifacts = &mut self.artifacts;
        let paths: [(&str, &mut PathBuf); 8] = [
            ("STRESS_MODEL_PATH", &mut artifacts.stress_model_path),
            ("STRESS_GENDER_ENCODER_PATH", &mut artifacts.stress_gender_encoder_path),
            ("STRESS_BMI_ENCODER_PATH", &mut artifacts.stress_bmi_encoder_path),
            ("STRESS_TARGET_ENCODER_PATH", &mut artifacts.stress_target_encoder_path),
            ("HEALTH_MODEL_PATH", &mut artifacts.health_model_path),
            ("HEALTH_GENDER_ENCODER_PATH", &mut artifacts.health_gender_encoder_path),
            ("HEALTH_BMI_ENCODER_PATH", &mut artifacts.health_bmi_encoder_path),
            ("HEALTH_TARGET_ENCODER_PATH", &mut artifacts.health_target_encoder_path),
        ];
        for (key, target) in paths {
            if let Some(value) = lookup(key) {
                *target = PathBuf::from(value);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let kafka = &self.kafka;
        if kafka.bootstrap_servers.trim().is_empty() {
            bail!("kafka.bootstrap_servers must not be empty");
        }
        if kafka.group_id.trim().is_empty() {
            bail!("kafka.group_id must not be empty");
        }
        if kafka.input_topic.trim().is_empty() || kafka.output_topic.trim().is_empty() {
            bail!("kafka input and output topics must not be empty");
        }
        if kafka.enable_auto_commit {
            bail!("kafka.enable_auto_commit must be false: offsets are committed after enrichment");
        }
        if kafka.max_batch == 0 {
            bail!("kafka.max_batch must be at least 1");
        }

        let UrgencyThresholds { low, medium, high } = self.urgency;
        for (name, value) in [("low", low), ("medium", medium), ("high", high)] {
            if !(0.0..=1.0).contains(&value) {
                bail!("urgency.{name} = {value} is outside [0, 1]");
            }
        }
        if !(low <= medium && medium <= high) {
            bail!("urgency thresholds must satisfy low <= medium <= high");
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
