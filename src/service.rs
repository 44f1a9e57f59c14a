use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use vitals_application::{InsightPipeline, PartitionWorker};
use vitals_domain::VitalsConfig;
use vitals_ml::ArtifactSet;
use vitals_ports::{ConsumerPort, PublisherPort};

pub fn config_path() -> PathBuf {
    config_path_from(|key| env::var(key).ok())
}

fn config_path_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(path) = lookup("VITALS_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    if let Some(home) = lookup("HOME") {
        return Path::new(&home).join(".vitals").join("config.yaml");
    }

    PathBuf::from("vitals-config.yaml")
}

/// Subscribe `consumer` to the input topic and wrap it in a worker that
/// publishes to the output topic.
pub async fn start_worker<C, P>(
    config: &VitalsConfig,
    artifacts: Arc<ArtifactSet>,
    mut consumer: C,
    publisher: P,
) -> Result<PartitionWorker<C, P>>
where
    C: ConsumerPort,
    P: PublisherPort,
{
    let kafka = &config.kafka;
    consumer
        .subscribe(&kafka.input_topic)
        .await
        .with_context(|| format!("failed to subscribe to {}", kafka.input_topic))?;

    let pipeline = InsightPipeline::new(artifacts, config.urgency);
    tracing::info!(
        input_topic = %kafka.input_topic,
        output_topic = %kafka.output_topic,
        group_id = %kafka.group_id,
        "worker ready"
    );
    Ok(PartitionWorker::new(
        consumer,
        publisher,
        pipeline,
        kafka.output_topic.clone(),
        Duration::from_millis(kafka.poll_timeout_ms),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let path = config_path_from(lookup(&[
            ("VITALS_CONFIG_PATH", "/etc/vitals.yaml"),
            ("HOME", "/home/svc"),
        ]));
        assert_eq!(path, PathBuf::from("/etc/vitals.yaml"));
    }

    #[test]
    fn test_home_config_path() {
        let path = config_path_from(lookup(&[("HOME", "/home/svc")]));
        assert_eq!(path, PathBuf::from("/home/svc/.vitals/config.yaml"));
    }

    #[test]
    fn test_fallback_config_path() {
        assert_eq!(config_path_from(lookup(&[])), PathBuf::from("vitals-config.yaml"));
    }
}
