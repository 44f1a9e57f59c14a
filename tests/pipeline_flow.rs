use std::time::Duration;

use tokio_util::sync::CancellationToken;

use vitals::application::MessageOutcome;
use vitals::domain::{ArtifactError, EnrichedInsight, Urgency, VitalsConfig};
use vitals::ml::{ArtifactRegistry, fixtures};
use vitals::stream::InMemoryBroker;

fn config_with_artifacts(dir: &tempfile::TempDir) -> VitalsConfig {
    let mut config = VitalsConfig::default();
    config.artifacts = fixtures::write_artifacts(dir.path()).unwrap();
    config.kafka.poll_timeout_ms = 10;
    config
}

fn insight(bytes: &[u8]) -> EnrichedInsight {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_stream_is_enriched_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_artifacts(&dir);
    let artifacts = ArtifactRegistry::new(config.artifacts.clone()).load().unwrap();

    let broker = InMemoryBroker::new();
    let input = &config.kafka.input_topic;
    let output = &config.kafka.output_topic;
    broker.produce(input, Some(b"user-1"), fixtures::sample_payload());
    broker.produce(input, Some(b"user-2"), br#"{"gender":"Female","age":-3}"#.to_vec());
    broker.produce(input, None, fixtures::sample_payload());

    let mut worker = vitals::start_worker(
        &config,
        artifacts,
        broker.consumer(config.kafka.max_batch),
        broker.publisher(),
    )
    .await
    .unwrap();

    let shutdown = CancellationToken::new();
    let stop = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        stop.cancel();
    });
    let stats = worker.run(shutdown).await;

    assert_eq!(stats.received, 3);
    assert_eq!(stats.acknowledged, 2);
    assert_eq!(stats.validation_failures, 1);

    let published = broker.messages(output);
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].key.as_deref(), Some(&b"user-1"[..]));
    assert_eq!(published[1].key, None);

    let first = insight(&published[0].payload);
    assert_eq!(first.predictions.stress, "low");
    assert_eq!(first.predictions.health, "high");
    assert_eq!(first.recommendations.health_risk.urgency, Urgency::High);
    assert!(!first.recommendations.stress.recommendations.is_empty());
    assert!(!first.recommendations.health_risk.recommendations.is_empty());

    let attempts: Vec<i64> = broker
        .commit_attempts()
        .iter()
        .map(|offset| offset.offset)
        .collect();
    assert_eq!(attempts, vec![0, 2]);
    assert_eq!(broker.committed(input), Some(3));
}

#[tokio::test]
async fn test_publish_failure_does_not_block_commit() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_artifacts(&dir);
    let artifacts = ArtifactRegistry::new(config.artifacts.clone()).load().unwrap();

    let broker = InMemoryBroker::new();
    broker.produce(&config.kafka.input_topic, None, fixtures::sample_payload());
    broker.fail_publishes(true);

    let mut worker =
        vitals::start_worker(&config, artifacts, broker.consumer(8), broker.publisher())
            .await
            .unwrap();
    let batch = broker.messages(&config.kafka.input_topic);
    let outcome = worker.handle(&batch[0]).await;

    assert_eq!(outcome, MessageOutcome::Acknowledged { published: false });
    assert!(broker.messages(&config.kafka.output_topic).is_empty());
    assert_eq!(broker.commit_attempts().len(), 1);
    assert_eq!(broker.committed(&config.kafka.input_topic), Some(1));
}

#[tokio::test]
async fn test_restart_resumes_after_committed_offset() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_artifacts(&dir);
    let registry = ArtifactRegistry::new(config.artifacts.clone());
    let input = config.kafka.input_topic.clone();

    let broker = InMemoryBroker::new();
    broker.produce(&input, None, fixtures::sample_payload());

    let mut first = vitals::start_worker(
        &config,
        registry.load().unwrap(),
        broker.consumer(8),
        broker.publisher(),
    )
    .await
    .unwrap();
    assert_eq!(first.poll_once().await.unwrap(), 1);

    broker.produce(&input, None, fixtures::sample_payload());
    let mut second = vitals::start_worker(
        &config,
        registry.load().unwrap(),
        broker.consumer(8),
        broker.publisher(),
    )
    .await
    .unwrap();
    assert_eq!(second.poll_once().await.unwrap(), 1);
    assert_eq!(broker.messages(&config.kafka.output_topic).len(), 2);
}

#[test]
fn test_missing_artifacts_refuse_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_artifacts(&dir);
    std::fs::remove_file(&config.artifacts.stress_model_path).unwrap();

    let registry = ArtifactRegistry::new(config.artifacts.clone());
    assert!(matches!(registry.load(), Err(ArtifactError::Missing { .. })));
    assert!(registry.resident().is_none());
}
