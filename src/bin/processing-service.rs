use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use vitals::stream::{KafkaConsumer, KafkaPublisher};
use vitals_domain::VitalsConfig;
use vitals_ml::ArtifactRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = vitals::config_path();
    let config = VitalsConfig::load(&config_path)?;
    vitals::telemetry::init(&config.logging)?;
    tracing::info!(
        service = %config.service.name,
        environment = %config.service.environment,
        config = %config_path.display(),
        "starting"
    );

    let registry = ArtifactRegistry::new(config.artifacts.clone());
    let artifacts = registry
        .load()
        .context("model artifacts must load before serving")?;

    let consumer = KafkaConsumer::new(&config.kafka).context("failed to create kafka consumer")?;
    let publisher =
        KafkaPublisher::new(&config.kafka).context("failed to create kafka producer")?;
    let mut worker = vitals::start_worker(&config, artifacts, consumer, publisher).await?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown requested");
                signal.cancel();
            }
            Err(error) => tracing::error!(%error, "failed to listen for ctrl-c"),
        }
    });

    worker.run(shutdown).await;
    worker
        .publisher()
        .flush(Duration::from_secs(10))
        .context("failed to flush pending insights")?;
    Ok(())
}
