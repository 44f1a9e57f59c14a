use std::time::Duration;

use tokio_util::sync::CancellationToken;

use vitals_ports::{ConsumerPort, InboundMessage, PublisherPort, StreamError};

use crate::pipeline::{InsightPipeline, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Offset committed. `published` is false when the insight could not be
    /// serialized or enqueued.
    Acknowledged { published: bool },
    /// Stopped before `Enriched`; the offset is left for broker redelivery.
    Skipped { stage: Stage, kind: &'static str },
    /// Enriched, but the commit request itself failed.
    CommitFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub received: u64,
    pub acknowledged: u64,
    pub validation_failures: u64,
    pub encoding_failures: u64,
    pub inference_failures: u64,
    pub publish_failures: u64,
    pub commit_failures: u64,
    pub poll_failures: u64,
}

impl WorkerStats {
    pub fn skipped(&self) -> u64 {
        self.validation_failures + self.encoding_failures + self.inference_failures
    }

    fn record_skip(&mut self, kind: &str) {
        match kind {
            "validation" => self.validation_failures += 1,
            "encoding" => self.encoding_failures += 1,
            _ => self.inference_failures += 1,
        }
    }
}

/// Sequential processor for one consumer assignment.
///
/// Messages are handled one at a time in poll order. A message is committed
/// once it reaches `Enriched`, whether or not its insight was enqueued.
pub struct PartitionWorker<C, P> {
    consumer: C,
    publisher: P,
    pipeline: InsightPipeline,
    output_topic: String,
    poll_timeout: Duration,
    stats: WorkerStats,
}

impl<C, P> PartitionWorker<C, P>
where
    C: ConsumerPort,
    P: PublisherPort,
{
    pub fn new(
        consumer: C,
        publisher: P,
        pipeline: InsightPipeline,
        output_topic: impl Into<String>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            consumer,
            publisher,
            pipeline,
            output_topic: output_topic.into(),
            poll_timeout,
            stats: WorkerStats::default(),
        }
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub async fn handle(&mut self, message: &InboundMessage) -> MessageOutcome {
        self.stats.received += 1;
        let offset = &message.offset;

        let insight = match self.pipeline.enrich(&message.payload) {
            Ok(insight) => insight,
            Err(failure) => {
                self.stats.record_skip(failure.kind());
                tracing::warn!(
                    %offset,
                    stage = %failure.stage,
                    domain = ?failure.domain,
                    kind = failure.kind(),
                    "message not enriched, offset left uncommitted"
                );
                return MessageOutcome::Skipped {
                    stage: failure.stage,
                    kind: failure.kind(),
                };
            }
        };
        tracing::debug!(%offset, stage = %Stage::Enriched, "message enriched");

        let published = match insight.to_json_bytes().and_then(|bytes| {
            self.publisher
                .publish(&self.output_topic, message.key.as_deref(), bytes)
        }) {
            Ok(()) => {
                tracing::debug!(
                    %offset,
                    stage = %Stage::Published,
                    topic = %self.output_topic,
                    "insight enqueued"
                );
                true
            }
            Err(error) => {
                self.stats.publish_failures += 1;
                tracing::error!(
                    %offset,
                    topic = %self.output_topic,
                    %error,
                    "insight not enqueued, committing anyway"
                );
                false
            }
        };

        match self.consumer.commit(offset).await {
            Ok(()) => {
                self.stats.acknowledged += 1;
                tracing::debug!(%offset, stage = %Stage::Acknowledged, "offset committed");
                MessageOutcome::Acknowledged { published }
            }
            Err(error) => {
                self.stats.commit_failures += 1;
                tracing::error!(%offset, %error, "offset commit failed");
                MessageOutcome::CommitFailed
            }
        }
    }

    /// Poll one batch and handle it in order. Returns the batch size.
    pub async fn poll_once(&mut self) -> Result<usize, StreamError> {
        let batch = self.consumer.poll(self.poll_timeout).await?;
        for message in &batch {
            self.handle(message).await;
        }
        Ok(batch.len())
    }

    /// Poll and handle until `shutdown` is cancelled. A batch in progress is
    /// finished first. Poll errors are logged and polling resumes after one
    /// poll interval.
    pub async fn run(&mut self, shutdown: CancellationToken) -> WorkerStats {
        tracing::info!(output_topic = %self.output_topic, "partition worker started");
        loop {
            let polled = tokio::select! {
                _ = shutdown.cancelled() => break,
                polled = self.consumer.poll(self.poll_timeout) => polled,
            };
            match polled {
                Ok(batch) => {
                    for message in &batch {
                        self.handle(message).await;
                    }
                }
                Err(error) => {
                    self.stats.poll_failures += 1;
                    tracing::error!(%error, "poll failed");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.poll_timeout) => {}
                    }
                }
            }
        }

        let stats = self.stats.clone();
        tracing::info!(
            received = stats.received,
            acknowledged = stats.acknowledged,
            skipped = stats.skipped(),
            publish_failures = stats.publish_failures,
            commit_failures = stats.commit_failures,
            poll_failures = stats.poll_failures,
            "partition worker stopped"
        );
        stats
    }
}
