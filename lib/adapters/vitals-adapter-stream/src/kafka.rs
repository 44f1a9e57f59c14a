use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use rdkafka::{ClientContext, Offset, TopicPartitionList};

use vitals_domain::{KafkaConfig, PublishError};
use vitals_ports::{
    ConsumerPort, DeliveryReport, InboundMessage, OffsetHandle, PublisherPort, StreamError,
};

/// Manually committed consumer; auto-commit is always off.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    max_batch: usize,
}

impl KafkaConsumer {
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false")
            .create()?;
        Ok(Self {
            consumer,
            max_batch: config.max_batch.max(1),
        })
    }
}

fn inbound(message: &BorrowedMessage<'_>) -> InboundMessage {
    InboundMessage {
        payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
        key: message.key().map(<[u8]>::to_vec),
        offset: OffsetHandle {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
        },
    }
}

#[async_trait]
impl ConsumerPort for KafkaConsumer {
    async fn subscribe(&mut self, topic: &str) -> Result<(), StreamError> {
        self.consumer
            .subscribe(&[topic])
            .map_err(|err| StreamError::Subscribe {
                topic: topic.to_string(),
                reason: err.to_string(),
            })?;
        tracing::info!(%topic, "kafka consumer subscribed");
        Ok(())
    }

    /// Wait up to `timeout` for one message, then drain what is already
    /// buffered, up to `max_batch`.
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<InboundMessage>, StreamError> {
        let mut batch = Vec::new();
        let mut wait = timeout;
        while batch.len() < self.max_batch {
            match tokio::time::timeout(wait, self.consumer.recv()).await {
                Err(_) => break,
                Ok(Ok(message)) => batch.push(inbound(&message)),
                Ok(Err(err)) if batch.is_empty() => return Err(StreamError::Poll(err.to_string())),
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "kafka error after partial batch");
                    break;
                }
            }
            wait = Duration::ZERO;
        }
        Ok(batch)
    }

    /// Kafka stores the next offset to read, so the commit is `offset + 1`.
    async fn commit(&mut self, offset: &OffsetHandle) -> Result<(), StreamError> {
        let commit_error = |reason: String| StreamError::Commit {
            offset: offset.clone(),
            reason,
        };
        let mut list = TopicPartitionList::new();
        list.add_partition_offset(
            &offset.topic,
            offset.partition,
            Offset::Offset(offset.offset + 1),
        )
        .map_err(|err| commit_error(err.to_string()))?;
        self.consumer
            .commit(&list, CommitMode::Async)
            .map_err(|err| commit_error(err.to_string()))
    }
}

/// Logs every delivery outcome; nothing else observes it.
pub struct DeliveryLogger;

impl ClientContext for DeliveryLogger {}

impl ProducerContext for DeliveryLogger {
    type DeliveryOpaque = ();

    fn delivery(&self, result: &DeliveryResult<'_>, _: Self::DeliveryOpaque) {
        let report = match result {
            Ok(message) => {
                DeliveryReport::delivered(message.topic(), message.partition(), message.offset())
            }
            Err((err, message)) => DeliveryReport::failed(message.topic(), err.to_string()),
        };
        report.log();
    }
}

pub struct KafkaPublisher {
    producer: ThreadedProducer<DeliveryLogger>,
}

impl KafkaPublisher {
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("linger.ms", config.linger_ms.to_string())
            .create_with_context(DeliveryLogger)?;
        Ok(Self { producer })
    }

    /// Wait for queued insights to be delivered, used at shutdown.
    pub fn flush(&self, timeout: Duration) -> Result<(), KafkaError> {
        self.producer.flush(timeout)
    }
}

impl PublisherPort for KafkaPublisher {
    fn publish(
        &self,
        topic: &str,
        key: Option<&[u8]>,
        payload: Vec<u8>,
    ) -> Result<(), PublishError> {
        let mut record = BaseRecord::<[u8], [u8]>::to(topic).payload(payload.as_slice());
        if let Some(key) = key {
            record = record.key(key);
        }
        self.producer
            .send(record)
            .map_err(|(err, _)| PublishError::Enqueue {
                topic: topic.to_string(),
                reason: err.to_string(),
            })
    }
}
