//! Broker-facing contracts of the processing service.
//!
//! The pipeline only needs an ordered stream of opaque payloads with a
//! committable offset, and a fire-and-forget publisher whose delivery outcome
//! is reported out of band.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use vitals_domain::PublishError;

/// Position of a consumed message; committing it acknowledges the message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffsetHandle {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl fmt::Display for OffsetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.topic, self.partition, self.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub payload: Vec<u8>,
    pub key: Option<Vec<u8>>,
    pub offset: OffsetHandle,
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("subscribe to {topic} failed: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("poll failed: {0}")]
    Poll(String),

    #[error("commit of {offset} failed: {reason}")]
    Commit { offset: OffsetHandle, reason: String },
}

/// Inbound side of the stream adapter.
///
/// Batches preserve per-partition order; one implementation instance is
/// driven by exactly one worker.
#[async_trait]
pub trait ConsumerPort: Send {
    async fn subscribe(&mut self, topic: &str) -> Result<(), StreamError>;

    /// Wait up to `timeout` for the next ordered batch; an empty batch means
    /// nothing arrived in time.
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<InboundMessage>, StreamError>;

    async fn commit(&mut self, offset: &OffsetHandle) -> Result<(), StreamError>;
}

/// Outbound side of the stream adapter.
///
/// `publish` only enqueues and returns immediately; the delivery outcome is
/// later surfaced as a [`DeliveryReport`] that implementations log.
pub trait PublisherPort: Send + Sync {
    fn publish(&self, topic: &str, key: Option<&[u8]>, payload: Vec<u8>)
    -> Result<(), PublishError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: Option<i32>,
    pub offset: Option<i64>,
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn delivered(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition: Some(partition),
            offset: Some(offset),
            error: None,
        }
    }

    pub fn failed(topic: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            partition: None,
            offset: None,
            error: Some(error.into()),
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.error.is_none()
    }

    /// Delivery reports are observational only.
    pub fn log(&self) {
        match &self.error {
            None => tracing::info!(
                topic = %self.topic,
                partition = ?self.partition,
                offset = ?self.offset,
                "insight delivered"
            ),
            Some(error) => tracing::error!(topic = %self.topic, %error, "insight delivery failed"),
        }
    }
}
