use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use vitals_domain::PublishError;
use vitals_ports::{
    ConsumerPort, DeliveryReport, InboundMessage, OffsetHandle, PublisherPort, StreamError,
};

const PARTITION: i32 = 0;

#[derive(Debug, Default)]
struct BrokerState {
    logs: HashMap<String, Vec<InboundMessage>>,
    /// Next offset to consume, per topic and partition.
    committed: HashMap<(String, i32), i64>,
    commit_attempts: Vec<OffsetHandle>,
    poll_errors: VecDeque<String>,
    fail_publishes: bool,
    fail_commits: bool,
}

/// Single-partition, in-process broker shared by consumers and publishers.
///
/// Each topic is an append-only log. Commits follow Kafka's convention of
/// storing the offset after the acknowledged message.
#[derive(Debug, Clone)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    appended: Arc<watch::Sender<u64>>,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBroker {
    pub fn new() -> Self {
        let (appended, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(BrokerState::default())),
            appended: Arc::new(appended),
        }
    }

    fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message and return its position.
    pub fn produce(&self, topic: &str, key: Option<&[u8]>, payload: Vec<u8>) -> OffsetHandle {
        let offset = {
            let mut state = self.state();
            let log = state.logs.entry(topic.to_string()).or_default();
            let offset = OffsetHandle {
                topic: topic.to_string(),
                partition: PARTITION,
                offset: log.len() as i64,
            };
            log.push(InboundMessage {
                payload,
                key: key.map(<[u8]>::to_vec),
                offset: offset.clone(),
            });
            offset
        };
        self.appended.send_modify(|version| *version += 1);
        offset
    }

    pub fn messages(&self, topic: &str) -> Vec<InboundMessage> {
        self.state().logs.get(topic).cloned().unwrap_or_default()
    }

    /// Next offset the consumer group will read, if anything was committed.
    pub fn committed(&self, topic: &str) -> Option<i64> {
        self.state()
            .committed
            .get(&(topic.to_string(), PARTITION))
            .copied()
    }

    pub fn commit_attempts(&self) -> Vec<OffsetHandle> {
        self.state().commit_attempts.clone()
    }

    pub fn consumer(&self, max_batch: usize) -> InMemoryConsumer {
        InMemoryConsumer {
            broker: self.clone(),
            appended: self.appended.subscribe(),
            topic: None,
            position: 0,
            max_batch: max_batch.max(1),
        }
    }

    pub fn publisher(&self) -> InMemoryPublisher {
        InMemoryPublisher {
            broker: self.clone(),
        }
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.state().fail_publishes = fail;
    }

    pub fn fail_commits(&self, fail: bool) {
        self.state().fail_commits = fail;
    }

    /// Make the next poll from any consumer fail with `reason`.
    pub fn inject_poll_error(&self, reason: impl Into<String>) {
        self.state().poll_errors.push_back(reason.into());
    }
}

#[derive(Debug)]
pub struct InMemoryConsumer {
    broker: InMemoryBroker,
    appended: watch::Receiver<u64>,
    topic: Option<String>,
    position: i64,
    max_batch: usize,
}

impl InMemoryConsumer {
    fn take_batch(&mut self) -> Result<Vec<InboundMessage>, StreamError> {
        let Some(topic) = &self.topic else {
            return Err(StreamError::Poll("consumer is not subscribed".into()));
        };
        let mut state = self.broker.state();
        if let Some(reason) = state.poll_errors.pop_front() {
            return Err(StreamError::Poll(reason));
        }
        let batch: Vec<InboundMessage> = state
            .logs
            .get(topic)
            .map(|log| {
                log.iter()
                    .skip(self.position as usize)
                    .take(self.max_batch)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        self.position += batch.len() as i64;
        Ok(batch)
    }
}

#[async_trait]
impl ConsumerPort for InMemoryConsumer {
    /// Resume from the committed position, or the start of the log.
    async fn subscribe(&mut self, topic: &str) -> Result<(), StreamError> {
        self.position = self.broker.committed(topic).unwrap_or(0);
        self.topic = Some(topic.to_string());
        tracing::info!(%topic, position = self.position, "subscribed");
        Ok(())
    }

    async fn poll(&mut self, timeout: Duration) -> Result<Vec<InboundMessage>, StreamError> {
        self.appended.borrow_and_update();
        let batch = self.take_batch()?;
        if !batch.is_empty() {
            return Ok(batch);
        }
        if tokio::time::timeout(timeout, self.appended.changed())
            .await
            .is_err()
        {
            return Ok(Vec::new());
        }
        self.appended.borrow_and_update();
        self.take_batch()
    }

    async fn commit(&mut self, offset: &OffsetHandle) -> Result<(), StreamError> {
        let mut state = self.broker.state();
        state.commit_attempts.push(offset.clone());
        if state.fail_commits {
            return Err(StreamError::Commit {
                offset: offset.clone(),
                reason: "commit rejected".into(),
            });
        }
        state
            .committed
            .insert((offset.topic.clone(), offset.partition), offset.offset + 1);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryPublisher {
    broker: InMemoryBroker,
}

impl PublisherPort for InMemoryPublisher {
    fn publish(
        &self,
        topic: &str,
        key: Option<&[u8]>,
        payload: Vec<u8>,
    ) -> Result<(), PublishError> {
        if self.broker.state().fail_publishes {
            DeliveryReport::failed(topic, "broker unavailable").log();
            return Err(PublishError::Enqueue {
                topic: topic.to_string(),
                reason: "broker unavailable".into(),
            });
        }
        let offset = self.broker.produce(topic, key, payload);
        DeliveryReport::delivered(topic, offset.partition, offset.offset).log();
        Ok(())
    }
}
