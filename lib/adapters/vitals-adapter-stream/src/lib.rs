//! Broker adapters for the consumer and publisher ports.
//!
//! [`memory`] is always available and backs tests and local runs. The Kafka
//! adapter is compiled with the `kafka` feature.

pub mod memory;

#[cfg(feature = "kafka")]
pub mod kafka;

pub use memory::{InMemoryBroker, InMemoryConsumer, InMemoryPublisher};

#[cfg(feature = "kafka")]
pub use kafka::{DeliveryLogger, KafkaConsumer, KafkaPublisher};
