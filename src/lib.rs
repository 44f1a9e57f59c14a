//! Processing service: consumes raw health metrics, scores them against the
//! stress and health-risk models and republishes enriched insights.
//!
//! The binary wires configuration, logging and the Kafka adapter around the
//! crates re-exported here.

pub mod service;
pub mod telemetry;

pub use service::{config_path, start_worker};

pub use vitals_adapter_stream as stream;
pub use vitals_application as application;
pub use vitals_domain as domain;
pub use vitals_ml as ml;
pub use vitals_ports as ports;
