//! Serving-time machine learning: artifact loading, feature encoding and
//! classifier inference for the stress and health-risk domains.

pub mod bundle;
pub mod features;
pub mod inference;
pub mod label_encoder;
pub mod model;
pub mod registry;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use bundle::ModelArtifactBundle;
pub use features::{Feature, FeatureEncoder};
pub use inference::InferenceEngine;
pub use label_encoder::{LabelEncoder, LabelEncoderError};
pub use model::{Classifier, ModelError};
pub use registry::{ArtifactRegistry, ArtifactSet};
