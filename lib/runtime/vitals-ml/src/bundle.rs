use std::path::Path;

use serde::de::DeserializeOwned;

use vitals_domain::{ArtifactError, DomainArtifactPaths, PredictionDomain};

use crate::label_encoder::LabelEncoder;
use crate::model::Classifier;

/// Classifier plus the encoders it was trained with, for one domain.
///
/// Loading is all-or-nothing: a bundle value only exists once every
/// artifact has been read and cross-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifactBundle {
    pub domain: PredictionDomain,
    pub model: Classifier,
    pub gender_encoder: LabelEncoder,
    pub bmi_encoder: LabelEncoder,
    pub target_encoder: LabelEncoder,
}

impl ModelArtifactBundle {
    pub fn new(
        domain: PredictionDomain,
        model: Classifier,
        gender_encoder: LabelEncoder,
        bmi_encoder: LabelEncoder,
        target_encoder: LabelEncoder,
    ) -> Result<Self, ArtifactError> {
        let bundle = Self {
            domain,
            model,
            gender_encoder,
            bmi_encoder,
            target_encoder,
        };
        bundle.check_consistency()?;
        Ok(bundle)
    }

    pub fn load(
        domain: PredictionDomain,
        paths: &DomainArtifactPaths,
    ) -> Result<Self, ArtifactError> {
        let model = read_artifact(&paths.model, Classifier::from_json)?;
        let gender_encoder = read_json::<LabelEncoder>(&paths.gender_encoder)?;
        let bmi_encoder = read_json::<LabelEncoder>(&paths.bmi_encoder)?;
        let target_encoder = read_json::<LabelEncoder>(&paths.target_encoder)?;
        Self::new(domain, model, gender_encoder, bmi_encoder, target_encoder)
    }

    fn check_consistency(&self) -> Result<(), ArtifactError> {
        let classes = self.model.num_classes();
        if self.target_encoder.len() != classes {
            return Err(ArtifactError::Inconsistent {
                domain: self.domain,
                reason: format!(
                    "target encoder has {} classes, model predicts {classes}",
                    self.target_encoder.len()
                ),
            });
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    read_artifact(path, |bytes| serde_json::from_slice::<T>(bytes))
}

fn read_artifact<T, E>(
    path: &Path,
    parse: impl FnOnce(&[u8]) -> Result<T, E>,
) -> Result<T, ArtifactError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Missing {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact = parse(&bytes).map_err(|err| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source: Box::new(err),
    })?;
    tracing::debug!(path = %path.display(), "artifact loaded");
    Ok(artifact)
}
