use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use vitals_domain::{ArtifactError, ArtifactsConfig, PredictionDomain};

use crate::bundle::ModelArtifactBundle;

/// Both domain bundles, immutable once built and shared between workers.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSet {
    pub stress: ModelArtifactBundle,
    pub health_risk: ModelArtifactBundle,
    pub loaded_at: DateTime<Utc>,
}

impl ArtifactSet {
    pub fn new(stress: ModelArtifactBundle, health_risk: ModelArtifactBundle) -> Self {
        Self {
            stress,
            health_risk,
            loaded_at: Utc::now(),
        }
    }

    pub fn bundle(&self, domain: PredictionDomain) -> &ModelArtifactBundle {
        match domain {
            PredictionDomain::Stress => &self.stress,
            PredictionDomain::HealthRisk => &self.health_risk,
        }
    }
}

/// Owner of the resident artifact set.
///
/// Constructed once at startup and handed to workers by reference; workers
/// hold the `Arc<ArtifactSet>` returned by [`ArtifactRegistry::load`] and never
/// touch the lock on the hot path.
#[derive(Debug)]
pub struct ArtifactRegistry {
    paths: ArtifactsConfig,
    resident: RwLock<Option<Arc<ArtifactSet>>>,
}

impl ArtifactRegistry {
    pub fn new(paths: ArtifactsConfig) -> Self {
        Self {
            paths,
            resident: RwLock::new(None),
        }
    }

    /// Return the resident set, reading storage only when nothing is resident.
    pub fn load(&self) -> Result<Arc<ArtifactSet>, ArtifactError> {
        if let Some(set) = self.resident() {
            return Ok(set);
        }
        let mut resident = self.resident.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished loading while we waited.
        if let Some(set) = resident.as_ref() {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(self.read_all()?);
        *resident = Some(Arc::clone(&set));
        Ok(set)
    }

    /// Re-read storage. The resident set is replaced only when every
    /// artifact loads; on failure the previous set stays resident.
    pub fn reload(&self) -> Result<Arc<ArtifactSet>, ArtifactError> {
        let set = Arc::new(self.read_all()?);
        let mut resident = self.resident.write().unwrap_or_else(PoisonError::into_inner);
        *resident = Some(Arc::clone(&set));
        Ok(set)
    }

    pub fn resident(&self) -> Option<Arc<ArtifactSet>> {
        self.resident
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn read_all(&self) -> Result<ArtifactSet, ArtifactError> {
        let stress = self.read_bundle(PredictionDomain::Stress)?;
        let health_risk = self.read_bundle(PredictionDomain::HealthRisk)?;
        let set = ArtifactSet::new(stress, health_risk);
        tracing::info!(loaded_at = %set.loaded_at, "model artifacts resident");
        Ok(set)
    }

    fn read_bundle(
        &self,
        domain: PredictionDomain,
    ) -> Result<ModelArtifactBundle, ArtifactError> {
        let paths = self.paths.for_domain(domain);
        let bundle = ModelArtifactBundle::load(domain, &paths)?;
        tracing::info!(
            %domain,
            model = %paths.model.display(),
            classes = bundle.target_encoder.len(),
            features = bundle.model.num_features(),
            "model bundle loaded"
        );
        Ok(bundle)
    }
}
