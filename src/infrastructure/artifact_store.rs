use crate::application::ml::forest::RandomForestClassifier;
use crate::application::ml::model::{TrainedModel, TrainingMetadata};
use crate::domain::errors::{LoanError, TrainingError};
use crate::domain::ml::feature_registry::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Bumped whenever the on-disk layout changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArtifactOut<'a> {
    format_version: u32,
    feature_names: &'a FeatureSchema,
    metadata: &'a TrainingMetadata,
    model: &'a RandomForestClassifier,
}

#[derive(Deserialize)]
struct ArtifactIn {
    format_version: u32,
    feature_names: FeatureSchema,
    metadata: TrainingMetadata,
    model: RandomForestClassifier,
}

/// Single-file JSON store for a trained model and its feature schema.
pub struct ArtifactStore {
    file_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }

    /// Writes the artifact atomically: temp file first, then rename over the target.
    pub fn save(&self, model: &TrainedModel) -> Result<(), TrainingError> {
        let content = serde_json::to_string(&ArtifactOut {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: model.schema(),
            metadata: model.metadata(),
            model: model.classifier(),
        })?;

        let write_err = |source: std::io::Error| TrainingError::ArtifactWrite {
            path: self.file_path.clone(),
            source,
        };

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(write_err)?;
        if let Err(e) = fs::rename(&temp_path, &self.file_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(e));
        }

        info!("Saved model artifact to {:?}", self.file_path);
        Ok(())
    }

    /// Loads and validates the artifact. A missing or unreadable file is
    /// `ArtifactNotFound`; anything that reads but does not hold together is
    /// `ArtifactCorrupt`.
    pub fn load(&self) -> Result<TrainedModel, LoanError> {
        let content =
            fs::read_to_string(&self.file_path).map_err(|source| LoanError::ArtifactNotFound {
                path: self.file_path.clone(),
                source,
            })?;

        let corrupt = |reason: String| LoanError::ArtifactCorrupt {
            path: self.file_path.clone(),
            reason,
        };

        let artifact: ArtifactIn =
            serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(corrupt(format!(
                "format version {} is not supported (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        let model = TrainedModel::new(artifact.feature_names, artifact.model, artifact.metadata)
            .map_err(corrupt)?;

        info!(
            "Loaded model artifact from {:?} ({} features, trained {}, accuracy {:.2}%)",
            self.file_path,
            model.schema().len(),
            model.metadata().trained_at.format("%Y-%m-%d %H:%M:%S"),
            model.metadata().accuracy * 100.0
        );
        Ok(model)
    }
}
