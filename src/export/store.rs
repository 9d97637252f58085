//! Paired scaler / classifier persistence

use super::artifact::{ArtifactEnvelope, ArtifactHeader, ArtifactKind};
use crate::error::{Result, ScoutError};
use crate::preprocessing::StandardScaler;
use crate::training::{FitReport, LogisticRegression, ModelMetrics, TrainedArtifacts, TrainingConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Default scaler file name
pub const SCALER_FILE: &str = "scaler.bin";
/// Default classifier file name
pub const MODEL_FILE: &str = "model.bin";

/// Classifier payload: the model plus how it was trained
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassifierPayload {
    model: LogisticRegression,
    report: FitReport,
    metrics: ModelMetrics,
    config: TrainingConfig,
}

/// Where a save put the two files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub classifier: PathBuf,
}

/// Header facts shared by both halves of a loaded pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub pair_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub crate_version: String,
    pub format_version: u32,
    pub feature_names: Vec<String>,
}

/// A verified scaler / classifier pair
#[derive(Debug, Clone)]
pub struct ArtifactPair {
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
    pub report: FitReport,
    pub metrics: ModelMetrics,
    pub config: TrainingConfig,
    pub metadata: ArtifactMetadata,
}

impl ArtifactPair {
    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }
}

/// Reads and writes artifact pairs in one directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    scaler_file: String,
    model_file: String,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            scaler_file: SCALER_FILE.to_string(),
            model_file: MODEL_FILE.to_string(),
        }
    }

    pub fn with_file_names(mut self, scaler: impl Into<String>, model: impl Into<String>) -> Self {
        self.scaler_file = scaler.into();
        self.model_file = model.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    /// Persist both halves under a fresh pair id.
    ///
    /// Each file is written to a `.tmp` sibling and renamed into place, the
    /// classifier last. The scaler being replaced is kept as a `.prev`
    /// sibling until the classifier rename succeeds, so [`load`](Self::load)
    /// can still assemble the old pair if the process dies in between. A
    /// failed save removes its temp files and puts the old scaler back.
    pub fn save(&self, artifacts: &TrainedArtifacts) -> Result<ArtifactPaths> {
        fs::create_dir_all(&self.dir)?;

        let pair_id = Uuid::new_v4();
        let created_at = Utc::now();
        let feature_names = artifacts.feature_names().to_vec();

        let scaler = ArtifactEnvelope::seal(
            ArtifactHeader::new(ArtifactKind::Scaler, pair_id, created_at, feature_names.clone()),
            &artifacts.scaler,
        )?;
        let classifier = ArtifactEnvelope::seal(
            ArtifactHeader::new(ArtifactKind::Classifier, pair_id, created_at, feature_names),
            &ClassifierPayload {
                model: artifacts.classifier.clone(),
                report: artifacts.report,
                metrics: artifacts.metrics.clone(),
                config: artifacts.config.clone(),
            },
        )?;

        let paths = ArtifactPaths {
            scaler: self.scaler_path(),
            classifier: self.model_path(),
        };

        if let Err(e) = commit_pair(&paths, &scaler.to_bytes()?, &classifier.to_bytes()?) {
            for tmp in [tmp_path(&paths.scaler), tmp_path(&paths.classifier)] {
                let _ = fs::remove_file(tmp);
            }
            warn!(dir = %self.dir.display(), error = %e, "Artifact save failed, previous pair kept");
            return Err(e);
        }

        info!(
            pair_id = %pair_id,
            scaler = %paths.scaler.display(),
            classifier = %paths.classifier.display(),
            "Saved artifact pair"
        );

        Ok(paths)
    }

    /// Load and cross-check both halves.
    ///
    /// Nothing is returned unless both files decode and agree on pair id,
    /// feature order and dimensionality.
    pub fn load(&self) -> Result<ArtifactPair> {
        let scaler_path = self.scaler_path();
        let model_path = self.model_path();

        let mut scaler_env = read_envelope(&scaler_path, ArtifactKind::Scaler)?;
        let model_env = read_envelope(&model_path, ArtifactKind::Classifier)?;

        // A save interrupted between its two renames leaves the old scaler in `.prev`
        if scaler_env.header.pair_id != model_env.header.pair_id {
            if let Some(previous) = self.previous_scaler(model_env.header.pair_id) {
                warn!(
                    pair_id = %model_env.header.pair_id,
                    "Recovered scaler from an interrupted save"
                );
                scaler_env = previous;
            }
        }

        if scaler_env.header.pair_id != model_env.header.pair_id {
            return Err(ScoutError::ArtifactMismatch(format!(
                "{} and {} were not saved together (pair ids {} and {})",
                scaler_path.display(),
                model_path.display(),
                scaler_env.header.pair_id,
                model_env.header.pair_id
            )));
        }
        if scaler_env.header.feature_names != model_env.header.feature_names {
            return Err(ScoutError::ArtifactMismatch(format!(
                "feature order differs: scaler {:?}, classifier {:?}",
                scaler_env.header.feature_names, model_env.header.feature_names
            )));
        }

        let scaler: StandardScaler = scaler_env.open(&scaler_path)?;
        let payload: ClassifierPayload = model_env.open(&model_path)?;

        check_compatible(&scaler, &payload.model)?;
        if scaler.feature_names() != scaler_env.header.feature_names.as_slice() {
            return Err(ScoutError::ArtifactMismatch(
                "scaler feature names disagree with its header".to_string(),
            ));
        }

        let header = scaler_env.header;
        if header.crate_version != env!("CARGO_PKG_VERSION") {
            warn!(
                written_by = %header.crate_version,
                running = env!("CARGO_PKG_VERSION"),
                "Artifacts were written by a different crate version"
            );
        }

        info!(
            pair_id = %header.pair_id,
            features = scaler.n_features(),
            dir = %self.dir.display(),
            "Loaded artifact pair"
        );

        Ok(ArtifactPair {
            scaler,
            classifier: payload.model,
            report: payload.report,
            metrics: payload.metrics,
            config: payload.config,
            metadata: ArtifactMetadata {
                pair_id: header.pair_id,
                created_at: header.created_at,
                crate_version: header.crate_version,
                format_version: scaler_env.format_version,
                feature_names: header.feature_names,
            },
        })
    }

    fn previous_scaler(&self, pair_id: Uuid) -> Option<ArtifactEnvelope> {
        let envelope = read_envelope(&previous_path(&self.scaler_path()), ArtifactKind::Scaler).ok()?;
        (envelope.header.pair_id == pair_id).then_some(envelope)
    }
}

/// Stage both files, then swap them in scaler first
fn commit_pair(paths: &ArtifactPaths, scaler_bytes: &[u8], classifier_bytes: &[u8]) -> Result<()> {
    let scaler_tmp = tmp_path(&paths.scaler);
    let classifier_tmp = tmp_path(&paths.classifier);
    let previous = previous_path(&paths.scaler);

    fs::write(&scaler_tmp, scaler_bytes)?;
    fs::write(&classifier_tmp, classifier_bytes)?;

    let kept_previous = match fs::rename(&paths.scaler, &previous) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };

    let swapped = fs::rename(&scaler_tmp, &paths.scaler)
        .and_then(|()| fs::rename(&classifier_tmp, &paths.classifier));
    if let Err(e) = swapped {
        if kept_previous {
            let _ = fs::rename(&previous, &paths.scaler);
        } else {
            let _ = fs::remove_file(&paths.scaler);
        }
        return Err(e.into());
    }

    if kept_previous {
        if let Err(e) = fs::remove_file(&previous) {
            warn!(path = %previous.display(), error = %e, "Could not remove previous scaler");
        }
    }
    Ok(())
}

/// Scaler and classifier must be fitted over the same number of features
pub fn check_compatible(scaler: &StandardScaler, classifier: &LogisticRegression) -> Result<()> {
    match classifier.n_features() {
        Some(n) if n == scaler.n_features() && scaler.is_fitted() => Ok(()),
        Some(n) => Err(ScoutError::ArtifactMismatch(format!(
            "scaler has {} features but classifier has {}",
            scaler.n_features(),
            n
        ))),
        None => Err(ScoutError::ArtifactMismatch(
            "classifier has no fitted coefficients".to_string(),
        )),
    }
}

fn read_envelope(path: &Path, expected: ArtifactKind) -> Result<ArtifactEnvelope> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ScoutError::artifact_not_found(path, "file does not exist"),
        _ => ScoutError::artifact_not_found(path, e.to_string()),
    })?;

    let envelope = ArtifactEnvelope::from_bytes(&bytes, path)?;
    if envelope.header.kind != expected {
        return Err(ScoutError::ArtifactMismatch(format!(
            "{} holds a {}, expected a {}",
            path.display(),
            envelope.header.kind,
            expected
        )));
    }
    Ok(envelope)
}

fn tmp_path(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}

fn previous_path(path: &Path) -> PathBuf {
    with_suffix(path, ".prev")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmp_path() {
        assert_eq!(tmp_path(Path::new("/a/b/model.bin")), PathBuf::from("/a/b/model.bin.tmp"));
        assert_eq!(previous_path(Path::new("/a/scaler.bin")), PathBuf::from("/a/scaler.bin.prev"));
    }

    #[test]
    fn test_default_file_names() {
        let store = ArtifactStore::new("/data");
        assert_eq!(store.scaler_path(), PathBuf::from("/data/scaler.bin"));
        assert_eq!(store.model_path(), PathBuf::from("/data/model.bin"));

        let store = store.with_file_names("s.bin", "m.bin");
        assert_eq!(store.model_path(), PathBuf::from("/data/m.bin"));
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let store = ArtifactStore::new("/definitely/not/a/real/dir");
        assert!(matches!(store.load(), Err(ScoutError::ArtifactNotFound { .. })));
    }
}
