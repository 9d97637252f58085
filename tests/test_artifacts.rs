//! Integration test: artifact persistence and pairing

use ndarray::Array2;
use pubg_scout::data::{load_csv, FeatureVector};
use pubg_scout::export::{ArtifactStore, MODEL_FILE, SCALER_FILE};
use pubg_scout::inference::{predict, Predictor};
use pubg_scout::preprocessing::StandardScaler;
use pubg_scout::training::{train, TrainedArtifacts, TrainingConfig};
use pubg_scout::ScoutError;
use std::path::PathBuf;

fn fixture_model() -> TrainedArtifacts {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pubg_small.csv");
    train(&load_csv(path).unwrap(), &TrainingConfig::default()).unwrap()
}

#[test]
fn test_save_and_load_pair() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = fixture_model();
    let store = ArtifactStore::new(dir.path());

    let paths = store.save(&artifacts).unwrap();
    assert_eq!(paths.scaler, dir.path().join(SCALER_FILE));
    assert_eq!(paths.classifier, dir.path().join(MODEL_FILE));
    assert!(paths.scaler.exists());
    assert!(paths.classifier.exists());

    // No temp files left behind
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let pair = store.load().unwrap();
    assert_eq!(pair.scaler, artifacts.scaler);
    assert_eq!(pair.classifier, artifacts.classifier);
    assert_eq!(pair.report, artifacts.report);
    assert_eq!(pair.metadata.feature_names, artifacts.feature_names().to_vec());
    assert_eq!(pair.metadata.crate_version, env!("CARGO_PKG_VERSION"));

    let v = FeatureVector::default();
    let before = predict(&v, &artifacts.scaler, &artifacts.classifier).unwrap();
    let after = predict(&v, &pair.scaler, &pair.classifier).unwrap();
    assert_eq!(before.probability.to_bits(), after.probability.to_bits());
}

#[test]
fn test_predictor_counts_and_shares() {
    let dir = tempfile::tempdir().unwrap();
    ArtifactStore::new(dir.path()).save(&fixture_model()).unwrap();

    let predictor = Predictor::load(dir.path()).unwrap();
    let clone = predictor.clone();
    predictor.predict(&FeatureVector::default()).unwrap();
    clone.predict(&FeatureVector::zeros()).unwrap();
    assert_eq!(predictor.predictions_served(), 2);

    let info = predictor.model_info();
    assert_eq!(info.weights.len(), 8);
    assert_eq!(info.means.len(), 8);
    assert_eq!(info.pair_id, predictor.metadata().pair_id);
}

#[test]
fn test_missing_scaler_file() {
    let dir = tempfile::tempdir().unwrap();
    ArtifactStore::new(dir.path()).save(&fixture_model()).unwrap();
    std::fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

    let err = Predictor::load(dir.path()).unwrap_err();
    match err {
        ScoutError::ArtifactNotFound { path, .. } => assert!(path.ends_with(SCALER_FILE)),
        other => panic!("expected ArtifactNotFound, got {:?}", other),
    }
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Predictor::load(dir.path()),
        Err(ScoutError::ArtifactNotFound { .. })
    ));
}

#[test]
fn test_corrupt_model_file() {
    let dir = tempfile::tempdir().unwrap();
    ArtifactStore::new(dir.path()).save(&fixture_model()).unwrap();

    let model_path = dir.path().join(MODEL_FILE);
    let mut bytes = std::fs::read(&model_path).unwrap();
    let last = bytes.len() - 20;
    bytes[last] ^= 0x5A;
    std::fs::write(&model_path, &bytes).unwrap();

    assert!(matches!(
        Predictor::load(dir.path()),
        Err(ScoutError::ArtifactNotFound { .. })
    ));

    std::fs::write(&model_path, b"not an artifact").unwrap();
    assert!(matches!(
        Predictor::load(dir.path()),
        Err(ScoutError::ArtifactNotFound { .. })
    ));
}

#[test]
fn test_files_from_different_saves_are_refused() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let artifacts = fixture_model();
    ArtifactStore::new(first.path()).save(&artifacts).unwrap();
    ArtifactStore::new(second.path()).save(&artifacts).unwrap();

    std::fs::copy(
        second.path().join(MODEL_FILE),
        first.path().join(MODEL_FILE),
    )
    .unwrap();

    assert!(matches!(
        Predictor::load(first.path()),
        Err(ScoutError::ArtifactMismatch(_))
    ));
}

#[test]
fn test_swapped_files_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    ArtifactStore::new(dir.path()).save(&fixture_model()).unwrap();

    let store = ArtifactStore::new(dir.path()).with_file_names(MODEL_FILE, SCALER_FILE);
    assert!(matches!(store.load(), Err(ScoutError::ArtifactMismatch(_))));
}

#[test]
fn test_mismatched_feature_count() {
    let dir = tempfile::tempdir().unwrap();
    let mut artifacts = fixture_model();

    let names: Vec<String> = ["Kills", "Damage", "Boosts"].iter().map(|s| s.to_string()).collect();
    let x = Array2::from_shape_vec((2, 3), vec![0.0, 10.0, 1.0, 4.0, 90.0, 3.0]).unwrap();
    let mut narrow = StandardScaler::new();
    narrow.fit(&x, &names).unwrap();
    artifacts.scaler = narrow;

    ArtifactStore::new(dir.path()).save(&artifacts).unwrap();

    assert!(matches!(
        Predictor::load(dir.path()),
        Err(ScoutError::ArtifactMismatch(_))
    ));
    assert!(matches!(
        predict(&FeatureVector::default(), &artifacts.scaler, &artifacts.classifier),
        Err(ScoutError::ArtifactMismatch(_))
    ));
}

#[test]
fn test_retrain_replaces_pair() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let artifacts = fixture_model();

    store.save(&artifacts).unwrap();
    let first_id = store.load().unwrap().metadata.pair_id;
    store.save(&artifacts).unwrap();
    let second_id = store.load().unwrap().metadata.pair_id;

    assert_ne!(first_id, second_id);
}

fn leftover_files(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp") || name.ends_with(".prev"))
        .collect()
}

#[test]
fn test_failed_save_keeps_previous_pair() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = fixture_model();
    ArtifactStore::new(dir.path()).save(&artifacts).unwrap();
    let original_id = ArtifactStore::new(dir.path()).load().unwrap().metadata.pair_id;

    // A non-empty directory where the classifier should go makes its rename fail
    let blocked = dir.path().join("blocked.bin");
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("keep"), b"x").unwrap();

    let store = ArtifactStore::new(dir.path()).with_file_names(SCALER_FILE, "blocked.bin");
    assert!(store.save(&artifacts).is_err());

    assert!(leftover_files(dir.path()).is_empty(), "{:?}", leftover_files(dir.path()));
    let pair = ArtifactStore::new(dir.path()).load().unwrap();
    assert_eq!(pair.metadata.pair_id, original_id);
}

#[test]
fn test_failed_first_save_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(MODEL_FILE)).unwrap();
    std::fs::write(dir.path().join(MODEL_FILE).join("keep"), b"x").unwrap();

    assert!(ArtifactStore::new(dir.path()).save(&fixture_model()).is_err());
    assert!(!dir.path().join(SCALER_FILE).exists());
    assert!(leftover_files(dir.path()).is_empty());
}

#[test]
fn test_interrupted_save_recovers_previous_scaler() {
    let dir = tempfile::tempdir().unwrap();
    let other = tempfile::tempdir().unwrap();
    let artifacts = fixture_model();
    ArtifactStore::new(dir.path()).save(&artifacts).unwrap();
    ArtifactStore::new(other.path()).save(&artifacts).unwrap();
    let original_id = ArtifactStore::new(dir.path()).load().unwrap().metadata.pair_id;

    // State after the scaler rename but before the classifier rename
    std::fs::rename(
        dir.path().join(SCALER_FILE),
        dir.path().join(format!("{}.prev", SCALER_FILE)),
    )
    .unwrap();
    std::fs::copy(other.path().join(SCALER_FILE), dir.path().join(SCALER_FILE)).unwrap();

    let pair = Predictor::load(dir.path()).unwrap();
    assert_eq!(pair.metadata().pair_id, original_id);

    // The next save completes normally and clears the leftover
    ArtifactStore::new(dir.path()).save(&artifacts).unwrap();
    assert!(leftover_files(dir.path()).is_empty());
    assert_ne!(ArtifactStore::new(dir.path()).load().unwrap().metadata.pair_id, original_id);
}
