//! Model export and serialization module
//!
//! Persists a trained scaler and classifier as a bound pair of binary
//! artifacts (`scaler.bin`, `model.bin`) and loads them back with integrity
//! and pairing checks.

mod artifact;
mod store;

pub use artifact::{ArtifactEnvelope, ArtifactHeader, ArtifactKind};
pub use store::{
    check_compatible, ArtifactMetadata, ArtifactPair, ArtifactPaths, ArtifactStore, MODEL_FILE,
    SCALER_FILE,
};
