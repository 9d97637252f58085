//! Binary artifact envelope
//!
//! Every persisted artifact is a bincode-encoded [`ArtifactEnvelope`]: magic
//! bytes, a format version, a header describing the pair it belongs to, the
//! bincode payload, and an FNV-1a checksum of that payload.

use crate::error::{Result, ScoutError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Which half of the pair an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Scaler,
    Classifier,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Scaler => write!(f, "scaler"),
            ArtifactKind::Classifier => write!(f, "classifier"),
        }
    }
}

/// Metadata stored in front of the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub kind: ArtifactKind,
    /// Shared by the scaler and classifier written in the same save
    pub pair_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Crate version that wrote the artifact
    pub crate_version: String,
    /// Feature order the payload was fitted on
    pub feature_names: Vec<String>,
}

impl ArtifactHeader {
    pub fn new(kind: ArtifactKind, pair_id: Uuid, created_at: DateTime<Utc>, feature_names: Vec<String>) -> Self {
        Self {
            kind,
            pair_id,
            created_at,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            feature_names,
        }
    }
}

/// Serialized artifact wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope {
    /// Magic bytes for format detection
    pub magic: [u8; 4],
    pub format_version: u32,
    pub header: ArtifactHeader,
    /// bincode-encoded scaler or classifier
    pub payload: Vec<u8>,
    /// FNV-1a of `payload`
    pub checksum: u64,
}

impl ArtifactEnvelope {
    /// Magic bytes for scout artifact files
    pub const MAGIC: [u8; 4] = *b"PUBS";
    /// Current format version; only this version can be read back
    pub const VERSION: u32 = 1;

    /// Encode `value` and wrap it
    pub fn seal<T: Serialize>(header: ArtifactHeader, value: &T) -> Result<Self> {
        let payload = bincode::serialize(value)
            .map_err(|e| ScoutError::SerializationError(format!("Failed to serialize {}: {}", header.kind, e)))?;
        let checksum = compute_checksum(&payload);
        Ok(Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            header,
            payload,
            checksum,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode and verify an envelope read from `path`.
    ///
    /// Any failure means the file is not a usable artifact and is reported
    /// as [`ScoutError::ArtifactNotFound`].
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self> {
        if bytes.len() < Self::MAGIC.len() || bytes[..Self::MAGIC.len()] != Self::MAGIC {
            return Err(ScoutError::artifact_not_found(path, "not a scout artifact (bad magic bytes)"));
        }

        let envelope: Self = bincode::deserialize(bytes)
            .map_err(|e| ScoutError::artifact_not_found(path, format!("corrupt artifact: {}", e)))?;

        if envelope.format_version != Self::VERSION {
            return Err(ScoutError::artifact_not_found(
                path,
                format!(
                    "unsupported artifact format version {} (expected {})",
                    envelope.format_version,
                    Self::VERSION
                ),
            ));
        }
        if !envelope.verify_checksum() {
            return Err(ScoutError::artifact_not_found(path, "checksum mismatch"));
        }

        Ok(envelope)
    }

    /// Decode the payload
    pub fn open<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        bincode::deserialize(&self.payload).map_err(|e| {
            ScoutError::artifact_not_found(path, format!("corrupt {} payload: {}", self.header.kind, e))
        })
    }

    pub fn verify_checksum(&self) -> bool {
        compute_checksum(&self.payload) == self.checksum
    }
}

/// FNV-1a hash
fn compute_checksum(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    data.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ *byte as u64).wrapping_mul(FNV_PRIME)
    })
}
