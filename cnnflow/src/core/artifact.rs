//! Artifacts a stage leaves on disk.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// What kind of file-system artifact a stage produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A downloaded archive.
    Archive,
    /// A directory of extracted files.
    Directory,
    /// A serialized network.
    Model,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive => write!(f, "archive"),
            Self::Directory => write!(f, "directory"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// An artifact produced by a stage.
///
/// Stages never hand in-memory values to each other; the next stage finds
/// these artifacts on disk at their configured paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageArtifact {
    /// The kind of artifact.
    #[serde(rename = "type")]
    pub kind: ArtifactKind,

    /// A short name, unique within the stage.
    pub name: String,

    /// Where the artifact lives.
    pub path: PathBuf,

    /// Additional metadata (size, checksum, layer counts).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// When the artifact was recorded (ISO 8601).
    pub created_at: String,
}

impl StageArtifact {
    /// Creates a new stage artifact.
    #[must_use]
    pub fn new(kind: ArtifactKind, name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            metadata: HashMap::new(),
            created_at: crate::utils::iso_timestamp(),
        }
    }

    /// Adds metadata to the artifact.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the artifact as a JSON value for event payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind,
            "name": self.name,
            "path": self.path.display().to_string(),
            "metadata": self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_creation() {
        let artifact = StageArtifact::new(ArtifactKind::Archive, "data", "artifacts/data.zip")
            .with_metadata("size", serde_json::json!("~ 2 KB"));

        assert_eq!(artifact.kind, ArtifactKind::Archive);
        assert_eq!(artifact.path, PathBuf::from("artifacts/data.zip"));
        assert_eq!(artifact.metadata.len(), 1);
    }

    #[test]
    fn test_artifact_to_json() {
        let json = StageArtifact::new(ArtifactKind::Model, "base_model", "m/base.json")
            .with_metadata("layers", serde_json::json!(19))
            .to_json();

        assert_eq!(json["type"], "model");
        assert_eq!(json["path"], "m/base.json");
        assert_eq!(json["metadata"]["layers"], 19);
    }
}
