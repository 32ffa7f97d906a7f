//! Stage output.

use super::StageArtifact;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a successful stage reports back to the orchestrator.
///
/// Failures are not outputs: a stage returns `Err(PipelineError)` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    /// Artifacts the stage left on disk.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<StageArtifact>,

    /// Additional summary values.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, serde_json::Value>,
}

impl StageOutput {
    /// Creates an output with no artifacts.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self::default()
    }

    /// Appends an artifact.
    #[must_use]
    pub fn with_artifact(mut self, artifact: StageArtifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    /// Adds a summary value.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Looks up an artifact by name.
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&StageArtifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}
