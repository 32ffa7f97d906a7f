//! Prepare base model stage.

use super::Stage;
use crate::components::PrepareBaseModel;
use crate::constants::STAGE_PREPARE_BASE_MODEL;
use crate::core::{ArtifactKind, StageArtifact, StageOutput};
use crate::errors::PipelineError;
use crate::model::{BuiltinZoo, ModelZoo, Network};
use crate::pipeline::PipelineContext;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Fetches the pretrained network and saves it with a new classification
/// head.
#[derive(Debug, Clone)]
pub struct PrepareBaseModelStage {
    zoo: Arc<dyn ModelZoo>,
}

impl PrepareBaseModelStage {
    /// Creates the stage with the given zoo.
    #[must_use]
    pub fn new(zoo: Arc<dyn ModelZoo>) -> Self {
        Self { zoo }
    }
}

impl Default for PrepareBaseModelStage {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinZoo))
    }
}

fn model_artifact(name: &str, path: &Path, network: &Network) -> StageArtifact {
    StageArtifact::new(ArtifactKind::Model, name, path)
        .with_metadata("architecture", serde_json::json!(network.name))
        .with_metadata("layers", serde_json::json!(network.layers().len()))
        .with_metadata("total_params", serde_json::json!(network.total_params()))
        .with_metadata("trainable_params", serde_json::json!(network.trainable_params()))
}

#[async_trait]
impl Stage for PrepareBaseModelStage {
    fn name(&self) -> &str {
        STAGE_PREPARE_BASE_MODEL
    }

    async fn execute(&self, ctx: &PipelineContext) -> Result<StageOutput, PipelineError> {
        let config = ctx.configuration_manager()?.get_prepare_base_model_config()?;
        let mut component = PrepareBaseModel::new(config.clone(), Arc::clone(&self.zoo));

        let base = model_artifact("base_model", &config.base_model_path, component.get_base_model()?);
        let full = component.update_base_model()?;
        info!("Updated model summary:\n{}", full.summary());
        let updated = model_artifact("updated_base_model", &config.updated_base_model_path, full);

        Ok(StageOutput::ok_empty()
            .with_artifact(base)
            .with_artifact(updated)
            .with_data("classes", serde_json::json!(config.params_classes)))
    }
}
