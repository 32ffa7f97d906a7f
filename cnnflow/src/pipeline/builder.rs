//! Pipeline builder with validation.

use super::TrainingPipeline;
use crate::errors::PipelineValidationError;
use crate::stages::Stage;
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// Stages run in the order they are added.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    ///
    /// # Errors
    ///
    /// Returns an error if a stage with the same name is already registered.
    pub fn stage(mut self, stage: Arc<dyn Stage>) -> Result<Self, PipelineValidationError> {
        if self.stages.iter().any(|s| s.name() == stage.name()) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' is registered twice",
                stage.name()
            ))
            .with_stages(vec![stage.name().to_string()]));
        }
        self.stages.push(stage);
        Ok(self)
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no stages.
    pub fn build(self) -> Result<TrainingPipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Pipeline '{}' has no stages",
                self.name
            )));
        }
        Ok(TrainingPipeline::new(self.name, self.stages))
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{DataIngestionStage, PrepareBaseModelStage};

    #[test]
    fn test_builder_creation() {
        let builder = PipelineBuilder::new("training");
        assert_eq!(builder.name(), "training");
        assert_eq!(builder.stage_count(), 0);
    }

    #[test]
    fn test_builder_preserves_order() {
        let pipeline = PipelineBuilder::new("training")
            .stage(Arc::new(DataIngestionStage::default()))
            .unwrap()
            .stage(Arc::new(PrepareBaseModelStage::default()))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(pipeline.stage_names(), vec!["data_ingestion", "prepare_base_model"]);
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let err = PipelineBuilder::new("training")
            .stage(Arc::new(PrepareBaseModelStage::default()))
            .unwrap()
            .stage(Arc::new(PrepareBaseModelStage::default()))
            .unwrap_err();

        assert_eq!(err.stages, vec!["prepare_base_model".to_string()]);
    }

    #[test]
    fn test_builder_empty_build() {
        let err = PipelineBuilder::new("training").build().unwrap_err();
        assert!(err.message.contains("no stages"));
    }
}
