//! Sequential pipeline execution.

use super::{PipelineBuilder, PipelineContext};
use crate::components::Downloader;
use crate::core::{StageArtifact, StageEvent};
use crate::errors::{PipelineError, PipelineValidationError};
use crate::model::ModelZoo;
use crate::observability::{stage_span, SpanTimer};
use crate::stages::{DataIngestionStage, PrepareBaseModelStage, Stage, StageReport};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, Instrument};

/// An ordered list of stages run one after another.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
}

impl TrainingPipeline {
    pub(crate) fn new(name: String, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { name, stages }
    }

    /// Builds the standard pipeline: data ingestion, then base model
    /// preparation.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in stages; the builder's validation error is
    /// passed through.
    pub fn standard(
        downloader: Arc<dyn Downloader>,
        zoo: Arc<dyn ModelZoo>,
    ) -> Result<Self, PipelineValidationError> {
        PipelineBuilder::new("training")
            .stage(Arc::new(DataIngestionStage::new(downloader)))?
            .stage(Arc::new(PrepareBaseModelStage::new(zoo)))?
            .build()
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage names in run order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Keeps only the named stages, in pipeline order.
    ///
    /// # Errors
    ///
    /// Returns an error if `names` is empty or names a stage the pipeline
    /// does not have.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, PipelineValidationError> {
        let wanted: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        let unknown: Vec<String> = wanted
            .iter()
            .filter(|n| !self.stages.iter().any(|s| s.name() == **n))
            .map(|n| (*n).to_string())
            .collect();
        if !unknown.is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Unknown stages: {}; available: {}",
                unknown.join(", "),
                self.stage_names().join(", ")
            ))
            .with_stages(unknown));
        }

        let stages: Vec<Arc<dyn Stage>> = self
            .stages
            .iter()
            .filter(|s| wanted.contains(&s.name()))
            .cloned()
            .collect();
        if stages.is_empty() {
            return Err(PipelineValidationError::new("No stages selected"));
        }
        Ok(Self::new(self.name.clone(), stages))
    }

    /// Runs every stage in order and returns one report per stage.
    ///
    /// # Errors
    ///
    /// Stops at the first failing stage and returns its error unchanged;
    /// later stages do not run.
    pub async fn run(&self, ctx: &PipelineContext) -> Result<Vec<StageReport>, PipelineError> {
        let run_id = ctx.run_id().to_string();
        info!(pipeline = %self.name, run_id = %run_id, stages = self.stages.len(), "Pipeline started");

        let mut reports = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let name = stage.name();
            info!(">>>>>> stage {name} started <<<<<<");
            ctx.sink()
                .emit(&StageEvent::started(name).add_data("run_id", serde_json::json!(run_id)))
                .await;

            let started_at = Utc::now();
            let timer = SpanTimer::start(name);
            let result = stage
                .execute(ctx)
                .instrument(stage_span(name, &run_id))
                .await;
            let duration_ms = timer.finish();

            match result {
                Ok(output) => {
                    let artifacts: Vec<serde_json::Value> =
                        output.artifacts.iter().map(StageArtifact::to_json).collect();
                    ctx.sink()
                        .emit(
                            &StageEvent::completed(name, duration_ms)
                                .add_data("run_id", serde_json::json!(run_id))
                                .add_data("artifacts", serde_json::Value::Array(artifacts)),
                        )
                        .await;
                    info!(">>>>>> stage {name} completed <<<<<<\n\nx==========x");
                    reports.push(StageReport::completed(name, started_at, output.artifacts));
                }
                Err(e) => {
                    error!(
                        stage = name,
                        error = %e,
                        class = %e.class(),
                        retryable = e.is_retryable(),
                        duration_ms,
                        "Stage failed"
                    );
                    ctx.sink()
                        .emit(
                            &StageEvent::failed(name, &e.to_string())
                                .add_data("run_id", serde_json::json!(run_id))
                                .add_data("class", serde_json::json!(e.class())),
                        )
                        .await;
                    return Err(e);
                }
            }
        }

        info!(pipeline = %self.name, run_id = %run_id, "Pipeline completed");
        Ok(reports)
    }
}
