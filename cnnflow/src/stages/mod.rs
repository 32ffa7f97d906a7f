//! Stage trait and the pipeline's stages.
//!
//! Stages are the units of work the orchestrator runs in order. Each stage
//! resolves its own configuration from the [`PipelineContext`] on every run
//! and reports the artifacts it left on disk.

mod data_ingestion;
mod prepare_base_model;
mod result;

pub use data_ingestion::DataIngestionStage;
pub use prepare_base_model::PrepareBaseModelStage;
pub use result::StageReport;

use crate::core::StageOutput;
use crate::errors::PipelineError;
use crate::pipeline::PipelineContext;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Executes the stage.
    ///
    /// # Errors
    ///
    /// Returns the first error the stage hits; the orchestrator stops the
    /// run and hands it to the caller unchanged.
    async fn execute(&self, ctx: &PipelineContext) -> Result<StageOutput, PipelineError>;
}
