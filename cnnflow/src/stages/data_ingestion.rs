//! Data ingestion stage.

use super::Stage;
use crate::components::{DataIngestion, Downloader, HttpDownloader};
use crate::constants::STAGE_DATA_INGESTION;
use crate::core::{ArtifactKind, StageArtifact, StageOutput};
use crate::errors::PipelineError;
use crate::pipeline::PipelineContext;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Downloads and extracts the dataset archive.
#[derive(Clone)]
pub struct DataIngestionStage {
    downloader: Arc<dyn Downloader>,
}

impl DataIngestionStage {
    /// Creates the stage with the given downloader.
    #[must_use]
    pub fn new(downloader: Arc<dyn Downloader>) -> Self {
        Self { downloader }
    }
}

impl Default for DataIngestionStage {
    fn default() -> Self {
        Self::new(Arc::new(HttpDownloader::new()))
    }
}

impl fmt::Debug for DataIngestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataIngestionStage").finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for DataIngestionStage {
    fn name(&self) -> &str {
        STAGE_DATA_INGESTION
    }

    async fn execute(&self, ctx: &PipelineContext) -> Result<StageOutput, PipelineError> {
        let config = ctx.configuration_manager()?.get_data_ingestion_config()?;
        let ingestion = DataIngestion::new(config, Arc::clone(&self.downloader));

        let archive = ingestion.download_file().await?;
        let entries = ingestion.extractor().await?;

        let extracted = StageArtifact::new(
            ArtifactKind::Directory,
            "unzip_dir",
            &ingestion.config().unzip_dir,
        )
        .with_metadata("entries", serde_json::json!(entries));

        Ok(StageOutput::ok_empty()
            .with_artifact(archive)
            .with_artifact(extracted)
            .with_data("entries", serde_json::json!(entries)))
    }
}
