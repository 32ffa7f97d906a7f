//! # cnnflow
//!
//! A stage pipeline that prepares a transfer-learning image classifier.
//!
//! The pipeline runs two stages over a shared YAML configuration:
//!
//! - **Data ingestion**: resolves a Drive share link, downloads the dataset
//!   archive, and extracts it
//! - **Prepare base model**: fetches a pretrained VGG16 from the model zoo,
//!   attaches a softmax head sized to the class count, freezes the inherited
//!   layers, compiles, and saves both networks
//!
//! Stages exchange nothing in memory; every artifact lands on disk at a
//! configured path, so each stage can also run on its own.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cnnflow::prelude::*;
//!
//! let pipeline = TrainingPipeline::standard(
//!     Arc::new(HttpDownloader::new()),
//!     Arc::new(BuiltinZoo),
//! )?;
//! let ctx = PipelineContext::new("config/config.yaml", Params::default());
//! let reports = pipeline.run(&ctx).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod components;
pub mod config;
pub mod constants;
pub mod core;
pub mod errors;
pub mod events;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::components::{DataIngestion, Downloader, HttpDownloader, PrepareBaseModel};
    pub use crate::config::{
        read_yaml, ConfigBox, ConfigurationManager, DataIngestionConfig, ImageShape, Params,
        PrepareBaseModelConfig, WeightsSource,
    };
    pub use crate::core::{ArtifactKind, StageArtifact, StageEvent, StageOutput, StageStatus};
    pub use crate::errors::{
        ArchiveError, ConfigError, DownloadError, ErrorClass, ModelError, PipelineError,
        PipelineValidationError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::model::{Architecture, BuiltinZoo, ModelZoo, Network};
    pub use crate::observability::{init_logging, LogFormat, LoggingConfig};
    pub use crate::pipeline::{PipelineBuilder, PipelineContext, TrainingPipeline};
    pub use crate::stages::{DataIngestionStage, PrepareBaseModelStage, Stage, StageReport};
    pub use crate::utils::{create_directories, iso_timestamp, Timestamp};
    pub use std::sync::Arc;
}
