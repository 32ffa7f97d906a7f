//! Pipeline building and execution.
//!
//! This module provides:
//! - The run context shared by all stages
//! - Pipeline builder with validation
//! - The sequential runner

mod builder;
mod context;
mod runner;

pub use builder::PipelineBuilder;
pub use context::PipelineContext;
pub use runner::TrainingPipeline;
