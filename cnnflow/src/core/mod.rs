//! Core domain types shared by stages and the orchestrator.
//!
//! This module contains:
//! - Stage status
//! - Stage output and the artifacts it reports
//! - Lifecycle events

mod artifact;
mod event;
mod output;
mod status;

pub use artifact::{ArtifactKind, StageArtifact};
pub use event::StageEvent;
pub use output::StageOutput;
pub use status::StageStatus;
