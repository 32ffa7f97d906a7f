//! Configuration loading and per-stage config resolution.
//!
//! This module provides:
//! - A YAML loader returning a read-only [`ConfigBox`]
//! - Typed stage records and build-time [`Params`]
//! - The [`ConfigurationManager`] that turns both into stage configs

mod entity;
mod loader;
mod manager;

pub use entity::{
    DataIngestionConfig, ImageShape, Params, PrepareBaseModelConfig, WeightsSource,
};
pub use loader::{read_yaml, ConfigBox};
pub use manager::ConfigurationManager;
