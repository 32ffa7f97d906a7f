//! Network descriptors and the pretrained model zoo.
//!
//! This module provides:
//! - [`Network`], a sequential descriptor with per-layer trainability
//! - [`ModelZoo`], the seam to pretrained architectures
//! - Compile settings and JSON persistence

mod compile;
mod network;
mod store;
mod zoo;

pub use compile::{compile, CompileSpec, Loss, Metric, Optimizer};
pub use network::{Activation, Layer, LayerId, LayerKind, Network};
pub use store::{load_model, save_model};
pub use zoo::{Architecture, BuiltinZoo, ModelZoo, PretrainedRequest};
