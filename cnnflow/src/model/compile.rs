//! Optimizer, loss, and metric bindings recorded on a network.

use super::network::Network;
use crate::errors::ModelError;
use serde::{Deserialize, Serialize};

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Optimizer {
    /// Adam with the given learning rate.
    Adam {
        /// Step size.
        learning_rate: f64,
    },
}

/// Training loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// Cross-entropy over one-hot labels.
    CategoricalCrossentropy,
}

/// Evaluation metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Fraction of correct predictions.
    Accuracy,
}

/// Everything bound to a network at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileSpec {
    /// Optimizer.
    pub optimizer: Optimizer,
    /// Loss.
    pub loss: Loss,
    /// Metrics reported during training.
    pub metrics: Vec<Metric>,
}

impl CompileSpec {
    /// Adam at `learning_rate`, categorical cross-entropy, accuracy.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidHyperparameter`] unless the learning rate
    /// is finite and positive.
    pub fn adam_categorical(learning_rate: f64) -> Result<Self, ModelError> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "learning_rate".to_string(),
                reason: format!("must be finite and positive, got {learning_rate}"),
            });
        }
        Ok(Self {
            optimizer: Optimizer::Adam { learning_rate },
            loss: Loss::CategoricalCrossentropy,
            metrics: vec![Metric::Accuracy],
        })
    }
}

/// Binds the optimizer, loss, and metrics to `network`.
pub fn compile(network: &mut Network, spec: CompileSpec) {
    tracing::debug!(
        network = %network.name,
        optimizer = ?spec.optimizer,
        loss = ?spec.loss,
        "Compiling network"
    );
    network.set_compile(spec);
}
