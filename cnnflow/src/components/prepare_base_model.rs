//! Pretrained base network preparation.

use crate::config::PrepareBaseModelConfig;
use crate::errors::{ModelError, PipelineError};
use crate::model::{
    compile, load_model, Activation, CompileSpec, LayerKind, ModelZoo, Network, PretrainedRequest,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Fetches the pretrained network and adapts its head to the target classes.
#[derive(Debug)]
pub struct PrepareBaseModel {
    config: PrepareBaseModelConfig,
    zoo: Arc<dyn ModelZoo>,
    base_model: Option<Network>,
    full_model: Option<Network>,
}

impl PrepareBaseModel {
    /// Creates the component.
    #[must_use]
    pub fn new(config: PrepareBaseModelConfig, zoo: Arc<dyn ModelZoo>) -> Self {
        Self {
            config,
            zoo,
            base_model: None,
            full_model: None,
        }
    }

    /// Returns the stage configuration.
    #[must_use]
    pub fn config(&self) -> &PrepareBaseModelConfig {
        &self.config
    }

    /// Returns the base network, if fetched or loaded.
    #[must_use]
    pub fn base_model(&self) -> Option<&Network> {
        self.base_model.as_ref()
    }

    /// Returns the head-adapted network, if built.
    #[must_use]
    pub fn full_model(&self) -> Option<&Network> {
        self.full_model.as_ref()
    }

    fn request(&self) -> PretrainedRequest {
        PretrainedRequest {
            architecture: self.config.params_architecture,
            input_shape: self.config.params_image_size,
            weights: self.config.params_weights.clone(),
            include_top: self.config.params_include_top,
        }
    }

    /// Requests the pretrained network and saves it to `base_model_path`.
    ///
    /// # Errors
    ///
    /// Returns the zoo's error unchanged, or a serialization error.
    pub fn get_base_model(&mut self) -> Result<&Network, PipelineError> {
        let request = self.request();
        info!(
            architecture = %request.architecture,
            input_shape = %request.input_shape,
            weights = %request.weights,
            include_top = request.include_top,
            "Fetching pretrained base model"
        );
        let network = self.zoo.pretrained(&request)?;
        Self::save_model(&self.config.base_model_path, &network)?;
        Ok(&*self.base_model.insert(network))
    }

    /// Re-requests the base network, attaches a softmax head sized to
    /// `params_classes`, freezes every inherited layer, compiles, and saves
    /// to `updated_base_model_path`.
    ///
    /// A `Flatten` layer is inserted only when the original head was dropped.
    ///
    /// # Errors
    ///
    /// Returns the zoo's error unchanged, an invalid-hyperparameter error, or
    /// a serialization error.
    pub fn prepare_model(&mut self) -> Result<&Network, PipelineError> {
        let mut network = self.zoo.pretrained(&self.request())?;
        network.freeze_all();
        if !self.config.params_include_top {
            network = attach(network, "flatten", LayerKind::Flatten)?;
        }
        let network = attach_classifier(
            network,
            self.config.params_classes,
            self.config.params_learning_rate,
        )?;

        Self::save_model(&self.config.updated_base_model_path, &network)?;
        Ok(&*self.full_model.insert(network))
    }

    /// Attaches `Flatten` and a `Dense(classes, softmax)` head to `model` and
    /// compiles it with Adam at `learning_rate`.
    ///
    /// With `freeze_all` every inherited layer is frozen. Otherwise, when
    /// `freeze_till` is `Some(n)` with `n > 0`, every inherited layer except
    /// the last `n` is frozen. The new head is always trainable.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidHyperparameter`] for zero classes or an
    /// unusable learning rate.
    pub fn create_model(
        mut model: Network,
        classes: usize,
        freeze_all: bool,
        freeze_till: Option<usize>,
        learning_rate: f64,
    ) -> Result<Network, ModelError> {
        if freeze_all {
            model.freeze_all();
        } else if let Some(n) = freeze_till.filter(|n| *n > 0) {
            model.freeze_all_but_last(n);
        }

        let model = attach(model, "flatten", LayerKind::Flatten)?;
        attach_classifier(model, classes, learning_rate)
    }

    /// Builds the fully frozen classifier from the base network and saves it
    /// to `updated_base_model_path`.
    ///
    /// Loads the base network from `base_model_path` when
    /// [`get_base_model`](Self::get_base_model) has not run in this process.
    ///
    /// # Errors
    ///
    /// Returns an error if the base network cannot be loaded, the head cannot
    /// be attached, or the result cannot be saved.
    pub fn update_base_model(&mut self) -> Result<&Network, PipelineError> {
        let base = match self.base_model.clone() {
            Some(network) => network,
            None => {
                debug!(path = %self.config.base_model_path.display(), "Loading base model");
                let network = load_model(&self.config.base_model_path)?;
                self.base_model = Some(network.clone());
                network
            }
        };

        let full = Self::create_model(
            base,
            self.config.params_classes,
            true,
            None,
            self.config.params_learning_rate,
        )?;
        Self::save_model(&self.config.updated_base_model_path, &full)?;
        Ok(&*self.full_model.insert(full))
    }

    /// Persists `model` at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Serialization`] if the write fails.
    pub fn save_model(path: &Path, model: &Network) -> Result<(), ModelError> {
        crate::model::save_model(path, model)
    }
}

fn attach_classifier(
    network: Network,
    classes: usize,
    learning_rate: f64,
) -> Result<Network, ModelError> {
    if classes == 0 {
        return Err(ModelError::InvalidHyperparameter {
            name: "classes".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let spec = CompileSpec::adam_categorical(learning_rate)?;
    let mut network = attach(
        network,
        "dense",
        LayerKind::Dense {
            units: classes,
            activation: Activation::Softmax,
        },
    )?;
    compile(&mut network, spec);
    Ok(network)
}

/// Appends a layer under the first free name in `base`, `base_1`, `base_2`...
fn attach(network: Network, base: &str, kind: LayerKind) -> Result<Network, ModelError> {
    let name = (0..)
        .map(|i| {
            if i == 0 {
                base.to_string()
            } else {
                format!("{base}_{i}")
            }
        })
        .find(|candidate| network.layer(candidate).is_none())
        .unwrap_or_else(|| base.to_string());

    let architecture = network.name.clone();
    let shape = network.input_shape.to_string();
    let previous = network.output_shape().to_vec();
    network
        .push(name.clone(), kind)
        .ok_or_else(|| ModelError::InvalidInputShape {
            architecture,
            shape,
            reason: format!("layer '{name}' cannot follow output {previous:?}"),
        })
}
