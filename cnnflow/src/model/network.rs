//! Network descriptor: layers, shapes, parameter counts, and trainability.

use super::compile::CompileSpec;
use crate::config::{ImageShape, WeightsSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique layer name within a network.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Creates a layer id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Activation function applied by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Identity.
    Linear,
    /// Rectified linear unit.
    Relu,
    /// Normalized exponential over the output units.
    Softmax,
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Relu => write!(f, "relu"),
            Self::Softmax => write!(f, "softmax"),
        }
    }
}

/// What a layer computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    /// Network input.
    Input,
    /// 2D convolution with `same` padding and stride 1.
    Conv2d {
        /// Number of output channels.
        filters: usize,
        /// Kernel height and width.
        kernel: [usize; 2],
        /// Activation function.
        activation: Activation,
    },
    /// 2D max pooling with stride equal to the pool size.
    MaxPool2d {
        /// Pool height and width.
        pool: [usize; 2],
    },
    /// Collapses all non-batch dimensions into one.
    Flatten,
    /// Fully connected layer.
    Dense {
        /// Number of output units.
        units: usize,
        /// Activation function.
        activation: Activation,
    },
}

impl LayerKind {
    /// Returns the Keras-style class name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Input => "InputLayer",
            Self::Conv2d { .. } => "Conv2D",
            Self::MaxPool2d { .. } => "MaxPooling2D",
            Self::Flatten => "Flatten",
            Self::Dense { .. } => "Dense",
        }
    }

    /// Computes the output shape and weight count for the given input shape.
    ///
    /// Returns `None` if the kind cannot follow a layer of that shape.
    #[must_use]
    pub fn infer(&self, input: &[usize]) -> Option<(Vec<usize>, u64)> {
        match (self, input) {
            (Self::Input, _) => Some((input.to_vec(), 0)),
            (
                Self::Conv2d {
                    filters, kernel, ..
                },
                [h, w, c],
            ) => {
                let weights = kernel[0] * kernel[1] * c * filters + filters;
                Some((vec![*h, *w, *filters], weights as u64))
            }
            (Self::MaxPool2d { pool }, [h, w, c]) => {
                Some((vec![h / pool[0], w / pool[1], *c], 0))
            }
            (Self::Flatten, dims) => Some((vec![dims.iter().product()], 0)),
            (Self::Dense { units, .. }, [n]) => Some((vec![*units], ((n + 1) * units) as u64)),
            _ => None,
        }
    }
}

/// A layer with its resolved output shape and parameter count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique layer name.
    pub id: LayerId,
    /// What the layer computes.
    pub kind: LayerKind,
    /// Output shape excluding the batch dimension.
    pub output_shape: Vec<usize>,
    /// Number of weights and biases.
    pub params: u64,
}

/// A sequential network descriptor.
///
/// Trainability is tracked per layer in a map keyed by [`LayerId`]; freezing
/// one layer never affects another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Network name.
    pub name: String,
    /// Input image shape.
    pub input_shape: ImageShape,
    /// Where the pretrained weights come from.
    pub weights: WeightsSource,
    layers: Vec<Layer>,
    trainable: BTreeMap<LayerId, bool>,
    compile: Option<CompileSpec>,
}

impl Network {
    /// Creates a network holding only its input layer.
    #[must_use]
    pub fn new(name: impl Into<String>, input_shape: ImageShape, weights: WeightsSource) -> Self {
        let mut network = Self {
            name: name.into(),
            input_shape,
            weights,
            layers: Vec::new(),
            trainable: BTreeMap::new(),
            compile: None,
        };
        let id = LayerId::new("input_1");
        network.trainable.insert(id.clone(), true);
        network.layers.push(Layer {
            id,
            kind: LayerKind::Input,
            output_shape: input_shape.as_array().to_vec(),
            params: 0,
        });
        network
    }

    /// Appends a layer after the current output.
    ///
    /// Returns `None` if the name is taken or the layer cannot follow the
    /// current output shape.
    #[must_use]
    pub fn push(mut self, name: impl Into<String>, kind: LayerKind) -> Option<Self> {
        let id = LayerId::new(name);
        if self.trainable.contains_key(&id) {
            return None;
        }
        let (output_shape, params) = kind.infer(self.output_shape())?;
        self.trainable.insert(id.clone(), true);
        self.layers.push(Layer {
            id,
            kind,
            output_shape,
            params,
        });
        Some(self)
    }

    /// Checks a descriptor that did not come from [`Network::new`].
    ///
    /// The first layer must be the only `Input` layer and match
    /// `input_shape`. Every later layer must follow its predecessor with the
    /// recorded shape and parameter count, and the trainability map must have
    /// exactly one entry per layer.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first inconsistency found.
    pub fn check_consistency(&self) -> Result<(), String> {
        let Some((first, rest)) = self.layers.split_first() else {
            return Err("network has no layers".to_string());
        };
        if first.kind != LayerKind::Input {
            return Err(format!("first layer '{}' is not an input layer", first.id));
        }
        if first.output_shape != self.input_shape.as_array() {
            return Err(format!(
                "input layer shape {:?} does not match input shape {}",
                first.output_shape, self.input_shape
            ));
        }

        let mut previous = &first.output_shape;
        for layer in rest {
            if layer.kind == LayerKind::Input {
                return Err(format!("layer '{}' is a second input layer", layer.id));
            }
            match layer.kind.infer(previous) {
                Some((shape, params)) if shape == layer.output_shape && params == layer.params => {}
                _ => {
                    return Err(format!(
                        "layer '{}' does not fit after shape {previous:?}",
                        layer.id
                    ))
                }
            }
            previous = &layer.output_shape;
        }

        let ids_match = self.trainable.len() == self.layers.len()
            && self.layers.iter().all(|l| self.trainable.contains_key(&l.id));
        if !ids_match {
            return Err("trainable flags do not match the layer names".to_string());
        }
        Ok(())
    }

    /// Returns the layers in order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the final layer.
    #[must_use]
    pub fn output_layer(&self) -> &Layer {
        // new() inserts the input layer; load_model() rejects descriptors without one
        &self.layers[self.layers.len() - 1]
    }

    /// Returns the output shape of the network.
    #[must_use]
    pub fn output_shape(&self) -> &[usize] {
        &self.output_layer().output_shape
    }

    /// Looks up a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id.as_str() == name)
    }

    /// Returns whether a layer receives weight updates.
    #[must_use]
    pub fn is_trainable(&self, id: &LayerId) -> Option<bool> {
        self.trainable.get(id).copied()
    }

    /// Sets the trainable flag of a single layer. Unknown ids are ignored.
    pub fn set_trainable(&mut self, id: &LayerId, trainable: bool) {
        if let Some(flag) = self.trainable.get_mut(id) {
            *flag = trainable;
        }
    }

    /// Freezes every layer currently in the network.
    pub fn freeze_all(&mut self) {
        self.trainable.values_mut().for_each(|flag| *flag = false);
    }

    /// Freezes every layer except the last `keep_trainable`.
    pub fn freeze_all_but_last(&mut self, keep_trainable: usize) {
        let cutoff = self.layers.len().saturating_sub(keep_trainable);
        for layer in &self.layers[..cutoff] {
            if let Some(flag) = self.trainable.get_mut(&layer.id) {
                *flag = false;
            }
        }
    }

    /// Returns the compile settings, if compiled.
    #[must_use]
    pub fn compile_spec(&self) -> Option<&CompileSpec> {
        self.compile.as_ref()
    }

    pub(crate) fn set_compile(&mut self, spec: CompileSpec) {
        self.compile = Some(spec);
    }

    /// Total number of parameters.
    #[must_use]
    pub fn total_params(&self) -> u64 {
        self.layers.iter().map(|l| l.params).sum()
    }

    /// Number of parameters in trainable layers.
    #[must_use]
    pub fn trainable_params(&self) -> u64 {
        self.layers
            .iter()
            .filter(|l| self.trainable.get(&l.id).copied().unwrap_or(false))
            .map(|l| l.params)
            .sum()
    }

    /// Renders a Keras-style summary table.
    #[must_use]
    pub fn summary(&self) -> String {
        let rule = "_".repeat(78);
        let mut out = format!("Model: \"{}\"\n{rule}\n", self.name);
        out.push_str(&format!(
            "{:<32}{:<24}{:>12}{:>10}\n{}\n",
            "Layer (type)",
            "Output Shape",
            "Param #",
            "Trainable",
            "=".repeat(78)
        ));
        for layer in &self.layers {
            let shape = format!(
                "(None, {})",
                layer
                    .output_shape
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            let trainable = self.trainable.get(&layer.id).copied().unwrap_or(false);
            out.push_str(&format!(
                "{:<32}{:<24}{:>12}{:>10}\n",
                format!("{} ({})", layer.id, layer.kind.type_name()),
                shape,
                layer.params,
                if trainable { "Y" } else { "N" }
            ));
        }
        let total = self.total_params();
        let trainable = self.trainable_params();
        out.push_str(&format!(
            "{}\nTotal params: {total}\nTrainable params: {trainable}\nNon-trainable params: {}\n{rule}",
            "=".repeat(78),
            total - trainable
        ));
        out
    }
}
