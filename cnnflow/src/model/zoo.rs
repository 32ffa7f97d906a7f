//! Pretrained network zoo.
//!
//! The zoo is the seam to the deep-learning framework: stages ask it for a
//! pretrained network and only ever see the returned [`Network`] descriptor.

use super::network::{Activation, LayerKind, Network};
use crate::config::{ImageShape, WeightsSource};
use crate::errors::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

/// Smallest spatial size the VGG family accepts.
const VGG_MIN_SIZE: usize = 32;

/// Number of ImageNet classes in the original classification head.
const IMAGENET_CLASSES: usize = 1000;

/// Supported pretrained architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Architecture {
    /// VGG16 (Simonyan & Zisserman, 2014).
    Vgg16,
}

impl FromStr for Architecture {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vgg16" => Ok(Self::Vgg16),
            other => Err(ModelError::UnknownArchitecture(other.to_string())),
        }
    }
}

impl TryFrom<String> for Architecture {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Architecture> for String {
    fn from(arch: Architecture) -> Self {
        arch.to_string()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vgg16 => write!(f, "vgg16"),
        }
    }
}

/// Parameters of a pretrained network request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PretrainedRequest {
    /// Which architecture to build.
    pub architecture: Architecture,
    /// Input image shape.
    pub input_shape: ImageShape,
    /// Where the weights come from.
    pub weights: WeightsSource,
    /// Whether to keep the original classification head.
    pub include_top: bool,
}

/// Source of pretrained networks.
pub trait ModelZoo: Send + Sync + Debug {
    /// Builds the requested pretrained network.
    ///
    /// # Errors
    ///
    /// Returns an error if the architecture is unavailable, the input shape
    /// is incompatible, or the weight source cannot be reached.
    fn pretrained(&self, request: &PretrainedRequest) -> Result<Network, ModelError>;
}

/// Zoo backed by the built-in architecture definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinZoo;

impl ModelZoo for BuiltinZoo {
    fn pretrained(&self, request: &PretrainedRequest) -> Result<Network, ModelError> {
        if let WeightsSource::File(path) = &request.weights {
            if !path.is_file() {
                return Err(ModelError::WeightsUnavailable { path: path.clone() });
            }
        }
        match request.architecture {
            Architecture::Vgg16 => vgg16(request),
        }
    }
}

fn vgg16(request: &PretrainedRequest) -> Result<Network, ModelError> {
    let shape = request.input_shape;
    let reject = |reason: String| ModelError::InvalidInputShape {
        architecture: Architecture::Vgg16.to_string(),
        shape: shape.to_string(),
        reason,
    };

    if request.include_top
        && request.weights == WeightsSource::Imagenet
        && shape.as_array() != [224, 224, 3]
    {
        return Err(reject(
            "imagenet weights with include_top require input shape (224, 224, 3)".to_string(),
        ));
    }
    if request.weights == WeightsSource::Imagenet && shape.channels != 3 {
        return Err(reject("imagenet weights require 3 input channels".to_string()));
    }
    if shape.height < VGG_MIN_SIZE || shape.width < VGG_MIN_SIZE {
        return Err(reject(format!(
            "height and width must be at least {VGG_MIN_SIZE}"
        )));
    }

    let blocks: [(usize, usize); 5] = [(2, 64), (2, 128), (3, 256), (3, 512), (3, 512)];
    let mut network = Network::new("vgg16", shape, request.weights.clone());
    for (block, (convs, filters)) in blocks.iter().enumerate() {
        for conv in 1..=*convs {
            network = append(
                network,
                format!("block{}_conv{conv}", block + 1),
                LayerKind::Conv2d {
                    filters: *filters,
                    kernel: [3, 3],
                    activation: Activation::Relu,
                },
            )?;
        }
        network = append(
            network,
            format!("block{}_pool", block + 1),
            LayerKind::MaxPool2d { pool: [2, 2] },
        )?;
    }

    if request.include_top {
        network = append(network, "flatten".to_string(), LayerKind::Flatten)?;
        for name in ["fc1", "fc2"] {
            network = append(
                network,
                name.to_string(),
                LayerKind::Dense {
                    units: 4096,
                    activation: Activation::Relu,
                },
            )?;
        }
        network = append(
            network,
            "predictions".to_string(),
            LayerKind::Dense {
                units: IMAGENET_CLASSES,
                activation: Activation::Softmax,
            },
        )?;
    }

    Ok(network)
}

fn append(network: Network, name: String, kind: LayerKind) -> Result<Network, ModelError> {
    let shape = network.input_shape.to_string();
    let arch = network.name.clone();
    network
        .push(name.clone(), kind)
        .ok_or_else(|| ModelError::InvalidInputShape {
            architecture: arch,
            shape,
            reason: format!("layer '{name}' cannot follow the previous output"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(include_top: bool) -> PretrainedRequest {
        PretrainedRequest {
            architecture: Architecture::Vgg16,
            input_shape: ImageShape::new(224, 224, 3).unwrap(),
            weights: WeightsSource::Imagenet,
            include_top,
        }
    }

    #[test]
    fn test_vgg16_without_top() {
        let net = BuiltinZoo.pretrained(&request(false)).unwrap();

        assert_eq!(net.layers().len(), 19);
        assert_eq!(net.output_layer().id.as_str(), "block5_pool");
        assert_eq!(net.output_shape(), &[7, 7, 512]);
        assert_eq!(net.total_params(), 14_714_688);
    }

    #[test]
    fn test_vgg16_with_top() {
        let net = BuiltinZoo.pretrained(&request(true)).unwrap();

        assert_eq!(net.layers().len(), 23);
        assert_eq!(net.output_shape(), &[1000]);
        assert_eq!(net.total_params(), 138_357_544);
    }

    #[test]
    fn test_include_top_requires_224() {
        let mut req = request(true);
        req.input_shape = ImageShape::new(128, 128, 3).unwrap();

        let err = BuiltinZoo.pretrained(&req).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInputShape { .. }));

        req.weights = WeightsSource::None;
        assert!(BuiltinZoo.pretrained(&req).is_ok());
    }

    #[test]
    fn test_rejects_small_or_non_rgb_input() {
        let mut req = request(false);
        req.input_shape = ImageShape::new(16, 16, 3).unwrap();
        assert!(BuiltinZoo.pretrained(&req).is_err());

        req.input_shape = ImageShape::new(64, 64, 1).unwrap();
        assert!(BuiltinZoo.pretrained(&req).is_err());
    }

    #[test]
    fn test_missing_weight_file() {
        let mut req = request(false);
        req.weights = WeightsSource::File("/no/such/weights.h5".into());

        let err = BuiltinZoo.pretrained(&req).unwrap_err();
        assert!(matches!(err, ModelError::WeightsUnavailable { .. }));
    }

    #[test]
    fn test_architecture_parsing() {
        assert_eq!("VGG16".parse::<Architecture>().unwrap(), Architecture::Vgg16);
        assert!(matches!(
            "resnet50".parse::<Architecture>(),
            Err(ModelError::UnknownArchitecture(name)) if name == "resnet50"
        ));
    }
}
