//! Typed configuration records consumed by the pipeline stages.

use super::loader::read_yaml;
use crate::constants;
use crate::errors::ConfigError;
use crate::model::Architecture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Input image dimensions as height, width, channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct ImageShape {
    /// Image height in pixels.
    pub height: usize,
    /// Image width in pixels.
    pub width: usize,
    /// Number of colour channels.
    pub channels: usize,
}

impl ImageShape {
    /// Creates a shape, rejecting zero-sized dimensions.
    ///
    /// # Errors
    ///
    /// Returns a message if any dimension is zero.
    pub fn new(height: usize, width: usize, channels: usize) -> Result<Self, String> {
        if height == 0 || width == 0 || channels == 0 {
            return Err(format!(
                "image dimensions must be non-zero, got [{height}, {width}, {channels}]"
            ));
        }
        Ok(Self {
            height,
            width,
            channels,
        })
    }

    /// Returns the dimensions as an array.
    #[must_use]
    pub fn as_array(&self) -> [usize; 3] {
        [self.height, self.width, self.channels]
    }
}

impl TryFrom<Vec<usize>> for ImageShape {
    type Error = String;

    fn try_from(dims: Vec<usize>) -> Result<Self, Self::Error> {
        match dims.as_slice() {
            [h, w, c] => Self::new(*h, *w, *c),
            other => Err(format!(
                "image size must have exactly 3 dimensions, got {}",
                other.len()
            )),
        }
    }
}

impl From<ImageShape> for Vec<usize> {
    fn from(shape: ImageShape) -> Self {
        shape.as_array().to_vec()
    }
}

impl fmt::Display for ImageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.height, self.width, self.channels)
    }
}

/// Where the pretrained weights come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum WeightsSource {
    /// The published ImageNet weights.
    Imagenet,
    /// Random initialization.
    None,
    /// A local weight file.
    File(PathBuf),
}

impl From<Option<String>> for WeightsSource {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::trim) {
            None | Some("" | "none" | "None" | "null") => Self::None,
            Some(s) if s.eq_ignore_ascii_case("imagenet") => Self::Imagenet,
            Some(s) => Self::File(PathBuf::from(s)),
        }
    }
}

impl From<WeightsSource> for Option<String> {
    fn from(source: WeightsSource) -> Self {
        match source {
            WeightsSource::Imagenet => Some("imagenet".to_string()),
            WeightsSource::None => None,
            WeightsSource::File(path) => Some(path.display().to_string()),
        }
    }
}

impl fmt::Display for WeightsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imagenet => write!(f, "imagenet"),
            Self::None => write!(f, "none"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Build-time hyperparameters, optionally overridden from `params.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Params {
    /// Pretrained architecture.
    pub architecture: Architecture,
    /// Input image size.
    pub image_size: ImageShape,
    /// Number of target classes.
    pub classes: usize,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Pretrained weight source.
    pub weights: WeightsSource,
    /// Whether to keep the network's original classification head.
    pub include_top: bool,
}

impl Default for Params {
    fn default() -> Self {
        let [height, width, channels] = constants::IMAGE_SIZE;
        Self {
            architecture: Architecture::Vgg16,
            image_size: ImageShape {
                height,
                width,
                channels,
            },
            classes: constants::CLASSES,
            learning_rate: constants::LEARNING_RATE,
            weights: WeightsSource::from(Some(constants::WEIGHTS.to_string())),
            include_top: constants::INCLUDE_TOP,
        }
    }
}

impl Params {
    /// Loads overrides from a YAML file; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or a value has the wrong
    /// shape.
    pub fn from_yaml(path: &Path) -> Result<Self, ConfigError> {
        let params: Self = read_yaml(path)?.deserialize()?;
        params.validate()?;
        Ok(params)
    }

    /// Checks the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classes == 0 {
            return Err(ConfigError::invalid_value("CLASSES", "must be at least 1"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::invalid_value(
                "LEARNING_RATE",
                format!("must be a positive number, got {}", self.learning_rate),
            ));
        }
        ImageShape::try_from(Vec::from(self.image_size))
            .map_err(|message| ConfigError::invalid_value("IMAGE_SIZE", message))?;
        Ok(())
    }
}

/// Paths used by the data ingestion stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIngestionConfig {
    /// Stage working directory.
    pub root_dir: PathBuf,
    /// Shareable link to the dataset archive.
    #[serde(rename = "source_URL")]
    pub source_url: String,
    /// Where the downloaded archive is written.
    pub local_data_file: PathBuf,
    /// Where the archive is extracted.
    pub unzip_dir: PathBuf,
}

impl DataIngestionConfig {
    /// Keys that must be present in the `data_ingestion` section.
    pub const REQUIRED_KEYS: &'static [&'static str] =
        &["root_dir", "source_URL", "local_data_file", "unzip_dir"];
}

/// Paths read from the `prepare_base_model` section.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PrepareBaseModelPaths {
    pub root_dir: PathBuf,
    pub base_model_path: PathBuf,
    pub updated_base_model_path: PathBuf,
}

/// Paths and hyperparameters used by the prepare base model stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareBaseModelConfig {
    /// Stage working directory.
    pub root_dir: PathBuf,
    /// Where the unmodified pretrained network is saved.
    pub base_model_path: PathBuf,
    /// Where the head-adapted network is saved.
    pub updated_base_model_path: PathBuf,
    /// Pretrained architecture.
    pub params_architecture: Architecture,
    /// Input image size.
    pub params_image_size: ImageShape,
    /// Adam learning rate.
    pub params_learning_rate: f64,
    /// Whether to keep the original classification head.
    pub params_include_top: bool,
    /// Pretrained weight source.
    pub params_weights: WeightsSource,
    /// Number of target classes.
    pub params_classes: usize,
}

impl PrepareBaseModelConfig {
    /// Keys that must be present in the `prepare_base_model` section.
    pub const REQUIRED_KEYS: &'static [&'static str] =
        &["root_dir", "base_model_path", "updated_base_model_path"];

    pub(crate) fn from_parts(paths: PrepareBaseModelPaths, params: &Params) -> Self {
        Self {
            root_dir: paths.root_dir,
            base_model_path: paths.base_model_path,
            updated_base_model_path: paths.updated_base_model_path,
            params_architecture: params.architecture,
            params_image_size: params.image_size,
            params_learning_rate: params.learning_rate,
            params_include_top: params.include_top,
            params_weights: params.weights.clone(),
            params_classes: params.classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_params_match_constants() {
        let params = Params::default();
        assert_eq!(params.image_size.as_array(), [224, 224, 3]);
        assert_eq!(params.classes, 2);
        assert_eq!(params.weights, WeightsSource::Imagenet);
        assert!(!params.include_top);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_from_yaml_overrides_and_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CLASSES: 5\nLEARNING_RATE: 0.001\nEPOCHS: 10\nWEIGHTS: null").unwrap();

        let params = Params::from_yaml(file.path()).unwrap();
        assert_eq!(params.classes, 5);
        assert_eq!(params.learning_rate, 0.001);
        assert_eq!(params.weights, WeightsSource::None);
        assert_eq!(params.image_size.as_array(), [224, 224, 3]);
    }

    #[test]
    fn test_params_reject_bad_image_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IMAGE_SIZE: [224, 224]").unwrap();

        assert!(matches!(
            Params::from_yaml(file.path()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_params_reject_unknown_architecture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ARCHITECTURE: resnet50").unwrap();

        let err = Params::from_yaml(file.path()).unwrap_err();
        assert!(err.to_string().contains("resnet50"));
    }

    #[test]
    fn test_params_validate() {
        let mut params = Params::default();
        params.classes = 0;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.learning_rate = f64::NAN;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.learning_rate = -1.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_weights_source_parsing() {
        assert_eq!(WeightsSource::from(Some("imagenet".into())), WeightsSource::Imagenet);
        assert_eq!(WeightsSource::from(Some("ImageNet".into())), WeightsSource::Imagenet);
        assert_eq!(WeightsSource::from(None), WeightsSource::None);
        assert_eq!(WeightsSource::from(Some("none".into())), WeightsSource::None);
        assert_eq!(
            WeightsSource::from(Some("weights/vgg16.h5".into())),
            WeightsSource::File(PathBuf::from("weights/vgg16.h5"))
        );
    }

    #[test]
    fn test_image_shape_display() {
        let shape = ImageShape::new(224, 224, 3).unwrap();
        assert_eq!(shape.to_string(), "(224, 224, 3)");
        assert!(ImageShape::new(0, 224, 3).is_err());
    }

    #[test]
    fn test_data_ingestion_config_deserializes_source_url() {
        let yaml = "root_dir: a\nsource_URL: https://x/y/z\nlocal_data_file: a/d.zip\nunzip_dir: a\n";
        let config: DataIngestionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.source_url, "https://x/y/z");
        assert_eq!(config.local_data_file, PathBuf::from("a/d.zip"));
    }
}
