//! Error types for the cnnflow pipeline.
//!
//! Every failure belongs to one of three classes: configuration, I/O, or an
//! external collaborator (download client, model zoo). All of them are fatal
//! for the run; the class and [`PipelineError::is_retryable`] let callers tell
//! transient conditions apart from permanent ones.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The broad failure class of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Missing, empty, or malformed configuration.
    Configuration,
    /// Network or filesystem failure.
    Io,
    /// Failure reported by an external collaborator such as the model zoo.
    External,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Io => write!(f, "io"),
            Self::External => write!(f, "external"),
        }
    }
}

/// The main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A dataset download error.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// An archive extraction error.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// A model construction or serialization error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The pipeline definition itself is invalid.
    #[error(transparent)]
    Validation(#[from] PipelineValidationError),

    /// Filesystem error tied to a path.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Wraps an I/O error with the path that caused it.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the failure class.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Config(_) | Self::Validation(_) => ErrorClass::Configuration,
            Self::Download(e) => e.class(),
            Self::Archive(_) | Self::Io { .. } | Self::Internal(_) => ErrorClass::Io,
            Self::Model(e) => e.class(),
        }
    }

    /// Returns true if retrying the failed operation could succeed.
    ///
    /// The pipeline itself never retries; this is information for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Download(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        /// The config path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is empty or parses to null.
    #[error("yaml file is empty: {}", .path.display())]
    Empty {
        /// The config path.
        path: PathBuf,
    },

    /// The configuration file is not valid YAML.
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        /// The config path.
        path: PathBuf,
        /// The parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A node that must be a mapping is something else.
    #[error("Expected a mapping at '{section}'")]
    NotAMapping {
        /// The dotted path of the offending node.
        section: String,
    },

    /// One or more required keys are absent.
    #[error("Missing required keys in '{section}': {}", .keys.join(", "))]
    MissingKeys {
        /// The section the keys belong to.
        section: String,
        /// Every missing key.
        keys: Vec<String>,
    },

    /// A key is present but its value is unusable.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Creates a missing-keys error.
    #[must_use]
    pub fn missing_keys(section: impl Into<String>, keys: Vec<String>) -> Self {
        Self::MissingKeys {
            section: section.into(),
            keys,
        }
    }

    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while downloading the dataset archive.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The source URL does not contain a file id.
    #[error("Cannot derive a file id from source URL '{url}'")]
    InvalidSourceUrl {
        /// The offending URL.
        url: String,
    },

    /// The request failed before a response arrived, or the body was cut off.
    #[error("Request to {url} failed: {source}")]
    Transport {
        /// The requested URL.
        url: String,
        /// The client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Download from {url} returned HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The server answered with a page instead of the file.
    #[error("Download from {url} returned {content_type} instead of a file")]
    UnexpectedContent {
        /// The requested URL.
        url: String,
        /// The content type received.
        content_type: String,
    },

    /// Writing the downloaded bytes failed.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// The destination path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Returns the failure class.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidSourceUrl { .. } => ErrorClass::Configuration,
            Self::UnexpectedContent { .. } => ErrorClass::External,
            Self::Transport { .. } | Self::Status { .. } | Self::Write { .. } => ErrorClass::Io,
        }
    }

    /// Returns true for transport failures, rate limiting, and server errors.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Errors raised while extracting the dataset archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive file could not be opened.
    #[error("Failed to open archive {}: {source}", .path.display())]
    Open {
        /// The archive path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The archive is corrupt or an entry could not be written.
    #[error("Failed to extract {} into {}: {source}", .archive.display(), .destination.display())]
    Extract {
        /// The archive path.
        archive: PathBuf,
        /// The extraction directory.
        destination: PathBuf,
        /// The zip error.
        #[source]
        source: zip::result::ZipError,
    },
}

/// Errors reported by the model zoo or the model store.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The zoo has no such architecture.
    #[error("Unknown architecture: {0}")]
    UnknownArchitecture(String),

    /// The requested input shape is incompatible with the architecture.
    #[error("Invalid input shape {shape} for {architecture}: {reason}")]
    InvalidInputShape {
        /// The architecture name.
        architecture: String,
        /// The requested shape.
        shape: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The pretrained weight source cannot be reached.
    #[error("Pretrained weights unavailable at {}", .path.display())]
    WeightsUnavailable {
        /// The weight file path.
        path: PathBuf,
    },

    /// A hyperparameter is out of range.
    #[error("Invalid hyperparameter '{name}': {reason}")]
    InvalidHyperparameter {
        /// The hyperparameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The model artifact could not be written or read.
    #[error("Model serialization failed for {}: {message}", .path.display())]
    Serialization {
        /// The artifact path.
        path: PathBuf,
        /// The serializer message.
        message: String,
    },
}

impl ModelError {
    /// Returns the failure class.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Serialization { .. } => ErrorClass::Io,
            _ => ErrorClass::External,
        }
    }
}

/// Error raised when a pipeline definition is invalid.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_lists_every_key() {
        let err = ConfigError::missing_keys(
            "data_ingestion",
            vec!["source_URL".to_string(), "unzip_dir".to_string()],
        );
        let msg = err.to_string();
        assert!(msg.contains("data_ingestion"));
        assert!(msg.contains("source_URL, unzip_dir"));
    }

    #[test]
    fn test_error_classes() {
        let config: PipelineError = ConfigError::Empty {
            path: PathBuf::from("config.yaml"),
        }
        .into();
        assert_eq!(config.class(), ErrorClass::Configuration);

        let model: PipelineError = ModelError::UnknownArchitecture("resnet".to_string()).into();
        assert_eq!(model.class(), ErrorClass::External);

        let io = PipelineError::io(
            "artifacts",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io.class(), ErrorClass::Io);
        assert!(io.to_string().contains("artifacts"));
    }

    #[test]
    fn test_download_retryability() {
        let throttled = DownloadError::Status {
            url: "u".to_string(),
            status: 429,
        };
        let unavailable = DownloadError::Status {
            url: "u".to_string(),
            status: 503,
        };
        let missing = DownloadError::Status {
            url: "u".to_string(),
            status: 404,
        };
        assert!(throttled.is_retryable());
        assert!(unavailable.is_retryable());
        assert!(!missing.is_retryable());

        let err: PipelineError = missing.into();
        assert!(!err.is_retryable());
        assert_eq!(err.class(), ErrorClass::Io);
    }

    #[test]
    fn test_invalid_source_url_is_configuration() {
        let err = DownloadError::InvalidSourceUrl {
            url: "nope".to_string(),
        };
        assert_eq!(err.class(), ErrorClass::Configuration);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_error_stages() {
        let err = PipelineValidationError::new("Duplicate stage")
            .with_stages(vec!["data_ingestion".to_string()]);
        assert_eq!(err.stages, vec!["data_ingestion".to_string()]);
        assert_eq!(err.to_string(), "Duplicate stage");
    }

    #[test]
    fn test_error_class_display() {
        assert_eq!(ErrorClass::Configuration.to_string(), "configuration");
        assert_eq!(ErrorClass::Io.to_string(), "io");
        assert_eq!(ErrorClass::External.to_string(), "external");
    }
}
