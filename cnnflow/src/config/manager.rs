//! Resolution of per-stage configuration records.

use super::entity::{
    DataIngestionConfig, Params, PrepareBaseModelConfig, PrepareBaseModelPaths,
};
use super::loader::{read_yaml, ConfigBox};
use crate::constants::{STAGE_DATA_INGESTION, STAGE_PREPARE_BASE_MODEL};
use crate::errors::PipelineError;
use crate::utils::create_directories;
use std::path::{Path, PathBuf};

/// Builds stage configuration records from the YAML file and [`Params`].
///
/// Each getter validates its section completely before creating any of the
/// directories the stage needs, so an incomplete section leaves the
/// filesystem untouched.
#[derive(Debug, Clone)]
pub struct ConfigurationManager {
    config: ConfigBox,
    params: Params,
    artifacts_root: PathBuf,
}

impl ConfigurationManager {
    /// Loads `config_path` and materializes `artifacts_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded, `artifacts_root` is
    /// missing, or the directory cannot be created.
    pub fn new(config_path: &Path, params: Params) -> Result<Self, PipelineError> {
        let config = read_yaml(config_path)?;
        let artifacts_root = PathBuf::from(config.get_str("artifacts_root")?);
        create_directories(&[&artifacts_root], true)?;

        Ok(Self {
            config,
            params,
            artifacts_root,
        })
    }

    /// Returns the root directory for all artifacts.
    #[must_use]
    pub fn artifacts_root(&self) -> &Path {
        &self.artifacts_root
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn raw(&self) -> &ConfigBox {
        &self.config
    }

    /// Returns the data ingestion stage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error listing every missing key, or an I/O error if the
    /// stage directories cannot be created.
    pub fn get_data_ingestion_config(&self) -> Result<DataIngestionConfig, PipelineError> {
        let section = self.config.section(STAGE_DATA_INGESTION)?;
        section.require(DataIngestionConfig::REQUIRED_KEYS)?;
        let config: DataIngestionConfig = section.deserialize()?;

        let mut dirs = vec![config.root_dir.clone(), config.unzip_dir.clone()];
        dirs.extend(parent_dir(&config.local_data_file));
        create_directories(&dirs, true)?;

        Ok(config)
    }

    /// Returns the prepare base model stage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error listing every missing key, an invalid-value error for
    /// unusable params, or an I/O error if the stage directories cannot be
    /// created.
    pub fn get_prepare_base_model_config(&self) -> Result<PrepareBaseModelConfig, PipelineError> {
        let section = self.config.section(STAGE_PREPARE_BASE_MODEL)?;
        section.require(PrepareBaseModelConfig::REQUIRED_KEYS)?;
        let paths: PrepareBaseModelPaths = section.deserialize()?;
        self.params.validate()?;

        let config = PrepareBaseModelConfig::from_parts(paths, &self.params);

        let mut dirs = vec![config.root_dir.clone()];
        dirs.extend(parent_dir(&config.base_model_path));
        dirs.extend(parent_dir(&config.updated_base_model_path));
        create_directories(&dirs, true)?;

        Ok(config)
    }
}

fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
