//! Default paths and build-time hyperparameters.

/// Default location of the pipeline configuration file.
pub const CONFIG_FILE_PATH: &str = "config/config.yaml";

/// Default location of the optional hyperparameter override file.
pub const PARAMS_FILE_PATH: &str = "params.yaml";

/// Default directory for the run log file.
pub const LOG_DIR: &str = "logs";

/// File name of the run log inside [`LOG_DIR`].
pub const LOG_FILE_NAME: &str = "running_logs.log";

/// Prefix of a direct-download Google Drive URL; the file id is appended.
pub const DRIVE_DOWNLOAD_PREFIX: &str = "https://drive.google.com/uc?/export=download&id=";

/// Input image size as height, width, channels.
pub const IMAGE_SIZE: [usize; 3] = [224, 224, 3];

/// Number of target classes.
pub const CLASSES: usize = 2;

/// Adam learning rate.
pub const LEARNING_RATE: f64 = 0.01;

/// Pretrained weight source identifier.
pub const WEIGHTS: &str = "imagenet";

/// Whether the pretrained network keeps its original classification head.
pub const INCLUDE_TOP: bool = false;

/// Name of the data ingestion stage.
pub const STAGE_DATA_INGESTION: &str = "data_ingestion";

/// Name of the prepare base model stage.
pub const STAGE_PREPARE_BASE_MODEL: &str = "prepare_base_model";
