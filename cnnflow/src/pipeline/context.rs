//! Per-run execution context.

use crate::config::{ConfigurationManager, Params};
use crate::errors::PipelineError;
use crate::events::{EventSink, LoggingEventSink};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// State shared by every stage of one run.
///
/// Stages receive the context by reference and build a fresh
/// [`ConfigurationManager`] from it, so each stage re-reads the config file.
#[derive(Clone)]
pub struct PipelineContext {
    run_id: Uuid,
    config_path: PathBuf,
    params: Params,
    sink: Arc<dyn EventSink>,
}

impl PipelineContext {
    /// Creates a context with a fresh run id and a logging sink.
    #[must_use]
    pub fn new(config_path: impl Into<PathBuf>, params: Params) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config_path: config_path.into(),
            params,
            sink: Arc::new(LoggingEventSink::default()),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the run id.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the configuration file path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the hyperparameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the event sink.
    #[must_use]
    pub fn sink(&self) -> &dyn EventSink {
        self.sink.as_ref()
    }

    /// Loads the configuration file into a new manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or `artifacts_root`
    /// cannot be created.
    pub fn configuration_manager(&self) -> Result<ConfigurationManager, PipelineError> {
        ConfigurationManager::new(&self.config_path, self.params.clone())
    }
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("run_id", &self.run_id)
            .field("config_path", &self.config_path)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageEvent;
    use crate::events::CollectingEventSink;

    #[test]
    fn test_context_run_ids_are_unique() {
        let a = PipelineContext::new("config/config.yaml", Params::default());
        let b = PipelineContext::new("config/config.yaml", Params::default());

        assert_ne!(a.run_id(), b.run_id());
        assert_eq!(a.config_path(), Path::new("config/config.yaml"));
    }

    #[test]
    fn test_context_with_sink() {
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = PipelineContext::new("c.yaml", Params::default()).with_sink(sink.clone());

        ctx.sink().try_emit(&StageEvent::started("x"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_configuration_manager_reports_missing_file() {
        let ctx = PipelineContext::new("/no/such/config.yaml", Params::default());
        assert!(matches!(
            ctx.configuration_manager(),
            Err(PipelineError::Config(_))
        ));
    }
}
