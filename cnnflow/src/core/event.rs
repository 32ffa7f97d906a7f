//! Pipeline lifecycle events.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event emitted by the orchestrator around a stage.
///
/// Events are consumed by an [`EventSink`](crate::events::EventSink) for
/// logging or inspection in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEvent {
    /// The event type (e.g., "stage.started", "stage.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (ISO 8601).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl StageEvent {
    /// Creates a new event with no data.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: crate::utils::iso_timestamp(),
            data: HashMap::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns the `stage` field, if present.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        self.data.get("stage").and_then(serde_json::Value::as_str)
    }

    /// Creates a "stage.started" event.
    #[must_use]
    pub fn started(stage_name: &str) -> Self {
        Self::new("stage.started").add_data("stage", serde_json::json!(stage_name))
    }

    /// Creates a "stage.completed" event.
    #[must_use]
    pub fn completed(stage_name: &str, duration_ms: f64) -> Self {
        Self::new("stage.completed")
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "stage.failed" event.
    #[must_use]
    pub fn failed(stage_name: &str, error: &str) -> Self {
        Self::new("stage.failed")
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("error", serde_json::json!(error))
    }
}
