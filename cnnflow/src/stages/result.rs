//! Per-stage run reports.

use crate::core::{StageArtifact, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the orchestrator records about a finished stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage name.
    pub name: String,
    /// Stage status.
    pub status: StageStatus,
    /// When the stage started.
    pub started_at: DateTime<Utc>,
    /// When the stage ended.
    pub ended_at: DateTime<Utc>,
    /// Artifacts the stage produced.
    #[serde(default)]
    pub artifacts: Vec<StageArtifact>,
    /// Error message if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageReport {
    /// Creates a completed report.
    #[must_use]
    pub fn completed(
        name: impl Into<String>,
        started_at: DateTime<Utc>,
        artifacts: Vec<StageArtifact>,
    ) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Ok,
            started_at,
            ended_at: Utc::now(),
            artifacts,
            error: None,
        }
    }

    /// Creates a failed report.
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        started_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Fail,
            started_at,
            ended_at: Utc::now(),
            artifacts: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }

    /// Returns true if the stage succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArtifactKind;

    #[test]
    fn test_stage_report_completed() {
        let started = Utc::now();
        let artifact = StageArtifact::new(ArtifactKind::Model, "base_model", "m.json");
        let report = StageReport::completed("prepare_base_model", started, vec![artifact]);

        assert!(report.is_success());
        assert_eq!(report.artifacts.len(), 1);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_stage_report_failed() {
        let report = StageReport::failed("data_ingestion", Utc::now(), "HTTP 503");

        assert!(!report.is_success());
        assert_eq!(report.status, StageStatus::Fail);
        assert_eq!(report.error.as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn test_stage_report_duration() {
        let started = Utc::now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let report = StageReport::completed("x", started, Vec::new());

        assert!(report.duration_ms() >= 10.0);
    }

    #[test]
    fn test_stage_report_serialization() {
        let report = StageReport::completed("x", Utc::now(), Vec::new());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "ok");
        assert!(json.get("error").is_none());
    }
}
