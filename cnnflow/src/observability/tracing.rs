//! Span helpers for stage execution.

use std::time::Instant;
use tracing::Span;

/// Opens the span a stage runs in.
#[must_use]
pub fn stage_span(stage: &str, run_id: &str) -> Span {
    tracing::info_span!("stage", stage = stage, run_id = run_id)
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("data_ingestion");
        assert_eq!(timer.name(), "data_ingestion");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.finish() >= 10.0);
    }

    #[test]
    fn test_stage_span_without_subscriber() {
        let span = stage_span("prepare_base_model", "run-1");
        let _guard = span.enter();
    }
}
