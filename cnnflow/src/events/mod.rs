//! Event sinks for pipeline observability.
//!
//! The orchestrator reports stage lifecycle events to the sink carried by the
//! [`PipelineContext`](crate::pipeline::PipelineContext); there is no global
//! sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
