//! Logging setup and stage timing.

mod logging;
mod tracing;

pub use self::logging::{init_logging, LogFormat, LoggingConfig};
pub use self::tracing::{stage_span, SpanTimer};
