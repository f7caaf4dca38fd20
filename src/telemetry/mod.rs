mod tracing;

pub use self::tracing::{init_tracing, level_filter, TracingConfig, TracingSink};
