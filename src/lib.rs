pub mod config;
pub mod models;
pub mod pipeline;

pub use config::EngineConfig;
pub use models::{EntitySpan, Metric, MetricSource, MetricStatus, ReportAnalysis, ReportCategory};
pub use pipeline::metrics::{ExtractionError, MetricExtractor};

use tracing_subscriber::EnvFilter;

/// Install the stderr tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}
