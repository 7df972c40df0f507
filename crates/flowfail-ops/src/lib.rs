//! Operational helpers: logging setup, failure reports and report sinks.

pub mod report;
pub mod sink;

use std::{error::Error, future::Future};

use flowfail_types::{
    BoxError, Data, FlowfailConfig, FlowfailError, OpsConfig, Result, StructuredFailure,
};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

pub use report::{log_failure, FailureReport, ReportEntry};
pub use sink::{FailureSink, ReportStore, TracingSink};

/// Environment variable that takes precedence over `ops.log_level`.
pub const LOG_ENV: &str = "FLOWFAIL_LOG";

const DEFAULT_FILTER: &str = "warn,flowfail_types=info,flowfail_ops=info";

/// Installs the global `fmt` subscriber, writing to stderr.
///
/// A bare level (`debug`, `warning`, ...) applies to the flowfail crates only
/// and leaves everything else at `warn`; full `EnvFilter` directives are used
/// as given. Unparseable directives fall back to the flowfail `info` default.
pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let directives = log_directives(config, std::env::var(LOG_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|err| FlowfailError::Ops(format!("failed to create log filter: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| FlowfailError::Ops(format!("tracing init error: {err}")))?;
    Ok(())
}

fn log_directives(config: &OpsConfig, env_override: Option<String>) -> String {
    let raw = env_override
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.log_level.clone());
    match scoped_level(&raw) {
        Some(level) => format!("warn,flowfail_types={level},flowfail_ops={level}"),
        None => raw.trim().to_string(),
    }
}

fn scoped_level(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}

/// Raises failures with configured defaults and hands reports to a sink.
pub struct Reporter<S: FailureSink> {
    config: FlowfailConfig,
    sink: S,
}

impl<S: FailureSink> Reporter<S> {
    pub fn new(config: FlowfailConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, sink })
    }

    pub fn config(&self) -> &FlowfailConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Builds a failure using the configured construction defaults.
    pub fn fail(
        &self,
        message: impl Into<String>,
        data: Data,
        cause: Option<BoxError>,
    ) -> StructuredFailure {
        StructuredFailure::with_options(message, data, cause, self.config.defaults)
    }

    /// Builds the report up front, so the returned future does not borrow `err`.
    pub fn report(
        &self,
        err: &(dyn Error + 'static),
    ) -> impl Future<Output = Result<FailureReport>> + Send + '_ {
        let report = FailureReport::from_error(err, &self.config.report);
        debug!(failure_id = %report.id, depth = report.entries.len(), "recording failure report");
        async move {
            self.sink.record(report.clone()).await?;
            Ok(report)
        }
    }
}
