use thiserror::Error;

pub type Result<T, E = FlowfailError> = std::result::Result<T, E>;

/// Raised when a structured failure cannot be built from the given arguments.
///
/// This signals a bug in the code raising the failure, so it is never itself a
/// [`StructuredFailure`](crate::StructuredFailure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("additional data must be non-nil")]
    MissingData,
    #[error("additional data must be a map, got {found}")]
    NotAMap { found: &'static str },
}

/// Crate-wide error covering configuration and operational failures.
#[derive(Debug, Error)]
pub enum FlowfailError {
    #[error("invalid argument: {0}")]
    Argument(#[from] ArgumentError),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
