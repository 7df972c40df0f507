//! Structured failure values for the flowfail project.
//!
//! A [`StructuredFailure`] always carries a message, a mandatory [`Data`]
//! payload and an optional cause. Generic tooling reads the payload through
//! [`StructuredContext`] or [`data_of`] without knowing the concrete type.

pub mod chain;
pub mod config;
pub mod context;
pub mod data;
pub mod failure;

mod errors;

pub use chain::{collect_data, merged_data, root_cause, Chain};
pub use config::{FailureOptions, FlowfailConfig, OpsConfig, ReportConfig};
pub use context::{data_of, find_failure, StructuredContext};
pub use data::Data;
pub use errors::{ArgumentError, FlowfailError, Result};
pub use failure::{BoxError, StructuredFailure};
