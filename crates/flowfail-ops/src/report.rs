//! Serialisable snapshots of failure chains for logs and telemetry.

use std::error::Error;

use chrono::{DateTime, Utc};
use flowfail_types::{Chain, Data, ReportConfig, StructuredFailure};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

/// One link of a failure chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub message: String,
    /// Present when the link is a [`StructuredFailure`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
}

impl ReportEntry {
    fn from_link(link: &(dyn Error + 'static)) -> Self {
        match link.downcast_ref::<StructuredFailure>() {
            Some(failure) => Self {
                message: failure.message().to_string(),
                data: Some(failure.data().clone()),
            },
            None => Self {
                message: link.to_string(),
                data: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
    /// Set when the chain was longer than `max_chain_depth`.
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
}

impl FailureReport {
    pub fn from_error(err: &(dyn Error + 'static), config: &ReportConfig) -> Self {
        let mut entries = Vec::new();
        let mut truncated = false;
        for (depth, link) in Chain::new(err).enumerate() {
            if depth >= config.max_chain_depth {
                truncated = true;
                break;
            }
            entries.push(ReportEntry::from_link(link));
        }

        let head = err.downcast_ref::<StructuredFailure>();
        let suppressed: Vec<String> = head
            .map(|failure| failure.suppressed().iter().map(|e| e.to_string()).collect())
            .unwrap_or_default();
        let backtrace = head
            .filter(|_| config.include_backtrace)
            .and_then(StructuredFailure::backtrace)
            .map(|trace| trace.to_string());

        Self {
            id: Uuid::new_v4(),
            captured_at: Utc::now(),
            entries,
            truncated,
            suppressed,
            backtrace,
        }
    }

    pub fn headline(&self) -> Option<&ReportEntry> {
        self.entries.first()
    }

    /// Messages of every link after the first, joined with ` <- `.
    pub fn causes(&self) -> String {
        self.entries
            .iter()
            .skip(1)
            .map(|entry| entry.message.as_str())
            .collect::<Vec<_>>()
            .join(" <- ")
    }
}

/// Builds a report for `err` and emits it as a single `error` event.
pub fn log_failure(err: &(dyn Error + 'static), config: &ReportConfig) -> FailureReport {
    let report = FailureReport::from_error(err, config);
    emit(&report);
    report
}

pub(crate) fn emit(report: &FailureReport) {
    let (reason, data) = match report.headline() {
        Some(entry) => (
            entry.message.as_str(),
            entry.data.as_ref().map(ToString::to_string).unwrap_or_default(),
        ),
        None => ("", String::new()),
    };
    error!(
        failure_id = %report.id,
        reason,
        data = %data,
        depth = report.entries.len(),
        truncated = report.truncated,
        suppressed = report.suppressed.len(),
        causes = %report.causes(),
        "structured failure"
    );
}
