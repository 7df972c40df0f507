use std::sync::Arc;

use async_trait::async_trait;
use flowfail_types::Result;
use tokio::sync::Mutex;

use crate::report::{emit, FailureReport};

/// Destination for failure reports.
#[async_trait]
pub trait FailureSink: Send + Sync {
    async fn record(&self, report: FailureReport) -> Result<()>;
}

/// Forwards every report to `tracing` as an `error` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl FailureSink for TracingSink {
    async fn record(&self, report: FailureReport) -> Result<()> {
        emit(&report);
        Ok(())
    }
}

/// In-memory report store; clones share the same storage.
#[derive(Clone, Default)]
pub struct ReportStore {
    reports: Arc<Mutex<Vec<FailureReport>>>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<FailureReport> {
        self.reports.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.reports.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.lock().await.is_empty()
    }
}

#[async_trait]
impl FailureSink for ReportStore {
    async fn record(&self, report: FailureReport) -> Result<()> {
        self.reports.lock().await.push(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfail_types::{data, ReportConfig, StructuredFailure};

    fn report(message: &str) -> FailureReport {
        let failure = StructuredFailure::new(message, data! { "code" => 1 });
        FailureReport::from_error(&failure, &ReportConfig::default())
    }

    #[tokio::test]
    async fn store_keeps_reports_in_order() {
        let store = ReportStore::new();
        assert!(store.is_empty().await);
        store.record(report("first")).await.unwrap();
        store.record(report("second")).await.unwrap();

        let messages: Vec<String> = store
            .snapshot()
            .await
            .iter()
            .filter_map(|r| r.headline().map(|e| e.message.clone()))
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = ReportStore::new();
        let handle = store.clone();
        handle.record(report("shared")).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn tracing_sink_accepts_reports() {
        let sink: Box<dyn FailureSink> = Box::new(TracingSink);
        assert!(sink.record(report("logged")).await.is_ok());
    }
}
