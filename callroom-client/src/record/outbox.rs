use crate::record::CallRecordApi;
use callroom_core::{CallId, EndReport};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReport {
    pub call_id: CallId,
    pub report: EndReport,
    pub attempts: u32,
}

/// Final billing snapshots waiting for the call record API.
///
/// A snapshot that cannot be persisted is retained here until a retry
/// succeeds; it is never dropped.
pub struct ReportOutbox {
    api: Arc<dyn CallRecordApi>,
    pending: Mutex<VecDeque<PendingReport>>,
}

impl ReportOutbox {
    pub fn new(api: Arc<dyn CallRecordApi>) -> Self {
        Self {
            api,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Tries once; on failure the report is queued. Returns whether it was persisted.
    pub async fn submit_end(&self, call_id: &CallId, report: EndReport) -> bool {
        match self.api.mark_ended(call_id, report).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Failed to persist end of call {} ({}s, cost {}): {}; queued for retry",
                    call_id, report.duration_secs, report.cost, e
                );
                self.pending.lock().await.push_back(PendingReport {
                    call_id: call_id.clone(),
                    report,
                    attempts: 1,
                });
                false
            }
        }
    }

    /// Re-sends every queued report. Returns how many are still pending.
    pub async fn retry_pending(&self) -> usize {
        let queued: Vec<PendingReport> = self.pending.lock().await.drain(..).collect();
        let mut failed = Vec::new();

        for mut item in queued {
            match self.api.mark_ended(&item.call_id, item.report).await {
                Ok(()) => info!(
                    "Persisted end of call {} after {} attempts",
                    item.call_id,
                    item.attempts + 1
                ),
                Err(e) => {
                    item.attempts += 1;
                    warn!(
                        "Retry {} for call {} failed: {}",
                        item.attempts, item.call_id, e
                    );
                    failed.push(item);
                }
            }
        }

        let mut pending = self.pending.lock().await;
        for item in failed.into_iter().rev() {
            pending.push_front(item);
        }
        pending.len()
    }

    pub async fn pending(&self) -> Vec<PendingReport> {
        self.pending.lock().await.iter().cloned().collect()
    }
}
