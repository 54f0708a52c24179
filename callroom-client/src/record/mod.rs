mod http_client;
mod outbox;

pub use http_client::HttpCallRecordClient;
pub use outbox::{PendingReport, ReportOutbox};

use crate::error::RecordError;
use async_trait::async_trait;
use callroom_core::{CallId, CallRecord, EndReport, Review};
use std::sync::Arc;
use tracing::warn;

/// The REST resource representing a call.
#[async_trait]
pub trait CallRecordApi: Send + Sync {
    async fn get_call(&self, call_id: &CallId) -> Result<CallRecord, RecordError>;

    /// Idempotent start marker.
    async fn mark_started(&self, call_id: &CallId) -> Result<(), RecordError>;

    /// Idempotent end marker carrying the final duration and cost.
    async fn mark_ended(&self, call_id: &CallId, report: EndReport) -> Result<(), RecordError>;

    async fn post_review(&self, call_id: &CallId, review: &Review) -> Result<(), RecordError>;
}

/// Posts a rating without waiting for the result.
pub fn send_review(api: Arc<dyn CallRecordApi>, call_id: CallId, review: Review) {
    tokio::spawn(async move {
        if let Err(e) = api.post_review(&call_id, &review).await {
            warn!("Review for call {} not delivered: {}", call_id, e);
        }
    });
}
