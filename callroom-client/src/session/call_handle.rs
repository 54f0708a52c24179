use crate::error::CallError;
use crate::session::command::CallCommand;
use crate::session::summary::CallSummary;
use callroom_core::{BillingSnapshot, CallId, CallRecord, CallStatus};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Caller-side handle of a running call.
///
/// Dropping the handle hangs up.
pub struct CallHandle {
    call_id: CallId,
    record: CallRecord,
    commands: mpsc::UnboundedSender<CallCommand>,
    status: watch::Receiver<CallStatus>,
    billing: watch::Receiver<BillingSnapshot>,
    task: JoinHandle<CallSummary>,
}

impl CallHandle {
    pub(crate) fn new(
        call_id: CallId,
        record: CallRecord,
        commands: mpsc::UnboundedSender<CallCommand>,
        status: watch::Receiver<CallStatus>,
        billing: watch::Receiver<BillingSnapshot>,
        task: JoinHandle<CallSummary>,
    ) -> Self {
        Self {
            call_id,
            record,
            commands,
            status,
            billing,
            task,
        }
    }

    pub fn call_id(&self) -> &CallId {
        &self.call_id
    }

    pub fn record(&self) -> &CallRecord {
        &self.record
    }

    /// Has no effect once the call has ended.
    pub fn hang_up(&self) {
        let _ = self.commands.send(CallCommand::HangUp);
    }

    pub fn set_muted(&self, muted: bool) {
        let _ = self.commands.send(CallCommand::SetMuted(muted));
    }

    pub fn status(&self) -> CallStatus {
        *self.status.borrow()
    }

    pub fn billing(&self) -> BillingSnapshot {
        *self.billing.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<CallStatus> {
        self.status.clone()
    }

    pub fn watch_billing(&self) -> watch::Receiver<BillingSnapshot> {
        self.billing.clone()
    }

    /// Waits until the call has ended and been finalized.
    pub async fn finished(self) -> Result<CallSummary, CallError> {
        let CallHandle { commands, task, .. } = self;
        let result = task.await;
        drop(commands);
        result.map_err(|e| CallError::Aborted(e.to_string()))
    }
}
