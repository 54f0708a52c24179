use crate::error::CallError;
use callroom_core::{BillingSnapshot, CallId, EndReason};

/// Outcome of a finished call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSummary {
    pub call_id: CallId,
    pub reason: EndReason,
    /// Final, authoritative duration and cost.
    pub snapshot: BillingSnapshot,
    /// Remote media was received at some point.
    pub reached_media: bool,
    /// The end report was accepted by the call record API.
    /// `false` either when it is waiting in the outbox or when there was nothing to bill.
    pub persisted: bool,
}

impl CallSummary {
    /// The pre-call error a UI should surface, if the call never started for a known reason.
    pub fn error(&self) -> Option<CallError> {
        match self.reason {
            EndReason::RoomFull => Some(CallError::RoomFull),
            _ => None,
        }
    }
}
