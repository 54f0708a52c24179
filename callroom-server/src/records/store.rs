use callroom_core::{CallId, CallRecord, EndReport, Mentor, RecordStatus, Review, RoomId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewCall {
    #[serde(default)]
    pub room_id: Option<RoomId>,
    pub rate_per_minute: u64,
    pub mentor: Mentor,
}

#[derive(Debug, Clone)]
pub struct StoredCall {
    pub record: CallRecord,
    pub start_marks: u32,
    pub end: Option<EndReport>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReviewRejected {
    UnknownCall,
    InvalidRating(u8),
}

#[derive(Clone, Default)]
pub struct CallRecordStore {
    calls: Arc<DashMap<CallId, StoredCall>>,
}

impl CallRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, new_call: NewCall) -> (CallId, CallRecord) {
        let call_id = CallId(Uuid::new_v4().to_string());
        let room_id = new_call
            .room_id
            .unwrap_or_else(|| RoomId(Uuid::new_v4().to_string()));
        let record = CallRecord {
            room_id,
            rate_per_minute: new_call.rate_per_minute,
            mentor: new_call.mentor,
            status: RecordStatus::Scheduled,
        };
        self.insert(call_id.clone(), record.clone());
        (call_id, record)
    }

    pub fn insert(&self, call_id: CallId, record: CallRecord) {
        info!("Call record {} stored for room {}", call_id, record.room_id);
        self.calls.insert(
            call_id,
            StoredCall {
                record,
                start_marks: 0,
                end: None,
                reviews: Vec::new(),
            },
        );
    }

    pub fn get(&self, call_id: &CallId) -> Option<StoredCall> {
        self.calls.get(call_id).map(|c| c.value().clone())
    }

    /// Idempotent: a completed call keeps its status.
    pub fn mark_started(&self, call_id: &CallId) -> Option<CallRecord> {
        let mut call = self.calls.get_mut(call_id)?;
        call.start_marks += 1;
        if call.record.status == RecordStatus::Scheduled {
            call.record.status = RecordStatus::Ongoing;
        }
        Some(call.record.clone())
    }

    /// Idempotent: the first end report wins and is returned on every later call.
    pub fn mark_ended(&self, call_id: &CallId, report: EndReport) -> Option<EndReport> {
        let mut call = self.calls.get_mut(call_id)?;
        let stored = *call.end.get_or_insert(report);
        call.record.status = RecordStatus::Completed;
        Some(stored)
    }

    pub fn add_review(&self, call_id: &CallId, review: Review) -> Result<(), ReviewRejected> {
        if !review.is_valid() {
            return Err(ReviewRejected::InvalidRating(review.rating));
        }
        let mut call = self
            .calls
            .get_mut(call_id)
            .ok_or(ReviewRejected::UnknownCall)?;
        call.reviews.push(review);
        Ok(())
    }
}
