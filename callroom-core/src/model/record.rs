use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Mentor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    Scheduled,
    Ongoing,
    Completed,
}

/// Call metadata as served by `GET /calls/{id}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub room_id: RoomId,
    pub rate_per_minute: u64,
    pub mentor: Mentor,
    pub status: RecordStatus,
}

/// Final duration and cost sent with `PATCH /calls/{id}/end`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EndReport {
    pub duration_secs: u64,
    pub cost: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Review {
    /// 1..=5
    pub rating: u8,
    pub comment: Option<String>,
}

impl Review {
    pub fn is_valid(&self) -> bool {
        (1..=5).contains(&self.rating)
    }
}
