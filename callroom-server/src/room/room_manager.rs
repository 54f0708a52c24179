use crate::room::{JoinOutcome, LeaveOutcome, Room};
use callroom_core::{PeerId, RoomId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::info;

/// Room table keyed by room id.
///
/// Every mutation happens under the map entry guard for that room, so
/// concurrent joins to one room are serialized and occupancy stays within capacity.
#[derive(Clone, Default)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, Room>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, room_id: &RoomId, peer_id: &PeerId) -> JoinOutcome {
        let mut room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Creating new room: {}", room_id);
            Room::new(room_id.clone())
        });
        room.admit(peer_id.clone())
    }

    pub fn leave(&self, room_id: &RoomId, peer_id: &PeerId) -> LeaveOutcome {
        let Entry::Occupied(mut entry) = self.rooms.entry(room_id.clone()) else {
            return LeaveOutcome::NotMember;
        };
        if !entry.get_mut().remove(peer_id) {
            return LeaveOutcome::NotMember;
        }

        let remaining = entry.get().occupants().first().cloned();
        if entry.get().is_empty() {
            entry.remove();
            info!("Room {} is empty, deleting", room_id);
        }
        LeaveOutcome::Left { remaining }
    }

    pub fn counterpart(&self, room_id: &RoomId, peer_id: &PeerId) -> Option<PeerId> {
        self.rooms
            .get(room_id)
            .and_then(|room| room.counterpart(peer_id).cloned())
    }

    pub fn occupancy(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map(|r| r.occupancy()).unwrap_or(0)
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
