use callroom_core::{PeerId, ROOM_CAPACITY, RoomId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// First occupant; it waits for a counterpart.
    Created,
    /// Second occupant arrived. The arrival is the offerer.
    Ready { offerer: PeerId, answerer: PeerId },
    /// Room already at capacity; the join is rejected.
    Full,
    /// The peer was already an occupant.
    AlreadyJoined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    NotMember,
    Left { remaining: Option<PeerId> },
}

/// Occupancy of a single call room. Never holds more than [`ROOM_CAPACITY`] peers.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    occupants: Vec<PeerId>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            occupants: Vec::with_capacity(ROOM_CAPACITY),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn occupancy(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.occupants.contains(peer_id)
    }

    pub fn admit(&mut self, peer_id: PeerId) -> JoinOutcome {
        if self.contains(&peer_id) {
            return JoinOutcome::AlreadyJoined;
        }
        match self.occupants.len() {
            0 => {
                self.occupants.push(peer_id);
                JoinOutcome::Created
            }
            n if n < ROOM_CAPACITY => {
                let answerer = self.occupants[0].clone();
                self.occupants.push(peer_id.clone());
                JoinOutcome::Ready {
                    offerer: peer_id,
                    answerer,
                }
            }
            _ => JoinOutcome::Full,
        }
    }

    /// Returns `false` if the peer was not an occupant.
    pub fn remove(&mut self, peer_id: &PeerId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|p| p != peer_id);
        self.occupants.len() != before
    }

    /// The other occupant, if `peer_id` is a member and is not alone.
    pub fn counterpart(&self, peer_id: &PeerId) -> Option<&PeerId> {
        if !self.contains(peer_id) {
            return None;
        }
        self.occupants.iter().find(|p| *p != peer_id)
    }

    pub fn occupants(&self) -> &[PeerId] {
        &self.occupants
    }
}
