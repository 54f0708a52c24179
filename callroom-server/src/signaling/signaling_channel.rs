use crate::room::{JoinOutcome, LeaveOutcome, RoomManager};
use crate::signaling::SignalingOutput;
use callroom_core::{ClientSignal, PeerId, Role, RoomId, ServerSignal};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Room-scoped relay between the two occupants of a call room.
pub struct SignalingChannel {
    rooms: RoomManager,
    memberships: DashMap<PeerId, RoomId>,
    output: Arc<dyn SignalingOutput>,
}

impl SignalingChannel {
    pub fn new(rooms: RoomManager, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms,
            memberships: DashMap::new(),
            output,
        }
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.memberships.get(peer_id).map(|r| r.value().clone())
    }

    /// Entry point for every event a participant sends.
    pub async fn handle(&self, peer_id: PeerId, signal: ClientSignal) {
        match signal {
            ClientSignal::JoinCall { room_id } => self.join(room_id, peer_id).await,
            ClientSignal::LeaveCall { room_id } => self.leave(room_id, peer_id).await,
            relayed => self.relay(peer_id, relayed).await,
        }
    }

    pub async fn join(&self, room_id: RoomId, peer_id: PeerId) {
        if let Some(current) = self.room_of(&peer_id) {
            if current != room_id {
                info!("Peer {} switches from room {} to {}", peer_id, current, room_id);
                self.leave(current, peer_id.clone()).await;
            }
        }

        match self.rooms.join(&room_id, &peer_id) {
            JoinOutcome::Created => {
                info!("Peer {} created room {}, waiting", peer_id, room_id);
                self.memberships.insert(peer_id.clone(), room_id.clone());
                self.output
                    .deliver(peer_id, ServerSignal::RoomCreated { room_id })
                    .await;
            }
            JoinOutcome::Ready { offerer, answerer } => {
                info!(
                    "Room {} ready: offerer {}, answerer {}",
                    room_id, offerer, answerer
                );
                self.memberships.insert(peer_id, room_id.clone());
                // Answerer is told first so it is ready before the offer can reach it.
                self.output
                    .deliver(
                        answerer,
                        ServerSignal::RoomReady {
                            room_id: room_id.clone(),
                            role: Role::Answerer,
                        },
                    )
                    .await;
                self.output
                    .deliver(
                        offerer,
                        ServerSignal::RoomReady {
                            room_id,
                            role: Role::Offerer,
                        },
                    )
                    .await;
            }
            JoinOutcome::Full => {
                warn!("Peer {} rejected, room {} is full", peer_id, room_id);
                self.output
                    .deliver(peer_id, ServerSignal::RoomFull { room_id })
                    .await;
            }
            JoinOutcome::AlreadyJoined => {
                debug!("Peer {} already in room {}", peer_id, room_id);
            }
        }
    }

    /// Forwards offer, answer and ICE candidate events to the other occupant.
    pub async fn relay(&self, sender: PeerId, signal: ClientSignal) {
        let Some(target) = self.rooms.counterpart(signal.room_id(), &sender) else {
            warn!(
                "Dropping relay from {} in room {}: no counterpart",
                sender,
                signal.room_id()
            );
            return;
        };

        let forwarded = match signal {
            ClientSignal::CallOffer { offer, .. } => ServerSignal::CallOffer { offer },
            ClientSignal::CallAnswer { answer, .. } => ServerSignal::CallAnswer { answer },
            ClientSignal::IceCandidate { candidate, .. } => {
                ServerSignal::IceCandidate { candidate }
            }
            ClientSignal::JoinCall { .. } | ClientSignal::LeaveCall { .. } => return,
        };

        self.output.deliver(target, forwarded).await;
    }

    pub async fn leave(&self, room_id: RoomId, peer_id: PeerId) {
        match self.rooms.leave(&room_id, &peer_id) {
            LeaveOutcome::NotMember => {
                debug!("Leave from {} ignored, not in room {}", peer_id, room_id);
            }
            LeaveOutcome::Left { remaining } => {
                info!("Peer {} left room {}", peer_id, room_id);
                self.memberships.remove_if(&peer_id, |_, r| *r == room_id);
                if let Some(other) = remaining {
                    self.output
                        .deliver(other, ServerSignal::PeerLeft { room_id })
                        .await;
                }
            }
        }
    }

    /// A dropped transport is treated exactly like an explicit leave.
    pub async fn disconnect(&self, peer_id: PeerId) {
        let Some(room_id) = self.room_of(&peer_id) else {
            return;
        };
        self.leave(room_id, peer_id).await;
    }
}
