use crate::room::RoomManager;
use crate::signaling::{SignalingChannel, SignalingOutput};
use async_trait::async_trait;
use axum::extract::ws::Message;
use callroom_core::{PeerId, ServerSignal};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Outbound websocket queues, one per connected participant.
#[derive(Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<DashMap<PeerId, mpsc::UnboundedSender<Message>>>,
}

impl PeerRegistry {
    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.peers.remove(peer_id);
    }

    pub fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn send_signal(&self, peer_id: &PeerId, msg: &ServerSignal) {
        if let Some(peer) = self.peers.get(peer_id) {
            match serde_json::to_string(msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {}: {:?}", peer_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal message: {}", e),
            }
        } else {
            warn!("Attempted to send signal to disconnected peer {}", peer_id);
        }
    }
}

#[async_trait]
impl SignalingOutput for PeerRegistry {
    async fn deliver(&self, peer_id: PeerId, signal: ServerSignal) {
        self.send_signal(&peer_id, &signal);
    }
}

/// Axum state for the websocket endpoint.
#[derive(Clone)]
pub struct SignalingService {
    registry: PeerRegistry,
    channel: Arc<SignalingChannel>,
}

impl SignalingService {
    pub fn new() -> Self {
        let registry = PeerRegistry::default();
        let channel = Arc::new(SignalingChannel::new(
            RoomManager::new(),
            Arc::new(registry.clone()),
        ));
        Self { registry, channel }
    }

    pub fn channel(&self) -> &Arc<SignalingChannel> {
        &self.channel
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}
