use async_trait::async_trait;
use callroom_core::{PeerId, ServerSignal};
use callroom_server::SignalingOutput;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct Delivered {
    pub peer_id: PeerId,
    pub signal: ServerSignal,
}

/// Mock SignalingOutput that captures all outgoing signals.
#[derive(Clone, Default)]
pub struct MockSignalingOutput {
    signals: Arc<Mutex<Vec<Delivered>>>,
}

impl MockSignalingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals delivered to one peer, in delivery order.
    pub async fn signals_for(&self, peer_id: &PeerId) -> Vec<ServerSignal> {
        self.signals
            .lock()
            .await
            .iter()
            .filter(|d| &d.peer_id == peer_id)
            .map(|d| d.signal.clone())
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.signals.lock().await.len()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn deliver(&self, peer_id: PeerId, signal: ServerSignal) {
        tracing::debug!("[MockSignaling] deliver {:?} to {}", signal, peer_id);

        self.signals.lock().await.push(Delivered { peer_id, signal });
    }
}
