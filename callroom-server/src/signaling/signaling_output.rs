use async_trait::async_trait;
use callroom_core::{PeerId, ServerSignal};

/// Delivery side of the signaling channel: whatever owns the participant
/// connections implements this so room logic can reach them.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver one event to one participant. Delivery is best-effort and never retried.
    async fn deliver(&self, peer_id: PeerId, signal: ServerSignal);
}
