mod ws_connector;

pub use ws_connector::WsConnector;

use crate::error::SignalingError;
use async_trait::async_trait;
use callroom_core::{ClientSignal, PeerId, ServerSignal};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outbound half of a participant's signaling connection.
#[async_trait]
pub trait SignalingLink: Send + Sync {
    /// Sends once; a lost event is not retried.
    async fn send(&self, signal: ClientSignal) -> Result<(), SignalingError>;
}

pub struct SignalingConnection {
    pub link: Arc<dyn SignalingLink>,
    /// Inbound events in server order. Closes when the transport drops.
    pub events: mpsc::UnboundedReceiver<ServerSignal>,
    pub peer_id: Option<PeerId>,
}

#[async_trait]
pub trait SignalingConnector: Send + Sync {
    async fn connect(&self) -> Result<SignalingConnection, SignalingError>;
}
