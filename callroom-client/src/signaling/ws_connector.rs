use crate::error::SignalingError;
use crate::signaling::{SignalingConnection, SignalingConnector, SignalingLink};
use async_trait::async_trait;
use callroom_core::{ClientSignal, ServerSignal};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Connects to the signaling server over a websocket.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

struct WsLink {
    tx: mpsc::UnboundedSender<Message>,
}

#[async_trait]
impl SignalingLink for WsLink {
    async fn send(&self, signal: ClientSignal) -> Result<(), SignalingError> {
        let json = serde_json::to_string(&signal)?;
        self.tx
            .send(Message::Text(json.into()))
            .map_err(|_| SignalingError::Closed)
    }
}

#[async_trait]
impl SignalingConnector for WsConnector {
    async fn connect(&self) -> Result<SignalingConnection, SignalingError> {
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| SignalingError::Connect(e.to_string()))?;
        info!("Connected to signaling server at {}", self.url);

        let (mut sender, mut receiver) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if sender.send(msg).await.is_err() {
                    break;
                }
            }
            let _ = sender.close().await;
        });

        tokio::spawn(async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ServerSignal>(&text) {
                        Ok(signal) => {
                            if event_tx.send(signal).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid signal from server: {:?}", e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            debug!("Signaling reader finished");
        });

        let peer_id = match event_rx.recv().await {
            Some(ServerSignal::Welcome { peer_id }) => Some(peer_id),
            Some(other) => {
                return Err(SignalingError::Connect(format!(
                    "expected welcome, got {:?}",
                    other
                )));
            }
            None => return Err(SignalingError::Closed),
        };

        Ok(SignalingConnection {
            link: Arc::new(WsLink { tx: out_tx }),
            events: event_rx,
            peer_id,
        })
    }
}
