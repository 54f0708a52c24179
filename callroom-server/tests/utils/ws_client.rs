use anyhow::{Context, Result, bail};
use callroom_core::{ClientSignal, PeerId, ServerSignal};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Raw websocket participant used to drive the signaling server end to end.
pub struct WsTestClient {
    pub peer_id: PeerId,
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTestClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (socket, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .context("Failed to connect websocket")?;
        let mut client = Self {
            peer_id: PeerId::new(),
            socket,
        };

        match client.recv().await? {
            ServerSignal::Welcome { peer_id } => client.peer_id = peer_id,
            other => bail!("Expected welcome, got {:?}", other),
        }
        Ok(client)
    }

    pub async fn send(&mut self, signal: &ClientSignal) -> Result<()> {
        let json = serde_json::to_string(signal)?;
        self.socket.send(Message::Text(json.into())).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<ServerSignal> {
        let timeout = Duration::from_millis(SIGNAL_TIMEOUT_MS);
        loop {
            let msg = tokio::time::timeout(timeout, self.socket.next())
                .await
                .context("Timeout waiting for signal")?
                .context("Socket closed")??;
            if let Message::Text(text) = msg {
                return Ok(serde_json::from_str(text.as_str())?);
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.socket.close(None).await?;
        Ok(())
    }
}
