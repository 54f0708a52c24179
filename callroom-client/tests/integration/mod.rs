pub mod session_tests;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use callroom_client::{
    CallDeps, CallHandle, CallRecordApi, ClientConfig, MediaSource, ReportOutbox,
    SignalingConnector,
};
use callroom_core::CallStatus;
use callroom_server::{CallRecordStore, SignalingService, router};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Host candidates only; tests never reach public STUN servers.
pub fn test_config(signaling_url: &str, api_base_url: &str) -> ClientConfig {
    ClientConfig::new(signaling_url, api_base_url, "test-token").with_ice_servers(vec![])
}

pub fn mock_deps(
    records: Arc<dyn CallRecordApi>,
    signaling: Arc<dyn SignalingConnector>,
    media: Arc<dyn MediaSource>,
) -> CallDeps {
    CallDeps {
        outbox: Arc::new(ReportOutbox::new(Arc::clone(&records))),
        records,
        media,
        signaling,
    }
}

pub async fn wait_for_status(handle: &CallHandle, status: CallStatus, timeout_ms: u64) -> bool {
    let mut rx = handle.watch_status();
    tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        rx.wait_for(|s| *s == status),
    )
    .await
    .map(|r| r.is_ok())
    .unwrap_or(false)
}

/// Serves signaling and the call record API on an ephemeral local port.
pub async fn spawn_server(records: CallRecordStore) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");
    let app = router(SignalingService::new(), Some(records));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
