use crate::config::ServerConfig;
use crate::records::{self, CallRecordStore};
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Signaling websocket at `/ws`, plus the call record API when a store is given.
pub fn router(service: SignalingService, records: Option<CallRecordStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ws", get(ws_handler))
        .with_state(service);

    if let Some(store) = records {
        app = app.merge(records::routes(store));
    }

    app.layer(cors)
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let records = config.serve_records.then(CallRecordStore::new);
    let app = router(SignalingService::new(), records);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Signaling server listening on http://{}", addr);
    if config.serve_records {
        info!("Call record API enabled at http://{}/calls", addr);
    }

    axum::serve(listener, app)
        .await
        .context("Signaling server stopped unexpectedly")?;
    Ok(())
}
