use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use axum::Router;
use nowplaying_proto::config::{HttpConfig, MpvConfig};
use nowplaying_proto::protocol::ApiResponse;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::error::ComposeError;
use crate::metadata::TagReader;
use crate::status;

#[derive(Clone)]
pub struct HttpState {
    pub mpv: Arc<MpvConfig>,
    pub tags: Arc<dyn TagReader>,
}

/// Every path and method answers with the current status.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .fallback(now_playing)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process exits.  Only a failed bind is an error.
pub async fn serve(config: &HttpConfig, state: HttpState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP server to {}: {}", addr, e))?;

    info!("HTTP server listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Always 200; failures only show up in the body.
async fn now_playing(State(state): State<HttpState>) -> Json<ApiResponse> {
    debug!("HTTP: status request");
    match status::now_playing(&state.mpv, state.tags.clone()).await {
        Ok(result) => Json(ApiResponse::success(result)),
        Err(e) => {
            match &e {
                ComposeError::NoMedia(source) => warn!("HTTP: {} ({})", e, source),
                ComposeError::Query { property, source } => {
                    warn!("HTTP: {} ({} failed: {})", e, property, source)
                }
            }
            Json(ApiResponse::failure(e.to_string()))
        }
    }
}
