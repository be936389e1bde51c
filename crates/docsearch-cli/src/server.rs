//! HTTP server implementation using Axum.

use crate::handler::{handle_health, handle_rpc};
use axum::{
    routing::{get, post},
    Router,
};
use docsearch_core::codec;
use docsearch_core::{DocIndex, DocSearchError, SearchIndex};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    /// In-memory FTS5 index over `source`
    pub index: DocIndex,
    /// The index as parsed from disk
    pub source: SearchIndex,
    /// File the index was loaded from
    pub path: PathBuf,
}

impl AppState {
    /// Parse `path` and build the in-memory search index.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let parsed = codec::read_file(path)?;
        let index = DocIndex::from_search_index(&parsed.index)?;
        info!("Loaded {} entries from {}", parsed.index.len(), path.display());

        Ok(Self {
            index,
            source: parsed.index,
            path: path.to_path_buf(),
        })
    }
}

/// Build the router with all routes attached.
pub fn router(state: AppState) -> Router {
    // Configure CORS for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/rpc", post(handle_rpc))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Resolve `--host`/`--port` into a socket address.
fn listen_addr(host: &str, port: u16) -> docsearch_core::Result<SocketAddr> {
    format!("{}:{}", host, port)
        .parse()
        .map_err(|e| DocSearchError::Config {
            message: format!("invalid listen address {}:{}: {}", host, port, e),
        })
}

/// Start the JSON-RPC HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let app = router(state);

    let addr = listen_addr(host, port)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    // Spawn the server in the background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
