//! # HTTP Print Service
//!
//! Thin JSON-in, PDF-out adapter over the generators, for a scanning front
//! end that wants labels and slips without linking the library.
//!
//! ## Usage
//!
//! ```bash
//! reelprint --config mill.json serve --listen 0.0.0.0:8080
//! ```
//!
//! | Route                      | Body         | Response          |
//! |----------------------------|--------------|-------------------|
//! | `POST /api/scan/parse`     | `{input}`    | `{code, is_valid}`|
//! | `POST /api/label`          | `ScanResult` | `application/pdf` |
//! | `POST /api/packing-slip`   | `Shipment`   | `application/pdf` |
//! | `POST /api/barcode/preview`| `{value}`    | `image/png`       |
//!
//! PDF routes take `?mode=print` (inline) or `?mode=download` (attachment,
//! the default).

mod handlers;
mod state;

pub use state::AppState;

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::assets::HttpFileLoader;
use crate::config::ReelprintConfig;
use crate::error::ReelprintError;

/// Largest accepted request body; a few thousand slip items fit comfortably.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Build the router. Exposed so tests can drive it without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/scan/parse", post(handlers::scan::parse))
        .route("/api/barcode/preview", post(handlers::scan::barcode_preview))
        .route("/api/label", post(handlers::documents::label))
        .route("/api/packing-slip", post(handlers::documents::packing_slip))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

/// Start the HTTP server and run until it fails.
///
/// ## Example
///
/// ```no_run
/// use reelprint::config::ReelprintConfig;
/// use reelprint::server::serve;
///
/// # async fn example() -> Result<(), reelprint::error::ReelprintError> {
/// serve(ReelprintConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ReelprintConfig) -> Result<(), ReelprintError> {
    let listen_addr = config.server.listen_addr.clone();
    let loader = Arc::new(HttpFileLoader::new()?);
    let app = router(Arc::new(AppState::new(config, loader)));

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| {
            ReelprintError::Transport(format!("Failed to bind to {}: {}", listen_addr, e))
        })?;

    tracing::info!(addr = %listen_addr, "print service listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| ReelprintError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}
