// GET /version

use axum::response::IntoResponse;

/// GET /version: service name and version baked in from Cargo.toml at build time.
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
