// HTTP + WebSocket routes

mod auth;
mod http;
mod website;
mod ws;

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::dashboard::DashboardSettings;
use crate::website_repo::WebsiteRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repo: Arc<WebsiteRepo>,
    pub(crate) dashboard: DashboardSettings,
    pub(crate) ws_dashboard_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

pub fn app(
    repo: Arc<WebsiteRepo>,
    ws_dashboard_connections: Arc<AtomicUsize>,
    config: AppConfig,
) -> anyhow::Result<Router> {
    let state = AppState {
        repo,
        dashboard: DashboardSettings::from_config(&config.dashboard)?,
        ws_dashboard_connections,
        config,
    };
    Ok(Router::new()
        .route("/", get(|| async { "Hello from uptime-monitor!" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route(
            "/api/v1/website",
            post(website::create_website).delete(website::delete_website),
        ) // POST, DELETE /api/v1/website
        .route("/api/v1/website/", delete(website::delete_website)) // DELETE /api/v1/website/
        .route("/api/v1/website/status", get(website::website_status)) // GET /api/v1/website/status
        .route("/api/v1/website/summary", get(website::website_summary)) // GET /api/v1/website/summary
        .route("/api/v1/websites", get(website::list_websites)) // GET /api/v1/websites
        .route("/api/v1/dashboard", get(website::dashboard)) // GET /api/v1/dashboard
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state))
}
