// WebSocket dashboard stream: pushes the caller's dashboard on a fixed refresh interval.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::time::{Duration, timeout};

use super::AppState;
use super::auth::AuthUser;
use super::website::load_dashboard;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the dashboard connection count on drop (connect = +1, drop = -1).
struct WsDashboardGuard(Arc<AtomicUsize>);

impl Drop for WsDashboardGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
    }
}

pub(super) async fn ws_dashboard(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_dashboard(socket, state, user_id).await {
            tracing::info!("Dashboard stream error: {}", e);
        }
    })
}

async fn stream_dashboard(
    mut socket: WebSocket,
    state: AppState,
    user_id: String,
) -> anyhow::Result<()> {
    state
        .ws_dashboard_connections
        .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let _guard = WsDashboardGuard(state.ws_dashboard_connections.clone());
    tracing::info!("Client connected to dashboard stream");

    let mut tick = tokio::time::interval(Duration::from_secs(
        state.config.publishing.dashboard_refresh_secs,
    ));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // interval fires immediately; skip the first ping so the dashboard is the first frame
    ping_interval.tick().await;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let websites = load_dashboard(&state, &user_id).await?;
                let json = serde_json::to_string(&serde_json::json!({ "websites": websites }))?;
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
