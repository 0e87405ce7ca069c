// /api/v1 handlers: website CRUD (soft delete) and dashboard summaries

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::auth::AuthUser;
use crate::clock::now_ms;
use crate::dashboard;
use crate::error::{ApiError, ApiResult};
use crate::models::{Website, WebsiteSummary, WebsiteWithTicks};

#[derive(Debug, Deserialize)]
pub(super) struct CreateWebsiteRequest {
    url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateWebsiteResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WebsiteIdParam {
    website_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct WebsitesResponse<T> {
    websites: Vec<T>,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageResponse {
    message: &'static str,
}

/// POST /api/v1/website: registers a URL for monitoring.
pub(super) async fn create_website(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateWebsiteRequest>,
) -> ApiResult<Json<CreateWebsiteResponse>> {
    let url = body.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ApiError::BadRequest(format!(
            "url must start with http:// or https://, got {url:?}"
        )));
    }
    let id = state.repo.create_website(&user_id, url).await?;
    tracing::info!(website_id = %id, url, "website created");
    Ok(Json(CreateWebsiteResponse { id }))
}

/// GET /api/v1/website/status?websiteId=: website with all its ticks.
pub(super) async fn website_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WebsiteIdParam>,
) -> ApiResult<Json<WebsiteWithTicks>> {
    let website = state
        .repo
        .get_website_with_ticks(&q.website_id, &user_id)
        .await?
        .ok_or(ApiError::NotFound("website"))?;
    Ok(Json(website))
}

/// GET /api/v1/websites: active websites of the caller (no ticks).
pub(super) async fn list_websites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<WebsitesResponse<Website>>> {
    let websites = state.repo.list_websites(&user_id).await?;
    Ok(Json(WebsitesResponse { websites }))
}

/// DELETE /api/v1/website: soft delete; body `{"websiteId": "..."}`.
pub(super) async fn delete_website(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<WebsiteIdParam>,
) -> ApiResult<Json<MessageResponse>> {
    if !state
        .repo
        .disable_website(&body.website_id, &user_id)
        .await?
    {
        return Err(ApiError::NotFound("website"));
    }
    tracing::info!(website_id = %body.website_id, "website disabled");
    Ok(Json(MessageResponse {
        message: "deleted website successfully",
    }))
}

/// GET /api/v1/website/summary?websiteId=: metrics and padded timeline for one website.
pub(super) async fn website_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WebsiteIdParam>,
) -> ApiResult<Json<WebsiteSummary>> {
    let website = state
        .repo
        .get_website_with_ticks(&q.website_id, &user_id)
        .await?
        .ok_or(ApiError::NotFound("website"))?;
    Ok(Json(dashboard::summarize(
        &website,
        &state.dashboard,
        now_ms(),
    )))
}

/// GET /api/v1/dashboard: one summary per active website of the caller.
pub(super) async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<WebsitesResponse<WebsiteSummary>>> {
    let websites = load_dashboard(&state, &user_id).await?;
    Ok(Json(WebsitesResponse { websites }))
}

pub(super) async fn load_dashboard(
    state: &AppState,
    user_id: &str,
) -> anyhow::Result<Vec<WebsiteSummary>> {
    let websites = state.repo.list_websites_with_ticks(user_id).await?;
    Ok(dashboard::summarize_all(
        &websites,
        &state.dashboard,
        now_ms(),
    ))
}
