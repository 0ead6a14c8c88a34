use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::messages::{CampaignRequest, CampaignResult, SendMessageRequest, SendResult},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Message,
    response::ApiResponse,
    routes::run_detached,
    services::message_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(send_message))
        .route("/campaign", post(campaign))
        .route("/messages", get(history))
}

#[utoipa::path(
    post,
    path = "/api/whatsapp/send",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message sent", body = ApiResponse<SendResult>),
        (status = 403, description = "Monthly message quota reached"),
        (status = 502, description = "Provider rejected the message")
    ),
    security(("bearer_auth" = [])),
    tag = "WhatsApp"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<SendResult>>> {
    let resp = run_detached(async move {
        message_service::send_custom(&state, &user, payload).await
    })
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/whatsapp/campaign",
    request_body = CampaignRequest,
    responses(
        (status = 200, description = "Campaign finished", body = ApiResponse<CampaignResult>),
        (status = 403, description = "Monthly message quota reached")
    ),
    security(("bearer_auth" = [])),
    tag = "WhatsApp"
)]
pub async fn campaign(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CampaignRequest>,
) -> AppResult<Json<ApiResponse<CampaignResult>>> {
    let resp = run_detached(async move {
        message_service::run_campaign(&state, &user, payload).await
    })
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/whatsapp/messages",
    responses((status = 200, description = "Latest messages", body = ApiResponse<Vec<Message>>)),
    security(("bearer_auth" = [])),
    tag = "WhatsApp"
)]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    Ok(Json(message_service::history(&state, &user).await?))
}
