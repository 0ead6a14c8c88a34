use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::ai::{AiAnswer, AiQueryRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::ai_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/query", post(query))
        .route("/suggestions", get(suggestions))
}

#[utoipa::path(
    post,
    path = "/api/ai/query",
    request_body = AiQueryRequest,
    responses(
        (status = 200, description = "Assistant answer", body = ApiResponse<AiAnswer>),
        (status = 403, description = "Monthly AI quota reached"),
        (status = 502, description = "AI provider failed")
    ),
    security(("bearer_auth" = [])),
    tag = "AI"
)]
pub async fn query(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AiQueryRequest>,
) -> AppResult<Json<ApiResponse<AiAnswer>>> {
    Ok(Json(ai_service::ask(&state, &user, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/ai/suggestions",
    responses((status = 200, description = "Starter questions", body = ApiResponse<Vec<String>>)),
    security(("bearer_auth" = [])),
    tag = "AI"
)]
pub async fn suggestions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<&'static str>>>> {
    Ok(Json(ai_service::suggestions(&state, &user).await?))
}
