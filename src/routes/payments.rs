use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::payments::{CheckoutOrder, CreateCheckoutRequest, PlanInfo, VerifiedPlan, VerifyPaymentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Payment,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(plans))
        .route("/create-order", post(create_order))
        .route("/verify", post(verify))
        .route("/history", get(history))
}

#[utoipa::path(
    get,
    path = "/api/payments/plans",
    responses((status = 200, description = "Subscription plans", body = ApiResponse<Vec<PlanInfo>>)),
    tag = "Payments"
)]
pub async fn plans() -> AppResult<Json<ApiResponse<Vec<PlanInfo>>>> {
    Ok(Json(payment_service::list_plans().await?))
}

#[utoipa::path(
    post,
    path = "/api/payments/create-order",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Gateway order created", body = ApiResponse<CheckoutOrder>),
        (status = 400, description = "Invalid plan selected"),
        (status = 503, description = "Payment gateway not configured")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutOrder>>> {
    Ok(Json(payment_service::create_checkout(&state, &user, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/payments/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Plan upgraded", body = ApiResponse<VerifiedPlan>),
        (status = 400, description = "Signature mismatch"),
        (status = 409, description = "Payment already verified")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn verify(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<VerifiedPlan>>> {
    Ok(Json(payment_service::verify(&state, &user, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/payments/history",
    responses((status = 200, description = "Payments made by the caller", body = ApiResponse<Vec<Payment>>)),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Payment>>>> {
    Ok(Json(payment_service::history(&state, &user).await?))
}
