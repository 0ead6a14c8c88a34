use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::analytics::{Dashboard, SalesTrends},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::TrendQuery,
    services::analytics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/sales-trends", get(sales_trends))
}

#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    responses((status = 200, description = "Sales summary for the caller's shop", body = ApiResponse<Dashboard>)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Dashboard>>> {
    Ok(Json(analytics_service::dashboard(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/analytics/sales-trends",
    params(TrendQuery),
    responses((status = 200, description = "Sales grouped by weekday or day of month", body = ApiResponse<SalesTrends>)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn sales_trends(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<ApiResponse<SalesTrends>>> {
    Ok(Json(analytics_service::sales_trends(&state, &user, query).await?))
}
