use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::{
        orders::CreateOrderRequest,
        shops::{CreateShopRequest, UpdateShopRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, Product, PublicShop, Shop},
    response::ApiResponse,
    routes::{params::CatalogQuery, run_detached},
    services::{order_service, shop_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_shop).get(get_shop).put(update_shop))
        .route("/public/{slug}", get(public_shop))
        .route("/public/{slug}/products", get(public_products))
        .route("/public/{slug}/orders", post(public_order))
}

#[utoipa::path(
    post,
    path = "/api/shop",
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop created", body = ApiResponse<Shop>),
        (status = 400, description = "Account already has a shop")
    ),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn create_shop(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateShopRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Shop>>)> {
    let resp = shop_service::create_shop(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/shop",
    responses((status = 200, description = "Own shop", body = ApiResponse<Shop>)),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn get_shop(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Shop>>> {
    Ok(Json(shop_service::get_my_shop(&state, &user).await?))
}

#[utoipa::path(
    put,
    path = "/api/shop",
    request_body = UpdateShopRequest,
    responses((status = 200, description = "Shop updated", body = ApiResponse<Shop>)),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn update_shop(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateShopRequest>,
) -> AppResult<Json<ApiResponse<Shop>>> {
    Ok(Json(shop_service::update_shop(&state, &user, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/shop/public/{slug}",
    params(("slug" = String, Path, description = "Public shop link")),
    responses(
        (status = 200, description = "Storefront", body = ApiResponse<PublicShop>),
        (status = 404, description = "No active shop with this link")
    ),
    tag = "Storefront"
)]
pub async fn public_shop(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<PublicShop>>> {
    Ok(Json(shop_service::get_public_shop(&state, &slug).await?))
}

#[utoipa::path(
    get,
    path = "/api/shop/public/{slug}/products",
    params(("slug" = String, Path, description = "Public shop link"), CatalogQuery),
    responses((status = 200, description = "Active products", body = ApiResponse<Vec<Product>>)),
    tag = "Storefront"
)]
pub async fn public_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    Ok(Json(shop_service::public_catalog(&state, &slug, query).await?))
}

#[utoipa::path(
    post,
    path = "/api/shop/public/{slug}/orders",
    params(("slug" = String, Path, description = "Public shop link")),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<Order>),
        (status = 400, description = "Insufficient stock or invalid order")
    ),
    tag = "Storefront"
)]
pub async fn public_order(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let resp = run_detached(order_service::create_public_order(state, slug, payload)).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
