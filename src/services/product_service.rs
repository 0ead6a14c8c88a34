use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        plan::{self, Resource},
        product::{self, DEFAULT_CATEGORY, DEFAULT_LOW_STOCK_THRESHOLD},
    },
    dto::products::{CreateProductRequest, UpdateProductRequest},
    entity::{
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        shops::{Column as ShopCol, Entity as Shops},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, ProductStats},
    response::{ApiResponse, Pagination},
    routes::params::ProductQuery,
    services::{shop_service::owned_shop, tags_from_json, to_json, usage_service, utc},
    state::AppState,
};

pub fn product_from_entity(product: ProductModel, low_stock_threshold: i32) -> Product {
    Product {
        id: product.id,
        shop_id: product.shop_id,
        unit: product.unit.parse().unwrap_or_default(),
        profit_margin: product::profit_margin(product.price, product.cost_price),
        is_low_stock: product::is_low_stock(product.stock, low_stock_threshold),
        tags: tags_from_json(product.tags),
        stats: ProductStats {
            total_sold: product.total_sold,
            revenue: product.revenue,
            views: product.views,
        },
        name: product.name,
        description: product.description,
        price: product.price,
        stock: product.stock,
        category: product.category,
        image: product.image,
        sku: product.sku,
        barcode: product.barcode,
        cost_price: product.cost_price,
        is_active: product.is_active,
        is_featured: product.is_featured,
        last_restocked: product.last_restocked.map(utc),
        created_at: utc(product.created_at),
        updated_at: utc(product.updated_at),
    }
}

async fn threshold_for(state: &AppState, shop_id: Uuid) -> AppResult<i32> {
    Ok(Shops::find_by_id(shop_id)
        .one(&state.orm)
        .await?
        .map(|s| s.low_stock_threshold)
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD))
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let shop_id = match query.shop_id {
        Some(id) => id,
        None => user.require_shop()?,
    };
    let page = query.page();

    let mut condition = Condition::all().add(Column::ShopId.eq(shop_id));
    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.as_str()));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(Column::IsActive.eq(is_active));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Name).ilike(format!("%{search}%")));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let paginator = finder.paginate(&state.orm, page.limit as u64);
    let total = paginator.num_items().await? as i64;
    let threshold = threshold_for(state, shop_id).await?;
    let items = paginator
        .fetch_page(page.index())
        .await?
        .into_iter()
        .map(|p| product_from_entity(p, threshold))
        .collect();

    Ok(ApiResponse::paginated(
        "Products",
        items,
        Pagination::new(page.page, page.limit, total),
    ))
}

/// Public product page; every read counts as a view.
pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::update_many()
        .col_expr(Column::Views, Expr::col(Column::Views).add(1))
        .filter(Column::Id.eq(id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product"));
    }

    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let threshold = threshold_for(state, product.shop_id).await?;
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product, threshold),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    let shop_id = user.require_shop()?;
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let account = usage_service::lock_account(&txn, user.user_id, now).await?;
    let current = Products::find()
        .filter(Column::ShopId.eq(shop_id))
        .count(&txn)
        .await? as i64;
    plan::check_ceiling(usage_service::plan_of(&account), Resource::Products, current)?;

    let stock = payload.stock.unwrap_or(0);
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_id: Set(shop_id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(stock),
        unit: Set(payload.unit.unwrap_or_default().as_str().to_string()),
        category: Set(payload
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())),
        image: Set(payload.image),
        sku: Set(payload.sku),
        barcode: Set(payload.barcode),
        cost_price: Set(payload.cost_price.unwrap_or(Decimal::ZERO)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        tags: Set(to_json(&payload.tags.unwrap_or_default())?),
        total_sold: Set(0),
        revenue: Set(Decimal::ZERO),
        views: Set(0),
        last_restocked: Set((stock > 0).then(|| now.into())),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    Shops::update_many()
        .col_expr(ShopCol::TotalProducts, Expr::col(ShopCol::TotalProducts).add(1))
        .filter(ShopCol::Id.eq(shop_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    let threshold = threshold_for(state, shop_id).await?;
    Ok(ApiResponse::success(
        "Product created successfully",
        product_from_entity(product, threshold),
    ))
}

async fn owned_product(state: &AppState, shop_id: Uuid, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .filter(Column::ShopId.eq(shop_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    let shop_id = user.require_shop()?;
    let existing = owned_product(state, shop_id, id).await?;
    let previous_stock = existing.stock;
    let now = Utc::now();

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        if stock > previous_stock {
            active.last_restocked = Set(Some(now.into()));
        }
        active.stock = Set(stock);
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(unit.as_str().to_string());
    }
    if let Some(category) = payload.category.filter(|c| !c.trim().is_empty()) {
        active.category = Set(category);
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(sku) = payload.sku {
        active.sku = Set(Some(sku));
    }
    if let Some(barcode) = payload.barcode {
        active.barcode = Set(Some(barcode));
    }
    if let Some(cost_price) = payload.cost_price {
        active.cost_price = Set(cost_price);
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(to_json(&tags)?);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(now.into());

    let product = active.update(&state.orm).await?;
    let threshold = threshold_for(state, shop_id).await?;

    Ok(ApiResponse::success(
        "Product updated successfully",
        product_from_entity(product, threshold),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let shop_id = user.require_shop()?;

    let txn = state.orm.begin().await?;
    let result = Products::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::ShopId.eq(shop_id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product"));
    }

    Shops::update_many()
        .col_expr(
            ShopCol::TotalProducts,
            Expr::cust("GREATEST(total_products - 1, 0)"),
        )
        .filter(ShopCol::Id.eq(shop_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({ "id": id }),
    ))
}

/// Active products at or below the shop's low-stock threshold, scarcest first.
pub async fn low_stock(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Vec<Product>>> {
    let shop = owned_shop(state, user).await?;
    let threshold = shop.low_stock_threshold;

    let items = Products::find()
        .filter(Column::ShopId.eq(shop.id))
        .filter(Column::IsActive.eq(true))
        .filter(Column::Stock.lte(threshold))
        .order_by_asc(Column::Stock)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| product_from_entity(p, threshold))
        .collect();

    Ok(ApiResponse::success("Low stock products", items))
}
