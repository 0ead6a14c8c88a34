use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    domain::{
        analytics::{self, TimeWindow, TrendPeriod},
        customer::Segment,
        order::OrderStatus,
    },
    dto::analytics::{
        Dashboard, DashboardTotals, LowStockProduct, PeriodSummary, SalesTrends, TodaySummary,
        TopProduct,
    },
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        shops::Model as ShopModel,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::TrendQuery,
    services::{ai_service::BusinessContext, order_service::orders_with_items, shop_service},
    state::AppState,
};

const TOP_PRODUCTS: i64 = 5;
const LOW_STOCK_ROWS: i64 = 10;
const RECENT_ORDERS: u64 = 10;

#[derive(FromRow)]
struct WindowRow {
    sales: Decimal,
    orders: i64,
}

async fn window_summary(pool: &DbPool, shop_id: Uuid, window: TimeWindow) -> AppResult<PeriodSummary> {
    let row = sqlx::query_as::<_, WindowRow>(
        r#"
        SELECT COALESCE(SUM(final_total), 0) AS sales, COUNT(*) AS orders
        FROM orders
        WHERE shop_id = $1 AND created_at >= $2 AND created_at < $3
        "#,
    )
    .bind(shop_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_one(pool)
    .await?;

    Ok(PeriodSummary {
        sales: row.sales,
        orders: row.orders,
    })
}

async fn top_products(pool: &DbPool, shop_id: Uuid, limit: i64) -> AppResult<Vec<TopProduct>> {
    Ok(sqlx::query_as::<_, TopProduct>(
        r#"
        SELECT id, name, total_sold, revenue, stock, price, unit
        FROM products
        WHERE shop_id = $1 AND is_active
        ORDER BY total_sold DESC, name
        LIMIT $2
        "#,
    )
    .bind(shop_id)
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

async fn low_stock_products(
    pool: &DbPool,
    shop_id: Uuid,
    threshold: i32,
    limit: i64,
) -> AppResult<Vec<LowStockProduct>> {
    Ok(sqlx::query_as::<_, LowStockProduct>(
        r#"
        SELECT id, name, stock, unit, price
        FROM products
        WHERE shop_id = $1 AND is_active AND stock <= $2
        ORDER BY stock, name
        LIMIT $3
        "#,
    )
    .bind(shop_id)
    .bind(threshold)
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

#[derive(FromRow)]
struct TotalsRow {
    customers: i64,
    vip_customers: i64,
    products: i64,
    pending_orders: i64,
}

async fn totals(pool: &DbPool, shop_id: Uuid) -> AppResult<DashboardTotals> {
    let open: Vec<&str> = OrderStatus::OPEN.iter().map(|s| s.as_str()).collect();
    let row = sqlx::query_as::<_, TotalsRow>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM customers WHERE shop_id = $1 AND is_active) AS customers,
            (SELECT COUNT(*) FROM customers WHERE shop_id = $1 AND segment = $2) AS vip_customers,
            (SELECT COUNT(*) FROM products WHERE shop_id = $1 AND is_active) AS products,
            (SELECT COUNT(*) FROM orders WHERE shop_id = $1 AND status = ANY($3)) AS pending_orders
        "#,
    )
    .bind(shop_id)
    .bind(Segment::Vip.as_str())
    .bind(&open)
    .fetch_one(pool)
    .await?;

    Ok(DashboardTotals {
        customers: row.customers,
        vip_customers: row.vip_customers,
        products: row.products,
        pending_orders: row.pending_orders,
    })
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Dashboard>> {
    let shop = shop_service::owned_shop(state, user).await?;
    let pool = &state.pool;
    let now = Utc::now();
    let clock = state.clock;

    let today = window_summary(pool, shop.id, clock.today(now)).await?;
    let yesterday = window_summary(pool, shop.id, clock.yesterday(now)).await?;
    let week = window_summary(pool, shop.id, clock.week_to_date(now)).await?;
    let month = window_summary(pool, shop.id, clock.month_to_date(now)).await?;

    let recent = Orders::find()
        .filter(OrderCol::ShopId.eq(shop.id))
        .order_by_desc(OrderCol::CreatedAt)
        .limit(RECENT_ORDERS)
        .all(&state.orm)
        .await?;

    let dashboard = Dashboard {
        today: TodaySummary {
            sales_change: analytics::percentage_change(today.sales, yesterday.sales),
            sales: today.sales,
            orders: today.orders,
        },
        yesterday,
        week,
        month,
        top_products: top_products(pool, shop.id, TOP_PRODUCTS).await?,
        low_stock_products: low_stock_products(pool, shop.id, shop.low_stock_threshold, LOW_STOCK_ROWS)
            .await?,
        recent_orders: orders_with_items(&state.orm, recent, false).await?,
        totals: totals(pool, shop.id).await?,
    };

    Ok(ApiResponse::success("Dashboard analytics", dashboard))
}

pub async fn sales_trends(
    state: &AppState,
    user: &AuthUser,
    query: TrendQuery,
) -> AppResult<ApiResponse<SalesTrends>> {
    let shop_id = user.require_shop()?;
    let period = query.period.unwrap_or(TrendPeriod::Week);
    let since = Utc::now() - Duration::days(period.days_back());

    let rows: Vec<(DateTime<Utc>, Decimal)> = sqlx::query_as(
        "SELECT created_at, final_total FROM orders WHERE shop_id = $1 AND created_at >= $2",
    )
    .bind(shop_id)
    .bind(since)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Sales trends",
        SalesTrends {
            period,
            sales_trends: analytics::bucket_sales(rows, period, &state.clock),
        },
    ))
}

/// Figures handed to the AI assistant alongside the owner's question.
pub async fn business_context(state: &AppState, shop: &ShopModel) -> AppResult<BusinessContext> {
    let pool = &state.pool;
    let now = Utc::now();
    let clock = state.clock;

    let active_products: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE shop_id = $1 AND is_active")
            .bind(shop.id)
            .fetch_one(pool)
            .await?;

    Ok(BusinessContext {
        shop_name: shop.shop_name.clone(),
        category: shop.category.parse().unwrap_or_default(),
        total_products: active_products.0,
        total_orders: shop.total_orders,
        total_revenue: shop.total_revenue,
        today_sales: window_summary(pool, shop.id, clock.today(now)).await?.sales,
        week_sales: window_summary(pool, shop.id, clock.week_to_date(now)).await?.sales,
        month_sales: window_summary(pool, shop.id, clock.month_to_date(now)).await?.sales,
        top_products: top_products(pool, shop.id, TOP_PRODUCTS).await?,
        low_stock_products: low_stock_products(pool, shop.id, shop.low_stock_threshold, TOP_PRODUCTS)
            .await?,
    })
}
