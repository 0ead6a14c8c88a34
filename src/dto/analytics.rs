use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::analytics::{TrendBucket, TrendPeriod},
    models::Order,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodaySummary {
    pub sales: Decimal,
    pub orders: i64,
    pub sales_change: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PeriodSummary {
    pub sales: Decimal,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub total_sold: i64,
    pub revenue: Decimal,
    pub stock: i32,
    pub price: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
    pub unit: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub customers: i64,
    pub vip_customers: i64,
    pub products: i64,
    pub pending_orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: TodaySummary,
    pub yesterday: PeriodSummary,
    pub week: PeriodSummary,
    pub month: PeriodSummary,
    pub top_products: Vec<TopProduct>,
    pub low_stock_products: Vec<LowStockProduct>,
    pub recent_orders: Vec<Order>,
    pub totals: DashboardTotals,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesTrends {
    pub period: TrendPeriod,
    pub sales_trends: Vec<TrendBucket>,
}
