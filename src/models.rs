use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    customer::Segment,
    message::{MessageStatus, MessageType},
    order::{OrderSource, OrderStatus, PaymentMethod, PaymentStatus},
    payment::PaymentState,
    plan::{Plan, PlanLimits, Usage},
    product::Unit,
    shop::{Language, ShopCategory},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub shop_id: Option<Uuid>,
    pub plan: Plan,
    pub plan_expiry: Option<DateTime<Utc>>,
    pub plan_limits: PlanLimits,
    pub usage: Usage,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Postal address stored as JSON on shops and customers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(custom = "crate::domain::validation::validate_pincode")]
    pub pincode: Option<String>,
    pub landmark: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopSettings {
    pub language: Language,
    pub currency: String,
    pub timezone: String,
    pub auto_confirm_orders: bool,
    pub low_stock_threshold: i32,
    #[serde(rename = "enableWhatsAppNotifications")]
    pub enable_whatsapp_notifications: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopStats {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub total_customers: i64,
    pub total_products: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub shop_name: String,
    pub category: ShopCategory,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub address: Option<Address>,
    pub public_slug: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub settings: ShopSettings,
    #[schema(value_type = Option<Object>)]
    pub business_hours: Option<serde_json::Value>,
    pub stats: ShopStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storefront view of a shop: no owner, settings or stats.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicShop {
    pub id: Uuid,
    pub shop_name: String,
    pub category: ShopCategory,
    pub whatsapp: Option<String>,
    pub address: Option<Address>,
    pub public_slug: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub business_hours: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_sold: i64,
    pub revenue: Decimal,
    pub views: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub unit: Unit,
    pub category: String,
    pub image: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub cost_price: Decimal,
    pub profit_margin: Decimal,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_low_stock: bool,
    pub tags: Vec<String>,
    pub stats: ProductStats,
    pub last_restocked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPreferences {
    pub language: Language,
    pub marketing_consent: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<Address>,
    pub total_orders: i32,
    pub total_spent: Decimal,
    pub last_order_date: Option<DateTime<Utc>>,
    pub average_order_value: Decimal,
    pub tags: Vec<String>,
    pub segment: Segment,
    pub notes: Option<String>,
    pub is_active: bool,
    pub preferences: CustomerPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithOrders {
    #[serde(flatten)]
    pub customer: Customer,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub unit: String,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    pub updated_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub order_number: String,
    pub customer: OrderCustomer,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub discount: Decimal,
    pub final_total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub paid_amount: Decimal,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_time: Option<String>,
    pub notes: Option<String>,
    pub whatsapp_sent: bool,
    pub source: OrderSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status_history: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub phone: String,
    pub name: Option<String>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub shop_id: Uuid,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub recipient: Recipient,
    pub body: String,
    pub status: MessageStatus,
    pub provider_message_id: Option<String>,
    pub order_id: Option<Uuid>,
    pub campaign_id: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Subscription payment as shown to the account owner. The gateway signature
/// is never returned.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub plan: Plan,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentState,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub receipt: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
