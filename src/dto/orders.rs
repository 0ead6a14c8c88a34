use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::order::{
    LineRequest, OrderSource, OrderStatus, PaymentMethod, PaymentStatus,
};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomerInput {
    #[validate(
        length(min = 1, max = 100, message = "Customer name must be 1-100 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub name: String,
    #[validate(custom = "crate::domain::validation::validate_phone")]
    pub phone: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<OrderItemRequest> for LineRequest {
    fn from(item: OrderItemRequest) -> Self {
        LineRequest {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate]
    pub customer: OrderCustomerInput,
    #[validate(length(min = 1, message = "Order must have at least one item"))]
    pub items: Vec<OrderItemRequest>,
    /// When present it must equal the sum of the line subtotals.
    pub total: Option<Decimal>,
    #[validate(custom = "crate::domain::validation::validate_non_negative")]
    pub discount: Option<Decimal>,
    pub delivery_date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub delivery_time: Option<String>,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub source: Option<OrderSource>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    #[validate(custom = "crate::domain::validation::validate_non_negative")]
    pub paid_amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
}
