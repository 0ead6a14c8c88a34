use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::plan::{Plan, PlanLimits};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCheckoutRequest {
    pub plan: Plan,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub payment_id: Uuid,
    pub order_id: String,
    /// Amount in paise, as the gateway expects it.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub plan: Plan,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPlan {
    pub plan: Plan,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub id: Plan,
    pub name: String,
    /// Price in rupees.
    pub price: i64,
    pub limits: PlanLimits,
    pub features: Vec<String>,
}
