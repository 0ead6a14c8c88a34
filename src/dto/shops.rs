use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    domain::shop::{Language, ShopCategory},
    models::Address,
};

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShopSettingsInput {
    pub language: Option<Language>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub auto_confirm_orders: Option<bool>,
    #[validate(range(min = 0, message = "lowStockThreshold cannot be negative"))]
    pub low_stock_threshold: Option<i32>,
    #[serde(rename = "enableWhatsAppNotifications")]
    pub enable_whatsapp_notifications: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShopRequest {
    #[validate(
        length(min = 1, max = 100, message = "Shop name must be 1-100 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub shop_name: String,
    pub category: Option<ShopCategory>,
    #[validate(custom = "crate::domain::validation::validate_phone")]
    pub whatsapp: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate]
    pub address: Option<Address>,
    pub logo: Option<String>,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[validate]
    pub settings: Option<ShopSettingsInput>,
    #[schema(value_type = Option<Object>)]
    pub business_hours: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShopRequest {
    #[validate(
        length(min = 1, max = 100, message = "Shop name must be 1-100 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub shop_name: Option<String>,
    pub category: Option<ShopCategory>,
    #[validate(custom = "crate::domain::validation::validate_phone")]
    pub whatsapp: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate]
    pub address: Option<Address>,
    pub logo: Option<String>,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[validate]
    pub settings: Option<ShopSettingsInput>,
    #[schema(value_type = Option<Object>)]
    pub business_hours: Option<serde_json::Value>,
}
