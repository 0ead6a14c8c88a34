use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::product::Unit;

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(
        length(min = 1, max = 200, message = "Product name must be 1-200 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub name: String,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom = "crate::domain::validation::validate_non_negative")]
    pub price: Decimal,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub unit: Option<Unit>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    #[validate(custom = "crate::domain::validation::validate_non_negative")]
    pub cost_price: Option<Decimal>,
    pub tags: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(
        length(min = 1, max = 200, message = "Product name must be 1-200 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom = "crate::domain::validation::validate_non_negative")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub unit: Option<Unit>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    #[validate(custom = "crate::domain::validation::validate_non_negative")]
    pub cost_price: Option<Decimal>,
    pub tags: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}
