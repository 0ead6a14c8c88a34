use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{domain::shop::Language, models::Address};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesInput {
    pub language: Option<Language>,
    pub marketing_consent: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub name: String,
    #[validate(custom = "crate::domain::validation::validate_phone")]
    pub phone: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate]
    pub address: Option<Address>,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub preferences: Option<PreferencesInput>,
}

/// Aggregates (order count, spend, segment) are maintained by order placement
/// and cannot be set here.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate]
    pub address: Option<Address>,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub preferences: Option<PreferencesInput>,
    pub is_active: Option<bool>,
}
