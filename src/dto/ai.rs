use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AiQueryRequest {
    #[validate(
        length(min = 1, max = 500, message = "Query must be 1-500 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub query: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AiUsage {
    pub used: i32,
    pub limit: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AiAnswer {
    pub query: String,
    pub response: String,
    pub usage: AiUsage,
}
