use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::customer::Segment;

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(custom = "crate::domain::validation::validate_phone")]
    pub phone: String,
    #[validate(
        length(min = 1, max = 1000, message = "Message must be 1-1000 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub message: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecipient {
    #[validate(custom = "crate::domain::validation::validate_phone")]
    pub phone: String,
    pub name: Option<String>,
    pub customer_id: Option<Uuid>,
}

/// Either explicit `recipients` or a customer `segment`; recipients win when
/// both are given.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Message must be 1-1000 characters"),
        custom = "crate::domain::validation::validate_not_blank"
    )]
    pub message: String,
    pub recipients: Option<Vec<CampaignRecipient>>,
    pub segment: Option<Segment>,
    pub campaign_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub message_id: Uuid,
    pub provider_message_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResult {
    pub phone: String,
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResult {
    pub campaign_id: String,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<RecipientResult>,
}
