use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, AppResult};

pub mod ai_service;
pub mod analytics_service;
pub mod auth_service;
pub mod customer_service;
pub mod message_service;
pub mod order_service;
pub mod payment_service;
pub mod product_service;
pub mod shop_service;
pub mod usage_service;

pub(crate) fn utc(at: DateTimeWithTimeZone) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

/// Reads a JSON column back into its typed form; malformed rows read as absent.
pub(crate) fn from_json<T: DeserializeOwned>(value: Option<serde_json::Value>) -> Option<T> {
    value.and_then(|v| serde_json::from_value(v).ok())
}

pub(crate) fn tags_from_json(value: serde_json::Value) -> Vec<String> {
    from_json(Some(value)).unwrap_or_default()
}

/// Maps a unique-index violation to `Conflict(message)`; other errors pass through.
pub(crate) fn conflict_on_unique(err: sea_orm::DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::OrmError(err),
    }
}
