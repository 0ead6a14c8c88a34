use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    clients::ProviderError,
    domain::{
        UnknownVariant,
        order::OrderRuleError,
        plan::{CeilingReached, LimitExceeded},
    },
    response::ApiResponse,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Insufficient stock for {product}. Available: {available}")]
    InsufficientStock { product: String, available: i32 },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("{message}")]
    LimitExceeded {
        message: String,
        plan: String,
        current: i64,
        limit: i64,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests from this IP, please try again later.")]
    TooManyRequests,

    #[error("{0}")]
    ExternalService(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{entity} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::LimitExceeded { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .next()
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field}: {detail}")
            })
            .collect();
        fields.sort();
        AppError::Validation(fields.join(", "))
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::ExternalService(err.to_string())
    }
}

impl From<UnknownVariant> for AppError {
    fn from(err: UnknownVariant) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<LimitExceeded> for AppError {
    fn from(err: LimitExceeded) -> Self {
        AppError::LimitExceeded {
            message: format!(
                "You have reached your monthly {} limit of {}. Please upgrade your plan.",
                err.kind.label(),
                err.limit
            ),
            plan: err.plan.as_str().to_string(),
            current: i64::from(err.current),
            limit: i64::from(err.limit),
        }
    }
}

impl From<CeilingReached> for AppError {
    fn from(err: CeilingReached) -> Self {
        AppError::LimitExceeded {
            message: format!(
                "Your {} plan allows up to {} {}. Please upgrade your plan.",
                err.plan.display_name(),
                err.limit,
                err.resource.label()
            ),
            plan: err.plan.as_str().to_string(),
            current: err.current,
            limit: i64::from(err.limit),
        }
    }
}

impl From<OrderRuleError> for AppError {
    fn from(err: OrderRuleError) -> Self {
        match err {
            OrderRuleError::InsufficientStock { product, available } => {
                AppError::InsufficientStock { product, available }
            }
            OrderRuleError::ProductNotFound(_) => AppError::NotFound(err.to_string()),
            OrderRuleError::EmptyOrder
            | OrderRuleError::InvalidQuantity(_)
            | OrderRuleError::NegativeAmount(_) => AppError::Validation(err.to_string()),
            OrderRuleError::ProductUnavailable(_)
            | OrderRuleError::DiscountExceedsTotal
            | OrderRuleError::TotalMismatch { .. } => AppError::BadRequest(err.to_string()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_exceeded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<UsageData>,
}

#[derive(Serialize)]
struct UsageData {
    current: i64,
    limit: i64,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "unhandled error");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        let mut data = ErrorData {
            error: message.clone(),
            limit_exceeded: None,
            current_plan: None,
            usage: None,
        };
        if let AppError::LimitExceeded {
            plan,
            current,
            limit,
            ..
        } = &self
        {
            data.limit_exceeded = Some(true);
            data.current_plan = Some(plan.clone());
            data.usage = Some(UsageData {
                current: *current,
                limit: *limit,
            });
        }

        let body = ApiResponse::failure(message, data);

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
