use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    clients::email::payment_confirmation_email,
    domain::{
        payment::{self, PaymentState},
        plan::{Plan, PlanLimits},
    },
    dto::payments::{CheckoutOrder, CreateCheckoutRequest, PlanInfo, VerifiedPlan, VerifyPaymentRequest},
    entity::{
        payments::{ActiveModel, Column, Entity as Payments, Model as PaymentModel},
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Payment,
    response::ApiResponse,
    services::utc,
    state::AppState,
};

const CURRENCY: &str = "INR";

pub fn payment_from_entity(payment: PaymentModel) -> Payment {
    Payment {
        id: payment.id,
        plan: payment.plan.parse().unwrap_or(Plan::Free),
        amount: payment.amount,
        currency: payment.currency,
        status: payment.status.parse().unwrap_or(PaymentState::Created),
        gateway_order_id: payment.gateway_order_id,
        gateway_payment_id: payment.gateway_payment_id,
        valid_from: payment.valid_from.map(utc),
        valid_until: payment.valid_until.map(utc),
        receipt: payment.receipt,
        failure_reason: payment.failure_reason,
        created_at: utc(payment.created_at),
    }
}

pub fn plan_catalogue() -> Vec<PlanInfo> {
    Plan::ALL
        .iter()
        .map(|plan| PlanInfo {
            id: *plan,
            name: plan.display_name().to_string(),
            price: plan.price_paise().unwrap_or(0) / 100,
            limits: PlanLimits::for_plan(*plan),
            features: plan.features().iter().map(|f| f.to_string()).collect(),
        })
        .collect()
}

pub async fn list_plans() -> AppResult<ApiResponse<Vec<PlanInfo>>> {
    Ok(ApiResponse::success("Plans", plan_catalogue()))
}

pub async fn create_checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCheckoutRequest,
) -> AppResult<ApiResponse<CheckoutOrder>> {
    let amount_paise = payload
        .plan
        .price_paise()
        .ok_or_else(|| AppError::BadRequest("Invalid plan selected".into()))?;
    let key_id = state
        .gateway
        .key_id()
        .map(str::to_string)
        .ok_or_else(|| AppError::ServiceUnavailable("Payment gateway is not configured".into()))?;

    let receipt = payment::receipt_id(Utc::now());
    let order = state
        .gateway
        .create_order(amount_paise, CURRENCY, &receipt)
        .await?;

    let record = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        gateway_order_id: Set(order.id.clone()),
        gateway_payment_id: Set(None),
        gateway_signature: Set(None),
        plan: Set(payload.plan.as_str().to_string()),
        amount: Set(Decimal::new(amount_paise, 2)),
        currency: Set(order.currency.clone()),
        status: Set(PaymentState::Created.as_str().to_string()),
        valid_from: Set(None),
        valid_until: Set(None),
        receipt: Set(Some(receipt)),
        failure_reason: Set(None),
        refund_id: Set(None),
        refund_amount: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.user_id, plan = %payload.plan, order_id = %order.id, "checkout created");
    Ok(ApiResponse::success(
        "Payment order created",
        CheckoutOrder {
            payment_id: record.id,
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id,
            plan: payload.plan,
        },
    ))
}

pub async fn verify(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyPaymentRequest,
) -> AppResult<ApiResponse<VerifiedPlan>> {
    let secret = state
        .gateway
        .key_secret()
        .ok_or_else(|| AppError::ServiceUnavailable("Payment gateway is not configured".into()))?;
    let valid = payment::verify_signature(
        secret,
        &payload.order_id,
        &payload.payment_id,
        &payload.signature,
    );
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let record = Payments::find()
        .filter(Column::GatewayOrderId.eq(payload.order_id.as_str()))
        .filter(Column::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Payment"))?;

    if record.status == PaymentState::Success.as_str() {
        return Err(AppError::Conflict("Payment already verified".into()));
    }

    if !valid {
        let mut active: ActiveModel = record.into();
        active.status = Set(PaymentState::Failed.as_str().to_string());
        active.gateway_payment_id = Set(Some(payload.payment_id));
        active.failure_reason = Set(Some("Signature verification failed".into()));
        active.updated_at = Set(now.into());
        active.update(&txn).await?;
        txn.commit().await?;
        tracing::warn!(user_id = %user.user_id, order_id = %payload.order_id, "payment signature mismatch");
        return Err(AppError::BadRequest("Payment verification failed".into()));
    }

    let plan: Plan = record.plan.parse()?;
    let amount = record.amount;
    let (valid_from, valid_until) = payment::validity_window(now);

    let mut active: ActiveModel = record.into();
    active.status = Set(PaymentState::Success.as_str().to_string());
    active.gateway_payment_id = Set(Some(payload.payment_id));
    active.gateway_signature = Set(Some(payload.signature));
    active.valid_from = Set(Some(valid_from.into()));
    active.valid_until = Set(Some(valid_until.into()));
    active.updated_at = Set(now.into());
    active.update(&txn).await?;

    let account = Users::find_by_id(user.user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let mut account: UserActive = account.into();
    account.plan = Set(plan.as_str().to_string());
    account.plan_expiry = Set(Some(valid_until.into()));
    account.updated_at = Set(now.into());
    account.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(user_id = %user.user_id, plan = %plan, "plan upgraded");

    let mailer = state.mailer.clone();
    let (subject, html) = payment_confirmation_email(
        &user.name,
        plan.display_name(),
        &amount.to_string(),
        &valid_until.format("%d %b %Y").to_string(),
    );
    let to = user.email.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send(&to, &subject, &html).await {
            tracing::warn!(error = %err, "payment confirmation email failed");
        }
    });

    Ok(ApiResponse::success(
        "Payment verified successfully",
        VerifiedPlan { plan, valid_until },
    ))
}

pub async fn history(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Vec<Payment>>> {
    let payments = Payments::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(payment_from_entity)
        .collect();
    Ok(ApiResponse::success("Payment history", payments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_lists_every_plan_in_rupees() {
        let plans = plan_catalogue();
        let prices: Vec<(Plan, i64)> = plans.iter().map(|p| (p.id, p.price)).collect();
        assert_eq!(
            prices,
            vec![
                (Plan::Free, 0),
                (Plan::Basic, 199),
                (Plan::Pro, 499),
                (Plan::Enterprise, 999),
            ]
        );
        assert!(plans.iter().all(|p| !p.features.is_empty()));
    }
}
