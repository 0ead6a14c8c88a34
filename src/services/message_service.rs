use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    clients::whatsapp::send_bulk,
    domain::{
        message::{self, MessageStatus, MessageType, OrderConfirmation},
        plan::UsageKind,
    },
    dto::messages::{
        CampaignRecipient, CampaignRequest, CampaignResult, RecipientResult, SendMessageRequest,
        SendResult,
    },
    entity::{
        messages::{ActiveModel, Column, Entity as Messages, Model as MessageModel},
        orders::{ActiveModel as OrderActive, Model as OrderModel},
        shops::Model as ShopModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Message, Recipient},
    response::ApiResponse,
    services::{
        customer_service, order_service::find_owned_order, shop_service::owned_shop,
        usage_service, utc,
    },
    state::AppState,
};

const HISTORY_LIMIT: u64 = 50;

pub fn message_from_entity(message: MessageModel) -> Message {
    Message {
        id: message.id,
        shop_id: message.shop_id,
        message_type: message.message_type.parse().unwrap_or(MessageType::Custom),
        recipient: Recipient {
            phone: message.recipient_phone,
            name: message.recipient_name,
            customer_id: message.customer_id,
        },
        body: message.body,
        status: message.status.parse().unwrap_or(MessageStatus::Queued),
        provider_message_id: message.provider_message_id,
        order_id: message.order_id,
        campaign_id: message.campaign_id,
        sent_at: message.sent_at.map(utc),
        delivered_at: message.delivered_at.map(utc),
        read_at: message.read_at.map(utc),
        failure_reason: message.failure_reason,
        retry_count: message.retry_count,
        created_at: utc(message.created_at),
    }
}

/// One delivery attempt to log.
struct Attempt<'a> {
    shop_id: Uuid,
    message_type: MessageType,
    phone: &'a str,
    name: Option<&'a str>,
    customer_id: Option<Uuid>,
    body: &'a str,
    order_id: Option<Uuid>,
    campaign_id: Option<&'a str>,
    outcome: &'a Result<String, String>,
}

impl Attempt<'_> {
    fn into_active(self, at: DateTime<Utc>) -> ActiveModel {
        let (status, provider_id, failure, sent_at) = match self.outcome {
            Ok(id) => (MessageStatus::Sent, Some(id.clone()), None, Some(at.into())),
            Err(reason) => (MessageStatus::Failed, None, Some(reason.clone()), None),
        };
        ActiveModel {
            id: Set(Uuid::new_v4()),
            shop_id: Set(self.shop_id),
            message_type: Set(self.message_type.as_str().to_string()),
            recipient_phone: Set(self.phone.to_string()),
            recipient_name: Set(self.name.map(str::to_string)),
            customer_id: Set(self.customer_id),
            body: Set(self.body.to_string()),
            template_name: Set(None),
            status: Set(status.as_str().to_string()),
            provider_message_id: Set(provider_id),
            order_id: Set(self.order_id),
            campaign_id: Set(self.campaign_id.map(str::to_string)),
            sent_at: Set(sent_at),
            delivered_at: Set(None),
            read_at: Set(None),
            failure_reason: Set(failure),
            retry_count: Set(0),
            created_at: Set(at.into()),
            updated_at: Set(at.into()),
        }
    }
}

pub async fn send_custom(
    state: &AppState,
    user: &AuthUser,
    payload: SendMessageRequest,
) -> AppResult<ApiResponse<SendResult>> {
    payload.validate()?;
    let shop_id = user.require_shop()?;
    usage_service::check(state, user.user_id, UsageKind::Messages).await?;

    let outcome = state
        .notifier
        .send_text(&payload.phone, &payload.message)
        .await
        .map_err(|err| err.to_string());

    let txn = state.orm.begin().await?;
    let record = Attempt {
        shop_id,
        message_type: MessageType::Custom,
        phone: &payload.phone,
        name: payload.customer_name.as_deref(),
        customer_id: payload.customer_id,
        body: &payload.message,
        order_id: None,
        campaign_id: None,
        outcome: &outcome,
    }
    .into_active(Utc::now())
    .insert(&txn)
    .await?;
    if outcome.is_ok() {
        usage_service::increment(&txn, user.user_id, UsageKind::Messages, 1).await?;
    }
    txn.commit().await?;

    match outcome {
        Ok(provider_id) => Ok(ApiResponse::success(
            "Message sent successfully",
            SendResult {
                message_id: record.id,
                provider_message_id: Some(provider_id),
            },
        )),
        Err(reason) => {
            tracing::warn!(shop_id = %shop_id, error = %reason, "custom message failed");
            Err(AppError::ExternalService(format!(
                "Failed to send message: {reason}"
            )))
        }
    }
}

/// Sends the confirmation for `order` and logs it; the owner is metered only
/// when the provider accepts the message.
async fn deliver_confirmation(
    state: &AppState,
    shop: &ShopModel,
    order: OrderModel,
) -> AppResult<(MessageModel, Result<String, String>)> {
    let body = message::format_order_confirmation(
        &OrderConfirmation {
            order_number: &order.order_number,
            customer_name: &order.customer_name,
            total: order.final_total,
            delivery_date: order.delivery_date,
            shop_name: &shop.shop_name,
        },
        shop.language.parse().unwrap_or_default(),
    );

    let outcome = state
        .notifier
        .send_text(&order.customer_phone, &body)
        .await
        .map_err(|err| err.to_string());

    let now = Utc::now();
    let txn = state.orm.begin().await?;
    let record = Attempt {
        shop_id: shop.id,
        message_type: MessageType::OrderConfirmation,
        phone: &order.customer_phone,
        name: Some(order.customer_name.as_str()),
        customer_id: order.customer_id,
        body: &body,
        order_id: Some(order.id),
        campaign_id: None,
        outcome: &outcome,
    }
    .into_active(now)
    .insert(&txn)
    .await?;

    if outcome.is_ok() {
        let mut active: OrderActive = order.into();
        active.whatsapp_sent = Set(true);
        active.updated_at = Set(now.into());
        active.update(&txn).await?;
        usage_service::increment(&txn, shop.owner_id, UsageKind::Messages, 1).await?;
    }
    txn.commit().await?;

    Ok((record, outcome))
}

pub async fn send_order_confirmation(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<SendResult>> {
    let shop = owned_shop(state, user).await?;
    let order = find_owned_order(&state.orm, shop.id, order_id).await?;
    usage_service::check(state, shop.owner_id, UsageKind::Messages).await?;

    let (record, outcome) = deliver_confirmation(state, &shop, order).await?;
    match outcome {
        Ok(provider_id) => Ok(ApiResponse::success(
            "WhatsApp message sent",
            SendResult {
                message_id: record.id,
                provider_message_id: Some(provider_id),
            },
        )),
        Err(reason) => {
            tracing::warn!(order_id = %order_id, error = %reason, "order confirmation failed");
            Ok(ApiResponse::partial(
                "Failed to send WhatsApp message",
                SendResult {
                    message_id: record.id,
                    provider_message_id: None,
                },
            ))
        }
    }
}

/// Post-commit confirmation for a freshly placed order. Runs detached from the
/// request, so every failure is logged rather than returned.
pub async fn auto_confirm(state: &AppState, shop: &ShopModel, order_id: Uuid) {
    if let Err(err) = usage_service::check(state, shop.owner_id, UsageKind::Messages).await {
        tracing::info!(order_id = %order_id, reason = %err, "skipping order confirmation");
        return;
    }
    let order = match find_owned_order(&state.orm, shop.id, order_id).await {
        Ok(order) => order,
        Err(err) => {
            tracing::warn!(order_id = %order_id, error = %err, "order vanished before confirmation");
            return;
        }
    };
    match deliver_confirmation(state, shop, order).await {
        Ok((_, Ok(_))) => tracing::debug!(order_id = %order_id, "order confirmation sent"),
        Ok((_, Err(reason))) => {
            tracing::warn!(order_id = %order_id, error = %reason, "order confirmation failed")
        }
        Err(err) => tracing::error!(order_id = %order_id, error = ?err, "order confirmation not recorded"),
    }
}

async fn campaign_audience(
    state: &AppState,
    shop_id: Uuid,
    payload: &CampaignRequest,
) -> AppResult<Vec<CampaignRecipient>> {
    if let Some(recipients) = payload.recipients.as_ref().filter(|r| !r.is_empty()) {
        for recipient in recipients {
            recipient.validate()?;
        }
        return Ok(recipients.clone());
    }
    let Some(segment) = payload.segment else {
        return Err(AppError::Validation(
            "Provide recipients or a customer segment".into(),
        ));
    };
    Ok(customer_service::marketing_audience(state, shop_id, Some(segment))
        .await?
        .into_iter()
        .map(|c| CampaignRecipient {
            phone: c.phone,
            name: Some(c.name),
            customer_id: Some(c.id),
        })
        .collect())
}

/// Broadcasts one text to a recipient list or segment, one send at a time.
pub async fn run_campaign(
    state: &AppState,
    user: &AuthUser,
    payload: CampaignRequest,
) -> AppResult<ApiResponse<CampaignResult>> {
    payload.validate()?;
    let shop_id = user.require_shop()?;

    let audience = campaign_audience(state, shop_id, &payload).await?;
    if audience.is_empty() {
        return Err(AppError::BadRequest("No recipients found".into()));
    }
    usage_service::check(state, user.user_id, UsageKind::Messages).await?;

    let campaign_id = payload
        .campaign_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| format!("{name}-{}", Utc::now().timestamp_millis()))
        .unwrap_or_else(|| format!("campaign-{}", Utc::now().timestamp_millis()));

    let phones: Vec<String> = audience.iter().map(|r| r.phone.clone()).collect();
    tracing::info!(shop_id = %shop_id, recipients = phones.len(), "campaign started");
    let outcomes = send_bulk(
        state.notifier.as_ref(),
        &phones,
        &payload.message,
        state.config.campaign_delay,
    )
    .await;

    let now = Utc::now();
    let rows: Vec<ActiveModel> = audience
        .iter()
        .zip(&outcomes)
        .map(|(recipient, outcome)| {
            Attempt {
                shop_id,
                message_type: MessageType::Campaign,
                phone: &recipient.phone,
                name: recipient.name.as_deref(),
                customer_id: recipient.customer_id,
                body: &payload.message,
                order_id: None,
                campaign_id: Some(campaign_id.as_str()),
                outcome: &outcome.result,
            }
            .into_active(now)
        })
        .collect();
    let sent = outcomes.iter().filter(|o| o.result.is_ok()).count();

    let txn = state.orm.begin().await?;
    Messages::insert_many(rows).exec(&txn).await?;
    usage_service::increment(&txn, user.user_id, UsageKind::Messages, sent as i32).await?;
    txn.commit().await?;

    let total = outcomes.len();
    let results = outcomes
        .into_iter()
        .map(|o| RecipientResult {
            phone: o.phone,
            success: o.result.is_ok(),
            message_id: o.result.as_ref().ok().cloned(),
            error: o.result.err(),
        })
        .collect();

    tracing::info!(shop_id = %shop_id, sent, total, "campaign finished");
    Ok(ApiResponse::success(
        format!("Campaign sent to {sent}/{total} recipients"),
        CampaignResult {
            campaign_id,
            total,
            sent,
            failed: total - sent,
            results,
        },
    ))
}

pub async fn history(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Vec<Message>>> {
    let shop_id = user.require_shop()?;
    let messages = Messages::find()
        .filter(Column::ShopId.eq(shop_id))
        .order_by_desc(Column::CreatedAt)
        .limit(HISTORY_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(message_from_entity)
        .collect();
    Ok(ApiResponse::success("Messages", messages))
}
