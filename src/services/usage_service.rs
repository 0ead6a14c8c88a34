use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::sea_query::{Expr, LockType};
use uuid::Uuid;

use crate::{
    domain::plan::{self, Plan, Usage, UsageKind},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn plan_of(user: &UserModel) -> Plan {
    user.plan.parse().unwrap_or(Plan::Free)
}

pub fn usage_of(user: &UserModel) -> Usage {
    Usage {
        orders_this_month: user.orders_this_month,
        messages_this_month: user.messages_this_month,
        ai_queries_this_month: user.ai_queries_this_month,
    }
}

fn usage_column(kind: UsageKind) -> UserCol {
    match kind {
        UsageKind::Orders => UserCol::OrdersThisMonth,
        UsageKind::Messages => UserCol::MessagesThisMonth,
        UsageKind::Ai => UserCol::AiQueriesThisMonth,
    }
}

/// Loads the account row `FOR UPDATE` and downgrades an expired paid plan.
///
/// Must run inside a transaction; the row stays locked until it ends.
pub async fn lock_account<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<UserModel> {
    let user = Users::find_by_id(user_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let stored = plan_of(&user);
    let expiry = user.plan_expiry.map(|at| at.with_timezone(&Utc));
    if plan::effective_plan(stored, expiry, now) == stored {
        return Ok(user);
    }

    tracing::info!(user_id = %user_id, plan = %stored, "paid plan expired, downgrading to free");
    let mut active: UserActive = user.into();
    active.plan = Set(Plan::Free.as_str().to_string());
    active.plan_expiry = Set(None);
    active.updated_at = Set(now.into());
    Ok(active.update(conn).await?)
}

/// Locks the account and rejects when `kind` is already at the plan ceiling.
pub async fn reserve<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    kind: UsageKind,
    now: DateTime<Utc>,
) -> AppResult<UserModel> {
    let user = lock_account(conn, user_id, now).await?;
    plan::check_limit(plan_of(&user), &usage_of(&user), kind)?;
    Ok(user)
}

/// Adds `by` to the monthly counter for `kind`.
pub async fn increment<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    kind: UsageKind,
    by: i32,
) -> AppResult<()> {
    if by <= 0 {
        return Ok(());
    }
    let column = usage_column(kind);
    Users::update_many()
        .col_expr(column, Expr::col(column).add(by))
        .filter(UserCol::Id.eq(user_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Quota check for provider-backed actions: the provider call happens outside
/// any transaction, so the counter is incremented afterwards with
/// [`increment`] only when it succeeds.
pub async fn check(state: &AppState, user_id: Uuid, kind: UsageKind) -> AppResult<UserModel> {
    let txn = state.orm.begin().await?;
    let user = reserve(&txn, user_id, kind, Utc::now()).await?;
    txn.commit().await?;
    Ok(user)
}
