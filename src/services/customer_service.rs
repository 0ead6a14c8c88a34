use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        customer::Segment,
        plan::{self, Resource},
    },
    dto::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    entity::{
        customers::{ActiveModel, Column, Entity as Customers, Model as CustomerModel},
        orders::{Column as OrderCol, Entity as Orders},
        shops::{Column as ShopCol, Entity as Shops},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Customer, CustomerPreferences, CustomerWithOrders},
    response::{ApiResponse, Pagination},
    routes::params::CustomerQuery,
    services::{
        conflict_on_unique, from_json, order_service, tags_from_json, to_json, usage_service, utc,
    },
    state::AppState,
};

const RECENT_ORDERS: u64 = 10;

pub fn customer_from_entity(customer: CustomerModel) -> Customer {
    Customer {
        id: customer.id,
        shop_id: customer.shop_id,
        segment: customer.segment.parse().unwrap_or(Segment::New),
        preferences: CustomerPreferences {
            language: customer.language.parse().unwrap_or_default(),
            marketing_consent: customer.marketing_consent,
        },
        address: from_json(customer.address),
        tags: tags_from_json(customer.tags),
        name: customer.name,
        phone: customer.phone,
        email: customer.email,
        total_orders: customer.total_orders,
        total_spent: customer.total_spent,
        last_order_date: customer.last_order_date.map(utc),
        average_order_value: customer.average_order_value,
        notes: customer.notes,
        is_active: customer.is_active,
        created_at: utc(customer.created_at),
        updated_at: utc(customer.updated_at),
    }
}

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    query: CustomerQuery,
) -> AppResult<ApiResponse<Vec<Customer>>> {
    let shop_id = user.require_shop()?;
    let page = query.page();

    let mut condition = Condition::all()
        .add(Column::ShopId.eq(shop_id))
        .add(Column::IsActive.eq(true));
    if let Some(segment) = query.segment {
        condition = condition.add(Column::Segment.eq(segment.as_str()));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Phone).ilike(pattern)),
        );
    }

    let paginator = Customers::find()
        .filter(condition)
        .order_by_desc(Column::TotalSpent)
        .order_by_desc(Column::CreatedAt)
        .paginate(&state.orm, page.limit as u64);
    let total = paginator.num_items().await? as i64;
    let items = paginator
        .fetch_page(page.index())
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();

    Ok(ApiResponse::paginated(
        "Customers",
        items,
        Pagination::new(page.page, page.limit, total),
    ))
}

async fn owned_customer(state: &AppState, shop_id: Uuid, id: Uuid) -> AppResult<CustomerModel> {
    Customers::find_by_id(id)
        .filter(Column::ShopId.eq(shop_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Customer"))
}

/// Customer with the ten most recent orders placed under its id.
pub async fn get_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CustomerWithOrders>> {
    let shop_id = user.require_shop()?;
    let customer = owned_customer(state, shop_id, id).await?;

    let orders = Orders::find()
        .filter(OrderCol::ShopId.eq(shop_id))
        .filter(OrderCol::CustomerId.eq(id))
        .order_by_desc(OrderCol::CreatedAt)
        .limit(RECENT_ORDERS)
        .all(&state.orm)
        .await?;
    let recent_orders = order_service::orders_with_items(&state.orm, orders, false).await?;

    Ok(ApiResponse::success(
        "Customer",
        CustomerWithOrders {
            customer: customer_from_entity(customer),
            recent_orders,
        },
    ))
}

pub async fn create_customer(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    payload.validate()?;
    let shop_id = user.require_shop()?;
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let account = usage_service::lock_account(&txn, user.user_id, now).await?;

    let duplicate = Customers::find()
        .filter(Column::ShopId.eq(shop_id))
        .filter(Column::Phone.eq(payload.phone.as_str()))
        .count(&txn)
        .await?;
    if duplicate > 0 {
        return Err(AppError::Conflict(
            "Customer with this phone already exists".into(),
        ));
    }

    let current = Customers::find()
        .filter(Column::ShopId.eq(shop_id))
        .count(&txn)
        .await? as i64;
    plan::check_ceiling(usage_service::plan_of(&account), Resource::Customers, current)?;

    let preferences = payload.preferences.unwrap_or_default();
    let address = payload.address.as_ref().map(to_json).transpose()?;
    let customer = ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_id: Set(shop_id),
        name: Set(payload.name.trim().to_string()),
        phone: Set(payload.phone),
        email: Set(payload.email),
        address: Set(address),
        total_orders: Set(0),
        total_spent: Set(Decimal::ZERO),
        last_order_date: Set(None),
        average_order_value: Set(Decimal::ZERO),
        tags: Set(to_json(&payload.tags.unwrap_or_default())?),
        segment: Set(Segment::New.as_str().to_string()),
        notes: Set(payload.notes),
        is_active: Set(true),
        language: Set(preferences.language.unwrap_or_default().as_str().to_string()),
        marketing_consent: Set(preferences.marketing_consent.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| conflict_on_unique(err, "Customer with this phone already exists"))?;

    Shops::update_many()
        .col_expr(
            ShopCol::TotalCustomers,
            Expr::col(ShopCol::TotalCustomers).add(1),
        )
        .filter(ShopCol::Id.eq(shop_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Customer created successfully",
        customer_from_entity(customer),
    ))
}

pub async fn update_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    payload.validate()?;
    let shop_id = user.require_shop()?;
    let existing = owned_customer(state, shop_id, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(to_json(&address)?));
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(to_json(&tags)?);
    }
    if let Some(preferences) = payload.preferences {
        if let Some(language) = preferences.language {
            active.language = Set(language.as_str().to_string());
        }
        if let Some(consent) = preferences.marketing_consent {
            active.marketing_consent = Set(consent);
        }
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());

    let customer = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Customer updated successfully",
        customer_from_entity(customer),
    ))
}

/// Customers of `shop_id` in `segment` who accept marketing messages.
pub async fn marketing_audience(
    state: &AppState,
    shop_id: Uuid,
    segment: Option<Segment>,
) -> AppResult<Vec<CustomerModel>> {
    let mut finder = Customers::find()
        .filter(Column::ShopId.eq(shop_id))
        .filter(Column::IsActive.eq(true))
        .filter(Column::MarketingConsent.eq(true));
    if let Some(segment) = segment {
        finder = finder.filter(Column::Segment.eq(segment.as_str()));
    }
    Ok(finder.order_by_asc(Column::CreatedAt).all(&state.orm).await?)
}
