use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType, OnConflict};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        customer::{CustomerTotals, Segment},
        order::{
            self, LineRequest, OrderSource, OrderStatus, PaymentStatus, StockedProduct,
            SYSTEM_ACTOR,
        },
        plan::UsageKind,
        shop::Language,
    },
    dto::orders::{CreateOrderRequest, UpdateOrderStatusRequest, UpdatePaymentRequest},
    entity::{
        customers::{
            ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers,
            Model as CustomerModel,
        },
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        order_status_history::{
            ActiveModel as HistoryActive, Column as HistoryCol, Entity as History,
            Model as HistoryModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
        shops::{Column as ShopCol, Entity as Shops, Model as ShopModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, Order, OrderCustomer, OrderItem, StatusChange},
    response::{ApiResponse, Pagination},
    routes::params::OrderListQuery,
    services::{message_service, shop_service, to_json, usage_service, utc},
    state::AppState,
};

pub fn order_from_entity(
    order: OrderModel,
    items: Vec<OrderItemModel>,
    history: Vec<HistoryModel>,
) -> Order {
    Order {
        id: order.id,
        shop_id: order.shop_id,
        order_number: order.order_number,
        customer: OrderCustomer {
            name: order.customer_name,
            phone: order.customer_phone,
            address: order.customer_address,
            customer_id: order.customer_id,
        },
        items: items.into_iter().map(order_item_from_entity).collect(),
        total: order.total,
        discount: order.discount,
        final_total: order.final_total,
        status: order.status.parse().unwrap_or(OrderStatus::Pending),
        payment_status: order.payment_status.parse().unwrap_or(PaymentStatus::Unpaid),
        payment_method: order.payment_method.parse().unwrap_or_default(),
        paid_amount: order.paid_amount,
        delivery_date: order.delivery_date,
        delivery_time: order.delivery_time,
        notes: order.notes,
        whatsapp_sent: order.whatsapp_sent,
        source: order.source.parse().unwrap_or_default(),
        status_history: history
            .into_iter()
            .filter_map(|h| {
                Some(StatusChange {
                    status: h.status.parse().ok()?,
                    updated_by: h.updated_by,
                    timestamp: utc(h.created_at),
                })
            })
            .collect(),
        created_at: utc(order.created_at),
        updated_at: utc(order.updated_at),
    }
}

fn order_item_from_entity(item: OrderItemModel) -> OrderItem {
    OrderItem {
        product_id: item.product_id,
        name: item.name,
        price: item.price,
        quantity: item.quantity,
        unit: item.unit,
        subtotal: item.subtotal,
    }
}

/// Attaches line items (and optionally the status history) to a page of orders,
/// preserving the input order.
pub async fn orders_with_items<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
    with_history: bool,
) -> AppResult<Vec<Order>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let mut items: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(ids.clone()))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
    {
        items.entry(item.order_id).or_default().push(item);
    }

    let mut history: HashMap<Uuid, Vec<HistoryModel>> = HashMap::new();
    if with_history {
        for entry in History::find()
            .filter(HistoryCol::OrderId.is_in(ids))
            .order_by_asc(HistoryCol::CreatedAt)
            .all(conn)
            .await?
        {
            history.entry(entry.order_id).or_default().push(entry);
        }
    }

    Ok(orders
        .into_iter()
        .map(|o| {
            let lines = items.remove(&o.id).unwrap_or_default();
            let changes = history.remove(&o.id).unwrap_or_default();
            order_from_entity(o, lines, changes)
        })
        .collect())
}

/// Next value of the per-shop daily counter; the row lock lasts until the
/// surrounding transaction ends.
async fn next_order_sequence<C: ConnectionTrait>(
    conn: &C,
    shop_id: Uuid,
    day: chrono::NaiveDate,
) -> AppResult<i32> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO order_counters (shop_id, day, last_value) VALUES ($1, $2, 1) \
             ON CONFLICT (shop_id, day) DO UPDATE SET last_value = order_counters.last_value + 1 \
             RETURNING last_value",
            [shop_id.into(), day.into()],
        ))
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order counter returned no row")))?;
    Ok(row.try_get::<i32>("", "last_value")?)
}

fn history_entry(order_id: Uuid, status: OrderStatus, actor: &str, at: DateTime<Utc>) -> HistoryActive {
    HistoryActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        status: Set(status.as_str().to_string()),
        updated_by: Set(actor.to_string()),
        created_at: Set(at.into()),
    }
}

/// Finds the customer for `phone` in the shop or creates it, returning the row
/// locked for the aggregate update. The flag is true when the row is new.
async fn resolve_customer<C: ConnectionTrait>(
    conn: &C,
    shop_id: Uuid,
    name: &str,
    phone: &str,
    address: Option<&str>,
) -> AppResult<(CustomerModel, bool)> {
    let fresh = CustomerTotals::fresh();
    let candidate = CustomerActive {
        id: Set(Uuid::new_v4()),
        shop_id: Set(shop_id),
        name: Set(name.to_string()),
        phone: Set(phone.to_string()),
        email: Set(None),
        address: Set(address
            .map(|street| {
                to_json(&Address {
                    street: Some(street.to_string()),
                    ..Address::default()
                })
            })
            .transpose()?),
        total_orders: Set(fresh.total_orders),
        total_spent: Set(fresh.total_spent),
        last_order_date: Set(None),
        average_order_value: Set(fresh.average_order_value),
        tags: Set(serde_json::json!([])),
        segment: Set(fresh.segment.as_str().to_string()),
        notes: Set(None),
        is_active: Set(true),
        language: Set(Language::default().as_str().to_string()),
        marketing_consent: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    };

    let inserted = Customers::insert(candidate)
        .on_conflict(
            OnConflict::columns([CustomerCol::ShopId, CustomerCol::Phone])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let customer = Customers::find()
        .filter(CustomerCol::ShopId.eq(shop_id))
        .filter(CustomerCol::Phone.eq(phone))
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("customer vanished after upsert")))?;

    Ok((customer, inserted > 0))
}

/// Places an order for `shop` as one unit of work: stock, customer aggregates,
/// shop counters and the actor's usage commit together or not at all.
///
/// `actor` is `None` for anonymous storefront orders, which are not metered.
pub async fn place_order(
    state: &AppState,
    shop: &ShopModel,
    actor: Option<&AuthUser>,
    payload: CreateOrderRequest,
    source: OrderSource,
) -> AppResult<Order> {
    payload.validate()?;
    let now = Utc::now();
    let lines: Vec<LineRequest> = payload.items.iter().copied().map(Into::into).collect();

    let txn = state.orm.begin().await?;

    if let Some(actor) = actor {
        usage_service::reserve(&txn, actor.user_id, UsageKind::Orders, now).await?;
    }

    let mut product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    product_ids.sort();
    product_ids.dedup();
    let stocked: HashMap<Uuid, StockedProduct> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .filter(ProdCol::ShopId.eq(shop.id))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| {
            (
                p.id,
                StockedProduct {
                    id: p.id,
                    name: p.name,
                    price: p.price,
                    stock: p.stock,
                    unit: p.unit,
                    is_active: p.is_active,
                },
            )
        })
        .collect();

    let draft = order::price_order(
        &lines,
        &stocked,
        payload.total,
        payload.discount.unwrap_or(Decimal::ZERO),
    )?;

    for change in &draft.stock_changes {
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::value(change.new_stock))
            .col_expr(ProdCol::TotalSold, Expr::col(ProdCol::TotalSold).add(change.sold))
            .col_expr(ProdCol::Revenue, Expr::col(ProdCol::Revenue).add(change.revenue))
            .col_expr(ProdCol::UpdatedAt, Expr::value(now))
            .filter(ProdCol::Id.eq(change.product_id))
            .exec(&txn)
            .await?;
    }

    let customer_input = &payload.customer;
    let customer_name = customer_input.name.trim().to_string();
    let (customer, created) = resolve_customer(
        &txn,
        shop.id,
        &customer_name,
        &customer_input.phone,
        customer_input.address.as_deref(),
    )
    .await?;

    let today = state.clock.local_date(now);
    let sequence = next_order_sequence(&txn, shop.id, today).await?;
    let order_number = order::format_order_number(today, sequence);

    let status = if shop.auto_confirm_orders {
        OrderStatus::Confirmed
    } else {
        OrderStatus::Pending
    };
    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        shop_id: Set(shop.id),
        order_number: Set(order_number),
        customer_name: Set(customer_name),
        customer_phone: Set(customer_input.phone.clone()),
        customer_id: Set(Some(customer.id)),
        customer_address: Set(customer_input.address.clone()),
        total: Set(draft.total),
        discount: Set(draft.discount),
        final_total: Set(draft.final_total),
        status: Set(status.as_str().to_string()),
        payment_status: Set(PaymentStatus::Unpaid.as_str().to_string()),
        payment_method: Set(payload.payment_method.unwrap_or_default().as_str().to_string()),
        paid_amount: Set(Decimal::ZERO),
        delivery_date: Set(payload.delivery_date),
        delivery_time: Set(payload.delivery_time.clone()),
        notes: Set(payload.notes.clone()),
        whatsapp_sent: Set(false),
        source: Set(source.as_str().to_string()),
        created_by: Set(actor.map(|a| a.user_id)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let item_rows: Vec<OrderItemActive> = draft
        .lines
        .iter()
        .map(|line| OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id),
            name: Set(line.name.clone()),
            price: Set(line.price),
            quantity: Set(line.quantity),
            unit: Set(line.unit.clone()),
            subtotal: Set(line.subtotal),
            created_at: Set(now.into()),
        })
        .collect();
    OrderItems::insert_many(item_rows).exec(&txn).await?;

    let mut history = vec![history_entry(order_id, OrderStatus::Pending, SYSTEM_ACTOR, now)];
    if status == OrderStatus::Confirmed {
        history.push(history_entry(
            order_id,
            OrderStatus::Confirmed,
            SYSTEM_ACTOR,
            now + Duration::milliseconds(1),
        ));
    }
    History::insert_many(history).exec(&txn).await?;

    let mut totals = CustomerTotals {
        total_orders: customer.total_orders,
        total_spent: customer.total_spent,
        last_order_date: customer.last_order_date.map(utc),
        average_order_value: customer.average_order_value,
        segment: customer.segment.parse().unwrap_or(Segment::New),
    };
    totals.record_order(draft.final_total, now);
    let mut customer_active: CustomerActive = customer.into();
    customer_active.total_orders = Set(totals.total_orders);
    customer_active.total_spent = Set(totals.total_spent);
    customer_active.last_order_date = Set(totals.last_order_date.map(Into::into));
    customer_active.average_order_value = Set(totals.average_order_value);
    customer_active.segment = Set(totals.segment.as_str().to_string());
    customer_active.updated_at = Set(now.into());
    customer_active.update(&txn).await?;

    let mut shop_update = Shops::update_many()
        .col_expr(ShopCol::TotalOrders, Expr::col(ShopCol::TotalOrders).add(1))
        .col_expr(
            ShopCol::TotalRevenue,
            Expr::col(ShopCol::TotalRevenue).add(draft.final_total),
        );
    if created {
        shop_update = shop_update.col_expr(
            ShopCol::TotalCustomers,
            Expr::col(ShopCol::TotalCustomers).add(1),
        );
    }
    shop_update
        .filter(ShopCol::Id.eq(shop.id))
        .exec(&txn)
        .await?;

    if let Some(actor) = actor {
        usage_service::increment(&txn, actor.user_id, UsageKind::Orders, 1).await?;
    }

    let mut placed = orders_with_items(&txn, vec![order], true).await?;
    txn.commit().await?;

    let placed = placed
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("placed order missing")))?;
    tracing::info!(
        order_id = %placed.id,
        order_number = %placed.order_number,
        shop_id = %shop.id,
        final_total = %placed.final_total,
        "order placed"
    );
    Ok(placed)
}

fn confirm_in_background(state: &AppState, shop: ShopModel, order_id: Uuid) {
    if !shop.enable_whatsapp_notifications || !state.notifier.is_configured() {
        return;
    }
    let state = state.clone();
    tokio::spawn(async move {
        message_service::auto_confirm(&state, &shop, order_id).await;
    });
}

/// Order entered by the shop owner.
pub async fn create_order(
    state: AppState,
    user: AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let shop = shop_service::owned_shop(&state, &user).await?;
    let source = payload.source.unwrap_or_default();
    let order = place_order(&state, &shop, Some(&user), payload, source).await?;
    confirm_in_background(&state, shop, order.id);
    Ok(ApiResponse::success("Order created successfully", order))
}

/// Anonymous order from a public storefront.
pub async fn create_public_order(
    state: AppState,
    slug: String,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let shop = shop_service::storefront(&state, &slug).await?;
    let order = place_order(&state, &shop, None, payload, OrderSource::PublicPage).await?;
    confirm_in_background(&state, shop, order.id);
    Ok(ApiResponse::success("Order placed successfully", order))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let shop_id = user.require_shop()?;
    let page = query.page();

    let mut condition = Condition::all().add(OrderCol::ShopId.eq(shop_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(payment_status) = query.payment_status {
        condition = condition.add(OrderCol::PaymentStatus.eq(payment_status.as_str()));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::OrderNumber.contains(search.to_uppercase()));
    }
    if let Some(start) = query.start_date {
        condition = condition.add(OrderCol::CreatedAt.gte(state.clock.day_start(start)));
    }
    if let Some(end) = query.end_date {
        condition = condition.add(OrderCol::CreatedAt.lt(state.clock.day_window(end).end));
    }

    let paginator = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .paginate(&state.orm, page.limit as u64);
    let total = paginator.num_items().await? as i64;
    let models = paginator.fetch_page(page.index()).await?;
    let items = orders_with_items(&state.orm, models, false).await?;

    Ok(ApiResponse::paginated(
        "Orders",
        items,
        Pagination::new(page.page, page.limit, total),
    ))
}

pub async fn find_owned_order<C: ConnectionTrait>(
    conn: &C,
    shop_id: Uuid,
    id: Uuid,
) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .filter(OrderCol::ShopId.eq(shop_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))
}

async fn load_order<C: ConnectionTrait>(conn: &C, order: OrderModel) -> AppResult<Order> {
    orders_with_items(conn, vec![order], true)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Order"))
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let shop_id = user.require_shop()?;
    let order = find_owned_order(&state.orm, shop_id, id).await?;
    Ok(ApiResponse::success("Order", load_order(&state.orm, order).await?))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let shop_id = user.require_shop()?;
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .filter(OrderCol::ShopId.eq(shop_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let current: OrderStatus = order.status.parse()?;
    let next = payload.status;
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot change order status from {current} to {next}"
        )));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;
    history_entry(id, next, &user.name, now).insert(&txn).await?;

    let order = load_order(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(order_id = %id, from = %current, to = %next, "order status changed");
    Ok(ApiResponse::success("Order status updated", order))
}

pub async fn update_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePaymentRequest,
) -> AppResult<ApiResponse<Order>> {
    payload.validate()?;
    let shop_id = user.require_shop()?;
    let order = find_owned_order(&state.orm, shop_id, id).await?;

    let paid_amount = order::settle_payment(
        payload.payment_status,
        payload.paid_amount,
        order.final_total,
    )
    .map_err(AppError::Validation)?;

    let mut active: OrderActive = order.into();
    active.payment_status = Set(payload.payment_status.as_str().to_string());
    active.paid_amount = Set(paid_amount);
    if let Some(method) = payload.payment_method {
        active.payment_method = Set(method.as_str().to_string());
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Payment status updated",
        load_order(&state.orm, order).await?,
    ))
}
