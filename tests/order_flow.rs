use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::FixedOffset;
use localbiz_api::{
    clients::{
        ProviderError,
        ai::Advisor,
        email::Mailer,
        payments::{GatewayOrder, PaymentGateway},
        whatsapp::Notifier,
    },
    config::{AppConfig, JwtConfig, RateLimitConfig},
    db::{create_orm_conn, create_pool, run_migrations},
    domain::{order::OrderStatus, payment, plan::Plan},
    dto::{
        auth::RegisterRequest,
        messages::{CampaignRecipient, CampaignRequest},
        orders::{CreateOrderRequest, OrderCustomerInput, OrderItemRequest, UpdateOrderStatusRequest},
        payments::{CreateCheckoutRequest, VerifyPaymentRequest},
        products::CreateProductRequest,
        shops::{CreateShopRequest, UpdateShopRequest},
    },
    entity::{
        messages::{Column as MessageCol, Entity as Messages},
        orders::{Column as OrderCol, Entity as Orders},
        products::Entity as Products,
        users::{Column as UserCol, Entity as Users},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Shop,
    services::{
        auth_service, message_service, order_service, payment_service, product_service,
        shop_service,
    },
    state::{AppState, Providers},
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, sea_query::Expr};
use uuid::Uuid;

const GATEWAY_SECRET: &str = "test_gateway_secret";

struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    fn is_configured(&self) -> bool {
        false
    }

    async fn send_text(&self, _phone: &str, _body: &str) -> Result<String, ProviderError> {
        Err(ProviderError::NotConfigured("WhatsApp"))
    }
}

struct CannedAdvisor;

#[async_trait]
impl Advisor for CannedAdvisor {
    fn is_configured(&self) -> bool {
        true
    }

    async fn advise(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok("Restock atta before the weekend.".into())
    }
}

struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send(&self, _to: &str, _subject: &str, _html: &str) -> Result<(), ProviderError> {
        Ok(())
    }
}

struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn key_id(&self) -> Option<&str> {
        Some("rzp_test_key")
    }

    fn key_secret(&self) -> Option<&str> {
        Some(GATEWAY_SECRET)
    }

    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder, ProviderError> {
        Ok(GatewayOrder {
            id: format!("order_{}", Uuid::new_v4().simple()),
            amount: amount_paise,
            currency: currency.to_string(),
        })
    }
}

fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run order flow tests.");
            None
        }
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt: JwtConfig {
            secret: "test-access-secret".into(),
            refresh_secret: "test-refresh-secret".into(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        },
        frontend_url: "http://localhost:5173".into(),
        rate_limit: RateLimitConfig {
            window: Duration::from_secs(900),
            max_requests: 100,
        },
        business_offset: FixedOffset::east_opt(330 * 60).expect("offset"),
        campaign_delay: Duration::ZERO,
        provider_timeout: Duration::from_secs(1),
        whatsapp: Default::default(),
        ai: Default::default(),
        email: Default::default(),
        payments: Default::default(),
    };
    let providers = Providers {
        notifier: Arc::new(SilentNotifier),
        advisor: Arc::new(CannedAdvisor),
        mailer: Arc::new(NullMailer),
        gateway: Arc::new(FakeGateway),
    };
    Ok(AppState::new(pool, orm, config, providers))
}

async fn owner_with_shop(state: &AppState, shop_name: &str) -> anyhow::Result<(AuthUser, Shop)> {
    let email = format!("owner-{}@example.com", Uuid::new_v4().simple());
    let profile = auth_service::register_user(
        state,
        RegisterRequest {
            name: "Test Owner".into(),
            email,
            password: "secret123".into(),
            phone: None,
        },
    )
    .await?
    .data
    .expect("auth data")
    .user;

    let mut owner = AuthUser {
        user_id: profile.id,
        name: profile.name,
        email: profile.email,
        shop_id: None,
    };
    let shop = shop_service::create_shop(
        state,
        &owner,
        CreateShopRequest {
            shop_name: shop_name.into(),
            category: None,
            whatsapp: None,
            email: None,
            address: None,
            logo: None,
            description: None,
            settings: None,
            business_hours: None,
        },
    )
    .await?
    .data
    .expect("shop data");
    owner.shop_id = Some(shop.id);
    Ok((owner, shop))
}

async fn add_product(
    state: &AppState,
    owner: &AuthUser,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let product = product_service::create_product(
        state,
        owner,
        CreateProductRequest {
            name: name.into(),
            description: None,
            price: Decimal::from(price),
            stock: Some(stock),
            unit: None,
            category: None,
            image: None,
            sku: None,
            barcode: None,
            cost_price: None,
            tags: None,
            is_featured: None,
            is_active: None,
        },
    )
    .await?
    .data
    .expect("product data");
    Ok(product.id)
}

fn order_request(phone: &str, items: &[(Uuid, i32)], discount: i64) -> CreateOrderRequest {
    CreateOrderRequest {
        customer: OrderCustomerInput {
            name: "Priya".into(),
            phone: phone.into(),
            address: Some("12 MG Road".into()),
        },
        items: items
            .iter()
            .map(|(product_id, quantity)| OrderItemRequest {
                product_id: *product_id,
                quantity: *quantity,
            })
            .collect(),
        total: None,
        discount: Some(Decimal::from(discount)),
        delivery_date: None,
        delivery_time: None,
        notes: None,
        payment_method: None,
        source: None,
    }
}

async fn stock_of(state: &AppState, id: Uuid) -> anyhow::Result<i32> {
    Ok(Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .expect("product")
        .stock)
}

async fn orders_used(state: &AppState, user_id: Uuid) -> anyhow::Result<i32> {
    Ok(Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .expect("user")
        .orders_this_month)
}

#[tokio::test]
async fn short_stock_rejects_the_order_and_leaves_nothing_behind() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let (owner, shop) = owner_with_shop(&state, "Atomic Kirana").await?;
    let atta = add_product(&state, &owner, "Atta", 50, 5).await?;
    let dal = add_product(&state, &owner, "Dal", 30, 2).await?;

    let result = order_service::create_order(
        state.clone(),
        owner.clone(),
        order_request("9876543210", &[(atta, 2), (dal, 3)], 0),
    )
    .await;

    match result {
        Err(AppError::InsufficientStock { product, available }) => {
            assert_eq!(product, "Dal");
            assert_eq!(available, 2);
        }
        other => panic!("expected insufficient stock, got {other:?}"),
    }
    assert_eq!(stock_of(&state, atta).await?, 5);
    assert_eq!(stock_of(&state, dal).await?, 2);
    assert_eq!(orders_used(&state, owner.user_id).await?, 0);
    let orders = Orders::find()
        .filter(OrderCol::ShopId.eq(shop.id))
        .count(&state.orm)
        .await?;
    assert_eq!(orders, 0);
    Ok(())
}

#[tokio::test]
async fn orders_are_priced_numbered_and_counted() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let (owner, shop) = owner_with_shop(&state, "Numbering Store").await?;
    let atta = add_product(&state, &owner, "Atta", 50, 5).await?;
    let dal = add_product(&state, &owner, "Dal", 30, 2).await?;

    let first = order_service::create_order(
        state.clone(),
        owner.clone(),
        order_request("9876543210", &[(atta, 2), (dal, 1)], 10),
    )
    .await?
    .data
    .expect("order");
    assert_eq!(first.total, Decimal::from(130));
    assert_eq!(first.final_total, Decimal::from(120));
    assert_eq!(first.status, OrderStatus::Pending);
    assert!(first.order_number.ends_with("-0001"), "{}", first.order_number);

    let second = order_service::create_order(
        state.clone(),
        owner.clone(),
        order_request("9876543210", &[(atta, 1)], 0),
    )
    .await?
    .data
    .expect("order");
    assert!(second.order_number.ends_with("-0002"), "{}", second.order_number);
    assert_eq!(second.customer.customer_id, first.customer.customer_id);

    assert_eq!(stock_of(&state, atta).await?, 2);
    assert_eq!(stock_of(&state, dal).await?, 1);
    assert_eq!(orders_used(&state, owner.user_id).await?, 2);

    let shop = shop_service::get_my_shop(&state, &owner).await?.data.expect("shop");
    assert_eq!(shop.stats.total_orders, 2);
    assert_eq!(shop.stats.total_customers, 1);
    assert_eq!(shop.stats.total_revenue, Decimal::from(170));
    Ok(())
}

#[tokio::test]
async fn exhausted_quota_blocks_orders_without_counting() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let (owner, _shop) = owner_with_shop(&state, "Quota Store").await?;
    let atta = add_product(&state, &owner, "Atta", 50, 5).await?;

    Users::update_many()
        .col_expr(UserCol::OrdersThisMonth, Expr::value(20))
        .filter(UserCol::Id.eq(owner.user_id))
        .exec(&state.orm)
        .await?;

    let result = order_service::create_order(
        state.clone(),
        owner.clone(),
        order_request("9876543210", &[(atta, 1)], 0),
    )
    .await;

    match result {
        Err(AppError::LimitExceeded { current, limit, plan, .. }) => {
            assert_eq!((current, limit), (20, 20));
            assert_eq!(plan, Plan::Free.as_str());
        }
        other => panic!("expected limit rejection, got {other:?}"),
    }
    assert_eq!(orders_used(&state, owner.user_id).await?, 20);
    assert_eq!(stock_of(&state, atta).await?, 5);
    Ok(())
}

#[tokio::test]
async fn status_cannot_move_backwards() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let (owner, _shop) = owner_with_shop(&state, "Status Store").await?;
    let atta = add_product(&state, &owner, "Atta", 50, 5).await?;
    let order = order_service::create_order(
        state.clone(),
        owner.clone(),
        order_request("9123456780", &[(atta, 1)], 0),
    )
    .await?
    .data
    .expect("order");

    let confirmed = order_service::update_status(
        &state,
        &owner,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Confirmed,
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    let trail: Vec<OrderStatus> = confirmed.status_history.iter().map(|h| h.status).collect();
    assert_eq!(trail, vec![OrderStatus::Pending, OrderStatus::Confirmed]);
    assert_eq!(confirmed.status_history[1].updated_by, "Test Owner");

    let backwards = order_service::update_status(
        &state,
        &owner,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Pending,
        },
    )
    .await;
    assert!(matches!(backwards, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn colliding_shop_names_get_numbered_slugs() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let name = format!("Slug Test {}", Uuid::new_v4().simple());

    let (first_owner, first) = owner_with_shop(&state, &name).await?;
    let (_, second) = owner_with_shop(&state, &name).await?;
    assert_eq!(second.public_slug, format!("{}-1", first.public_slug));

    let resaved = shop_service::update_shop(
        &state,
        &first_owner,
        UpdateShopRequest {
            shop_name: Some(name.clone()),
            category: None,
            whatsapp: None,
            email: None,
            address: None,
            logo: None,
            description: Some("Same name, new description".into()),
            is_active: None,
            settings: None,
            business_hours: None,
        },
    )
    .await?
    .data
    .expect("shop");
    assert_eq!(resaved.public_slug, first.public_slug);

    let public = shop_service::get_public_shop(&state, &first.public_slug)
        .await?
        .data
        .expect("public shop");
    assert_eq!(public.public_slug, first.public_slug);
    Ok(())
}

#[tokio::test]
async fn verified_payment_upgrades_the_plan_once() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let (owner, _shop) = owner_with_shop(&state, "Upgrade Store").await?;

    let checkout = payment_service::create_checkout(
        &state,
        &owner,
        CreateCheckoutRequest { plan: Plan::Basic },
    )
    .await?
    .data
    .expect("checkout");
    assert_eq!(checkout.amount, 19_900);

    let payment_id = "pay_test_1".to_string();
    let signature = payment::sign(GATEWAY_SECRET, &checkout.order_id, &payment_id).expect("sign");
    let verified = payment_service::verify(
        &state,
        &owner,
        VerifyPaymentRequest {
            order_id: checkout.order_id.clone(),
            payment_id: payment_id.clone(),
            signature: signature.clone(),
        },
    )
    .await?
    .data
    .expect("verified");
    assert_eq!(verified.plan, Plan::Basic);

    let account = Users::find_by_id(owner.user_id).one(&state.orm).await?.expect("user");
    assert_eq!(account.plan, Plan::Basic.as_str());
    assert!(account.plan_expiry.is_some());

    let again = payment_service::verify(
        &state,
        &owner,
        VerifyPaymentRequest {
            order_id: checkout.order_id,
            payment_id,
            signature,
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn each_shop_numbers_its_own_orders() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let (first_owner, _) = owner_with_shop(&state, "First Counter Store").await?;
    let (second_owner, _) = owner_with_shop(&state, "Second Counter Store").await?;
    let first_atta = add_product(&state, &first_owner, "Atta", 50, 5).await?;
    let second_atta = add_product(&state, &second_owner, "Atta", 50, 5).await?;

    let first = order_service::create_order(
        state.clone(),
        first_owner.clone(),
        order_request("9876543210", &[(first_atta, 1)], 0),
    )
    .await?
    .data
    .expect("order");
    let second = order_service::create_order(
        state.clone(),
        second_owner.clone(),
        order_request("9876543210", &[(second_atta, 1)], 0),
    )
    .await?
    .data
    .expect("order");

    assert!(first.order_number.ends_with("-0001"), "{}", first.order_number);
    assert_eq!(second.order_number, first.order_number);
    assert_ne!(second.shop_id, first.shop_id);
    Ok(())
}

#[tokio::test]
async fn concurrent_orders_get_distinct_numbers() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    const ORDERS: usize = 5;
    let state = setup_state(&url).await?;
    let (owner, shop) = owner_with_shop(&state, "Rush Hour Store").await?;
    let atta = add_product(&state, &owner, "Atta", 50, 10).await?;

    let handles: Vec<_> = (0..ORDERS)
        .map(|i| {
            let state = state.clone();
            let owner = owner.clone();
            let request = order_request(&format!("98765432{i:02}"), &[(atta, 1)], 0);
            tokio::spawn(order_service::create_order(state, owner, request))
        })
        .collect();

    let mut suffixes = Vec::new();
    for handle in handles {
        let order = handle.await??.data.expect("order");
        let suffix = order.order_number.rsplit('-').next().unwrap_or_default().to_string();
        suffixes.push(suffix);
    }
    suffixes.sort();
    let expected: Vec<String> = (1..=ORDERS).map(|n| format!("{n:04}")).collect();
    assert_eq!(suffixes, expected);

    assert_eq!(stock_of(&state, atta).await?, 10 - ORDERS as i32);
    assert_eq!(orders_used(&state, owner.user_id).await?, ORDERS as i32);
    let placed = Orders::find()
        .filter(OrderCol::ShopId.eq(shop.id))
        .count(&state.orm)
        .await?;
    assert_eq!(placed, ORDERS as u64);
    Ok(())
}

#[tokio::test]
async fn campaign_logs_every_recipient_and_meters_only_sends() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let (owner, shop) = owner_with_shop(&state, "Campaign Store").await?;

    let result = message_service::run_campaign(
        &state,
        &owner,
        CampaignRequest {
            message: "Diwali offer: 10% off all sweets".into(),
            recipients: Some(vec![
                CampaignRecipient {
                    phone: "9876543210".into(),
                    name: Some("Priya".into()),
                    customer_id: None,
                },
                CampaignRecipient {
                    phone: "9123456780".into(),
                    name: None,
                    customer_id: None,
                },
            ]),
            segment: None,
            campaign_name: Some("diwali".into()),
        },
    )
    .await?
    .data
    .expect("campaign");
    assert_eq!((result.total, result.sent, result.failed), (2, 0, 2));
    assert!(result.campaign_id.starts_with("diwali-"));

    let logged = Messages::find()
        .filter(MessageCol::ShopId.eq(shop.id))
        .filter(MessageCol::CampaignId.eq(result.campaign_id.as_str()))
        .all(&state.orm)
        .await?;
    assert_eq!(logged.len(), 2);
    assert!(logged.iter().all(|m| m.status == "failed"));

    let account = Users::find_by_id(owner.user_id).one(&state.orm).await?.expect("user");
    assert_eq!(account.messages_this_month, 0);
    Ok(())
}
