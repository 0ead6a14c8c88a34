use localbiz_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    domain::{product::Unit, shop::ShopCategory},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        products::CreateProductRequest,
        shops::CreateShopRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{auth_service, product_service, shop_service},
    state::{AppState, Providers},
};
use rust_decimal::Decimal;

const DEMO_EMAIL: &str = "demo@localbiz.in";
const DEMO_PASSWORD: &str = "demo123";

// (name, price in paise, stock, unit, category)
const CATALOG: &[(&str, i64, i32, Unit, &str)] = &[
    ("Aashirvaad Atta 5kg", 24000, 25, Unit::Packet, "Grocery"),
    ("Tata Salt 1kg", 2800, 60, Unit::Packet, "Grocery"),
    ("Toor Dal", 14500, 40, Unit::Kg, "Pulses"),
    ("Amul Butter 100g", 5600, 8, Unit::Piece, "Dairy"),
    ("Sugar", 4500, 3, Unit::Kg, "Grocery"),
    ("Fortune Sunflower Oil 1L", 16500, 18, Unit::Liter, "Oil"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let providers = Providers::from_config(&config)?;
    let state = AppState::new(pool, orm, config, providers);

    let mut owner = demo_owner(&state).await?;
    if owner.shop_id.is_some() {
        println!("Demo shop already present for {DEMO_EMAIL}; nothing to do");
        return Ok(());
    }

    let shop = shop_service::create_shop(
        &state,
        &owner,
        CreateShopRequest {
            shop_name: "Sharma Kirana Store".into(),
            category: Some(ShopCategory::Kirana),
            whatsapp: Some("9876543210".into()),
            email: Some(DEMO_EMAIL.into()),
            address: None,
            logo: None,
            description: Some("Daily groceries delivered in the neighbourhood".into()),
            settings: None,
            business_hours: None,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("shop creation returned no data"))?;
    owner.shop_id = Some(shop.id);

    for (name, paise, stock, unit, category) in CATALOG {
        product_service::create_product(
            &state,
            &owner,
            CreateProductRequest {
                name: (*name).into(),
                description: None,
                price: Decimal::new(*paise, 2),
                stock: Some(*stock),
                unit: Some(*unit),
                category: Some((*category).into()),
                image: None,
                sku: None,
                barcode: None,
                cost_price: None,
                tags: None,
                is_featured: None,
                is_active: None,
            },
        )
        .await?;
    }

    println!(
        "Seed completed. Login: {DEMO_EMAIL} / {DEMO_PASSWORD}, shop link: /shop/{}",
        shop.public_slug
    );
    Ok(())
}

/// Registers the demo account, or logs into it when it already exists.
async fn demo_owner(state: &AppState) -> anyhow::Result<AuthUser> {
    let registered = auth_service::register_user(
        state,
        RegisterRequest {
            name: "Ramesh Sharma".into(),
            email: DEMO_EMAIL.into(),
            password: DEMO_PASSWORD.into(),
            phone: Some("9876543210".into()),
        },
    )
    .await;

    let resp = match registered {
        Ok(resp) => resp,
        Err(AppError::Conflict(_)) => {
            auth_service::login_user(
                state,
                LoginRequest {
                    email: DEMO_EMAIL.into(),
                    password: DEMO_PASSWORD.into(),
                },
            )
            .await?
        }
        Err(err) => return Err(err.into()),
    };
    let profile = resp
        .data
        .ok_or_else(|| anyhow::anyhow!("auth returned no data"))?
        .user;

    Ok(AuthUser {
        user_id: profile.id,
        name: profile.name,
        email: profile.email,
        shop_id: profile.shop_id,
    })
}
