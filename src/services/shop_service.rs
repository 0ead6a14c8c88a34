use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        product::DEFAULT_LOW_STOCK_THRESHOLD,
        shop::{self, Language},
    },
    dto::shops::{CreateShopRequest, ShopSettingsInput, UpdateShopRequest},
    entity::{
        products::{Column as ProdCol, Entity as Products},
        shops::{ActiveModel, Column, Entity as Shops, Model as ShopModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, PublicShop, Shop, ShopSettings, ShopStats},
    response::{ApiResponse, Pagination},
    routes::params::CatalogQuery,
    services::{conflict_on_unique, from_json, product_service::product_from_entity, to_json, utc},
    state::AppState,
};

pub fn shop_from_entity(shop: ShopModel) -> Shop {
    Shop {
        id: shop.id,
        owner_id: shop.owner_id,
        category: shop.category.parse().unwrap_or_default(),
        settings: settings_of(&shop),
        stats: ShopStats {
            total_orders: shop.total_orders,
            total_revenue: shop.total_revenue,
            total_customers: shop.total_customers,
            total_products: shop.total_products,
        },
        shop_name: shop.shop_name,
        whatsapp: shop.whatsapp,
        email: shop.email,
        address: from_json(shop.address),
        public_slug: shop.public_slug,
        logo: shop.logo,
        description: shop.description,
        is_active: shop.is_active,
        business_hours: shop.business_hours,
        created_at: utc(shop.created_at),
        updated_at: utc(shop.updated_at),
    }
}

fn public_shop_from_entity(shop: ShopModel) -> PublicShop {
    PublicShop {
        id: shop.id,
        category: shop.category.parse().unwrap_or_default(),
        shop_name: shop.shop_name,
        whatsapp: shop.whatsapp,
        address: from_json(shop.address),
        public_slug: shop.public_slug,
        logo: shop.logo,
        description: shop.description,
        business_hours: shop.business_hours,
    }
}

pub fn settings_of(shop: &ShopModel) -> ShopSettings {
    ShopSettings {
        language: shop.language.parse().unwrap_or_default(),
        currency: shop.currency.clone(),
        timezone: shop.timezone.clone(),
        auto_confirm_orders: shop.auto_confirm_orders,
        low_stock_threshold: shop.low_stock_threshold,
        enable_whatsapp_notifications: shop.enable_whatsapp_notifications,
    }
}

fn apply_settings(active: &mut ActiveModel, settings: ShopSettingsInput) {
    if let Some(language) = settings.language {
        active.language = Set(language.as_str().to_string());
    }
    if let Some(currency) = settings.currency {
        active.currency = Set(currency);
    }
    if let Some(timezone) = settings.timezone {
        active.timezone = Set(timezone);
    }
    if let Some(auto_confirm) = settings.auto_confirm_orders {
        active.auto_confirm_orders = Set(auto_confirm);
    }
    if let Some(threshold) = settings.low_stock_threshold {
        active.low_stock_threshold = Set(threshold);
    }
    if let Some(enabled) = settings.enable_whatsapp_notifications {
        active.enable_whatsapp_notifications = Set(enabled);
    }
}

/// First free slug for `name`, ignoring the shop `exclude` (its own row on re-save).
pub async fn assign_slug<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    exclude: Option<Uuid>,
) -> AppResult<String> {
    let base = shop::slugify(name);
    for candidate in shop::slug_candidates(&base) {
        let mut finder = Shops::find().filter(Column::PublicSlug.eq(candidate.as_str()));
        if let Some(id) = exclude {
            finder = finder.filter(Column::Id.ne(id));
        }
        if finder.count(conn).await? == 0 {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict(format!(
        "Could not find a free shop link for '{base}'"
    )))
}

/// The caller's shop row.
pub async fn owned_shop(state: &AppState, user: &AuthUser) -> AppResult<ShopModel> {
    let shop_id = user.require_shop()?;
    Shops::find_by_id(shop_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Shop"))
}

pub async fn create_shop(
    state: &AppState,
    user: &AuthUser,
    payload: CreateShopRequest,
) -> AppResult<ApiResponse<Shop>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let existing = Shops::find()
        .filter(Column::OwnerId.eq(user.user_id))
        .one(&txn)
        .await?;
    if user.shop_id.is_some() || existing.is_some() {
        return Err(AppError::BadRequest(
            "Shop already exists for this user".into(),
        ));
    }

    let shop_name = payload.shop_name.trim().to_string();
    let slug = assign_slug(&txn, &shop_name, None).await?;
    let address = payload.address.as_ref().map(to_json).transpose()?;

    let mut active = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.user_id),
        shop_name: Set(shop_name),
        category: Set(payload.category.unwrap_or_default().as_str().to_string()),
        whatsapp: Set(payload.whatsapp),
        email: Set(payload.email),
        address: Set(address),
        public_slug: Set(slug),
        logo: Set(payload.logo),
        description: Set(payload.description),
        is_active: Set(true),
        language: Set(Language::default().as_str().to_string()),
        currency: Set("INR".to_string()),
        timezone: Set("Asia/Kolkata".to_string()),
        auto_confirm_orders: Set(false),
        low_stock_threshold: Set(DEFAULT_LOW_STOCK_THRESHOLD),
        enable_whatsapp_notifications: Set(true),
        business_hours: Set(payload.business_hours),
        total_orders: Set(0),
        total_revenue: Set(Decimal::ZERO),
        total_customers: Set(0),
        total_products: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    };
    if let Some(settings) = payload.settings {
        apply_settings(&mut active, settings);
    }

    let shop = active
        .insert(&txn)
        .await
        .map_err(|err| conflict_on_unique(err, "Shop link already taken, please retry"))?;

    Users::update_many()
        .col_expr(UserCol::ShopId, Expr::value(Some(shop.id)))
        .col_expr(UserCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(UserCol::Id.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(shop_id = %shop.id, slug = %shop.public_slug, "shop created");
    Ok(ApiResponse::success(
        "Shop created successfully",
        shop_from_entity(shop),
    ))
}

pub async fn get_my_shop(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Shop>> {
    let shop = owned_shop(state, user).await?;
    Ok(ApiResponse::success("Shop", shop_from_entity(shop)))
}

pub async fn update_shop(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateShopRequest,
) -> AppResult<ApiResponse<Shop>> {
    payload.validate()?;
    let existing = owned_shop(state, user).await?;

    let txn = state.orm.begin().await?;
    let name_changed = payload
        .shop_name
        .as_deref()
        .is_some_and(|name| name.trim() != existing.shop_name);
    let slug_missing = existing.public_slug.is_empty();
    let shop_id = existing.id;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.shop_name {
        let name = name.trim().to_string();
        if name_changed && slug_missing {
            active.public_slug = Set(assign_slug(&txn, &name, Some(shop_id)).await?);
        }
        active.shop_name = Set(name);
    }
    if let Some(category) = payload.category {
        active.category = Set(category.as_str().to_string());
    }
    if let Some(whatsapp) = payload.whatsapp {
        active.whatsapp = Set(Some(whatsapp));
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(to_json(&address)?));
    }
    if let Some(logo) = payload.logo {
        active.logo = Set(Some(logo));
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(hours) = payload.business_hours {
        active.business_hours = Set(Some(hours));
    }
    if let Some(settings) = payload.settings {
        apply_settings(&mut active, settings);
    }
    active.updated_at = Set(Utc::now().into());

    let shop = active
        .update(&txn)
        .await
        .map_err(|err| conflict_on_unique(err, "Shop link already taken, please retry"))?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Shop updated successfully",
        shop_from_entity(shop),
    ))
}

/// Active shop behind a storefront slug.
pub async fn storefront(state: &AppState, slug: &str) -> AppResult<ShopModel> {
    if !shop::is_valid_slug(slug) {
        return Err(AppError::not_found("Shop"));
    }
    Shops::find()
        .filter(Column::PublicSlug.eq(slug))
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Shop"))
}

pub async fn get_public_shop(state: &AppState, slug: &str) -> AppResult<ApiResponse<PublicShop>> {
    let shop = storefront(state, slug).await?;
    Ok(ApiResponse::success("Shop", public_shop_from_entity(shop)))
}

pub async fn public_catalog(
    state: &AppState,
    slug: &str,
    query: CatalogQuery,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let shop = storefront(state, slug).await?;
    let page = query.page();

    let mut finder = Products::find()
        .filter(ProdCol::ShopId.eq(shop.id))
        .filter(ProdCol::IsActive.eq(true));
    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        finder = finder.filter(ProdCol::Category.eq(category.as_str()));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(Expr::col(ProdCol::Name).ilike(format!("%{search}%")));
    }
    let finder = finder
        .order_by_desc(ProdCol::IsFeatured)
        .order_by_asc(ProdCol::Name);

    let paginator = finder.paginate(&state.orm, page.limit as u64);
    let total = paginator.num_items().await? as i64;
    let threshold = shop.low_stock_threshold;
    let items = paginator
        .fetch_page(page.index())
        .await?
        .into_iter()
        .map(|p| product_from_entity(p, threshold))
        .collect();

    Ok(ApiResponse::paginated(
        "Products",
        items,
        Pagination::new(page.page, page.limit, total),
    ))
}
