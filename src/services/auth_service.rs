use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use crate::{
    clients::email::welcome_email,
    domain::plan::{Plan, PlanLimits},
    dto::auth::{
        AccessTokenResponse, AuthResponse, Claims, LoginRequest, RefreshRequest, RegisterRequest,
    },
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, decode_claims},
    models::UserProfile,
    response::ApiResponse,
    services::{
        conflict_on_unique,
        usage_service::{plan_of, usage_of},
        utc,
    },
    state::AppState,
};

pub fn profile_from_entity(user: UserModel) -> UserProfile {
    let plan = plan_of(&user);
    UserProfile {
        id: user.id,
        usage: usage_of(&user),
        name: user.name,
        email: user.email,
        phone: user.phone,
        shop_id: user.shop_id,
        plan,
        plan_expiry: user.plan_expiry.map(utc),
        plan_limits: PlanLimits::for_plan(plan),
        is_verified: user.is_verified,
        last_login: user.last_login.map(utc),
        created_at: utc(user.created_at),
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn issue_token(user_id: Uuid, secret: &str, ttl: Duration) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Refresh tokens are stored only as their SHA-256 hex digest.
pub fn refresh_token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

struct TokenPair {
    access: String,
    refresh: String,
}

fn issue_pair(state: &AppState, user_id: Uuid) -> AppResult<TokenPair> {
    let jwt = &state.config.jwt;
    Ok(TokenPair {
        access: issue_token(user_id, &jwt.secret, Duration::minutes(jwt.access_ttl_minutes))?,
        refresh: issue_token(
            user_id,
            &jwt.refresh_secret,
            Duration::days(jwt.refresh_ttl_days),
        )?,
    })
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    payload.validate()?;
    let RegisterRequest {
        name,
        email,
        password,
        phone,
    } = payload;
    let email = email.trim().to_lowercase();

    let exist = Users::find()
        .filter(Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict(
            "User already exists with this email".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();
    let tokens = issue_pair(state, id)?;

    let user = ActiveModel {
        id: Set(id),
        name: Set(name.trim().to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        phone: Set(phone),
        shop_id: Set(None),
        plan: Set(Plan::Free.as_str().to_string()),
        plan_expiry: Set(None),
        orders_this_month: Set(0),
        messages_this_month: Set(0),
        ai_queries_this_month: Set(0),
        is_verified: Set(false),
        is_active: Set(true),
        refresh_token_hash: Set(Some(refresh_token_digest(&tokens.refresh))),
        last_login: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| conflict_on_unique(err, "User already exists with this email"))?;

    tracing::info!(user_id = %user.id, "account registered");

    let mailer = state.mailer.clone();
    let (subject, html) = welcome_email(&user.name, &state.config.email.dashboard_url);
    let to = user.email.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send(&to, &subject, &html).await {
            tracing::warn!(error = %err, "welcome email failed");
        }
    });

    Ok(ApiResponse::success(
        "User registered successfully",
        AuthResponse {
            user: profile_from_entity(user),
            access_token: tokens.access,
            refresh_token: tokens.refresh,
        },
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    payload.validate()?;
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = Users::find()
        .filter(Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".into()));
    }

    let tokens = issue_pair(state, user.id)?;
    let now = Utc::now();
    let mut active: ActiveModel = user.into();
    active.last_login = Set(Some(now.into()));
    active.refresh_token_hash = Set(Some(refresh_token_digest(&tokens.refresh)));
    active.updated_at = Set(now.into());
    let user = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Login successful",
        AuthResponse {
            user: profile_from_entity(user),
            access_token: tokens.access,
            refresh_token: tokens.refresh,
        },
    ))
}

pub async fn refresh_access_token(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<AccessTokenResponse>> {
    let claims = decode_claims(&payload.refresh_token, &state.config.jwt.refresh_secret)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    let presented = refresh_token_digest(&payload.refresh_token);
    if !user.is_active || user.refresh_token_hash.as_deref() != Some(presented.as_str()) {
        return Err(AppError::Unauthorized("Invalid refresh token".into()));
    }

    let jwt = &state.config.jwt;
    let access_token = issue_token(
        user.id,
        &jwt.secret,
        Duration::minutes(jwt.access_ttl_minutes),
    )?;

    Ok(ApiResponse::success(
        "Token refreshed",
        AccessTokenResponse { access_token },
    ))
}

pub async fn logout_user(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    Users::update_many()
        .col_expr(
            Column::RefreshTokenHash,
            sea_orm::sea_query::Expr::value(Option::<String>::None),
        )
        .filter(Column::Id.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Logged out successfully",
        serde_json::json!({}),
    ))
}

pub async fn current_user(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UserProfile>> {
    let account = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success("Profile", profile_from_entity(account)))
}
