use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::user::{self, UserRole};
use crate::entities::{car_owner, shop_owner};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::SESSION_COOKIE;
use crate::utils::jwt::{create_token, Claims};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::{normalize_email, present};
use crate::AppState;

const DUPLICATE_EMAIL: &str = "User with this email already exists";

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
}

impl From<user::Model> for UserInfo {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
        }
    }
}

/// Register a car owner or shop owner account together with its role profile
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let (Some(name), Some(email), Some(phone), Some(password), Some(role)) = (
        present(&payload.name),
        present(&payload.email),
        present(&payload.phone),
        present(&payload.password),
        present(&payload.role),
    ) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    let role = UserRole::parse(&role)
        .ok_or_else(|| AppError::BadRequest("Role must be CAR_OWNER or SHOP_OWNER".to_string()))?;
    payload.validate()?;
    let email = normalize_email(&email);

    // Check if email already exists
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_EMAIL.to_string()));
    }

    let password_hash = hash_password(&password)?;
    let now = Utc::now();

    let txn = state.db.begin().await?;

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        email: Set(email),
        phone: Set(phone),
        password_hash: Set(password_hash),
        role: Set(role),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::unique_violation(e, DUPLICATE_EMAIL))?;

    match role {
        UserRole::CarOwner => {
            car_owner::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                address: Set(None),
                city: Set(None),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await?;
        }
        UserRole::ShopOwner => {
            shop_owner::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                shop_name: Set(name),
                address: Set(None),
                city: Set(None),
                description: Set(None),
                phone: Set(None),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    tracing::info!(user_id = %user.id, role = ?user.role, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Login with email and password, issuing the session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(&payload.email)))
        .one(&state.db)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = create_token(
        user.id,
        &user.email,
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Clear the session cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    // Always emit the expired cookie, even when the request carried none.
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();

    (
        jar.add(cookie),
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}

/// Current session's user
pub async fn session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<UserInfo>> {
    let user = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session user no longer exists".to_string()))?;

    Ok(Json(user.into()))
}
