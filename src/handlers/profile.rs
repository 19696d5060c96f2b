use axum::{extract::State, Extension, Json};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::user::{self, UserRole};
use crate::entities::{car_owner, shop_owner};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::auth::UserInfo;
use crate::utils::jwt::Claims;
use crate::utils::validation::present;
use crate::AppState;

/// Car owner profile of the session user (404 when it has none).
pub async fn current_car_owner<C: ConnectionTrait>(
    db: &C,
    claims: &Claims,
) -> AppResult<car_owner::Model> {
    car_owner::Entity::find()
        .filter(car_owner::Column::UserId.eq(claims.sub))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Car owner profile not found".to_string()))
}

/// Shop owner profile of the session user (404 when it has none).
pub async fn current_shop_owner<C: ConnectionTrait>(
    db: &C,
    claims: &Claims,
) -> AppResult<shop_owner::Model> {
    shop_owner::Entity::find()
        .filter(shop_owner::Column::UserId.eq(claims.sub))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop owner profile not found".to_string()))
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleProfile {
    CarOwner(car_owner::Model),
    ShopOwner(shop_owner::Model),
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserInfo,
    pub profile: RoleProfile,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    // Shop owners only
    #[validate(length(max = 100, message = "Shop name must be at most 100 characters"))]
    pub shop_name: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub shop_phone: Option<String>,
}

async fn load_profile(state: &AppState, claims: &Claims) -> AppResult<ProfileResponse> {
    let user = find_user(state, claims.sub).await?;

    let profile = match user.role {
        UserRole::CarOwner => RoleProfile::CarOwner(current_car_owner(&state.db, claims).await?),
        UserRole::ShopOwner => RoleProfile::ShopOwner(current_shop_owner(&state.db, claims).await?),
    };

    Ok(ProfileResponse {
        user: user.into(),
        profile,
    })
}

async fn find_user(state: &AppState, user_id: Uuid) -> AppResult<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Get the session user's account and role profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ProfileResponse>> {
    Ok(Json(load_profile(&state, &claims).await?))
}

/// Update account details and the role-specific profile fields
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    payload.validate()?;

    let txn = state.db.begin().await?;

    let user = user::Entity::find_by_id(claims.sub)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = user.into();
    if let Some(name) = present(&payload.name) {
        active.name = Set(name);
    }
    if let Some(phone) = present(&payload.phone) {
        active.phone = Set(phone);
    }
    if active.is_changed() {
        active.update(&txn).await?;
    }

    match claims.role {
        UserRole::CarOwner => {
            let profile = current_car_owner(&txn, &claims).await?;
            let mut active: car_owner::ActiveModel = profile.into();
            if payload.address.is_some() {
                active.address = Set(present(&payload.address));
            }
            if payload.city.is_some() {
                active.city = Set(present(&payload.city));
            }
            if active.is_changed() {
                active.update(&txn).await?;
            }
        }
        UserRole::ShopOwner => {
            let profile = current_shop_owner(&txn, &claims).await?;
            let mut active: shop_owner::ActiveModel = profile.into();
            if let Some(shop_name) = present(&payload.shop_name) {
                active.shop_name = Set(shop_name);
            }
            if payload.address.is_some() {
                active.address = Set(present(&payload.address));
            }
            if payload.city.is_some() {
                active.city = Set(present(&payload.city));
            }
            if payload.description.is_some() {
                active.description = Set(present(&payload.description));
            }
            if payload.shop_phone.is_some() {
                active.phone = Set(present(&payload.shop_phone));
            }
            if active.is_changed() {
                active.update(&txn).await?;
            }
        }
    }

    txn.commit().await?;
    tracing::debug!(user_id = %claims.sub, "Profile updated");

    Ok(Json(load_profile(&state, &claims).await?))
}
