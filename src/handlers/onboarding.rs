use axum::{
    extract::{OriginalUri, State},
    Extension, Json,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use crate::entities::user::UserRole;
use crate::entities::{service, vehicle};
use crate::error::AppResult;
use crate::handlers::profile::{current_car_owner, current_shop_owner};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct OnboardingStatus {
    pub role: UserRole,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_count: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: uuid::Uuid,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct PageContext {
    pub path: String,
    pub user: SessionUser,
    pub onboarding_complete: bool,
}

/// Car owners finish onboarding by adding a vehicle, shop owners by publishing a service.
async fn onboarding_status(state: &AppState, claims: &Claims) -> AppResult<OnboardingStatus> {
    let status = match claims.role {
        UserRole::CarOwner => {
            let owner = current_car_owner(&state.db, claims).await?;
            let vehicles = vehicle::Entity::find()
                .filter(vehicle::Column::CarOwnerId.eq(owner.id))
                .count(&state.db)
                .await?;
            OnboardingStatus {
                role: claims.role,
                completed: vehicles > 0,
                vehicle_count: Some(vehicles),
                service_count: None,
            }
        }
        UserRole::ShopOwner => {
            let shop = current_shop_owner(&state.db, claims).await?;
            let services = service::Entity::find()
                .filter(service::Column::ShopOwnerId.eq(shop.id))
                .count(&state.db)
                .await?;
            OnboardingStatus {
                role: claims.role,
                completed: services > 0,
                vehicle_count: None,
                service_count: Some(services),
            }
        }
    };

    Ok(status)
}

/// Whether the session user has finished onboarding for their role
pub async fn status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<OnboardingStatus>> {
    Ok(Json(onboarding_status(&state, &claims).await?))
}

/// Context for the guarded `/dashboard` and `/onboarding` pages
pub async fn page_context(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<PageContext>> {
    let onboarding = onboarding_status(&state, &claims).await?;

    Ok(Json(PageContext {
        path: uri.path().to_string(),
        user: SessionUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        },
        onboarding_complete: onboarding.completed,
    }))
}
