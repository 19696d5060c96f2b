use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::entities::service;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::profile::current_shop_owner;
use crate::utils::jwt::Claims;
use crate::utils::validation::{present, required};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be zero or greater"))]
    pub price: Option<f64>,
    #[validate(range(min = 1, message = "Duration must be a positive number of minutes"))]
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateServiceRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be zero or greater"))]
    pub price: Option<f64>,
    #[validate(range(min = 1, message = "Duration must be a positive number of minutes"))]
    pub duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

/// List every service of the shop, inactive ones included
pub async fn list_services(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<service::Model>>> {
    let shop = current_shop_owner(&state.db, &claims).await?;

    let services = service::Entity::find()
        .filter(service::Column::ShopOwnerId.eq(shop.id))
        .order_by_asc(service::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(services))
}

/// Publish a new service
pub async fn create_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateServiceRequest>,
) -> AppResult<(StatusCode, Json<service::Model>)> {
    let name = required(&payload.name, "name")?;
    let price = payload
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;
    let duration_minutes = payload
        .duration_minutes
        .ok_or_else(|| AppError::BadRequest("duration_minutes is required".to_string()))?;
    payload.validate()?;

    let shop = current_shop_owner(&state.db, &claims).await?;

    let service = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_owner_id: Set(shop.id),
        name: Set(name),
        description: Set(present(&payload.description)),
        price: Set(price),
        duration_minutes: Set(duration_minutes),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(service_id = %service.id, shop_owner_id = %shop.id, "Service published");
    Ok((StatusCode::CREATED, Json(service)))
}

/// Update a service
pub async fn update_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(service_id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateServiceRequest>,
) -> AppResult<Json<service::Model>> {
    payload.validate()?;
    let shop = current_shop_owner(&state.db, &claims).await?;
    let service = service::Entity::find_by_id(service_id)
        .filter(service::Column::ShopOwnerId.eq(shop.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    let mut active: service::ActiveModel = service.clone().into();

    if let Some(name) = present(&payload.name) {
        active.name = Set(name);
    }
    if payload.description.is_some() {
        active.description = Set(present(&payload.description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(minutes) = payload.duration_minutes {
        active.duration_minutes = Set(minutes);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    if !active.is_changed() {
        return Ok(Json(service));
    }

    Ok(Json(active.update(&state.db).await?))
}

/// Deactivate a service; existing bookings keep referring to it
pub async fn delete_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(service_id): AppPath<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let shop = current_shop_owner(&state.db, &claims).await?;
    let service = service::Entity::find_by_id(service_id)
        .filter(service::Column::ShopOwnerId.eq(shop.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    let mut active: service::ActiveModel = service.into();
    active.is_active = Set(false);
    active.update(&state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Service deactivated" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(price: f64, duration_minutes: i32) -> CreateServiceRequest {
        CreateServiceRequest {
            name: Some("Foam wash".into()),
            description: None,
            price: Some(price),
            duration_minutes: Some(duration_minutes),
        }
    }

    #[test]
    fn test_price_rules() {
        assert!(create(0.0, 30).validate().is_ok());
        assert!(create(25.5, 30).validate().is_ok());
        assert!(create(-1.0, 30).validate().is_err());
    }

    #[test]
    fn test_duration_rules() {
        assert!(create(10.0, 30).validate().is_ok());
        assert!(create(10.0, 0).validate().is_err());
    }
}
