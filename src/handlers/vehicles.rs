use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::entities::booking;
use crate::entities::vehicle;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::profile::current_car_owner;
use crate::utils::jwt::Claims;
use crate::utils::validation::{present, required};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct VehicleRequest {
    #[validate(length(max = 100, message = "Make must be at most 100 characters"))]
    pub make: Option<String>,
    #[validate(length(max = 100, message = "Model must be at most 100 characters"))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub year: Option<i32>,
    #[validate(length(max = 50, message = "Color must be at most 50 characters"))]
    pub color: Option<String>,
    #[validate(length(max = 20, message = "License plate must be at most 20 characters"))]
    pub license_plate: Option<String>,
}

async fn owned_vehicle(
    state: &AppState,
    car_owner_id: Uuid,
    vehicle_id: Uuid,
) -> AppResult<vehicle::Model> {
    vehicle::Entity::find_by_id(vehicle_id)
        .filter(vehicle::Column::CarOwnerId.eq(car_owner_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
}

/// List the car owner's vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    let owner = current_car_owner(&state.db, &claims).await?;

    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::CarOwnerId.eq(owner.id))
        .order_by_asc(vehicle::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(vehicles))
}

/// Register a vehicle
pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<VehicleRequest>,
) -> AppResult<(StatusCode, Json<vehicle::Model>)> {
    let make = required(&payload.make, "make")?;
    let model = required(&payload.model, "model")?;
    let license_plate = required(&payload.license_plate, "license_plate")?.to_uppercase();
    payload.validate()?;

    let owner = current_car_owner(&state.db, &claims).await?;

    let vehicle = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        car_owner_id: Set(owner.id),
        make: Set(make),
        model: Set(model),
        year: Set(payload.year),
        color: Set(present(&payload.color)),
        license_plate: Set(license_plate),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.db)
    .await?;

    tracing::debug!(vehicle_id = %vehicle.id, car_owner_id = %owner.id, "Vehicle registered");
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// Update a vehicle
pub async fn update_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(vehicle_id): AppPath<Uuid>,
    AppJson(payload): AppJson<VehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    payload.validate()?;

    let owner = current_car_owner(&state.db, &claims).await?;
    let vehicle = owned_vehicle(&state, owner.id, vehicle_id).await?;

    let mut active: vehicle::ActiveModel = vehicle.clone().into();
    if let Some(make) = present(&payload.make) {
        active.make = Set(make);
    }
    if let Some(model) = present(&payload.model) {
        active.model = Set(model);
    }
    if let Some(plate) = present(&payload.license_plate) {
        active.license_plate = Set(plate.to_uppercase());
    }
    if payload.year.is_some() {
        active.year = Set(payload.year);
    }
    if payload.color.is_some() {
        active.color = Set(present(&payload.color));
    }

    if !active.is_changed() {
        return Ok(Json(vehicle));
    }

    Ok(Json(active.update(&state.db).await?))
}

/// Delete a vehicle that was never booked; booked vehicles stay for the shops' history
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(vehicle_id): AppPath<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let owner = current_car_owner(&state.db, &claims).await?;
    let vehicle = owned_vehicle(&state, owner.id, vehicle_id).await?;

    let bookings = booking::Entity::find()
        .filter(booking::Column::VehicleId.eq(vehicle.id))
        .count(&state.db)
        .await?;

    if bookings > 0 {
        return Err(AppError::BadRequest(
            "Vehicle has bookings and cannot be deleted".to_string(),
        ));
    }

    vehicle::Entity::delete_by_id(vehicle.id)
        .exec(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Vehicle deleted" })))
}
