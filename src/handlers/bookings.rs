use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::user::UserRole;
use crate::entities::{car_owner, service, shop_owner, user, vehicle};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::profile::{current_car_owner, current_shop_owner};
use crate::utils::jwt::Claims;
use crate::utils::validation::present;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub service_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize)]
pub struct BookingServiceInfo {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize)]
pub struct BookingVehicleInfo {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub license_plate: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct BookingShopInfo {
    pub id: Uuid,
    pub shop_name: String,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub status: BookingStatus,
    pub scheduled_at: DateTime<Utc>,
    pub total_amount: f64,
    pub notes: Option<String>,
    pub service: Option<BookingServiceInfo>,
    pub vehicle: Option<BookingVehicleInfo>,
    pub customer: Option<CustomerInfo>,
    pub shop: Option<BookingShopInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join bookings with their service, vehicle, customer and shop in four batched lookups.
async fn describe_bookings(
    db: &DatabaseConnection,
    bookings: Vec<booking::Model>,
) -> AppResult<Vec<BookingResponse>> {
    let ids = |f: fn(&booking::Model) -> Uuid| bookings.iter().map(f).collect::<Vec<Uuid>>();

    let (services, vehicles, car_owners, shops) = tokio::try_join!(
        service::Entity::find()
            .filter(service::Column::Id.is_in(ids(|b| b.service_id)))
            .all(db),
        vehicle::Entity::find()
            .filter(vehicle::Column::Id.is_in(ids(|b| b.vehicle_id)))
            .all(db),
        car_owner::Entity::find()
            .filter(car_owner::Column::Id.is_in(ids(|b| b.car_owner_id)))
            .all(db),
        shop_owner::Entity::find()
            .filter(shop_owner::Column::Id.is_in(ids(|b| b.shop_owner_id)))
            .all(db),
    )?;

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(car_owners.iter().map(|o| o.user_id).collect::<Vec<_>>()))
        .all(db)
        .await?;

    let responses = bookings
        .into_iter()
        .map(|b| {
            let customer = car_owners
                .iter()
                .find(|o| o.id == b.car_owner_id)
                .and_then(|o| users.iter().find(|u| u.id == o.user_id));

            BookingResponse {
                id: b.id,
                status: b.status,
                scheduled_at: b.scheduled_at.with_timezone(&Utc),
                total_amount: b.total_amount,
                notes: b.notes,
                service: services.iter().find(|s| s.id == b.service_id).map(|s| {
                    BookingServiceInfo {
                        id: s.id,
                        name: s.name.clone(),
                        duration_minutes: s.duration_minutes,
                    }
                }),
                vehicle: vehicles.iter().find(|v| v.id == b.vehicle_id).map(|v| {
                    BookingVehicleInfo {
                        id: v.id,
                        make: v.make.clone(),
                        model: v.model.clone(),
                        license_plate: v.license_plate.clone(),
                    }
                }),
                customer: customer.map(|u| CustomerInfo {
                    name: u.name.clone(),
                    phone: u.phone.clone(),
                }),
                shop: shops.iter().find(|s| s.id == b.shop_owner_id).map(|s| {
                    BookingShopInfo {
                        id: s.id,
                        shop_name: s.shop_name.clone(),
                    }
                }),
                created_at: b.created_at.with_timezone(&Utc),
                updated_at: b.updated_at.with_timezone(&Utc),
            }
        })
        .collect();

    Ok(responses)
}

async fn describe_booking(
    db: &DatabaseConnection,
    booking: booking::Model,
) -> AppResult<BookingResponse> {
    describe_bookings(db, vec![booking])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Booking description missing".to_string()))
}

/// The booking as seen from the session: car owners see their own, shop owners
/// see the ones placed at their shop. Anything else is reported as missing.
async fn visible_booking(
    state: &AppState,
    claims: &Claims,
    booking_id: Uuid,
) -> AppResult<booking::Model> {
    let query = booking::Entity::find_by_id(booking_id);
    let query = match claims.role {
        UserRole::CarOwner => {
            let owner = current_car_owner(&state.db, claims).await?;
            query.filter(booking::Column::CarOwnerId.eq(owner.id))
        }
        UserRole::ShopOwner => {
            let shop = current_shop_owner(&state.db, claims).await?;
            query.filter(booking::Column::ShopOwnerId.eq(shop.id))
        }
    };

    query
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

/// Shop-owner-only status change on one of the shop's bookings.
async fn shop_transition(
    state: &AppState,
    claims: &Claims,
    booking_id: Uuid,
    next: BookingStatus,
) -> AppResult<BookingResponse> {
    claims.require_role(UserRole::ShopOwner)?;
    let booking = visible_booking(state, claims, booking_id).await?;
    let updated = transition(&state.db, booking, next).await?;
    describe_booking(&state.db, updated).await
}

/// Move a booking to `next` when its current status allows it.
async fn transition(
    db: &DatabaseConnection,
    booking: booking::Model,
    next: BookingStatus,
) -> AppResult<booking::Model> {
    if !booking.status.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Booking is {} and cannot be marked {}",
            booking.status.as_str(),
            next.as_str()
        )));
    }

    let booking_id = booking.id;
    let previous = booking.status;

    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(db).await?;

    tracing::info!(
        booking_id = %booking_id,
        from = previous.as_str(),
        to = next.as_str(),
        "Booking status changed"
    );

    Ok(updated)
}

/// Book a service for one of the car owner's vehicles
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    claims.require_role(UserRole::CarOwner)?;

    let (Some(service_id), Some(vehicle_id), Some(scheduled_at)) =
        (payload.service_id, payload.vehicle_id, payload.scheduled_at)
    else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };
    payload.validate()?;

    if scheduled_at <= Utc::now() {
        return Err(AppError::BadRequest(
            "Booking must be scheduled in the future".to_string(),
        ));
    }

    let owner = current_car_owner(&state.db, &claims).await?;

    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .filter(vehicle::Column::CarOwnerId.eq(owner.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let service = service::Entity::find_by_id(service_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    if !service.is_active {
        return Err(AppError::BadRequest(
            "Service is not currently offered".to_string(),
        ));
    }

    let now = Utc::now();
    let booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        car_owner_id: Set(owner.id),
        shop_owner_id: Set(service.shop_owner_id),
        service_id: Set(service.id),
        vehicle_id: Set(vehicle.id),
        status: Set(BookingStatus::Pending),
        scheduled_at: Set(scheduled_at.into()),
        total_amount: Set(service.price),
        notes: Set(present(&payload.notes)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(
        booking_id = %booking.id,
        shop_owner_id = %booking.shop_owner_id,
        "Booking requested"
    );

    Ok((
        StatusCode::CREATED,
        Json(describe_booking(&state.db, booking).await?),
    ))
}

/// List the session's bookings, newest appointment first
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppQuery(params): AppQuery<BookingListQuery>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let mut query = booking::Entity::find();
    query = match claims.role {
        UserRole::CarOwner => {
            let owner = current_car_owner(&state.db, &claims).await?;
            query.filter(booking::Column::CarOwnerId.eq(owner.id))
        }
        UserRole::ShopOwner => {
            let shop = current_shop_owner(&state.db, &claims).await?;
            query.filter(booking::Column::ShopOwnerId.eq(shop.id))
        }
    };
    if let Some(status) = params.status {
        query = query.filter(booking::Column::Status.eq(status));
    }

    let bookings = query
        .order_by_desc(booking::Column::ScheduledAt)
        .all(&state.db)
        .await?;

    Ok(Json(describe_bookings(&state.db, bookings).await?))
}

/// Booking details for either party
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let booking = visible_booking(&state, &claims, booking_id).await?;
    Ok(Json(describe_booking(&state.db, booking).await?))
}

/// Confirm a pending booking (shop owner)
pub async fn confirm_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let response = shop_transition(&state, &claims, booking_id, BookingStatus::Confirmed).await?;
    Ok(Json(response))
}

/// Mark a confirmed booking as being worked on (shop owner)
pub async fn start_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let response = shop_transition(&state, &claims, booking_id, BookingStatus::InProgress).await?;
    Ok(Json(response))
}

/// Mark a booking as done (shop owner)
pub async fn complete_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let response = shop_transition(&state, &claims, booking_id, BookingStatus::Completed).await?;
    Ok(Json(response))
}

/// Cancel a booking; either party may cancel before work starts
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let booking = visible_booking(&state, &claims, booking_id).await?;
    let updated = transition(&state.db, booking, BookingStatus::Cancelled).await?;
    Ok(Json(describe_booking(&state.db, updated).await?))
}
