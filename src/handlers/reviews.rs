use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::review;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::profile::current_car_owner;
use crate::utils::jwt::Claims;
use crate::utils::validation::present;
use crate::AppState;

const ALREADY_REVIEWED: &str = "Booking has already been reviewed";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub booking_id: Option<Uuid>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

/// Review the shop of one of the caller's completed bookings
pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<review::Model>)> {
    let (Some(booking_id), Some(rating)) = (payload.booking_id, payload.rating) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };
    payload.validate()?;

    let owner = current_car_owner(&state.db, &claims).await?;

    let booking = booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::CarOwnerId.eq(owner.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.status != BookingStatus::Completed {
        return Err(AppError::BadRequest(
            "Only completed bookings can be reviewed".to_string(),
        ));
    }

    let already_reviewed = review::Entity::find()
        .filter(review::Column::BookingId.eq(booking.id))
        .count(&state.db)
        .await?;

    if already_reviewed > 0 {
        return Err(AppError::BadRequest(ALREADY_REVIEWED.to_string()));
    }

    let review = review::ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_owner_id: Set(booking.shop_owner_id),
        car_owner_id: Set(owner.id),
        booking_id: Set(booking.id),
        rating: Set(rating),
        comment: Set(present(&payload.comment)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.db)
    .await
    // A concurrent request may have reviewed the booking after the check above
    .map_err(|e| AppError::unique_violation(e, ALREADY_REVIEWED))?;

    tracing::info!(review_id = %review.id, shop_owner_id = %review.shop_owner_id, "Review posted");
    Ok((StatusCode::CREATED, Json(review)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rating: i32) -> CreateReviewRequest {
        CreateReviewRequest {
            booking_id: Some(Uuid::new_v4()),
            rating: Some(rating),
            comment: None,
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(request(0).validate().is_err());
        assert!(request(1).validate().is_ok());
        assert!(request(5).validate().is_ok());
        assert!(request(6).validate().is_err());
    }
}
