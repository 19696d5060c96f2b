use axum::{extract::State, Extension, Json};
use sea_orm::{
    sea_query::Expr, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use serde::Serialize;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::{review, service};
use crate::error::AppResult;
use crate::handlers::profile::current_shop_owner;
use crate::handlers::shops::RatingSummary;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Default, Serialize)]
pub struct StatsResponse {
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub confirmed_bookings: u64,
    pub in_progress_bookings: u64,
    pub completed_bookings: u64,
    pub cancelled_bookings: u64,
    pub total_revenue: f64,
    pub total_services: u64,
    pub active_services: u64,
    pub total_reviews: u64,
    pub average_rating: f64,
}

/// Dashboard aggregates for the shop owner's shop
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<StatsResponse>> {
    let shop = current_shop_owner(&state.db, &claims).await?;
    let db = &state.db;

    let shop_bookings = || booking::Entity::find().filter(booking::Column::ShopOwnerId.eq(shop.id));
    let with_status = |status: BookingStatus| {
        shop_bookings()
            .filter(booking::Column::Status.eq(status))
            .count(db)
    };
    let shop_services = || service::Entity::find().filter(service::Column::ShopOwnerId.eq(shop.id));

    let (
        total_bookings,
        pending_bookings,
        confirmed_bookings,
        in_progress_bookings,
        completed_bookings,
        cancelled_bookings,
        revenue,
        total_services,
        active_services,
        ratings,
    ) = tokio::try_join!(
        shop_bookings().count(db),
        with_status(BookingStatus::Pending),
        with_status(BookingStatus::Confirmed),
        with_status(BookingStatus::InProgress),
        with_status(BookingStatus::Completed),
        with_status(BookingStatus::Cancelled),
        shop_bookings()
            .select_only()
            .column_as(Expr::col(booking::Column::TotalAmount).sum(), "revenue")
            .filter(booking::Column::Status.eq(BookingStatus::Completed))
            .into_tuple::<Option<f64>>()
            .one(db),
        shop_services().count(db),
        shop_services()
            .filter(service::Column::IsActive.eq(true))
            .count(db),
        review::Entity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::ShopOwnerId.eq(shop.id))
            .into_tuple::<i32>()
            .all(db),
    )?;

    let rating = RatingSummary::from_ratings(ratings);

    Ok(Json(StatsResponse {
        total_bookings,
        pending_bookings,
        confirmed_bookings,
        in_progress_bookings,
        completed_bookings,
        cancelled_bookings,
        total_revenue: revenue.flatten().unwrap_or(0.0),
        total_services,
        active_services,
        total_reviews: rating.review_count,
        average_rating: rating.average_rating,
    }))
}
