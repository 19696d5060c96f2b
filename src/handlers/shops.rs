use std::collections::HashMap;

use axum::{
    extract::State,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{car_owner, review, service, shop_owner, user};
use crate::error::{AppError, AppResult};
use crate::extract::{AppPath, AppQuery};
use crate::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub review_count: u64,
}

impl RatingSummary {
    /// Average rounded to two decimals; zero when there are no ratings.
    pub fn from_ratings<I: IntoIterator<Item = i32>>(ratings: I) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0i64, 0u64), |(sum, count), r| (sum + i64::from(r), count + 1));

        if count == 0 {
            return Self::default();
        }

        let average = sum as f64 / count as f64;
        Self {
            average_rating: (average * 100.0).round() / 100.0,
            review_count: count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_minutes: i32,
}

impl From<service::Model> for ServiceInfo {
    fn from(s: service::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            price: s.price,
            duration_minutes: s.duration_minutes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShopSummary {
    pub id: Uuid,
    pub shop_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub active_services: usize,
    pub rating: RatingSummary,
}

#[derive(Debug, Serialize)]
pub struct ShopDetailResponse {
    pub id: Uuid,
    pub shop_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub owner_name: String,
    pub services: Vec<ServiceInfo>,
    pub rating: RatingSummary,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub reviewer_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ShopListQuery {
    pub city: Option<String>,
}

async fn find_shop(state: &AppState, shop_id: Uuid) -> AppResult<shop_owner::Model> {
    shop_owner::Entity::find_by_id(shop_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))
}

/// List shops, optionally restricted to one city
pub async fn list_shops(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ShopListQuery>,
) -> AppResult<Json<Vec<ShopSummary>>> {
    let mut query = shop_owner::Entity::find().order_by_asc(shop_owner::Column::ShopName);
    if let Some(city) = params.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        query = query.filter(shop_owner::Column::City.eq(city));
    }
    let shops = query.all(&state.db).await?;
    let shop_ids: Vec<Uuid> = shops.iter().map(|s| s.id).collect();

    let services = service::Entity::find()
        .filter(service::Column::ShopOwnerId.is_in(shop_ids.clone()))
        .filter(service::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;

    let ratings: Vec<(Uuid, i32)> = review::Entity::find()
        .select_only()
        .column(review::Column::ShopOwnerId)
        .column(review::Column::Rating)
        .filter(review::Column::ShopOwnerId.is_in(shop_ids))
        .into_tuple()
        .all(&state.db)
        .await?;

    let mut service_counts: HashMap<Uuid, usize> = HashMap::new();
    for s in &services {
        *service_counts.entry(s.shop_owner_id).or_default() += 1;
    }

    let mut ratings_by_shop: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for (shop_id, rating) in ratings {
        ratings_by_shop.entry(shop_id).or_default().push(rating);
    }

    let responses = shops
        .into_iter()
        .map(|s| ShopSummary {
            active_services: service_counts.get(&s.id).copied().unwrap_or(0),
            rating: RatingSummary::from_ratings(
                ratings_by_shop.remove(&s.id).unwrap_or_default(),
            ),
            id: s.id,
            shop_name: s.shop_name,
            address: s.address,
            city: s.city,
        })
        .collect();

    Ok(Json(responses))
}

/// Public shop page: profile, active services and rating
pub async fn get_shop(
    State(state): State<AppState>,
    AppPath(shop_id): AppPath<Uuid>,
) -> AppResult<Json<ShopDetailResponse>> {
    let shop = find_shop(&state, shop_id).await?;

    let (owner, services, ratings) = tokio::try_join!(
        user::Entity::find_by_id(shop.user_id).one(&state.db),
        service::Entity::find()
            .filter(service::Column::ShopOwnerId.eq(shop.id))
            .filter(service::Column::IsActive.eq(true))
            .order_by_asc(service::Column::Price)
            .all(&state.db),
        review::Entity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::ShopOwnerId.eq(shop.id))
            .into_tuple::<i32>()
            .all(&state.db),
    )?;

    Ok(Json(ShopDetailResponse {
        id: shop.id,
        shop_name: shop.shop_name,
        address: shop.address,
        city: shop.city,
        description: shop.description,
        phone: shop.phone,
        owner_name: owner.map(|u| u.name).unwrap_or_default(),
        services: services.into_iter().map(ServiceInfo::from).collect(),
        rating: RatingSummary::from_ratings(ratings),
    }))
}

/// Reviews left for a shop, newest first
pub async fn shop_reviews(
    State(state): State<AppState>,
    AppPath(shop_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let shop = find_shop(&state, shop_id).await?;

    let reviews = review::Entity::find()
        .filter(review::Column::ShopOwnerId.eq(shop.id))
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let owner_ids: Vec<Uuid> = reviews.iter().map(|r| r.car_owner_id).collect();
    let owners = car_owner::Entity::find()
        .filter(car_owner::Column::Id.is_in(owner_ids))
        .all(&state.db)
        .await?;
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(owners.iter().map(|o| o.user_id).collect::<Vec<_>>()))
        .all(&state.db)
        .await?;

    let responses = reviews
        .into_iter()
        .map(|r| {
            let reviewer = owners
                .iter()
                .find(|o| o.id == r.car_owner_id)
                .and_then(|o| users.iter().find(|u| u.id == o.user_id));
            ReviewResponse {
                id: r.id,
                rating: r.rating,
                comment: r.comment,
                reviewer_name: reviewer.map(|u| u.name.clone()).unwrap_or_default(),
                created_at: r.created_at.with_timezone(&Utc),
            }
        })
        .collect();

    Ok(Json(responses))
}
