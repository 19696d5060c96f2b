mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use carwash_backend::entities::booking::BookingStatus;
use carwash_backend::entities::user::UserRole;
use common::setup;

#[tokio::test]
async fn test_get_shop_lists_active_services_and_rating() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;
    let vehicle = app.vehicle(driver.profile_id).await;
    let active = app.service(shop.profile_id, 25.0, true).await;
    app.service(shop.profile_id, 10.0, false).await;
    let done = app.booking(&driver, &active, &vehicle, BookingStatus::Completed).await;
    app.review(&done, 4).await;

    let res = app.get(&format!("/api/shops/{}", shop.profile_id), None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["shop_name"], "shop@example.com wash");
    assert_eq!(res.body["services"].as_array().map(Vec::len), Some(1));
    assert_eq!(res.body["services"][0]["id"], active.id.to_string());
    assert_eq!(res.body["rating"]["review_count"], 1);
    assert_eq!(res.body["rating"]["average_rating"].as_f64(), Some(4.0));
}

#[tokio::test]
async fn test_get_unknown_shop_is_not_found() {
    let app = setup().await;

    let res = app.get(&format!("/api/shops/{}", Uuid::new_v4()), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .get(&format!("/api/shops/{}/reviews", Uuid::new_v4()), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_shops_filters_by_city() {
    let app = setup().await;
    app.account(UserRole::ShopOwner, "a@example.com").await;
    app.account(UserRole::ShopOwner, "b@example.com").await;

    let all = app.get("/api/shops", None).await;
    assert_eq!(all.body.as_array().map(Vec::len), Some(2));

    let springfield = app.get("/api/shops?city=Springfield", None).await;
    assert_eq!(springfield.body.as_array().map(Vec::len), Some(2));

    let elsewhere = app.get("/api/shops?city=Shelbyville", None).await;
    assert_eq!(elsewhere.body, json!([]));
}

#[tokio::test]
async fn test_review_only_completed_bookings_once() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;
    let vehicle = app.vehicle(driver.profile_id).await;
    let service = app.service(shop.profile_id, 25.0, true).await;
    let pending = app.booking(&driver, &service, &vehicle, BookingStatus::Pending).await;
    let done = app.booking(&driver, &service, &vehicle, BookingStatus::Completed).await;

    let res = app
        .post("/api/reviews", Some(&driver.token), json!({ "booking_id": pending.id, "rating": 5 }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post("/api/reviews", Some(&driver.token), json!({ "booking_id": done.id, "rating": 9 }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post(
            "/api/reviews",
            Some(&driver.token),
            json!({ "booking_id": done.id, "rating": 5, "comment": "Great" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["shop_owner_id"], shop.profile_id.to_string());

    let again = app
        .post("/api/reviews", Some(&driver.token), json!({ "booking_id": done.id, "rating": 4 }))
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let reviews = app
        .get(&format!("/api/shops/{}/reviews", shop.profile_id), None)
        .await;
    assert_eq!(reviews.body.as_array().map(Vec::len), Some(1));
    assert_eq!(reviews.body[0]["reviewer_name"], "driver@example.com name");
}

#[tokio::test]
async fn test_services_are_scoped_to_their_shop() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;
    let rival = app.account(UserRole::ShopOwner, "rival@example.com").await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;
    let service = app.service(shop.profile_id, 25.0, true).await;
    let uri = format!("/api/services/{}", service.id);

    let res = app
        .request(Method::PUT, &uri, Some(&rival.token), Some(json!({ "price": 1.0 })))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.get("/api/services", Some(&driver.token)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .request(Method::PUT, &uri, Some(&shop.token), Some(json!({ "price": -5.0 })))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(Method::PUT, &uri, Some(&shop.token), Some(json!({ "price": 30.0 })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["price"].as_f64(), Some(30.0));

    let res = app.request(Method::DELETE, &uri, Some(&shop.token), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let listed = app.get("/api/services", Some(&shop.token)).await;
    assert_eq!(listed.body[0]["is_active"], false);
}

#[tokio::test]
async fn test_booked_vehicle_cannot_be_deleted() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;
    let other = app.account(UserRole::CarOwner, "other@example.com").await;
    let service = app.service(shop.profile_id, 25.0, true).await;
    let busy = app.vehicle(driver.profile_id).await;
    let idle = app.vehicle(driver.profile_id).await;
    app.booking(&driver, &service, &busy, BookingStatus::Confirmed).await;

    let res = app
        .request(Method::DELETE, &format!("/api/vehicles/{}", busy.id), Some(&driver.token), None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(Method::DELETE, &format!("/api/vehicles/{}", idle.id), Some(&other.token), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .request(Method::DELETE, &format!("/api/vehicles/{}", idle.id), Some(&driver.token), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let listed = app.get("/api/vehicles", Some(&driver.token)).await;
    assert_eq!(listed.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_profile_update_for_shop_owner() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;

    let res = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(&shop.token),
            Some(json!({ "shop_name": "Bubbles", "city": "Shelbyville", "phone": "555-0199" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["phone"], "555-0199");
    assert_eq!(res.body["profile"]["kind"], "shop_owner");
    assert_eq!(res.body["profile"]["shop_name"], "Bubbles");
    assert_eq!(res.body["profile"]["city"], "Shelbyville");
    assert_eq!(res.body["profile"]["address"], "1 Main St");
}

#[tokio::test]
async fn test_vehicle_with_completed_booking_keeps_shop_history() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;
    let service = app.service(shop.profile_id, 40.0, true).await;
    let vehicle = app.vehicle(driver.profile_id).await;
    let done = app.booking(&driver, &service, &vehicle, BookingStatus::Completed).await;
    app.review(&done, 5).await;

    let res = app
        .request(Method::DELETE, &format!("/api/vehicles/{}", vehicle.id), Some(&driver.token), None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Vehicle has bookings and cannot be deleted");

    let stats = app.get("/api/stats", Some(&shop.token)).await;
    assert_eq!(stats.body["completed_bookings"], 1);
    assert_eq!(stats.body["total_revenue"].as_f64(), Some(40.0));
    assert_eq!(stats.body["total_reviews"], 1);
}

#[tokio::test]
async fn test_vehicle_year_out_of_range_is_rejected() {
    let app = setup().await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;

    let res = app
        .post(
            "/api/vehicles",
            Some(&driver.token),
            json!({ "make": "Ford", "model": "T", "year": 1850, "license_plate": "OLD-1" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Year must be between 1900 and 2100");
}
