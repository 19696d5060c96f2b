mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use carwash_backend::entities::booking::BookingStatus;
use carwash_backend::entities::user::UserRole;
use common::setup;

#[tokio::test]
async fn test_stats_requires_shop_owner() {
    let app = setup().await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;

    assert_eq!(app.get("/api/stats", None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get("/api/stats", Some(&driver.token)).await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_stats_defaults_to_zero() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;

    let res = app.get("/api/stats", Some(&shop.token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body,
        json!({
            "total_bookings": 0,
            "pending_bookings": 0,
            "confirmed_bookings": 0,
            "in_progress_bookings": 0,
            "completed_bookings": 0,
            "cancelled_bookings": 0,
            "total_revenue": 0.0,
            "total_services": 0,
            "active_services": 0,
            "total_reviews": 0,
            "average_rating": 0.0,
        })
    );
}

#[tokio::test]
async fn test_stats_aggregates_only_own_shop() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;
    let rival = app.account(UserRole::ShopOwner, "rival@example.com").await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;
    let vehicle = app.vehicle(driver.profile_id).await;

    let basic = app.service(shop.profile_id, 20.0, true).await;
    let deluxe = app.service(shop.profile_id, 50.0, false).await;
    let elsewhere = app.service(rival.profile_id, 99.0, true).await;

    let done_basic = app.booking(&driver, &basic, &vehicle, BookingStatus::Completed).await;
    let done_deluxe = app.booking(&driver, &deluxe, &vehicle, BookingStatus::Completed).await;
    app.booking(&driver, &basic, &vehicle, BookingStatus::Pending).await;
    app.booking(&driver, &basic, &vehicle, BookingStatus::Cancelled).await;
    let rival_done = app.booking(&driver, &elsewhere, &vehicle, BookingStatus::Completed).await;

    app.review(&done_basic, 5).await;
    app.review(&done_deluxe, 4).await;
    app.review(&rival_done, 1).await;

    let res = app.get("/api/stats", Some(&shop.token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["total_bookings"], 4);
    assert_eq!(res.body["pending_bookings"], 1);
    assert_eq!(res.body["completed_bookings"], 2);
    assert_eq!(res.body["cancelled_bookings"], 1);
    assert_eq!(res.body["total_revenue"].as_f64(), Some(70.0));
    assert_eq!(res.body["total_services"], 2);
    assert_eq!(res.body["active_services"], 1);
    assert_eq!(res.body["total_reviews"], 2);
    assert_eq!(res.body["average_rating"].as_f64(), Some(4.5));
}

#[tokio::test]
async fn test_onboarding_status_tracks_vehicles_for_car_owners() {
    let app = setup().await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;

    assert_eq!(
        app.get("/api/onboarding/status", None).await.status,
        StatusCode::UNAUTHORIZED
    );

    let before = app.get("/api/onboarding/status", Some(&driver.token)).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["role"], "CAR_OWNER");
    assert_eq!(before.body["completed"], false);
    assert_eq!(before.body["vehicle_count"], 0);

    let created = app
        .post(
            "/api/vehicles",
            Some(&driver.token),
            json!({ "make": "Honda", "model": "Civic", "license_plate": "xyz-987" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["license_plate"], "XYZ-987");

    let after = app.get("/api/onboarding/status", Some(&driver.token)).await;
    assert_eq!(after.body["completed"], true);
    assert_eq!(after.body["vehicle_count"], 1);
}

#[tokio::test]
async fn test_onboarding_status_tracks_services_for_shop_owners() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;

    let before = app.get("/api/onboarding/status", Some(&shop.token)).await;
    assert_eq!(before.body["role"], "SHOP_OWNER");
    assert_eq!(before.body["completed"], false);
    assert!(before.body.get("vehicle_count").is_none());

    let created = app
        .post(
            "/api/services",
            Some(&shop.token),
            json!({ "name": "Interior detail", "price": 80.0, "duration_minutes": 90 }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let after = app.get("/api/onboarding/status", Some(&shop.token)).await;
    assert_eq!(after.body["completed"], true);
    assert_eq!(after.body["service_count"], 1);
}

#[tokio::test]
async fn test_dashboard_redirects_without_session_cookie() {
    let app = setup().await;

    let res = app.get("/dashboard/bookings", None).await;

    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        res.headers[header::LOCATION],
        "/login?callbackUrl=/dashboard/bookings"
    );

    let res = app.get("/onboarding", None).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_dashboard_with_session_cookie_returns_page_context() {
    let app = setup().await;
    let shop = app.account(UserRole::ShopOwner, "shop@example.com").await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header(header::COOKIE, format!("session_token={}", shop.token))
        .body(Body::empty())
        .unwrap();
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["path"], "/dashboard");
    assert_eq!(res.body["user"]["role"], "SHOP_OWNER");
    assert_eq!(res.body["onboarding_complete"], false);
}

#[tokio::test]
async fn test_dashboard_accepts_bearer_session() {
    let app = setup().await;
    let driver = app.account(UserRole::CarOwner, "driver@example.com").await;

    let res = app.get("/dashboard/bookings", Some(&driver.token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["path"], "/dashboard/bookings");
    assert_eq!(res.body["user"]["role"], "CAR_OWNER");
}
