use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{auth, bookings, onboarding, profile, reviews, services, shops, stats, vehicles};
use crate::middleware::auth::{auth_middleware, page_guard, require_car_owner, require_shop_owner};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let rate_limited = state.config.rate_limit_enabled;

    // Public routes (per-IP rate limiting)
    let mut auth_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let mut public_routes = Router::new()
        .route("/shops", get(shops::list_shops))
        .route("/shops/{id}", get(shops::get_shop))
        .route("/shops/{id}/reviews", get(shops::shop_reviews));

    if rate_limited {
        let public_governor = create_public_governor();
        auth_routes = auth_routes.layer(public_governor.clone());
        public_routes = public_routes.layer(public_governor);
    }

    // Any signed-in user; role checks that differ per operation happen in the handlers
    let session_routes = Router::new()
        .route("/auth/session", get(auth::session))
        .route("/onboarding/status", get(onboarding::status))
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/bookings/{id}", get(bookings::get_booking))
        .route("/bookings/{id}/confirm", post(bookings::confirm_booking))
        .route("/bookings/{id}/start", post(bookings::start_booking))
        .route("/bookings/{id}/complete", post(bookings::complete_booking))
        .route("/bookings/{id}/cancel", post(bookings::cancel_booking))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Car owner routes (requires auth + car owner role)
    let mut car_owner_routes = Router::new()
        .route("/vehicles", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route(
            "/vehicles/{id}",
            put(vehicles::update_vehicle).delete(vehicles::delete_vehicle),
        )
        .route("/reviews", post(reviews::create_review));
    if rate_limited {
        car_owner_routes = car_owner_routes.layer(create_role_governor(RateLimitedRole::CarOwner));
    }
    let car_owner_routes = car_owner_routes
        .layer(middleware::from_fn(require_car_owner))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Shop owner routes (requires auth + shop owner role)
    let mut shop_owner_routes = Router::new()
        .route("/services", get(services::list_services).post(services::create_service))
        .route(
            "/services/{id}",
            put(services::update_service).delete(services::delete_service),
        )
        .route("/stats", get(stats::get_stats));
    if rate_limited {
        shop_owner_routes = shop_owner_routes.layer(create_role_governor(RateLimitedRole::ShopOwner));
    }
    let shop_owner_routes = shop_owner_routes
        .layer(middleware::from_fn(require_shop_owner))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Browser pages: redirect to /login without a session cookie
    let page_routes = Router::new()
        .route("/dashboard", get(onboarding::page_context))
        .route("/dashboard/{*rest}", get(onboarding::page_context))
        .route("/onboarding", get(onboarding::page_context))
        .layer(middleware::from_fn_with_state(state.clone(), page_guard));

    let api = Router::new()
        .merge(auth_routes)
        .merge(public_routes)
        .merge(session_routes)
        .merge(car_owner_routes)
        .merge(shop_owner_routes);

    Router::new()
        .nest("/api", api)
        .merge(page_routes)
        .with_state(state)
}
